use crate::store::Operation;

/// Applies a single operation to scalar operands.
/// Unary operations ignore `b`.
#[inline(always)]
pub fn apply(op: Operation, a: f64, b: f64) -> f64 {
    match op {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => a / b,
        Operation::Power => a.powf(b),
        Operation::Negate => -a,
        Operation::Sin => a.sin(),
        Operation::Cos => a.cos(),
        Operation::Tan => a.tan(),
        Operation::Exp => a.exp(),
        Operation::Log => a.ln(),
        Operation::Sqrt => a.sqrt(),
        Operation::Tanh => a.tanh(),
        Operation::Atan => a.atan(),
    }
}
