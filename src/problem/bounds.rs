//! Bound containers and their validation.
use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Bound '{name}' has length {got}, expected {expected}")]
    LengthMismatch { name: &'static str, expected: usize, got: usize },
    #[error("Bound pair '{name}' is inverted at index {index}: lower {lower} > upper {upper}")]
    Inverted { name: &'static str, index: usize, lower: f64, upper: f64 },
    #[error("Bound pair '{name}' holds NaN at index {index}")]
    NotANumber { name: &'static str, index: usize },
}

/// User-facing bounds for a problem: `lbx <= x <= ubx`, `lbg <= g(x, p) <= ubg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub lbx: Vec<f64>,
    pub ubx: Vec<f64>,
    pub lbg: Vec<f64>,
    pub ubg: Vec<f64>,
}

impl BoundsConfig {
    /// Unbounded `x` and equality-free, unbounded `g`.
    pub fn unbounded(n: usize, m: usize) -> Self {
        Self {
            lbx: vec![f64::NEG_INFINITY; n],
            ubx: vec![f64::INFINITY; n],
            lbg: vec![f64::NEG_INFINITY; m],
            ubg: vec![f64::INFINITY; m],
        }
    }

    /// Checks the configuration against the problem dimensions.
    pub fn validate(&self, n: usize, m: usize) -> Result<(), ConfigError> {
        check_length("lbx", &self.lbx, n)?;
        check_length("ubx", &self.ubx, n)?;
        check_length("lbg", &self.lbg, m)?;
        check_length("ubg", &self.ubg, m)?;
        check_order("x", &self.lbx, &self.ubx)?;
        check_order("g", &self.lbg, &self.ubg)
    }
}

fn check_length(name: &'static str, values: &[f64], expected: usize) -> Result<(), ConfigError> {
    if values.len() != expected {
        return Err(ConfigError::LengthMismatch { name, expected, got: values.len() });
    }
    Ok(())
}

fn check_order(name: &'static str, lower: &[f64], upper: &[f64]) -> Result<(), ConfigError> {
    for (index, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
        if lo.is_nan() || hi.is_nan() {
            return Err(ConfigError::NotANumber { name, index });
        }
        if lo > hi {
            return Err(ConfigError::Inverted { name, index, lower: lo, upper: hi });
        }
    }
    Ok(())
}

/// Elementwise interval `lowerbound <= v <= upperbound`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub lowerbound: Vec<f64>,
    pub upperbound: Vec<f64>,
}

impl BoxBounds {
    pub fn len(&self) -> usize {
        self.lowerbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lowerbound.is_empty()
    }

    pub fn contains(&self, v: &[f64], tolerance: f64) -> bool {
        v.len() == self.len()
            && v.iter()
                .zip(self.lowerbound.iter().zip(&self.upperbound))
                .all(|(&x, (&lo, &hi))| x >= lo - tolerance && x <= hi + tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> BoundsConfig {
        BoundsConfig {
            lbx: vec![-1.0, -2.0],
            ubx: vec![1.0, 2.0],
            lbg: vec![0.0],
            ubg: vec![0.0],
        }
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(config().validate(2, 1), Ok(()));
        assert_eq!(BoundsConfig::unbounded(3, 0).validate(3, 0), Ok(()));
    }

    #[rstest]
    #[case(3, 1, "lbx", 3, 2)]
    #[case(2, 2, "lbg", 2, 1)]
    fn test_length_mismatch(
        #[case] n: usize,
        #[case] m: usize,
        #[case] name: &'static str,
        #[case] expected: usize,
        #[case] got: usize,
    ) {
        assert_eq!(config().validate(n, m), Err(ConfigError::LengthMismatch { name, expected, got }));
    }

    #[test]
    fn test_short_upper_bound() {
        let mut cfg = config();
        cfg.ubx.pop();
        assert_eq!(
            cfg.validate(2, 1),
            Err(ConfigError::LengthMismatch { name: "ubx", expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_inverted_bounds() {
        let mut cfg = config();
        cfg.lbg[0] = 1.0;
        assert!(matches!(cfg.validate(2, 1), Err(ConfigError::Inverted { name: "g", index: 0, .. })));
    }

    #[test]
    fn test_nan_bounds() {
        let mut cfg = config();
        cfg.ubx[1] = f64::NAN;
        assert_eq!(cfg.validate(2, 1), Err(ConfigError::NotANumber { name: "x", index: 1 }));
    }

    #[test]
    fn test_box_contains() {
        let b = BoxBounds { lowerbound: vec![0.0, 0.0], upperbound: vec![1.0, f64::INFINITY] };
        assert!(b.contains(&[0.5, 1e9], 0.0));
        assert!(!b.contains(&[1.5, 0.0], 1e-9));
        assert!(!b.contains(&[0.5], 0.0));
    }

    #[test]
    fn test_config_from_json() {
        let cfg: BoundsConfig =
            serde_json::from_str(r#"{"lbx":[-1.0,-2.0],"ubx":[1.0,2.0],"lbg":[0.0],"ubg":[0.0]}"#).unwrap();
        assert_eq!(cfg, config());
    }
}
