//! Human-facing output: solver reports and trajectory animation frames.
pub mod animation;
pub mod report;

pub use animation::{Animation, AnimationError, Frame, Frames, Patch, Point, VehicleGeometry, VehicleState, Viewport};
pub use report::{format_solver_stats, print_solver_stats};
