//! Frame geometry for replaying a closed-loop vehicle trajectory.
//!
//! Nothing here draws. Each `Frame` holds what a plotting front-end needs:
//! the car rectangle (rear-right corner plus rotation), the velocity arrow
//! and the prediction made at that step.
use serde::{Serialize, Deserialize};
use std::time::Duration;
use thiserror::Error;

/// Ratio between the parking spot and the vehicle footprint.
pub const PARKING_SCALE: f64 = 1.2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("Expected at least {expected} prediction polylines, got {got}")]
    PredictionCount { expected: usize, got: usize },
    #[error("Vehicle dimensions must be positive, got width {width} and length {length}")]
    Geometry { width: f64, length: f64 },
    #[error("Frame interval must be a positive, representable duration, got {0} s")]
    Interval(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One column of the state trajectory. `heading` is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleGeometry {
    pub width: f64,
    pub length: f64,
}

/// Axis-aligned rectangle given by its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub corner: Point,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min: Point,
    pub max: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    /// Rear-right corner of the car; the rectangle extends `length` along
    /// the heading and `width` to its left.
    pub corner: Point,
    pub angle_deg: f64,
    pub arrow_origin: Point,
    /// Arrow components `(v cos θ, v sin θ)`.
    pub arrow: Point,
    pub prediction: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    states: Vec<VehicleState>,
    geometry: VehicleGeometry,
    predictions: Option<Vec<Vec<Point>>>,
    interval: Duration,
}

impl Animation {
    /// `ts` is the sampling time in seconds; `predictions[i]`, when given,
    /// is the trajectory predicted at step `i`.
    pub fn new(
        states: Vec<VehicleState>,
        geometry: VehicleGeometry,
        predictions: Option<Vec<Vec<Point>>>,
        ts: f64,
    ) -> Result<Self, AnimationError> {
        if !(geometry.width > 0.0 && geometry.length > 0.0) {
            return Err(AnimationError::Geometry { width: geometry.width, length: geometry.length });
        }
        let interval = match Duration::try_from_secs_f64(ts) {
            Ok(d) if !d.is_zero() => d,
            _ => return Err(AnimationError::Interval(ts)),
        };
        let frames = states.len().saturating_sub(1);
        if let Some(p) = &predictions {
            if p.len() < frames {
                return Err(AnimationError::PredictionCount { expected: frames, got: p.len() });
            }
        }
        Ok(Self { states, geometry, predictions, interval })
    }

    /// One frame per state, except the last.
    pub fn frame_count(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn frame_interval(&self) -> Duration {
        self.interval
    }

    /// The reference spot, centred at the origin.
    pub fn parking_spot(&self) -> Patch {
        let VehicleGeometry { width, length } = self.geometry;
        Patch {
            corner: Point::new(-0.5 * PARKING_SCALE * length, -0.5 * PARKING_SCALE * width),
            width: PARKING_SCALE * length,
            height: PARKING_SCALE * width,
        }
    }

    /// Smallest axis-aligned box holding the rotated footprint of every
    /// state; `None` for an empty trajectory.
    pub fn viewport(&self) -> Option<Viewport> {
        let VehicleGeometry { width, length } = self.geometry;
        self.states.iter().fold(None, |acc, s| {
            let (sin, cos) = s.heading.sin_cos();
            let dx = 0.5 * width * sin.abs() + 0.5 * length * cos.abs();
            let dy = 0.5 * width * cos.abs() + 0.5 * length * sin.abs();
            let (lo, hi) = (Point::new(s.x - dx, s.y - dy), Point::new(s.x + dx, s.y + dy));
            Some(match acc {
                None => Viewport { min: lo, max: hi },
                Some(v) => Viewport {
                    min: Point::new(v.min.x.min(lo.x), v.min.y.min(lo.y)),
                    max: Point::new(v.max.x.max(hi.x), v.max.y.max(hi.y)),
                },
            })
        })
    }

    pub fn frame(&self, index: usize) -> Option<Frame> {
        if index >= self.frame_count() {
            return None;
        }
        let s = &self.states[index];
        let VehicleGeometry { width, length } = self.geometry;
        let (sin, cos) = s.heading.sin_cos();

        let back = Point::new(s.x - 0.5 * length * cos, s.y - 0.5 * length * sin);
        let corner = Point::new(back.x + 0.5 * width * sin, back.y - 0.5 * width * cos);

        Some(Frame {
            index,
            corner,
            angle_deg: s.heading.to_degrees(),
            arrow_origin: Point::new(s.x, s.y),
            arrow: Point::new(s.speed * cos, s.speed * sin),
            prediction: self.predictions.as_ref().and_then(|p| p.get(index).cloned()),
        })
    }

    /// Lazily computed frames. Calling this again starts over.
    pub fn frames(&self) -> Frames<'_> {
        Frames { animation: self, next: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct Frames<'a> {
    animation: &'a Animation,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.animation.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.animation.frame_count().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    const CAR: VehicleGeometry = VehicleGeometry { width: 2.0, length: 4.0 };

    fn state(x: f64, y: f64, heading: f64, speed: f64) -> VehicleState {
        VehicleState { x, y, heading, speed }
    }

    #[test]
    fn test_frame_geometry_heading_east() {
        let anim = Animation::new(vec![state(1.0, 2.0, 0.0, 3.0), state(0.0, 0.0, 0.0, 0.0)], CAR, None, 0.1).unwrap();
        let frame = anim.frame(0).unwrap();
        assert_relative_eq!(frame.corner.x, -1.0);
        assert_relative_eq!(frame.corner.y, 1.0);
        assert_relative_eq!(frame.angle_deg, 0.0);
        assert_relative_eq!(frame.arrow.x, 3.0);
        assert_relative_eq!(frame.arrow.y, 0.0);
        assert_eq!(frame.arrow_origin, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_frame_geometry_heading_north() {
        let anim = Animation::new(vec![state(0.0, 0.0, FRAC_PI_2, 2.0); 2], CAR, None, 0.1).unwrap();
        let frame = anim.frame(0).unwrap();
        // back = (0, -2), corner = back + (1, 0)
        assert_relative_eq!(frame.corner.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.corner.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(frame.angle_deg, 90.0, epsilon = 1e-12);
        assert_relative_eq!(frame.arrow.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.arrow.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_count_and_restart() {
        let states = (0..5).map(|i| state(i as f64, 0.0, 0.0, 1.0)).collect();
        let anim = Animation::new(states, CAR, None, 0.05).unwrap();

        let frames = anim.frames();
        assert_eq!(frames.len(), 4);
        let first: Vec<usize> = frames.map(|f| f.index).collect();
        let second: Vec<usize> = anim.frames().map(|f| f.index).collect();
        assert_eq!(first, vec![0, 1, 2, 3]);
        assert_eq!(first, second);
        assert!(anim.frame(4).is_none());
    }

    #[test]
    fn test_predictions_are_attached_per_step() {
        let states = vec![state(0.0, 0.0, 0.0, 0.0); 3];
        let predictions = vec![vec![Point::new(0.0, 0.0)], vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]];
        let anim = Animation::new(states, CAR, Some(predictions), 0.1).unwrap();
        let frames: Vec<Frame> = anim.frames().collect();
        assert_eq!(frames[1].prediction.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_too_few_predictions() {
        let err = Animation::new(vec![state(0.0, 0.0, 0.0, 0.0); 3], CAR, Some(vec![]), 0.1).unwrap_err();
        assert_eq!(err, AnimationError::PredictionCount { expected: 2, got: 0 });
    }

    #[test]
    fn test_viewport_and_parking_spot() {
        let states = vec![state(0.0, 0.0, 0.0, 0.0), state(10.0, 5.0, FRAC_PI_2, 0.0)];
        let anim = Animation::new(states, CAR, None, 0.1).unwrap();
        let view = anim.viewport().unwrap();
        assert_relative_eq!(view.min.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(view.min.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(view.max.x, 11.0, epsilon = 1e-12);
        assert_relative_eq!(view.max.y, 7.0, epsilon = 1e-12);

        let spot = anim.parking_spot();
        assert_relative_eq!(spot.corner.x, -2.4);
        assert_relative_eq!(spot.corner.y, -1.2);
        assert_relative_eq!(spot.width, 4.8);
        assert_relative_eq!(spot.height, 2.4);
        assert_eq!(anim.frame_interval(), Duration::from_millis(100));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(1e-12)]
    #[case(1e20)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_unusable_interval_is_rejected(#[case] ts: f64) {
        let err = Animation::new(vec![state(0.0, 0.0, 0.0, 0.0); 2], CAR, None, ts).unwrap_err();
        assert!(matches!(err, AnimationError::Interval(_)));
    }

    #[test]
    fn test_empty_trajectory() {
        let anim = Animation::new(vec![], CAR, None, 0.1).unwrap();
        assert_eq!(anim.frame_count(), 0);
        assert!(anim.viewport().is_none());
        assert_eq!(anim.frames().count(), 0);
    }
}
