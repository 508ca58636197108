//! Typing speed profiles.
//!
//! A profile maps simulated time to a typing velocity in characters per
//! second over a (possibly bounded) domain. Leaving the domain is the
//! normal termination condition for timeline generation, not an error.

use serde::{Deserialize, Serialize};

/// One knot of a piecewise-linear speed profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedPoint {
    /// Time in seconds from the start of typing.
    pub t: f64,
    /// Velocity at that time.
    pub chars_per_sec: f64,
}

/// Serde-friendly speed function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeedProfile {
    /// Constant velocity. With `duration` set, the domain ends after that
    /// many seconds; otherwise generation stops at the end of the text.
    Constant {
        chars_per_sec: f64,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// Piecewise-linear interpolation between knots, domain `[0, last.t]`.
    Segments { points: Vec<SpeedPoint> },
}

impl Default for SpeedProfile {
    fn default() -> Self {
        SpeedProfile::Constant {
            chars_per_sec: 5.0,
            duration: None,
        }
    }
}

impl SpeedProfile {
    /// Velocity at time `t`, or `None` once the domain is exhausted.
    pub fn speed_at(&self, t: f64) -> Option<f64> {
        match self {
            SpeedProfile::Constant {
                chars_per_sec,
                duration,
            } => match duration {
                Some(d) if t > *d => None,
                _ => Some(*chars_per_sec),
            },
            SpeedProfile::Segments { points } => {
                let last = points.last()?;
                if t > last.t {
                    return None;
                }
                let first = points.first().expect("non-empty");
                if t <= first.t {
                    return Some(first.chars_per_sec);
                }
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if t <= b.t {
                        let span = b.t - a.t;
                        if span <= 0.0 {
                            return Some(b.chars_per_sec);
                        }
                        let k = (t - a.t) / span;
                        return Some(a.chars_per_sec + k * (b.chars_per_sec - a.chars_per_sec));
                    }
                }
                Some(last.chars_per_sec)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_unbounded() {
        let p = SpeedProfile::default();
        assert_eq!(p.speed_at(0.0), Some(5.0));
        assert_eq!(p.speed_at(1e9), Some(5.0));
    }

    #[test]
    fn test_constant_bounded_domain() {
        let p = SpeedProfile::Constant {
            chars_per_sec: 3.0,
            duration: Some(2.0),
        };
        assert_eq!(p.speed_at(2.0), Some(3.0));
        assert_eq!(p.speed_at(2.01), None);
    }

    #[test]
    fn test_segments_interpolate() {
        let p = SpeedProfile::Segments {
            points: vec![
                SpeedPoint { t: 0.0, chars_per_sec: 0.0 },
                SpeedPoint { t: 2.0, chars_per_sec: 10.0 },
            ],
        };
        assert_eq!(p.speed_at(1.0), Some(5.0));
        assert_eq!(p.speed_at(2.0), Some(10.0));
        assert_eq!(p.speed_at(2.1), None);
    }

    #[test]
    fn test_segments_empty_is_exhausted() {
        let p = SpeedProfile::Segments { points: vec![] };
        assert_eq!(p.speed_at(0.0), None);
    }
}
