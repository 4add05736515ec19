use std::cmp::Ordering;
use std::fmt;

use crate::foundation::error::{DrillError, DrillResult};

pub use kurbo::{Point, Vec2};

/// Start time of a timeline bucket, in seconds.
///
/// Keys order numerically (`2 < 10`), never by their string form. NaN and
/// infinities are rejected at construction and `-0.0` is folded into `0.0`, so
/// the total order agrees with `==` on the wrapped value.
#[derive(Clone, Copy, Debug)]
pub struct TimeKey(f64);

impl TimeKey {
    pub const ZERO: TimeKey = TimeKey(0.0);

    pub fn new(secs: f64) -> DrillResult<Self> {
        if !secs.is_finite() {
            return Err(DrillError::validation(format!(
                "time key must be finite, got {secs}"
            )));
        }
        Ok(Self(secs + 0.0))
    }

    /// Parse a key as written in the document encoding (`"2.5"`, `"0"`).
    pub fn parse(s: &str) -> DrillResult<Self> {
        let secs: f64 = s
            .trim()
            .parse()
            .map_err(|e| DrillError::validation(format!("time key '{s}' is not a number: {e}")))?;
        Self::new(secs)
    }

    pub fn secs(self) -> f64 {
        self.0
    }
}

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for TimeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `destination·p + origin·(1−p)`; exact at `p == 0` and `p == 1`.
pub fn lerp_point(origin: Point, destination: Point, p: f64) -> Point {
    Point::new(
        destination.x * p + origin.x * (1.0 - p),
        destination.y * p + origin.y * (1.0 - p),
    )
}

/// Rendered radius of a lofted ball at flight progress `p`.
///
/// Parabola through `ground` at `p ∈ {0, 1}` peaking at `air` when `p == 0.5`.
pub fn loft_radius(ground: f64, air: f64, p: f64) -> f64 {
    let k = (air - ground).max(0.0).sqrt();
    air - (k * (2.0 * p - 1.0)).powi(2)
}

pub(crate) fn ensure_finite(value: f64, what: &str) -> DrillResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DrillError::validation(format!(
            "{what} must be finite, got {value}"
        )))
    }
}

pub(crate) fn ensure_finite_point(p: Point, what: &str) -> DrillResult<Point> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(p)
    } else {
        Err(DrillError::validation(format!("{what} must be finite")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
