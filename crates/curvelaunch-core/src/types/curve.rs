//! # Curve Types
//!
//! A launch curve is an ordered list of liquidity segments. Each point closes a
//! segment: its liquidity is active from the previous point's sqrt price (or
//! the start price for the first point) up to its own sqrt price.

use crate::constants::MAX_CURVE_POINT;
use crate::errors::{ConfigViolation, CoreResult};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Upper bound of a liquidity segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct CurvePoint {
    /// Segment upper bound (Q64.64)
    pub sqrt_price: u128,
    /// Liquidity active inside the segment (scaled by 2^128)
    pub liquidity: u128,
}

impl CurvePoint {
    pub fn new(sqrt_price: u128, liquidity: u128) -> Self {
        Self {
            sqrt_price,
            liquidity,
        }
    }
}

/// Bounded list of curve points (at most [`MAX_CURVE_POINT`])
///
/// Capacity is enforced on construction, on push and on deserialization.
/// Ordering and liquidity rules are checked by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "client",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")
)]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Curve {
    /// Build a curve from points, rejecting more than the allowed capacity
    pub fn new(points: Vec<CurvePoint>) -> CoreResult<Self> {
        if points.len() > MAX_CURVE_POINT {
            return Err(ConfigViolation::CurveTooLong {
                len: points.len(),
                max: MAX_CURVE_POINT,
            }
            .into());
        }
        Ok(Self { points })
    }

    /// Append a point, failing once the curve is full
    pub fn push(&mut self, point: CurvePoint) -> CoreResult<()> {
        if self.points.len() >= MAX_CURVE_POINT {
            return Err(ConfigViolation::CurveTooLong {
                len: self.points.len() + 1,
                max: MAX_CURVE_POINT,
            }
            .into());
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&CurvePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&CurvePoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurvePoint> {
        self.points.iter()
    }
}

impl TryFrom<Vec<CurvePoint>> for Curve {
    type Error = crate::errors::CurveLaunchError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        Curve::new(points)
    }
}

impl From<Curve> for Vec<CurvePoint> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

impl<'a> IntoIterator for &'a Curve {
    type Item = &'a CurvePoint;
    type IntoIter = std::slice::Iter<'a, CurvePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CurveLaunchError;

    #[test]
    fn test_capacity_enforced_on_new_and_push() {
        let points = vec![CurvePoint::new(1, 1); MAX_CURVE_POINT];
        let mut curve = Curve::new(points).unwrap();
        assert_eq!(curve.len(), MAX_CURVE_POINT);

        let err = curve.push(CurvePoint::new(2, 1)).unwrap_err();
        assert_eq!(
            err,
            CurveLaunchError::InvalidConfiguration(ConfigViolation::CurveTooLong { len: 17, max: 16 })
        );

        let too_long = vec![CurvePoint::default(); MAX_CURVE_POINT + 1];
        assert!(Curve::try_from(too_long).is_err());
    }

    #[test]
    fn test_push_and_access() {
        let mut curve = Curve::default();
        assert!(curve.is_empty());
        curve.push(CurvePoint::new(10, 5)).unwrap();
        curve.push(CurvePoint::new(20, 7)).unwrap();
        assert_eq!(curve.first().map(|p| p.sqrt_price), Some(10));
        assert_eq!(curve.last().map(|p| p.liquidity), Some(7));
        assert_eq!(curve.iter().count(), 2);
        let raw: Vec<CurvePoint> = curve.into();
        assert_eq!(raw.len(), 2);
    }
}
