//! Label-placement value object.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Reference rectangle where a product's label is expected to sit.
///
/// Set once at registration and handed to the label oracle during
/// verification scans; never mutated afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, DomainError> {
        if [x, y, width, height].iter().any(|v| !v.is_finite()) {
            return Err(DomainError::validation("label region must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(DomainError::validation(
                "label region width and height must be positive",
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_rectangles() {
        assert!(LabelRegion::new(0.0, 0.0, 0.0, 50.0).is_err());
        assert!(LabelRegion::new(0.0, 0.0, 100.0, -1.0).is_err());
        assert!(LabelRegion::new(f64::INFINITY, 0.0, 100.0, 50.0).is_err());
    }

    #[test]
    fn accepts_reasonable_rectangles() {
        let r = LabelRegion::new(0.0, 0.0, 100.0, 50.0).unwrap();
        assert_eq!(r.width, 100.0);
    }
}
