//! Validates authored polygons once, at [`crate::NavElement`] construction
//! time (spec.md §4.1). Failures are fatal to construction and are never
//! recovered at runtime.

use itertools::Itertools;

use crate::error::NavError;
use crate::geometry::{Vector2, EPSILON};

/// Reject fewer than 3 vertices, clockwise or colinear-seeded winding, and
/// non-convex rings. Colinear interior vertices are tolerated.
pub fn validate_polygon(points: &[Vector2]) -> Result<(), NavError> {
    if points.len() < 3 {
        let reason = format!("{} vertices, need at least 3", points.len());
        log::debug!("rejecting polygon: {reason}");
        return Err(NavError::InvalidPolygon { reason });
    }

    let first_edge = points[1] - points[0];
    let second_edge = points[2] - points[1];
    let seed_cross = first_edge.cross(second_edge);
    if seed_cross.abs() <= EPSILON {
        log::debug!("rejecting polygon: first two edges are colinear");
        return Err(NavError::InvalidPolygon {
            reason: "first two edges are colinear".to_string(),
        });
    }
    if seed_cross < 0.0 {
        log::debug!("rejecting polygon: clockwise winding");
        return Err(NavError::InvalidPolygon {
            reason: "clockwise winding".to_string(),
        });
    }

    let mut saw_positive = false;
    let mut saw_negative = false;
    for (a, b, c) in points.iter().copied().circular_tuple_windows() {
        let cross = (b - a).cross(c - b);
        if cross > EPSILON {
            saw_positive = true;
        } else if cross < -EPSILON {
            saw_negative = true;
        }
        if saw_positive && saw_negative {
            log::debug!("rejecting polygon: non-convex, both left and right turns present");
            return Err(NavError::InvalidPolygon {
                reason: "non-convex: both left and right turns present".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vector2> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn accepts_ccw_square() {
        assert!(validate_polygon(&square()).is_ok());
    }

    #[test]
    fn rejects_too_few_vertices() {
        let two = vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)];
        assert!(matches!(
            validate_polygon(&two),
            Err(NavError::InvalidPolygon { .. })
        ));
    }

    #[test]
    fn rejects_clockwise_triangle() {
        let cw = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
        ];
        assert!(matches!(
            validate_polygon(&cw),
            Err(NavError::InvalidPolygon { .. })
        ));
    }

    #[test]
    fn rejects_non_convex_quad() {
        // A dart / arrowhead shape: CCW overall, but concave at one vertex.
        let dart = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        ];
        assert!(matches!(
            validate_polygon(&dart),
            Err(NavError::InvalidPolygon { .. })
        ));
    }

    #[test]
    fn tolerates_colinear_vertices() {
        let with_colinear = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(0.5, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        assert!(validate_polygon(&with_colinear).is_ok());
    }
}
