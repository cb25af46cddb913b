//! Containment of node positions inside the canvas
//!
//! Both shapes are pure functions of `(candidate, width, height)`.

use serde::{Deserialize, Serialize};

use crate::vector::Vector2;

/// Shape of the region nodes are confined to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryShape {
    /// The full `width x height` rectangle anchored at the origin
    #[default]
    Rectangle,
    /// The ellipse inscribed in that rectangle
    Ellipse,
}

impl BoundaryShape {
    /// Move `pos` to the nearest admissible point (per-axis, not Euclidean).
    pub fn clamp(self, pos: Vector2, width: f64, height: f64) -> Vector2 {
        match self {
            BoundaryShape::Rectangle => {
                Vector2::new(pos.x.clamp(0.0, width), pos.y.clamp(0.0, height))
            }
            BoundaryShape::Ellipse => clamp_to_ellipse(pos, width, height),
        }
    }

    /// Whether `pos` lies inside the shape, allowing `eps` of rounding slack
    pub fn contains(self, pos: Vector2, width: f64, height: f64, eps: f64) -> bool {
        match self {
            BoundaryShape::Rectangle => {
                pos.x >= -eps && pos.x <= width + eps && pos.y >= -eps && pos.y <= height + eps
            }
            BoundaryShape::Ellipse => {
                let (a, b) = (width / 2.0, height / 2.0);
                let u = (pos.x - a) / a;
                let v = (pos.y - b) / b;
                u * u + v * v <= 1.0 + eps
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryShape::Rectangle => "rectangle",
            BoundaryShape::Ellipse => "ellipse",
        }
    }
}

impl std::fmt::Display for BoundaryShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn clamp_to_ellipse(pos: Vector2, width: f64, height: f64) -> Vector2 {
    let center = Vector2::new(width / 2.0, height / 2.0);
    let (a, b) = (center.x, center.y);
    let rel = pos.subtract(center);

    // Radicands go negative once the other coordinate is already outside
    // the half extent; those collapse to a zero bound.
    let x_bound = a * (1.0 - (rel.y / b).powi(2)).max(0.0).sqrt();
    let x = rel.x.clamp(-x_bound, x_bound);
    let y_bound = b * (1.0 - (x / a).powi(2)).max(0.0).sqrt();
    let y = rel.y.clamp(-y_bound, y_bound);

    Vector2::new(x, y).add(center)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn rectangle_clamps_each_axis() {
        let shape = BoundaryShape::Rectangle;

        assert_eq!(
            shape.clamp(Vector2::new(-1.0, 5.0), 2.0, 3.0),
            Vector2::new(0.0, 3.0)
        );
        assert_eq!(
            shape.clamp(Vector2::new(1.0, 1.0), 2.0, 3.0),
            Vector2::new(1.0, 1.0)
        );
    }

    #[test]
    fn ellipse_leaves_interior_points_alone() {
        let p = Vector2::new(0.6, 0.45);
        let clamped = BoundaryShape::Ellipse.clamp(p, 1.0, 1.0);
        assert!(clamped.subtract(p).magnitude() < EPS);
    }

    #[test]
    fn ellipse_on_square_canvas_matches_circle_formula() {
        // |x| <= sqrt(r^2 - y^2) around the center
        let p = BoundaryShape::Ellipse.clamp(Vector2::new(1.0, 0.8), 1.0, 1.0);
        let y = 0.3_f64;
        let expected_x = 0.5 + (0.25 - y * y).sqrt();

        assert!((p.x - expected_x).abs() < EPS);
        assert!((p.y - 0.8).abs() < EPS);
    }

    #[test]
    fn ellipse_guards_negative_radicand() {
        // y is already beyond the half extent: the x bound collapses to zero
        // instead of producing NaN.
        let p = BoundaryShape::Ellipse.clamp(Vector2::new(5.0, 9.0), 2.0, 1.0);

        assert!(p.is_finite());
        assert_eq!(p, Vector2::new(1.0, 1.0));
        assert!(BoundaryShape::Ellipse.contains(p, 2.0, 1.0, EPS));
    }

    #[test]
    fn ellipse_clamp_always_lands_inside() {
        let (w, h) = (3.0, 1.5);
        for i in -20..=20 {
            for j in -20..=20 {
                let candidate = Vector2::new(i as f64 * 0.25, j as f64 * 0.2);
                let p = BoundaryShape::Ellipse.clamp(candidate, w, h);
                assert!(
                    BoundaryShape::Ellipse.contains(p, w, h, EPS),
                    "{candidate} clamped to {p} which is outside"
                );
            }
        }
    }

    #[test]
    fn rectangle_contains_is_inclusive() {
        let shape = BoundaryShape::Rectangle;
        assert!(shape.contains(Vector2::new(0.0, 1.0), 1.0, 1.0, 0.0));
        assert!(!shape.contains(Vector2::new(1.1, 0.5), 1.0, 1.0, EPS));
    }

    #[test]
    fn serializes_in_snake_case() {
        let json = serde_json::to_string(&BoundaryShape::Ellipse).unwrap();
        assert_eq!(json, "\"ellipse\"");
    }
}
