//! Scalar 2D vector math, axis-aligned bounding rectangles, and the
//! float/integer coordinate conversion used by the offset and clip engines.

use std::ops::{Add, Sub};

/// Epsilon used by [`Vector2::approx_eq`] and the polygon validator.
pub const EPSILON: f32 = 1.0e-5;

/// A point or direction in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Z-component of the 3D cross product of `self` and `other` treated as
    /// vectors in the z=0 plane.
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            Self::ZERO
        } else {
            self.scale(1.0 / len)
        }
    }

    /// Normalised perpendicular, rotated 90 degrees counter-clockwise.
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x).normalize()
    }

    pub fn rotate_about_origin(self, angle_radians: f32) -> Self {
        let (sin, cos) = angle_radians.sin_cos();
        Self::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
        )
    }

    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned bounding rectangle. Reads of this type are always
/// snapshots: nothing aliases a shared mutable rect (see the "`_Bounds`
/// mutated via a shared `Quad`" open question in spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vector2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max).scale(0.5)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Scale the rectangle about its own centre by `factor`.
    pub fn scaled_about_center(&self, factor: f32) -> Self {
        let center = self.center();
        let half = Vector2::new(self.width() * 0.5 * factor, self.height() * 0.5 * factor);
        Self::new(center - half, center + half)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, point: Vector2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Does `other` fit entirely strictly inside `self`?
    pub fn strictly_contains(&self, other: &Self) -> bool {
        other.min.x > self.min.x
            && other.min.y > self.min.y
            && other.max.x < self.max.x
            && other.max.y < self.max.y
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            Vector2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vector2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// The four quadrant rectangles of `self`, in top-left, top-right,
    /// bottom-left, bottom-right order.
    pub fn quadrants(&self) -> [Self; 4] {
        let center = self.center();
        [
            Self::new(Vector2::new(self.min.x, center.y), Vector2::new(center.x, self.max.y)),
            Self::new(center, self.max),
            Self::new(self.min, center),
            Self::new(Vector2::new(center.x, self.min.y), Vector2::new(self.max.x, center.y)),
        ]
    }
}

/// Scaling factor turning [`Vector2`] floats into [`IntPoint`] integers for
/// the offset/clip engine. See spec.md §3 and §6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    A1 = 1,
    A10 = 10,
    A100 = 100,
    A1000 = 1000,
    A10000 = 10000,
    A100000 = 100000,
}

impl Accuracy {
    pub fn factor(self) -> f64 {
        self as i64 as f64
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::A100
    }
}

/// A point in the 64-bit integer coordinate domain used by the clipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Scale a [`Vector2`] by `accuracy` and round half-to-even to an
    /// [`IntPoint`], per spec.md §3/§6.2.
    pub fn from_vector2(v: Vector2, accuracy: Accuracy) -> Self {
        let factor = accuracy.factor();
        Self::new(
            ((v.x as f64) * factor).round_ties_even() as i64,
            ((v.y as f64) * factor).round_ties_even() as i64,
        )
    }

    pub fn to_vector2(self, accuracy: Accuracy) -> Vector2 {
        let factor = accuracy.factor();
        Vector2::new((self.x as f64 / factor) as f32, (self.y as f64 / factor) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_product_sign_matches_orientation() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert!(a.cross(b) > 0.0);
        assert!(b.cross(a) < 0.0);
    }

    #[test]
    fn rotate_about_origin_preserves_length() {
        let v = Vector2::new(3.0, 4.0);
        let rotated = v.rotate_about_origin(1.23);
        assert!((rotated.length() - v.length()).abs() < 1.0e-4);
    }

    #[test]
    fn int_point_round_trip_within_quantisation() {
        let accuracy = Accuracy::A100;
        let v = Vector2::new(1.005, -2.0055);
        let ip = IntPoint::from_vector2(v, accuracy);
        let back = ip.to_vector2(accuracy);
        assert!((back.x - v.x).abs() <= 1.0 / accuracy.factor() as f32 + 1.0e-3);
        assert!((back.y - v.y).abs() <= 1.0 / accuracy.factor() as f32 + 1.0e-3);
    }

    #[test]
    fn aabb_quadrants_cover_strict_containment() {
        let rect = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        let small = Aabb::new(Vector2::new(1.0, 1.0), Vector2::new(2.0, 2.0));
        assert!(rect.quadrants()[2].strictly_contains(&small));
    }

    #[test]
    fn aabb_intersects_is_symmetric() {
        let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(2.0, 2.0));
        let b = Aabb::new(Vector2::new(1.0, 1.0), Vector2::new(3.0, 3.0));
        let c = Aabb::new(Vector2::new(5.0, 5.0), Vector2::new(6.0, 6.0));
        assert!(a.intersects(&b) && b.intersects(&a));
        assert!(!a.intersects(&c) && !c.intersects(&a));
    }
}
