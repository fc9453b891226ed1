//! The authoring entity (spec.md §3/§4.2, component C5): one convex polygon
//! plus pose and offset, owning its inflated points, world points, and AABB.

use crate::engine;
use crate::error::NavError;
use crate::geometry::{Accuracy, Aabb, IntPoint, Vector2};
use crate::ids::GroupId;
use crate::validator::validate_polygon;

/// Obstacle vs surface is a two-variant tagged enum (spec.md §9
/// "Polymorphism"): they share geometry, pose, and offset, and only branch
/// in group rebuild and graph building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    Obstacle,
    Surface { cost: f32 },
}

impl ElementKind {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, ElementKind::Obstacle)
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, ElementKind::Surface { .. })
    }
}

/// One authored polygon, its current pose, and the caches derived from
/// them. See spec.md §3 for the full invariant list.
#[derive(Debug, Clone)]
pub struct NavElement {
    pub(crate) kind: ElementKind,
    pub(crate) original_points: Vec<Vector2>,
    pub(crate) position: Vector2,
    pub(crate) rotation: f32,
    pub(crate) extra_offset: f32,

    pub(crate) extended_points: Vec<Vector2>,
    pub(crate) world_points: Vec<Vector2>,
    pub(crate) int_world_points: Vec<IntPoint>,
    pub(crate) aabb: Aabb,

    pub(crate) dirty: bool,
    pub(crate) extend_dirty: bool,
    pub(crate) group_id: GroupId,
    pub(crate) in_quadtree: bool,
}

impl NavElement {
    pub(crate) fn new(
        kind: ElementKind,
        original_points: Vec<Vector2>,
        position: Vector2,
        rotation: f32,
        extra_offset: f32,
    ) -> Result<Self, NavError> {
        validate_polygon(&original_points)?;
        // A zero-size placeholder AABB; refresh() computes the real one
        // before this element is ever queried or inserted into the tree.
        let aabb = Aabb::new(position, position);
        Ok(Self {
            kind,
            original_points,
            position,
            rotation,
            extra_offset: extra_offset.max(0.0),
            extended_points: Vec::new(),
            world_points: Vec::new(),
            int_world_points: Vec::new(),
            aabb,
            dirty: true,
            extend_dirty: true,
            group_id: GroupId::UNASSIGNED,
            in_quadtree: false,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn cost(&self) -> Option<f32> {
        match self.kind {
            ElementKind::Surface { cost } => Some(cost),
            ElementKind::Obstacle => None,
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn extra_offset(&self) -> f32 {
        self.extra_offset
    }

    pub fn world_points(&self) -> &[Vector2] {
        &self.world_points
    }

    /// Snapshot of the current AABB. Never an alias: every call returns a
    /// fresh copy, per the "`_Bounds`... mutated via a shared `Quad`" open
    /// question in spec.md §9 (resolved here as "always a value").
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_position(&mut self, position: Vector2) {
        if !self.position.approx_eq(position, 0.0) {
            self.position = position;
            self.dirty = true;
        }
    }

    pub(crate) fn set_rotation(&mut self, rotation: f32) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.dirty = true;
        }
    }

    pub(crate) fn set_extra_offset(&mut self, extra_offset: f32) {
        let extra_offset = extra_offset.max(0.0);
        if self.extra_offset != extra_offset {
            self.extra_offset = extra_offset;
            self.dirty = true;
            self.extend_dirty = true;
        }
    }

    pub(crate) fn set_cost(&mut self, cost: f32) -> Result<(), NavError> {
        match &mut self.kind {
            ElementKind::Surface { cost: slot } => {
                *slot = cost;
                Ok(())
            }
            ElementKind::Obstacle => Err(NavError::InvalidPolygon {
                reason: "cost only applies to surfaces".to_string(),
            }),
        }
    }

    /// Recompute `extended_points` by running the offset engine over
    /// `original_points` scaled into the integer domain (spec.md §4.2 step
    /// 1). No-op unless `extend_dirty`.
    fn refresh_extended_points(
        &mut self,
        agent_radius: f32,
        accuracy: Accuracy,
    ) -> Result<(), NavError> {
        if !self.extend_dirty {
            return Ok(());
        }
        let distance = ((agent_radius + self.extra_offset) as f64) * accuracy.factor();
        let int_ring: Vec<IntPoint> = self
            .original_points
            .iter()
            .map(|p| IntPoint::from_vector2(*p, accuracy))
            .collect();
        let offset_ring = engine::offset_ring(&int_ring, distance)?;
        self.extended_points = offset_ring
            .into_iter()
            .map(|p| p.to_vector2(accuracy))
            .collect();
        self.extend_dirty = false;
        Ok(())
    }

    /// Rotate and translate `extended_points` into world space, updating the
    /// AABB and integer world ring in the same pass (spec.md §4.2 steps 2
    /// and 4).
    fn refresh_world_points(&mut self, accuracy: Accuracy) {
        self.world_points.clear();
        self.world_points.reserve(self.extended_points.len());
        for p in &self.extended_points {
            self.world_points
                .push(p.rotate_about_origin(self.rotation) + self.position);
        }
        self.aabb =
            Aabb::from_points(self.world_points.iter().copied()).unwrap_or(Aabb::new(self.position, self.position));

        self.int_world_points.clear();
        self.int_world_points.reserve(self.world_points.len());
        self.int_world_points.extend(
            self.world_points
                .iter()
                .map(|p| IntPoint::from_vector2(*p, accuracy)),
        );
    }

    pub(crate) fn int_world_points(&self) -> &[IntPoint] {
        &self.int_world_points
    }

    /// Idempotent refresh (spec.md §4.2). The caller (`Nav2D::update`) is
    /// responsible for the quadtree maintenance and group dismantle steps
    /// (3 and 5) since those need access to shared state this element
    /// doesn't own.
    pub(crate) fn refresh_points(
        &mut self,
        agent_radius: f32,
        accuracy: Accuracy,
    ) -> Result<(), NavError> {
        if !self.dirty {
            return Ok(());
        }
        self.refresh_extended_points(agent_radius, accuracy)?;
        self.refresh_world_points(accuracy);
        Ok(())
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Synthesise a regular hexagon of circumradius `radius / cos(30°)`, rotated
/// 30 degrees, as an approximation of a disc (spec.md §4.7/§8 scenario 5).
/// `radius` is the apothem (disc radius), not the circumradius: a disc of
/// radius `r` is inscribed in this hexagon, so vertices sit further out at
/// `r / cos(30°)`.
pub fn hexagon_points(radius: f32) -> Vec<Vector2> {
    const SIDES: usize = 6;
    let rotation = std::f32::consts::FRAC_PI_6; // 30 degrees
    let circumradius = radius / rotation.cos();
    (0..SIDES)
        .map(|i| {
            let angle = rotation + std::f32::consts::TAU * (i as f32) / (SIDES as f32);
            Vector2::new(circumradius * angle.cos(), circumradius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::EPSILON;

    #[test]
    fn hexagon_has_six_ccw_vertices() {
        let hex = hexagon_points(1.0);
        assert_eq!(hex.len(), 6);
        assert!(validate_polygon(&hex).is_ok());
    }

    /// P4 (spec.md §8): every extended vertex lies outside (or on the
    /// boundary of) the original polygon's Minkowski sum with a disc of
    /// radius `agentRadius + extraOffset`, to within quantisation `±1/A`.
    /// A square's miter-join offset is itself a parallel square, so the
    /// perpendicular distance from each extended vertex to the nearest
    /// original edge is exactly that radius — the cleanest case to check.
    #[test]
    fn property_p4_extended_vertices_clear_the_inflation_radius() {
        let points = vec![
            Vector2::new(-0.5, -0.5),
            Vector2::new(0.5, -0.5),
            Vector2::new(0.5, 0.5),
            Vector2::new(-0.5, 0.5),
        ];
        let agent_radius = 0.3;
        let extra_offset = 0.2;
        let accuracy = Accuracy::A100;
        let tolerance = (1.0 / accuracy.factor()) as f32;

        let mut element =
            NavElement::new(ElementKind::Obstacle, points.clone(), Vector2::ZERO, 0.0, extra_offset).unwrap();
        element.refresh_points(agent_radius, accuracy).unwrap();

        let required = agent_radius + extra_offset;
        for extended in &element.extended_points {
            let distance_to_original = points
                .iter()
                .zip(points.iter().cycle().skip(1))
                .map(|(a, b)| distance_to_segment(*extended, *a, *b))
                .fold(f32::INFINITY, f32::min);
            assert!(
                distance_to_original >= required - tolerance,
                "extended vertex {extended:?} is only {distance_to_original} from the original \
                 polygon, expected at least {required}"
            );
        }
    }

    fn distance_to_segment(p: Vector2, a: Vector2, b: Vector2) -> f32 {
        let ab = b - a;
        let len_sq = ab.dot(ab);
        let t = if len_sq <= EPSILON {
            0.0
        } else {
            ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
        };
        let closest = a + ab.scale(t);
        (p - closest).length()
    }

    #[test]
    fn refresh_is_idempotent_when_not_dirty() {
        let points = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        let mut element =
            NavElement::new(ElementKind::Obstacle, points, Vector2::ZERO, 0.0, 0.0).unwrap();
        element
            .refresh_points(0.5, Accuracy::A100)
            .expect("first refresh");
        element.clear_dirty();
        let snapshot = element.world_points.clone();
        element
            .refresh_points(0.5, Accuracy::A100)
            .expect("second refresh is a no-op");
        assert_eq!(element.world_points, snapshot);
    }
}
