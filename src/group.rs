//! A connected component of mutually-overlapping elements (spec.md §3/§4.4,
//! component C7), and its derived per-group polygon booleans.

use std::collections::HashSet;

use crate::element::{ElementKind, NavElement};
use crate::engine::{self, ClippedIsland};
use crate::error::NavError;
use crate::ids::{ElementId, GroupId};

/// Whether a [`NavShape`] came from an obstacle union or a surface
/// difference. Both walk the same way in the graph builder (spec.md §4.6);
/// this tag only matters for which list a shape lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavShapeKind {
    Obstacle,
    Surface,
}

/// A node in a derived polygon contour tree (spec.md §3). Parent/children
/// are arena-style `u32` indices into the owning [`ElementGroup`]'s
/// `nav_obstacles`/`nav_surfaces` vector, never references — this is what
/// lets a group rebuild be an O(1) truncate-and-refill (spec.md §9).
#[derive(Debug, Clone)]
pub struct NavShape {
    pub points: Vec<crate::geometry::Vector2>,
    pub hole: bool,
    pub nav_type: NavShapeKind,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
}

/// A connected component of the AABB-overlap graph over elements. A group
/// with zero members has no reason to exist (spec.md §4.4); `Nav2D` removes
/// it from the group table on the turn its last member leaves.
#[derive(Debug, Clone, Default)]
pub struct ElementGroup {
    pub(crate) id: GroupId,
    pub(crate) obstacles: HashSet<ElementId>,
    pub(crate) surfaces: HashSet<ElementId>,
    pub(crate) nav_obstacles: Vec<NavShape>,
    pub(crate) nav_surfaces: Vec<NavShape>,
}

impl ElementGroup {
    pub(crate) fn new(id: GroupId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.surfaces.is_empty()
    }

    pub fn obstacle_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.obstacles.iter().copied()
    }

    pub fn surface_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.surfaces.iter().copied()
    }

    pub fn nav_obstacles(&self) -> &[NavShape] {
        &self.nav_obstacles
    }

    pub fn nav_surfaces(&self) -> &[NavShape] {
        &self.nav_surfaces
    }

    pub(crate) fn add(&mut self, id: ElementId, kind: ElementKind) {
        match kind {
            ElementKind::Obstacle => {
                self.obstacles.insert(id);
            }
            ElementKind::Surface { .. } => {
                self.surfaces.insert(id);
            }
        }
    }

    pub(crate) fn remove(&mut self, id: ElementId) {
        self.obstacles.remove(&id);
        self.surfaces.remove(&id);
    }

    fn push_tree(
        target: &mut Vec<NavShape>,
        islands: Vec<ClippedIsland>,
        nav_type: NavShapeKind,
        accuracy: crate::geometry::Accuracy,
    ) {
        for island in islands {
            let contour_index = target.len() as u32;
            target.push(NavShape {
                points: island
                    .exterior
                    .iter()
                    .map(|p| p.to_vector2(accuracy))
                    .collect(),
                hole: false,
                nav_type,
                parent: None,
                children: Vec::new(),
            });
            let mut hole_indices = Vec::with_capacity(island.holes.len());
            for hole in island.holes {
                let hole_index = target.len() as u32;
                target.push(NavShape {
                    points: hole.iter().map(|p| p.to_vector2(accuracy)).collect(),
                    hole: true,
                    nav_type,
                    parent: Some(contour_index),
                    children: Vec::new(),
                });
                hole_indices.push(hole_index);
            }
            target[contour_index as usize].children = hole_indices;
        }
    }

    /// Rebuild `nav_obstacles`/`nav_surfaces` from current members (spec.md
    /// §4.4). Discards whatever tree was there before — shapes never
    /// survive past the rebuild that discards them (spec.md §5 memory
    /// discipline).
    pub(crate) fn rebuild(
        &mut self,
        elements: &crate::arena::Arena<NavElement>,
        accuracy: crate::geometry::Accuracy,
    ) -> Result<(), NavError> {
        self.nav_obstacles.clear();
        self.nav_surfaces.clear();

        let obstacle_rings: Vec<Vec<_>> = self
            .obstacles
            .iter()
            .filter_map(|id| elements.get(*id))
            .map(|e| e.int_world_points().to_vec())
            .collect();

        let obstacle_islands = match obstacle_rings.len() {
            0 => vec![],
            1 => vec![ClippedIsland {
                exterior: obstacle_rings[0].clone(),
                holes: vec![],
            }],
            _ => engine::union_rings(&obstacle_rings)?,
        };
        Self::push_tree(
            &mut self.nav_obstacles,
            obstacle_islands.clone(),
            NavShapeKind::Obstacle,
            accuracy,
        );

        for surface_id in &self.surfaces {
            let Some(surface) = elements.get(*surface_id) else {
                continue;
            };
            let surface_ring = surface.int_world_points().to_vec();
            let clipped = if obstacle_islands.is_empty() {
                vec![ClippedIsland {
                    exterior: surface_ring,
                    holes: vec![],
                }]
            } else {
                engine::difference_ring(&surface_ring, &obstacle_islands)?
            };
            Self::push_tree(&mut self.nav_surfaces, clipped, NavShapeKind::Surface, accuracy);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::element::ElementKind;
    use crate::geometry::{Accuracy, Vector2};

    fn square(offset: f32) -> Vec<Vector2> {
        vec![
            Vector2::new(offset, offset),
            Vector2::new(offset + 1.0, offset),
            Vector2::new(offset + 1.0, offset + 1.0),
            Vector2::new(offset, offset + 1.0),
        ]
    }

    fn make_element(
        arena: &mut Arena<NavElement>,
        kind: ElementKind,
        offset: f32,
        accuracy: Accuracy,
    ) -> ElementId {
        let mut element = NavElement::new(kind, square(offset), Vector2::ZERO, 0.0, 0.0).unwrap();
        element.refresh_points(0.0, accuracy).unwrap();
        element.clear_dirty();
        arena.insert(element)
    }

    #[test]
    fn single_obstacle_fast_path_has_no_holes() {
        let accuracy = Accuracy::A100;
        let mut arena = Arena::new();
        let id = make_element(&mut arena, ElementKind::Obstacle, 0.0, accuracy);
        let mut group = ElementGroup::new(GroupId(1));
        group.add(id, ElementKind::Obstacle);
        group.rebuild(&arena, accuracy).unwrap();
        assert_eq!(group.nav_obstacles().len(), 1);
        assert!(!group.nav_obstacles()[0].hole);
    }

    #[test]
    fn surface_minus_obstacle_has_one_hole() {
        let accuracy = Accuracy::A100;
        let mut arena = Arena::new();
        let obstacle = make_element(&mut arena, ElementKind::Obstacle, 1.0, accuracy);
        let surface_points = vec![
            Vector2::new(-2.0, -2.0),
            Vector2::new(4.0, -2.0),
            Vector2::new(4.0, 4.0),
            Vector2::new(-2.0, 4.0),
        ];
        let mut surface_element =
            NavElement::new(ElementKind::Surface { cost: 2.0 }, surface_points, Vector2::ZERO, 0.0, 0.0)
                .unwrap();
        surface_element.refresh_points(0.0, accuracy).unwrap();
        surface_element.clear_dirty();
        let surface = arena.insert(surface_element);

        let mut group = ElementGroup::new(GroupId(1));
        group.add(obstacle, ElementKind::Obstacle);
        group.add(surface, ElementKind::Surface { cost: 2.0 });
        group.rebuild(&arena, accuracy).unwrap();

        assert_eq!(group.nav_obstacles().len(), 1);
        assert_eq!(group.nav_surfaces().len(), 2);
        assert!(group.nav_surfaces().iter().any(|s| s.hole));
    }
}
