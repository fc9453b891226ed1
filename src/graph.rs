//! Builds the navigation graph from a group's `NavShape` forest (spec.md
//! §3/§4.6, component C9).

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;

use crate::arena::Arena;
use crate::geometry::Vector2;
use crate::group::{ElementGroup, NavShape};
use crate::ids::NavPointId;

/// A graph vertex placed on a `NavShape` contour vertex.
#[derive(Debug, Clone)]
pub struct NavPoint {
    pub position: Vector2,
    pub(crate) forbidden: HashSet<NavPointId>,
    pub(crate) neighbours: Vec<NavPointId>,
}

impl NavPoint {
    pub fn neighbours(&self) -> &[NavPointId] {
        &self.neighbours
    }

    pub fn forbidden_connections(&self) -> &HashSet<NavPointId> {
        &self.forbidden
    }
}

/// Canonical (low id, high id) connection key (spec.md §3: "keys are stored
/// canonically, lower id first").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionKey(pub NavPointId, pub NavPointId);

impl ConnectionKey {
    fn canonical(a: NavPointId, b: NavPointId) -> Self {
        if a.raw() <= b.raw() {
            ConnectionKey(a, b)
        } else {
            ConnectionKey(b, a)
        }
    }

    pub fn low(&self) -> NavPointId {
        self.0
    }

    pub fn high(&self) -> NavPointId {
        self.1
    }
}

/// Minimal useful payload for a connection (see SPEC_FULL.md §3): the
/// Euclidean length of the edge it represents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionData {
    pub length: f32,
}

/// The navigation graph: a point arena plus an undirected connection table.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    pub(crate) points: Arena<NavPoint>,
    pub(crate) connections: HashMap<ConnectionKey, ConnectionData>,
}

impl NavGraph {
    pub fn points(&self) -> impl Iterator<Item = (NavPointId, &NavPoint)> {
        self.points.iter()
    }

    pub fn point(&self, id: NavPointId) -> Option<&NavPoint> {
        self.points.get(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = (&ConnectionKey, &ConnectionData)> {
        self.connections.iter()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
        self.connections.clear();
    }

    fn add_ring(
        &mut self,
        ring_points: &[Vector2],
        forbidden_seed: Option<HashSet<NavPointId>>,
    ) -> HashSet<NavPointId> {
        let ids: Vec<NavPointId> = ring_points
            .iter()
            .map(|p| {
                self.points.insert(NavPoint {
                    position: *p,
                    forbidden: HashSet::new(),
                    neighbours: Vec::new(),
                })
            })
            .collect();

        let forbidden: HashSet<NavPointId> = forbidden_seed.unwrap_or_else(|| ids.iter().copied().collect());
        for id in &ids {
            if let Some(point) = self.points.get_mut(*id) {
                point.forbidden = forbidden.clone();
            }
        }

        for (a, b) in ids.iter().copied().circular_tuple_windows() {
            self.connect(a, b);
        }
        ids.into_iter().collect()
    }

    fn connect(&mut self, a: NavPointId, b: NavPointId) {
        if let Some(pa) = self.points.get_mut(a) {
            if !pa.neighbours.contains(&b) {
                pa.neighbours.push(b);
            }
        }
        if let Some(pb) = self.points.get_mut(b) {
            if !pb.neighbours.contains(&a) {
                pb.neighbours.push(a);
            }
        }
        let key = ConnectionKey::canonical(a, b);
        if let std::collections::hash_map::Entry::Vacant(entry) = self.connections.entry(key) {
            let length = match (self.points.get(a), self.points.get(b)) {
                (Some(pa), Some(pb)) => (pb.position - pa.position).length(),
                _ => 0.0,
            };
            entry.insert(ConnectionData { length });
        }
    }

    /// Build the graph for one group: surfaces first (their own forbidden
    /// ring), then obstacles breadth-first from the top-level shapes, holes
    /// inheriting their parent contour's forbidden set (spec.md §4.6).
    pub(crate) fn build_for_group(&mut self, group: &ElementGroup) {
        // Surfaces have no holes *in this system* (spec.md §4.6): unlike
        // obstacles, a surface's hole ring does not inherit its parent
        // contour's forbidden set — every surface ring (outer or hole)
        // gets its own fresh self-ring forbidden set.
        for surface in group.nav_surfaces() {
            self.add_ring(&surface.points, None);
        }

        let top_level: Vec<usize> = group
            .nav_obstacles()
            .iter()
            .enumerate()
            .filter(|(_, shape)| shape.parent.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut queue: VecDeque<(usize, Option<HashSet<NavPointId>>)> =
            top_level.into_iter().map(|i| (i, None)).collect();

        while let Some((index, inherited_forbidden)) = queue.pop_front() {
            let shape: &NavShape = &group.nav_obstacles()[index];
            let forbidden = self.add_ring(&shape.points, inherited_forbidden.clone());
            for &child in &shape.children {
                let child_forbidden = if group.nav_obstacles()[child as usize].hole {
                    Some(forbidden.clone())
                } else {
                    None
                };
                queue.push_back((child as usize, child_forbidden));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_of_four_forms_a_four_cycle() {
        let mut graph = NavGraph::default();
        let square = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        let ids: Vec<_> = graph.add_ring(&square, None).into_iter().collect();
        assert_eq!(ids.len(), 4);
        for id in &ids {
            assert_eq!(graph.point(*id).unwrap().neighbours().len(), 2);
        }
        assert_eq!(graph.connection_count(), 4);
    }

    #[test]
    fn connection_keys_are_canonically_ordered() {
        let mut graph = NavGraph::default();
        let triangle = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        graph.add_ring(&triangle, None);
        for key in graph.connections.keys() {
            assert!(key.low().raw() <= key.high().raw());
        }
    }
}
