//! Lifecycle, edit API, and the single `update()` settle step (spec.md
//! §4.7, component C10). This is the only type embedders touch.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::arena::Arena;
use crate::element::{hexagon_points, ElementKind, NavElement};
use crate::error::NavError;
use crate::geometry::{Aabb, Accuracy, Vector2};
use crate::graph::NavGraph;
use crate::group::ElementGroup;
use crate::ids::{ElementId, GroupId};
use crate::quadtree::RegionQuadTree;

#[cfg(feature = "trace")]
use tracing::instrument;

/// The navigation mesh facade. Owns every [`NavElement`], every
/// [`ElementGroup`] (by id), the spatial index, and the navigation graph.
pub struct Nav2D {
    agent_radius: f32,
    accuracy: Accuracy,
    elements: Arena<NavElement>,
    quadtree: RegionQuadTree,
    groups: HashMap<GroupId, ElementGroup>,
    next_group_id: u32,
    dirty_elements: HashSet<ElementId>,
    regroup_queue: VecDeque<ElementId>,
    rebuild_set: HashSet<GroupId>,
    graph: NavGraph,
}

impl Nav2D {
    /// Construct a new facade over the world rectangle `min_corner`..`max_corner`.
    /// Rejects a bounding rectangle with area < 1 unit² (spec.md §4.7).
    pub fn new(
        min_corner: Vector2,
        max_corner: Vector2,
        agent_radius: f32,
        accuracy: Accuracy,
    ) -> Result<Self, NavError> {
        let world_rect = Aabb::new(min_corner, max_corner);
        if world_rect.area() < 1.0 {
            log::warn!("rejecting world rect with area {} < 1 unit^2", world_rect.area());
            return Err(NavError::InvalidWorld {
                area: world_rect.area(),
            });
        }
        log::debug!("creating Nav2D over {:?} at accuracy {:?}", world_rect, accuracy);
        Ok(Self {
            agent_radius,
            accuracy,
            elements: Arena::new(),
            quadtree: RegionQuadTree::new(world_rect),
            groups: HashMap::new(),
            next_group_id: 1,
            dirty_elements: HashSet::new(),
            regroup_queue: VecDeque::new(),
            rebuild_set: HashSet::new(),
            graph: NavGraph::default(),
        })
    }

    pub fn agent_radius(&self) -> f32 {
        self.agent_radius
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    fn insert_element(&mut self, element: NavElement) -> ElementId {
        let id = self.elements.insert(element);
        self.dirty_elements.insert(id);
        id
    }

    pub fn add_obstacle(
        &mut self,
        points: Vec<Vector2>,
        position: Vector2,
        rotation: f32,
        extra_offset: f32,
    ) -> Result<ElementId, NavError> {
        let element = NavElement::new(ElementKind::Obstacle, points, position, rotation, extra_offset)?;
        Ok(self.insert_element(element))
    }

    /// Synthesises a regular hexagon inscribing a disc of `radius`, rotated
    /// 30 degrees, as an approximation of that disc (spec.md §4.7).
    pub fn add_obstacle_disc(
        &mut self,
        radius: f32,
        position: Vector2,
        extra_offset: f32,
    ) -> Result<ElementId, NavError> {
        self.add_obstacle(hexagon_points(radius), position, 0.0, extra_offset)
    }

    pub fn add_surface(
        &mut self,
        points: Vec<Vector2>,
        position: Vector2,
        rotation: f32,
        cost: f32,
        extra_offset: f32,
    ) -> Result<ElementId, NavError> {
        let element = NavElement::new(
            ElementKind::Surface { cost },
            points,
            position,
            rotation,
            extra_offset,
        )?;
        Ok(self.insert_element(element))
    }

    pub fn add_surface_disc(
        &mut self,
        radius: f32,
        position: Vector2,
        cost: f32,
        extra_offset: f32,
    ) -> Result<ElementId, NavError> {
        self.add_surface(hexagon_points(radius), position, 0.0, cost, extra_offset)
    }

    pub fn set_position(&mut self, id: ElementId, position: Vector2) {
        if let Some(element) = self.elements.get_mut(id) {
            element.set_position(position);
            if element.is_dirty() {
                self.dirty_elements.insert(id);
            }
        }
    }

    pub fn set_rotation(&mut self, id: ElementId, rotation: f32) {
        if let Some(element) = self.elements.get_mut(id) {
            element.set_rotation(rotation);
            if element.is_dirty() {
                self.dirty_elements.insert(id);
            }
        }
    }

    pub fn set_extra_offset(&mut self, id: ElementId, extra_offset: f32) {
        if let Some(element) = self.elements.get_mut(id) {
            element.set_extra_offset(extra_offset);
            if element.is_dirty() {
                self.dirty_elements.insert(id);
            }
        }
    }

    pub fn set_cost(&mut self, id: ElementId, cost: f32) -> Result<(), NavError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| NavError::InvalidPolygon {
                reason: "unknown element id".to_string(),
            })?
            .set_cost(cost)
    }

    /// Detach the element, dismantle its old group, and settle. Idempotent:
    /// removing an id that is no longer present is a no-op (spec.md §4.7).
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), NavError> {
        if !self.elements.contains(id) {
            log::trace!("remove_element({id}) is a no-op, already absent");
            return Ok(());
        }
        log::debug!("removing element {id}");
        let group_id = self.elements[id].group_id();
        if group_id.is_assigned() {
            self.dismantle_group(group_id);
        }
        self.quadtree.remove(id);
        self.dirty_elements.remove(&id);
        self.elements.remove(id);
        self.update()?;
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> Option<&NavElement> {
        self.elements.get(id)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (ElementId, &NavElement)> {
        self.elements.iter().filter(|(_, e)| e.kind().is_obstacle())
    }

    pub fn surfaces(&self) -> impl Iterator<Item = (ElementId, &NavElement)> {
        self.elements.iter().filter(|(_, e)| e.kind().is_surface())
    }

    pub fn groups(&self) -> impl Iterator<Item = &ElementGroup> {
        self.groups.values()
    }

    pub fn group(&self, id: GroupId) -> Option<&ElementGroup> {
        self.groups.get(&id)
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    fn allocate_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        id
    }

    /// Clears a group's membership so every former member is requeued for
    /// fresh grouping (spec.md §3 glossary "Dismantle", §4.5b).
    fn dismantle_group(&mut self, group_id: GroupId) {
        let Some(group) = self.groups.remove(&group_id) else {
            return;
        };
        log::trace!("dismantling group {group_id:?}");
        for member in group.obstacle_ids().chain(group.surface_ids()) {
            if let Some(element) = self.elements.get_mut(member) {
                element.group_id = GroupId::UNASSIGNED;
            }
            self.regroup_queue.push_back(member);
        }
    }

    fn assign_to_group(&mut self, id: ElementId, group_id: GroupId) {
        let Some(kind) = self.elements.get(id).map(|e| e.kind()) else {
            return;
        };
        self.elements.get_mut(id).unwrap().group_id = group_id;
        self.groups
            .entry(group_id)
            .or_insert_with(|| ElementGroup::new(group_id))
            .add(id, kind);
    }

    fn remove_from_current_group(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let group_id = element.group_id();
        if !group_id.is_assigned() {
            return;
        }
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.remove(id);
            if group.is_empty() {
                self.groups.remove(&group_id);
            }
        }
    }

    /// Element-level regroup (spec.md §4.5a): query the quadtree for
    /// elements overlapping `id`'s rect and merge group membership
    /// accordingly.
    fn regroup_one(&mut self, id: ElementId) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let rect = element.aabb();
        let neighbours = self.quadtree.query_intersecting(&rect);
        if neighbours.is_empty() {
            return;
        }

        let distinct_groups: HashSet<GroupId> = neighbours
            .iter()
            .filter_map(|n| self.elements.get(*n))
            .map(|e| e.group_id())
            .filter(|g| g.is_assigned())
            .collect();

        let target_group = match distinct_groups.len() {
            0 => self.allocate_group_id(),
            1 => *distinct_groups.iter().next().unwrap(),
            _ => self.allocate_group_id(),
        };

        let mut changed = false;
        for neighbour in neighbours {
            let previous = self.elements.get(neighbour).map(|e| e.group_id());
            if previous == Some(target_group) {
                continue;
            }
            self.remove_from_current_group(neighbour);
            self.assign_to_group(neighbour, target_group);
            self.regroup_queue.push_back(neighbour);
            changed = true;
        }
        if changed {
            self.rebuild_set.insert(target_group);
        }
    }

    /// Refresh dirty elements, regroup, rebuild group booleans, rebuild the
    /// graph — in that order (spec.md §4.5 settlement order). A no-op if
    /// nothing is dirty. Returns the ids refreshed this pass (the "points
    /// refreshed" event of spec.md §6.3).
    #[cfg_attr(feature = "trace", instrument(skip(self)))]
    pub fn update(&mut self) -> Result<Vec<ElementId>, NavError> {
        let mut refreshed = Vec::new();

        // i. Refresh dirty elements.
        let dirty: Vec<ElementId> = self.dirty_elements.drain().collect();
        if dirty.is_empty() {
            log::trace!("update() called with nothing dirty");
        } else {
            log::debug!("refreshing {} dirty element(s)", dirty.len());
        }
        for id in dirty {
            let Some(element) = self.elements.get_mut(id) else {
                continue;
            };
            if !element.is_dirty() {
                continue;
            }
            element.refresh_points(self.agent_radius, self.accuracy)?;
            let rect = element.aabb();
            let in_quadtree = element.in_quadtree;
            if in_quadtree {
                self.quadtree.move_element(id, rect)?;
            } else {
                self.quadtree.insert(id, rect)?;
                self.elements.get_mut(id).unwrap().in_quadtree = true;
            }

            let group_id = self.elements[id].group_id();
            if group_id.is_assigned() {
                self.dismantle_group(group_id);
            } else {
                self.regroup_queue.push_back(id);
            }

            self.elements.get_mut(id).unwrap().clear_dirty();
            refreshed.push(id);
        }

        // ii. Drain the regroup queue, each element exactly once.
        let mut seen = HashSet::new();
        while let Some(id) = self.regroup_queue.pop_front() {
            if seen.contains(&id) {
                continue;
            }
            seen.insert(id);
            self.regroup_one(id);
        }

        // iii. Rebuild groups still marked dirty.
        let to_rebuild: Vec<GroupId> = self.rebuild_set.drain().collect();
        for group_id in to_rebuild {
            if let Some(mut group) = self.groups.remove(&group_id) {
                group.rebuild(&self.elements, self.accuracy)?;
                self.groups.insert(group_id, group);
            }
        }

        // iv. Rebuild the navigation graph.
        self.graph.clear();
        for group in self.groups.values() {
            self.graph.build_for_group(group);
        }
        log::trace!(
            "settled: {} group(s), {} nav point(s)",
            self.groups.len(),
            self.graph.point_count()
        );

        Ok(refreshed)
    }
}
