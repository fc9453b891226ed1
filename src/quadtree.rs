//! Region quadtree (spec.md §4.3, component C6): an AABB spatial index over
//! [`crate::element::NavElement`]s, supporting insert/remove/move and
//! rectangle queries.

use std::collections::HashMap;

use crate::error::NavError;
use crate::geometry::Aabb;
use crate::ids::ElementId;

/// Quadrant side below which a node stops subdividing further.
pub const MIN_QUADRANT_SIDE: f32 = 1.0;

struct QuadNode {
    rect: Aabb,
    children: Option<Box<[QuadNode; 4]>>,
    stored: Vec<(ElementId, Aabb)>,
}

impl QuadNode {
    fn new(rect: Aabb) -> Self {
        Self {
            rect,
            children: None,
            stored: Vec::new(),
        }
    }

    fn can_subdivide(&self) -> bool {
        self.rect.width() * 0.5 >= MIN_QUADRANT_SIDE && self.rect.height() * 0.5 >= MIN_QUADRANT_SIDE
    }

    fn child_index_containing(&self, rect: &Aabb) -> Option<usize> {
        if !self.can_subdivide() {
            return None;
        }
        self.rect
            .quadrants()
            .iter()
            .position(|quadrant| quadrant.strictly_contains(rect))
    }

    fn ensure_children(&mut self) -> &mut [QuadNode; 4] {
        if self.children.is_none() {
            let quadrants = self.rect.quadrants();
            self.children = Some(Box::new([
                QuadNode::new(quadrants[0]),
                QuadNode::new(quadrants[1]),
                QuadNode::new(quadrants[2]),
                QuadNode::new(quadrants[3]),
            ]));
        }
        self.children.as_mut().unwrap()
    }

    fn insert(&mut self, id: ElementId, rect: Aabb) {
        if let Some(index) = self.child_index_containing(&rect) {
            self.ensure_children()[index].insert(id, rect);
        } else {
            self.stored.push((id, rect));
        }
    }

    fn remove(&mut self, id: ElementId, rect: &Aabb) -> bool {
        if let Some(index) = self.child_index_containing(rect) {
            if let Some(children) = &mut self.children {
                return children[index].remove(id, rect);
            }
        }
        if let Some(pos) = self.stored.iter().position(|(stored_id, _)| *stored_id == id) {
            self.stored.swap_remove(pos);
            true
        } else {
            false
        }
    }

    /// Depth-first, left-to-right-among-children, then this node's own
    /// elements last — stable order (spec.md §4.5 determinism note).
    fn query_intersecting(&self, rect: &Aabb, out: &mut Vec<ElementId>) {
        if !self.rect.intersects(rect) {
            return;
        }
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_intersecting(rect, out);
            }
        }
        for (id, aabb) in &self.stored {
            if aabb.intersects(rect) {
                out.push(*id);
            }
        }
    }

    fn any_intersecting(&self, rect: &Aabb) -> bool {
        if !self.rect.intersects(rect) {
            return false;
        }
        if self.stored.iter().any(|(_, aabb)| aabb.intersects(rect)) {
            return true;
        }
        if let Some(children) = &self.children {
            children.iter().any(|child| child.any_intersecting(rect))
        } else {
            false
        }
    }

    fn collect_all(&self, out: &mut Vec<(ElementId, Aabb)>) {
        out.extend(self.stored.iter().copied());
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_all(out);
            }
        }
    }
}

/// AABB spatial index rooted at (twice) the authored world bounds, per
/// spec.md §4.3.
pub struct RegionQuadTree {
    root: QuadNode,
    side_table: HashMap<ElementId, Aabb>,
}

impl RegionQuadTree {
    pub fn new(world_rect: Aabb) -> Self {
        Self {
            root: QuadNode::new(world_rect.scaled_about_center(2.0)),
            side_table: HashMap::new(),
        }
    }

    pub fn world_rect(&self) -> Aabb {
        self.root.rect
    }

    pub fn insert(&mut self, id: ElementId, rect: Aabb) -> Result<(), NavError> {
        if rect.is_degenerate() {
            return Err(NavError::DegenerateBounds);
        }
        self.root.insert(id, rect);
        self.side_table.insert(id, rect);
        Ok(())
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(rect) = self.side_table.remove(&id) else {
            return false;
        };
        self.root.remove(id, &rect)
    }

    pub fn move_element(&mut self, id: ElementId, new_rect: Aabb) -> Result<(), NavError> {
        self.remove(id);
        self.insert(id, new_rect)
    }

    pub fn query_intersecting(&self, rect: &Aabb) -> Vec<ElementId> {
        if rect.is_degenerate() {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.root.query_intersecting(rect, &mut out);
        out
    }

    pub fn any_intersecting(&self, rect: &Aabb) -> bool {
        if rect.is_degenerate() {
            return false;
        }
        self.root.any_intersecting(rect)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.side_table.contains_key(&id)
    }

    pub fn clear(&mut self) {
        let world_rect = self.root.rect;
        self.root = QuadNode::new(world_rect);
        self.side_table.clear();
    }

    /// Re-index every known element against a new world rectangle (spec.md
    /// §4.3 "if the world rectangle is mutated, the tree is re-indexed").
    pub fn reindex(&mut self, new_world_rect: Aabb) {
        let mut all = Vec::new();
        self.root.collect_all(&mut all);
        self.root = QuadNode::new(new_world_rect.scaled_about_center(2.0));
        self.side_table.clear();
        for (id, rect) in all {
            self.root.insert(id, rect);
            self.side_table.insert(id, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::element::NavElement;
    use crate::geometry::Vector2;

    fn fake_id(arena: &mut Arena<NavElement>) -> ElementId {
        arena.insert(
            NavElement::new(
                crate::element::ElementKind::Obstacle,
                vec![
                    Vector2::new(0.0, 0.0),
                    Vector2::new(1.0, 0.0),
                    Vector2::new(1.0, 1.0),
                    Vector2::new(0.0, 1.0),
                ],
                Vector2::ZERO,
                0.0,
                0.0,
            )
            .unwrap(),
        )
    }

    #[test]
    fn insert_then_query_finds_overlapping_rect() {
        let mut arena = Arena::new();
        let id = fake_id(&mut arena);
        let mut tree = RegionQuadTree::new(Aabb::new(Vector2::new(-10.0, -10.0), Vector2::new(10.0, 10.0)));
        tree.insert(id, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)))
            .unwrap();
        let hits = tree.query_intersecting(&Aabb::new(Vector2::new(-1.0, -1.0), Vector2::new(0.5, 0.5)));
        assert_eq!(hits, vec![id]);
    }

    #[test]
    fn remove_then_query_finds_nothing() {
        let mut arena = Arena::new();
        let id = fake_id(&mut arena);
        let mut tree = RegionQuadTree::new(Aabb::new(Vector2::new(-10.0, -10.0), Vector2::new(10.0, 10.0)));
        tree.insert(id, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)))
            .unwrap();
        assert!(tree.remove(id));
        assert!(tree
            .query_intersecting(&Aabb::new(Vector2::new(-1.0, -1.0), Vector2::new(2.0, 2.0)))
            .is_empty());
    }

    #[test]
    fn empty_rect_query_yields_empty_result() {
        let tree = RegionQuadTree::new(Aabb::new(Vector2::new(-10.0, -10.0), Vector2::new(10.0, 10.0)));
        let degenerate = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(0.0, 0.0));
        assert!(tree.query_intersecting(&degenerate).is_empty());
    }

    #[test]
    fn insert_rejects_degenerate_rect() {
        let mut arena = Arena::new();
        let id = fake_id(&mut arena);
        let mut tree = RegionQuadTree::new(Aabb::new(Vector2::new(-10.0, -10.0), Vector2::new(10.0, 10.0)));
        let degenerate = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(0.0, 0.0));
        assert!(matches!(tree.insert(id, degenerate), Err(NavError::DegenerateBounds)));
    }

    #[test]
    fn move_updates_position() {
        let mut arena = Arena::new();
        let id = fake_id(&mut arena);
        let mut tree = RegionQuadTree::new(Aabb::new(Vector2::new(-10.0, -10.0), Vector2::new(10.0, 10.0)));
        tree.insert(id, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)))
            .unwrap();
        tree.move_element(id, Aabb::new(Vector2::new(5.0, 5.0), Vector2::new(6.0, 6.0)))
            .unwrap();
        assert!(tree
            .query_intersecting(&Aabb::new(Vector2::new(-1.0, -1.0), Vector2::new(0.5, 0.5)))
            .is_empty());
        assert_eq!(
            tree.query_intersecting(&Aabb::new(Vector2::new(5.5, 5.5), Vector2::new(5.6, 5.6))),
            vec![id]
        );
    }
}
