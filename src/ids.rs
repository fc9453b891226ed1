//! Handle types shared across modules. Kept separate from the structures
//! they index to avoid import cycles between `element`, `group`, and `graph`.

use crate::arena::Index;
use crate::element::NavElement;
use crate::graph::NavPoint;

/// Arena handle to a [`NavElement`].
pub type ElementId = Index<NavElement>;

/// Arena handle to a [`NavPoint`]; spec.md calls this `connectionId`.
pub type NavPointId = Index<NavPoint>;

/// Identity of an [`crate::group::ElementGroup`]. `0` means "unassigned"
/// (spec.md §3: `groupId = 0` iff the element is not currently a group
/// member). Unlike [`ElementId`]/[`NavPointId`] this is *not* an arena
/// index: ids are handed out by a monotonic counter and never reused, even
/// after the group that held them is deleted (spec.md §4.5 tie-break notes
/// deliberately avoid reusing an incumbent id when merging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

impl GroupId {
    pub const UNASSIGNED: GroupId = GroupId(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        GroupId::UNASSIGNED
    }
}
