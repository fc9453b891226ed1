//! Incremental 2D navigation mesh builder for convex polygonal obstacles and
//! surfaces.
//!
//! [`Nav2D`] is the facade: add obstacles and surfaces, move or remove them,
//! call [`Nav2D::update`] to settle, and read back the navigation graph it
//! derives. Internals are organised by pipeline stage:
//!
//! - [`geometry`] — vectors, rectangles, the `Accuracy` scaling factor, and
//!   the float/integer point conversion shared by everything downstream.
//! - [`validator`] — rejects malformed authored polygons before they ever
//!   reach an element.
//! - [`element`] — one authored polygon plus pose and offset, and the cache
//!   it derives (extended points, world points, AABB).
//! - [`engine`] — the offset/inflate and boolean union/difference adapter
//!   over the integer coordinate domain.
//! - [`quadtree`] — the AABB spatial index used to find overlap candidates.
//! - [`group`] — connected components of overlapping elements, and their
//!   derived contour/hole trees.
//! - [`graph`] — the navigation graph built from a group's contour trees.
//! - [`nav2d`] — the facade tying all of the above into one `update()` step.
//!
//! See `SPEC_FULL.md` in the repository root for the full behavioural
//! specification this crate implements.

mod arena;
mod element;
mod engine;
mod error;
mod geometry;
mod graph;
mod group;
mod ids;
mod nav2d;
mod quadtree;
mod validator;

pub use element::{ElementKind, NavElement};
pub use error::NavError;
pub use geometry::{Aabb, Accuracy, IntPoint, Vector2};
pub use graph::{ConnectionData, ConnectionKey, NavGraph, NavPoint};
pub use group::{ElementGroup, NavShape, NavShapeKind};
pub use ids::{ElementId, GroupId, NavPointId};
pub use nav2d::Nav2D;
