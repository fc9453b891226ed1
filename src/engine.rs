//! Adapter onto the integer-coordinate polygon engine consumed by the rest
//! of the crate (spec.md §6.2, components C3/C4).
//!
//! The contract above this module is integer rings in, integer rings (plus
//! a hole tree) out. Underneath, two published geometry crates do the real
//! work in floating point: [`geo_offset`] for closed-polygon miter
//! offsetting, and [`geo_booleanop`] for NonZero-consistent union/
//! difference on simple polygons. Coordinates cross the boundary as
//! integers cast straight to `f64` (no division by `Accuracy` — the offset
//! distance is scaled the same way, so the geometry is invariant under the
//! shared scale and nothing is lost re-deriving `Accuracy` twice).

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geo_booleanop::boolean::BooleanOp;
use geo_offset::Offset;

use crate::error::NavError;
use crate::geometry::IntPoint;

/// One contour and its direct holes, as produced by a union or difference.
/// See SPEC_FULL.md §4.4 for why this crate only ever needs one level of
/// holes per outer contour.
#[derive(Debug, Clone)]
pub struct ClippedIsland {
    pub exterior: Vec<IntPoint>,
    pub holes: Vec<Vec<IntPoint>>,
}

fn ring_to_line_string(ring: &[IntPoint]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    // geo requires a closed ring (first == last).
    if coords.first() != coords.last() {
        coords.push(coords[0]);
    }
    LineString::new(coords)
}

fn ring_from_line_string(line: &LineString<f64>) -> Vec<IntPoint> {
    let coords = line.0.as_slice();
    let len = if coords.len() > 1 && coords.first() == coords.last() {
        coords.len() - 1
    } else {
        coords.len()
    };
    coords[..len]
        .iter()
        .map(|c| IntPoint::new(c.x.round_ties_even() as i64, c.y.round_ties_even() as i64))
        .collect()
}

fn ring_to_polygon(ring: &[IntPoint], holes: &[Vec<IntPoint>]) -> Polygon<f64> {
    Polygon::new(
        ring_to_line_string(ring),
        holes.iter().map(|h| ring_to_line_string(h)).collect(),
    )
}

fn multi_polygon_to_islands(multi: &MultiPolygon<f64>) -> Vec<ClippedIsland> {
    multi
        .0
        .iter()
        .map(|poly| ClippedIsland {
            exterior: ring_from_line_string(poly.exterior()),
            holes: poly.interiors().iter().map(ring_from_line_string).collect(),
        })
        .collect()
}

/// Inflate (or shrink, if `distance` is negative) a closed convex ring by
/// `distance`, using a miter join. Authored polygons are convex, so exactly
/// one output ring is expected; anything else is an [`NavError::EngineFailure`].
pub fn offset_ring(ring: &[IntPoint], distance: f64) -> Result<Vec<IntPoint>, NavError> {
    let polygon = ring_to_polygon(ring, &[]);
    let offset = polygon.offset(distance).map_err(|err| {
        log::error!("offset engine error: {err:?}");
        NavError::EngineFailure {
            reason: format!("offset engine error: {err:?}"),
        }
    })?;
    let mut islands = multi_polygon_to_islands(&offset);
    if islands.len() != 1 || !islands[0].holes.is_empty() {
        log::error!(
            "offsetting a convex polygon produced {} islands, expected exactly one simple ring",
            islands.len()
        );
        return Err(NavError::EngineFailure {
            reason: format!(
                "expected exactly one simple output ring from offsetting a convex polygon, got {}",
                islands.len()
            ),
        });
    }
    Ok(islands.remove(0).exterior)
}

/// Union all `subjects` together (NonZero-consistent: geo-booleanop treats
/// each simple input polygon as a single winding region, which matches
/// NonZero fill for convex, non-self-intersecting input).
pub fn union_rings(subjects: &[Vec<IntPoint>]) -> Result<Vec<ClippedIsland>, NavError> {
    if subjects.is_empty() {
        return Ok(vec![]);
    }
    let mut acc = MultiPolygon(vec![ring_to_polygon(&subjects[0], &[])]);
    for ring in &subjects[1..] {
        let next = MultiPolygon(vec![ring_to_polygon(ring, &[])]);
        acc = acc.union(&next);
    }
    Ok(multi_polygon_to_islands(&acc))
}

/// Subtract the union of `clips` from `subject`. Each clip island's holes are
/// carried through as interior rings, so a gap enclosed by the clip set (e.g.
/// an uncovered pocket inside a ring of obstacles) is not wrongly clipped
/// away too — it stays subtractable surface, matching what `nav_obstacles`
/// reports for the same island set.
pub fn difference_ring(
    subject: &[IntPoint],
    clips: &[ClippedIsland],
) -> Result<Vec<ClippedIsland>, NavError> {
    if clips.is_empty() {
        return Ok(vec![ClippedIsland {
            exterior: subject.to_vec(),
            holes: vec![],
        }]);
    }
    let subject_multi = MultiPolygon(vec![ring_to_polygon(subject, &[])]);
    let clip_multi = MultiPolygon(
        clips
            .iter()
            .map(|island| ring_to_polygon(&island.exterior, &island.holes))
            .collect(),
    );
    let result = subject_multi.difference(&clip_multi);
    Ok(multi_polygon_to_islands(&result))
}
