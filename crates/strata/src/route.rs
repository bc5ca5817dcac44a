//! Edge polylines in the canonical top-to-bottom frame.
//!
//! Runs after positioning, while reversed edges still point down the ranks. Edges sharing the
//! same endpoints are routed once and then fanned apart along the path normal.

use crate::graphlib::EdgeKey;
use crate::position::RankGeometry;
use crate::util::{EPSILON, label_anchor};
use crate::{LayoutGraph, NodeLabel, Point};
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

/// Distance an edge travels straight out of (or into) a node box before bending.
pub const PORT_OFFSET: f64 = 10.0;

/// Routes every edge whose endpoints are both positioned. Returns the number of routed edges.
pub fn route_edges(g: &mut LayoutGraph, geometry: &RankGeometry) -> usize {
    let mut groups: Vec<Vec<EdgeKey>> = Vec::new();
    let mut group_of: HashMap<(String, String), usize> = HashMap::default();
    for key in g.edges() {
        let pair = (key.v.clone(), key.w.clone());
        match group_of.get(&pair) {
            Some(&ix) => groups[ix].push(key.clone()),
            None => {
                group_of.insert(pair, groups.len());
                groups.push(vec![key.clone()]);
            }
        }
    }

    let ranksep = g.graph().ranksep;
    let edgesep = g.graph().edgesep;
    let mut routed = 0usize;
    for group in groups {
        let Some(first) = group.first() else {
            continue;
        };
        let (Some(source), Some(target)) = (g.node(&first.v), g.node(&first.w)) else {
            continue;
        };
        let Some(base) = base_path(source, target, geometry, ranksep) else {
            continue;
        };

        let count = group.len();
        for (i, key) in group.iter().enumerate() {
            let offset = (i as f64 - (count as f64 - 1.0) / 2.0) * edgesep;
            let points = fan(&base, offset);
            let anchor = label_anchor(&points);
            if let Some(label) = g.edge_mut_by_key(key) {
                label.x = anchor.map(|p| p.x);
                label.y = anchor.map(|p| p.y);
                label.points = points;
                routed += 1;
            }
        }
    }
    debug!(routed, "route: edges routed");
    routed
}

/// Unfanned path between two positioned nodes.
pub fn base_path(
    source: &NodeLabel,
    target: &NodeLabel,
    geometry: &RankGeometry,
    ranksep: f64,
) -> Option<Vec<Point>> {
    let a = source.center()?;
    let b = target.center()?;
    let rv = source.rank?;
    let rw = target.rank?;

    if rv == rw {
        return Some(same_rank_arc(a, source.height, b, target.height, ranksep));
    }

    let down = if rw > rv { 1.0 } else { -1.0 };
    let port = PORT_OFFSET.min(ranksep / 4.0);
    let mut points = Vec::with_capacity(4 + (rw - rv).unsigned_abs() as usize);
    points.push(a);
    points.push(Point::new(a.x, a.y + down * (source.height / 2.0 + port)));

    let dx = b.x - a.x;
    if dx.abs() > EPSILON {
        let span = f64::from(rw - rv);
        let step = if rw > rv { 1 } else { -1 };
        let mut r = rv + step;
        while r != rw {
            if let Some(y) = geometry.center(r) {
                let t = f64::from(r - rv) / span;
                points.push(Point::new(a.x + dx * t, y));
            }
            r += step;
        }
    }

    points.push(Point::new(b.x, b.y - down * (target.height / 2.0 + port)));
    points.push(b);
    Some(points)
}

/// Symmetric arc from the top of one node to the top of another in the same rank, lifted a third
/// of `ranksep` above the higher of the two top edges.
fn same_rank_arc(a: Point, a_height: f64, b: Point, b_height: f64, ranksep: f64) -> Vec<Point> {
    let a_top = a.y - a_height / 2.0;
    let b_top = b.y - b_height / 2.0;
    let peak = a_top.min(b_top) - ranksep / 3.0;
    let dx = b.x - a.x;
    vec![
        Point::new(a.x, a_top),
        Point::new(a.x + dx / 4.0, peak),
        Point::new(a.x + dx / 2.0, peak),
        Point::new(a.x + dx * 3.0 / 4.0, peak),
        Point::new(b.x, b_top),
    ]
}

/// Shifts every interior point by `offset` along the normal of the local tangent. The first and
/// last points stay put.
pub fn fan(points: &[Point], offset: f64) -> Vec<Point> {
    if offset.abs() <= EPSILON || points.len() < 3 {
        return points.to_vec();
    }
    let mut out = points.to_vec();
    for i in 1..points.len() - 1 {
        let tx = points[i + 1].x - points[i - 1].x;
        let ty = points[i + 1].y - points[i - 1].y;
        let len = tx.hypot(ty);
        if len <= EPSILON {
            out[i].x += offset;
            continue;
        }
        out[i].x += -ty / len * offset;
        out[i].y += tx / len * offset;
    }
    out
}
