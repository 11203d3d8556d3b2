//! Polygon rings and the union of overlapping polygon sets.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Point, EPS};

/// A closed polygon ring. The closing edge from the last vertex back to
/// the first is implicit; rings never repeat their first vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The ring translated by `offset`.
    pub fn translated(&self, offset: Point) -> Polygon {
        Polygon::new(self.vertices.iter().map(|&v| v + offset).collect())
    }

    /// Directed edges of the ring, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Twice the signed area of the ring (positive for counterclockwise
    /// vertex order in mathematical axes).
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum()
    }

    /// The same ring with counterclockwise vertex order.
    pub fn normalized(mut self) -> Polygon {
        if self.signed_area() < 0.0 {
            self.vertices.reverse();
        }
        self
    }

    /// Whether `p` lies strictly inside the ring. Boundary points are
    /// not inside.
    pub fn contains(&self, p: Point) -> bool {
        if self.vertices.len() < 3 || self.on_boundary(p) {
            return false;
        }

        // Even-odd rule with a ray towards positive x.
        let mut inside = false;
        for (a, b) in self.edges() {
            let crosses = (a.y > p.y) != (b.y > p.y);
            if crosses {
                let x_at = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if x_at > p.x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Whether `p` lies on one of the ring's edges, within tolerance.
    pub fn on_boundary(&self, p: Point) -> bool {
        self.edges()
            .any(|(a, b)| distance_to_segment(p, a, b) <= EPS)
    }
}

/// Cross product of (b - a) and (c - a).
pub(crate) fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Distance from `p` to the segment `a`..`b`.
pub(crate) fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= EPS * EPS {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a + Point::new(ab.x * t, ab.y * t))
}

/// Whether `p` lies on segment `a`..`b` strictly between the endpoints.
pub(crate) fn strictly_on_segment(p: Point, a: Point, b: Point) -> bool {
    if p == a || p == b {
        return false;
    }
    distance_to_segment(p, a, b) <= EPS
        && p.distance_to(a) > EPS
        && p.distance_to(b) > EPS
}

/// Whether the open segments `a`..`b` and `c`..`d` cross at an interior
/// point of both. Touching at endpoints does not count.
pub(crate) fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    (o1 > EPS && o2 < -EPS || o1 < -EPS && o2 > EPS)
        && (o3 > EPS && o4 < -EPS || o3 < -EPS && o4 > EPS)
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Parameters along `a`..`b` at which the segment meets `c`..`d`,
/// including endpoint touches and collinear overlaps.
fn intersection_params(a: Point, b: Point, c: Point, d: Point) -> SmallVec<[f64; 2]> {
    let mut params = SmallVec::new();
    let r = b - a;
    let s = d - c;
    let denom = r.x * s.y - r.y * s.x;
    let qp = c - a;

    if denom.abs() > EPS {
        let t = (qp.x * s.y - qp.y * s.x) / denom;
        let u = (qp.x * r.y - qp.y * r.x) / denom;
        if (-EPS..=1.0 + EPS).contains(&t) && (-EPS..=1.0 + EPS).contains(&u) {
            params.push(t.clamp(0.0, 1.0));
        }
    } else if (qp.x * r.y - qp.y * r.x).abs() <= EPS {
        // Collinear: project the other segment's endpoints onto a..b.
        let len_sq = r.dot(r);
        if len_sq > EPS * EPS {
            for p in [c, d] {
                let t = (p - a).dot(r) / len_sq;
                if (-EPS..=1.0 + EPS).contains(&t) {
                    params.push(t.clamp(0.0, 1.0));
                }
            }
        }
    }

    params
}

const MERGE_GRID: f64 = 1e-6;

fn stitch_key(p: Point) -> (i64, i64) {
    (
        (p.x / MERGE_GRID).round() as i64,
        (p.y / MERGE_GRID).round() as i64,
    )
}

#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: Point,
    end: Point,
}

/// Union of a set of possibly overlapping polygons.
///
/// Every input edge is split at its intersections with the other
/// polygons; fragments whose midpoint lies inside another polygon are
/// discarded (a single copy survives for collinear shared edges), and
/// the survivors are stitched back into rings. The output rings are
/// disjoint, counterclockwise, and cover exactly the union of the
/// inputs. Fragments that cannot be closed into a ring, such as the
/// shared edge of two touching polygons, are dropped, so no zero-area
/// ring is ever produced.
pub fn union_polygons(polygons: &[Polygon]) -> Vec<Polygon> {
    let polys: Vec<Polygon> = polygons
        .iter()
        .filter(|p| p.len() >= 3)
        .map(|p| p.clone().normalized())
        .collect();

    if polys.len() <= 1 {
        return polys;
    }

    let mut fragments: Vec<Fragment> = Vec::new();

    for (i, poly) in polys.iter().enumerate() {
        for (a, b) in poly.edges() {
            let mut cuts: Vec<f64> = vec![0.0, 1.0];
            for (j, other) in polys.iter().enumerate() {
                if j == i {
                    continue;
                }
                for (c, d) in other.edges() {
                    cuts.extend(intersection_params(a, b, c, d));
                }
            }
            cuts.sort_by(|x, y| x.total_cmp(y));
            cuts.dedup_by(|x, y| (*x - *y).abs() <= EPS);

            for window in cuts.windows(2) {
                let (t0, t1) = (window[0], window[1]);
                if t1 - t0 <= EPS {
                    continue;
                }
                let start = lerp(a, b, t0);
                let end = lerp(a, b, t1);
                let mid = lerp(a, b, (t0 + t1) / 2.0);

                let mut keep = true;
                for (j, other) in polys.iter().enumerate() {
                    if j == i {
                        continue;
                    }
                    if other.contains(mid) || (other.on_boundary(mid) && j < i) {
                        keep = false;
                        break;
                    }
                }
                if keep {
                    fragments.push(Fragment { start, end });
                }
            }
        }
    }

    stitch_fragments(&fragments)
}

fn stitch_fragments(fragments: &[Fragment]) -> Vec<Polygon> {
    use hashbrown::HashMap;

    let mut by_start: HashMap<(i64, i64), SmallVec<[usize; 2]>> = HashMap::new();
    for (idx, fragment) in fragments.iter().enumerate() {
        by_start.entry(stitch_key(fragment.start)).or_default().push(idx);
    }

    let mut used = vec![false; fragments.len()];
    let mut rings = Vec::new();

    for first in 0..fragments.len() {
        if used[first] {
            continue;
        }

        let ring_start = stitch_key(fragments[first].start);
        let mut ring = vec![fragments[first].start];
        let mut current = first;
        used[first] = true;
        let mut closed = false;

        for _ in 0..fragments.len() {
            let end = fragments[current].end;
            if stitch_key(end) == ring_start {
                closed = true;
                break;
            }
            ring.push(end);

            let incoming = end - fragments[current].start;
            let next = by_start
                .get(&stitch_key(end))
                .into_iter()
                .flatten()
                .copied()
                .filter(|&idx| !used[idx])
                .min_by(|&x, &y| {
                    turn_angle(incoming, fragments[x].end - fragments[x].start)
                        .total_cmp(&turn_angle(incoming, fragments[y].end - fragments[y].start))
                });

            match next {
                Some(idx) => {
                    used[idx] = true;
                    current = idx;
                }
                None => break,
            }
        }

        if closed && ring.len() >= 3 {
            let polygon = Polygon::new(ring);
            if polygon.signed_area().abs() > EPS {
                rings.push(polygon.normalized());
            }
        }
    }

    rings
}

/// Signed turn from direction `from` to direction `to`. Tracing the
/// outer boundary of counterclockwise rings takes the smallest value
/// (the most clockwise continuation) at a junction.
fn turn_angle(from: Point, to: Point) -> f64 {
    (from.x * to.y - from.y * to.x).atan2(from.dot(to))
}
