//! Visibility graphs over polygonal obstacles with shortest-path
//! queries.

use hashbrown::HashMap;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use thiserror::Error;

use super::polygon::{segments_cross, strictly_on_segment};
use super::{Point, Polygon};

/// Failures of a visibility-graph query. Layout evaluation treats these
/// as infeasibility of the enclosing configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("point {0} lies inside an obstacle polygon")]
    PointInsideObstacle(Point),

    #[error("no unobstructed path from {0} to {1}")]
    NoPath(Point, Point),
}

/// Identity key for a vertex; vertices are shared only when their
/// coordinates are bit-for-bit equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey(u64, u64);

impl From<Point> for PointKey {
    fn from(p: Point) -> Self {
        Self(p.x.to_bits(), p.y.to_bits())
    }
}

/// A graph over the vertices of a set of polygonal obstacles whose
/// edges are unobstructed line-of-sight segments.
#[derive(Debug, Clone, Default)]
pub struct VisibilityGraph {
    polygons: Vec<Polygon>,
    graph: UnGraph<Point, f64>,
    nodes: HashMap<PointKey, NodeIndex>,
}

impl VisibilityGraph {
    /// Build the graph: one node per polygon vertex, an edge for every
    /// polygon side and for every vertex pair in clear line of sight.
    pub fn build(polygons: Vec<Polygon>) -> Self {
        let mut vis = Self {
            polygons,
            graph: UnGraph::new_undirected(),
            nodes: HashMap::new(),
        };

        let rings: Vec<Vec<Point>> = vis
            .polygons
            .iter()
            .map(|p| p.vertices().to_vec())
            .collect();

        for ring in &rings {
            for &vertex in ring {
                vis.ensure_node(vertex);
            }
        }

        // Polygon sides are always traversable.
        for ring in &rings {
            let n = ring.len();
            for i in 0..n {
                let a = vis.nodes[&PointKey::from(ring[i])];
                let b = vis.nodes[&PointKey::from(ring[(i + 1) % n])];
                if a != b {
                    vis.graph
                        .update_edge(a, b, vis.graph[a].distance_to(vis.graph[b]));
                }
            }
        }

        // Cross-visibility between every remaining vertex pair.
        let indices: Vec<NodeIndex> = vis.graph.node_indices().collect();
        for (i, &a) in indices.iter().enumerate() {
            for &b in &indices[i + 1..] {
                if vis.graph.contains_edge(a, b) {
                    continue;
                }
                let (pa, pb) = (vis.graph[a], vis.graph[b]);
                if vis.segment_clear(pa, pb) {
                    vis.graph.update_edge(a, b, pa.distance_to(pb));
                }
            }
        }

        vis
    }

    fn ensure_node(&mut self, p: Point) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .nodes
            .entry(PointKey::from(p))
            .or_insert_with(|| graph.add_node(p))
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether `p` lies strictly inside any obstacle polygon.
    pub fn point_inside(&self, p: Point) -> bool {
        self.polygons.iter().any(|poly| poly.contains(p))
    }

    /// Whether the segment `a`..`b` stays clear of every polygon
    /// interior. Segments may run along polygon boundaries and touch
    /// vertices at their endpoints.
    fn segment_clear(&self, a: Point, b: Point) -> bool {
        if a == b {
            return false;
        }

        for poly in &self.polygons {
            for (c, d) in poly.edges() {
                if c == a || c == b || d == a || d == b {
                    continue;
                }
                if segments_cross(a, b, c, d) {
                    return false;
                }
            }
            // Grazing a vertex mid-segment is treated as blocked; the
            // same route remains available through the vertex node.
            for &v in poly.vertices() {
                if strictly_on_segment(v, a, b) {
                    return false;
                }
            }
        }

        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        !self.point_inside(mid)
    }

    /// Vertices directly reachable from `p` via an unobstructed
    /// segment.
    pub fn visible_from(&self, p: Point) -> Vec<Point> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx])
            .filter(|&v| v != p && self.segment_clear(p, v))
            .collect()
    }

    /// Shortest obstacle-avoiding path from `a` to `b`, both endpoints
    /// included. Fails when an endpoint is inside a polygon or no
    /// route exists.
    pub fn shortest_path(&self, a: Point, b: Point) -> Result<Vec<Point>, GeometryError> {
        if self.point_inside(a) {
            return Err(GeometryError::PointInsideObstacle(a));
        }
        if self.point_inside(b) {
            return Err(GeometryError::PointInsideObstacle(b));
        }
        if a == b {
            return Ok(vec![a]);
        }

        let mut graph = self.graph.clone();
        let start = match self.nodes.get(&PointKey::from(a)) {
            Some(&idx) => idx,
            None => graph.add_node(a),
        };
        let goal = match self.nodes.get(&PointKey::from(b)) {
            Some(&idx) => idx,
            None => graph.add_node(b),
        };

        // Connect the query points to everything they can see.
        for (endpoint, node) in [(a, start), (b, goal)] {
            for &vertex_node in self.nodes.values() {
                if vertex_node == node {
                    continue;
                }
                let vertex = graph[vertex_node];
                if self.segment_clear(endpoint, vertex) {
                    graph.update_edge(node, vertex_node, endpoint.distance_to(vertex));
                }
            }
        }
        if self.segment_clear(a, b) {
            graph.update_edge(start, goal, a.distance_to(b));
        }

        let route = astar(
            &graph,
            start,
            |node| node == goal,
            |edge| *edge.weight(),
            |node| graph[node].distance_to(b),
        );

        match route {
            Some((_, nodes)) => Ok(nodes.into_iter().map(|idx| graph[idx]).collect()),
            None => Err(GeometryError::NoPath(a, b)),
        }
    }
}

/// Total Euclidean length of a polyline.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|pair| pair[0].distance_to(pair[1])).sum()
}
