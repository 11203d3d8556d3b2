/*!
The plant: a grid of cells holding placed station models, and the
per-transport visibility graphs derived from a fully placed grid.
*/

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::geometry::{
    angle_between_points, union_polygons, Point, Polygon, VisibilityGraph,
};
use crate::model::{Cell, Specification, StationModel};

/// Invalid placement requests.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlacementError {
    #[error("cell {cell} is outside the grid")]
    OutOfRange { cell: Cell },

    #[error("cell {cell} is already occupied by \"{occupant}\"")]
    CellOccupied { cell: Cell, occupant: String },

    #[error("station \"{station}\" is already placed")]
    AlreadyPlaced { station: String },

    #[error("station \"{station}\" does not exist in the specification")]
    UnknownStation { station: String },
}

/// A (partially) placed plant over the specification's grid.
#[derive(Debug, Clone)]
pub struct Plant<'a> {
    spec: &'a Specification,
    grid: Vec<Option<&'a str>>,
    placed: BTreeMap<&'a str, Cell>,
}

impl<'a> Plant<'a> {
    pub fn new(spec: &'a Specification) -> Self {
        let size = spec.grid().size;
        Self {
            spec,
            grid: vec![None; (size.x * size.y) as usize],
            placed: BTreeMap::new(),
        }
    }

    pub fn spec(&self) -> &'a Specification {
        self.spec
    }

    fn slot(&self, cell: Cell) -> usize {
        (cell.y * self.spec.grid().size.x + cell.x) as usize
    }

    /// Place a station model on an empty in-range cell. Every model may
    /// appear at most once.
    pub fn place(&mut self, station: &str, cell: Cell) -> Result<(), PlacementError> {
        let (name, _) = self
            .spec
            .stations
            .models
            .get_key_value(station)
            .ok_or_else(|| PlacementError::UnknownStation {
                station: station.to_string(),
            })?;

        if !self.spec.grid().contains_cell(cell) {
            return Err(PlacementError::OutOfRange { cell });
        }
        if self.placed.contains_key(name.as_str()) {
            return Err(PlacementError::AlreadyPlaced {
                station: station.to_string(),
            });
        }
        let slot = self.slot(cell);
        if let Some(occupant) = self.grid[slot] {
            return Err(PlacementError::CellOccupied {
                cell,
                occupant: occupant.to_string(),
            });
        }

        self.grid[slot] = Some(name.as_str());
        self.placed.insert(name.as_str(), cell);
        Ok(())
    }

    /// The station occupying a cell, if any.
    pub fn get(&self, cell: Cell) -> Option<(&'a str, &'a StationModel)> {
        if !self.spec.grid().contains_cell(cell) {
            return None;
        }
        self.grid[self.slot(cell)]
            .map(|name| (name, &self.spec.stations.models[name]))
    }

    /// The cell a station was placed on, if it was.
    pub fn station_cell(&self, station: &str) -> Option<Cell> {
        self.placed.get(station).copied()
    }

    /// Occupied cells in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &'a str, &'a StationModel)> + '_ {
        let size = self.spec.grid().size;
        (0..size.x)
            .flat_map(move |x| (0..size.y).map(move |y| Cell::new(x, y)))
            .filter_map(move |cell| self.get(cell).map(|(name, model)| (cell, name, model)))
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// Whether every station model of the specification is placed.
    pub fn is_complete(&self) -> bool {
        self.placed.len() == self.spec.stations.models.len()
    }

    pub fn unused_stations(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.spec
            .stations
            .models
            .keys()
            .map(String::as_str)
            .filter(move |name| !self.placed.contains_key(name))
    }

    /// Empty cells with at least one occupied 4-neighbour, in
    /// column-major order. Row 0 is the conveyor strip and never a
    /// candidate.
    pub fn adjacent_empty_cells(&self) -> Vec<Cell> {
        let size = self.spec.grid().size;
        let mut candidates = Vec::new();

        for x in 0..size.x {
            for y in 1..size.y {
                let cell = Cell::new(x, y);
                if self.get(cell).is_some() {
                    continue;
                }
                let neighbours = [
                    Cell::new(x, y - 1),
                    Cell::new(x - 1, y),
                    Cell::new(x + 1, y),
                    Cell::new(x, y + 1),
                ];
                if neighbours.iter().any(|&n| self.get(n).is_some()) {
                    candidates.push(cell);
                }
            }
        }

        candidates
    }

    /// The set of "{name}({x},{y})" fragments identifying this
    /// configuration.
    pub fn canonical_set(&self) -> BTreeSet<String> {
        self.placed
            .iter()
            .map(|(name, cell)| format!("{}({},{})", name, cell.x, cell.y))
            .collect()
    }

    /// The canonical fragments joined in sorted order. Two plants are
    /// equivalent configurations exactly when their strings match.
    pub fn canonical_string(&self) -> String {
        self.canonical_set().into_iter().collect()
    }
}

/// Per-transport visibility graphs of a placed plant, keyed by the
/// transport station's name.
#[derive(Debug, Clone, Default)]
pub struct PlantVisibility {
    graphs: BTreeMap<String, VisibilityGraph>,
}

impl PlantVisibility {
    /// Build one visibility graph per placed transport station.
    ///
    /// Obstacles are translated to absolute coordinates and split into
    /// the non-transport set and per-transport sets; each transport
    /// navigates around every obstacle except its own. Silhouette
    /// vertices that hide part of a polygon from the transport's cell
    /// centre get an auxiliary vertex pushed `inflation` units away, so
    /// shortest paths cannot hug the polygon's invisible side.
    pub fn build(plant: &Plant<'_>, inflation: f64) -> Self {
        let grid = plant.spec().grid();

        let mut normal: Vec<Polygon> = Vec::new();
        let mut robot: BTreeMap<&str, Vec<Polygon>> = BTreeMap::new();

        for (cell, name, station) in plant.iter() {
            if station.obstacles.is_none() {
                continue;
            }
            let absolute = station.absolute_obstacles(grid.cell_origin(cell));
            if station.is_transport() {
                robot.insert(name, absolute);
            } else {
                normal.extend(absolute);
            }
        }

        let mut graphs = BTreeMap::new();
        for (cell, name, station) in plant.iter() {
            if !station.is_transport() {
                continue;
            }

            let centre = grid.cell_centre(cell);
            let others: Vec<Polygon> = normal
                .iter()
                .cloned()
                .chain(
                    robot
                        .iter()
                        .filter(|&(&robot_name, _)| robot_name != name)
                        .flat_map(|(_, polygons)| polygons.iter().cloned()),
                )
                .collect();

            let graph = transport_visibility_graph(centre, &others, inflation);
            debug!(
                transport = name,
                obstacles = others.len(),
                vertices = graph.vertex_count(),
                "built transport visibility graph"
            );
            graphs.insert(name.to_string(), graph);
        }

        Self { graphs }
    }

    pub fn get(&self, transport: &str) -> Option<&VisibilityGraph> {
        self.graphs.get(transport)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VisibilityGraph)> {
        self.graphs.iter().map(|(name, graph)| (name.as_str(), graph))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Build one transport's visibility graph from the obstacles it must
/// navigate around.
fn transport_visibility_graph(
    centre: Point,
    others: &[Polygon],
    inflation: f64,
) -> VisibilityGraph {
    // Visible vertices are determined polygon by polygon: each ring
    // blocks sight of its own vertices only.
    let mut visible: Vec<Point> = Vec::new();
    for polygon in others {
        let local = VisibilityGraph::build(vec![polygon.clone()]);
        visible.extend(local.visible_from(centre));
    }

    let extruded: Vec<Polygon> = others
        .iter()
        .map(|polygon| extrude_invisible_edges(centre, polygon, &visible, inflation))
        .collect();

    VisibilityGraph::build(union_polygons(&extruded))
}

/// Insert an auxiliary vertex next to every visible vertex whose
/// neighbour is hidden, pushed away from `centre` by `inflation` units.
/// Every original vertex is kept.
fn extrude_invisible_edges(
    centre: Point,
    polygon: &Polygon,
    visible: &[Point],
    inflation: f64,
) -> Polygon {
    let vertices = polygon.vertices();
    let n = vertices.len();
    let mut ring = Vec::with_capacity(n + 2);

    for i in 0..n {
        let vertex = vertices[i];
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];

        if visible.contains(&vertex) {
            let aux = inflated_vertex(centre, vertex, inflation);
            if !visible.contains(&prev) {
                ring.push(aux);
            }
            ring.push(vertex);
            if !visible.contains(&next) {
                ring.push(aux);
            }
        } else {
            ring.push(vertex);
        }
    }

    Polygon::new(ring)
}

fn inflated_vertex(centre: Point, vertex: Point, inflation: f64) -> Point {
    let angle = angle_between_points(centre, vertex);
    vertex + Point::new(inflation * angle.cos(), inflation * angle.sin())
}
