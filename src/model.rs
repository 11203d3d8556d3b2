/*!
Plant specification data model.

The records mirror the external specification schema field for field
(`Stations.Grid`, `Stations.Models`, `Parts`, `Activities`); parsing the
source document (YAML or otherwise) is a collaborator concern, so the
types only derive serde and validate structure.
*/

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Polygon, Vector};

/// Grid cell coordinates (column, row).
pub type Cell = Vector<i32>;

/// The station that moves parts in and out of the plant. It must exist
/// in every specification and is always placed at the reserved cell.
pub const INOUT_STATION: &str = "InOut";

/// Structural defects of a specification. These abort a search before
/// it starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecificationError {
    #[error("required station \"{INOUT_STATION}\" is missing")]
    MissingInOut,

    #[error("station \"{station}\" declares both transport and activities")]
    TransportWithActivities { station: String },

    #[error("station \"{station}\" has an obstacle ring with {vertices} vertices; at least 3 are required")]
    DegenerateObstacle { station: String, vertices: usize },

    #[error("grid of {cols}x{rows} cells is too small to place stations")]
    GridTooSmall { cols: i32, rows: i32 },
}

/// A parsed plant specification: grid, station models, parts and
/// activities. Immutable for the duration of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specification {
    #[serde(rename = "Stations")]
    pub stations: Stations,

    #[serde(rename = "Parts")]
    pub parts: BTreeMap<String, Part>,

    #[serde(rename = "Activities")]
    pub activities: BTreeMap<String, Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stations {
    #[serde(rename = "Grid")]
    pub grid: GridParams,

    #[serde(rename = "Models")]
    pub models: BTreeMap<String, StationModel>,
}

/// Grid dimensions and the physical size of one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    #[serde(rename = "Size")]
    pub size: Vector<i32>,

    #[serde(rename = "Measures")]
    pub measures: Vector<f64>,
}

impl GridParams {
    pub fn half_measures(&self) -> Point {
        Point::new(self.measures.x / 2.0, self.measures.y / 2.0)
    }

    /// Physical coordinates of a cell's origin corner.
    pub fn cell_origin(&self, cell: Cell) -> Point {
        Point::new(
            f64::from(cell.x) * self.measures.x,
            f64::from(cell.y) * self.measures.y,
        )
    }

    /// Physical coordinates of a cell's centre.
    pub fn cell_centre(&self, cell: Cell) -> Point {
        self.cell_origin(cell) + self.half_measures()
    }

    pub fn contains_cell(&self, cell: Cell) -> bool {
        (0..self.size.x).contains(&cell.x) && (0..self.size.y).contains(&cell.y)
    }

    /// The reserved cell for the InOut station: middle column of the
    /// first row.
    pub fn inout_cell(&self) -> Cell {
        Cell::new(self.size.x / 2, 0)
    }
}

/// A station model. Storage may coexist with either transport or
/// activities, but a model never has both of the latter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationModel {
    #[serde(rename = "Storage", default, skip_serializing_if = "Option::is_none")]
    pub storages: Option<Vec<Storage>>,

    #[serde(rename = "Transport", default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,

    #[serde(rename = "Activities", default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<String>>,

    #[serde(rename = "Obstacles", default, skip_serializing_if = "Option::is_none")]
    pub obstacles: Option<Vec<Polygon>>,
}

impl StationModel {
    pub fn is_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Obstacle rings translated to an absolute origin.
    pub fn absolute_obstacles(&self, origin: Point) -> Vec<Polygon> {
        self.obstacles
            .iter()
            .flatten()
            .map(|ring| ring.translated(origin))
            .collect()
    }
}

/// A storage slot inside a station: a position (relative to the cell
/// origin) and the part types it handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Place")]
    pub position: Point,

    #[serde(rename = "Type")]
    pub types: Vec<StorageType>,
}

/// What a storage slot does for one part. `add` and `remove` carry the
/// schema's 0/1 encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageType {
    #[serde(rename = "Part")]
    pub part: String,

    #[serde(rename = "Add")]
    pub add: u8,

    #[serde(rename = "Remove")]
    pub remove: u8,

    #[serde(rename = "Requires", default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

impl StorageType {
    /// The slot accepts this part (transport may deposit it).
    pub fn accepts(&self) -> bool {
        self.add == 1
    }

    /// The slot yields this part (transport may pick it up).
    pub fn yields(&self) -> bool {
        self.remove == 1
    }
}

/// Transport capability of a station: carrying range and the parts it
/// can move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    #[serde(rename = "Range")]
    pub range: f64,

    #[serde(rename = "Parts")]
    pub parts: Vec<String>,
}

impl Transport {
    pub fn carries(&self, part: &str) -> bool {
        self.parts.iter().any(|p| p == part)
    }
}

/// A producible part and the ordered activities that produce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(rename = "Activities")]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "Requires")]
    pub requires: Vec<String>,

    #[serde(rename = "Returns")]
    pub returns: Vec<String>,

    #[serde(rename = "TimeSpend")]
    pub time_spend: f64,
}

impl Specification {
    pub fn grid(&self) -> &GridParams {
        &self.stations.grid
    }

    pub fn station(&self, name: &str) -> Option<&StationModel> {
        self.stations.models.get(name)
    }

    /// Check the structural requirements the search relies on.
    pub fn validate(&self) -> Result<(), SpecificationError> {
        let grid = self.grid();
        if grid.size.x < 1 || grid.size.y < 2 {
            return Err(SpecificationError::GridTooSmall {
                cols: grid.size.x,
                rows: grid.size.y,
            });
        }

        if !self.stations.models.contains_key(INOUT_STATION) {
            return Err(SpecificationError::MissingInOut);
        }

        for (name, model) in &self.stations.models {
            if model.transport.is_some() && model.activities.is_some() {
                return Err(SpecificationError::TransportWithActivities {
                    station: name.clone(),
                });
            }
            for ring in model.obstacles.iter().flatten() {
                if ring.len() < 3 {
                    return Err(SpecificationError::DegenerateObstacle {
                        station: name.clone(),
                        vertices: ring.len(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec() -> Specification {
        let mut models = BTreeMap::new();
        models.insert(
            INOUT_STATION.to_string(),
            StationModel {
                storages: None,
                transport: None,
                activities: None,
                obstacles: None,
            },
        );

        Specification {
            stations: Stations {
                grid: GridParams {
                    size: Vector::new(5, 5),
                    measures: Vector::new(1.0, 1.0),
                },
                models,
            },
            parts: BTreeMap::new(),
            activities: BTreeMap::new(),
        }
    }

    #[test]
    fn grid_coordinates() {
        let grid = GridParams {
            size: Vector::new(5, 5),
            measures: Vector::new(0.8, 0.8),
        };

        assert_eq!(grid.inout_cell(), Cell::new(2, 0));
        assert_eq!(grid.cell_origin(Cell::new(2, 1)), Point::new(1.6, 0.8));
        assert_eq!(grid.cell_centre(Cell::new(0, 0)), Point::new(0.4, 0.4));
        assert!(grid.contains_cell(Cell::new(4, 4)));
        assert!(!grid.contains_cell(Cell::new(5, 0)));
        assert!(!grid.contains_cell(Cell::new(-1, 2)));
    }

    #[test]
    fn minimal_specification_is_valid() {
        assert_eq!(minimal_spec().validate(), Ok(()));
    }

    #[test]
    fn missing_inout_is_rejected() {
        let mut spec = minimal_spec();
        spec.stations.models.clear();

        assert_eq!(spec.validate(), Err(SpecificationError::MissingInOut));
    }

    #[test]
    fn transport_with_activities_is_rejected() {
        let mut spec = minimal_spec();
        spec.stations.models.insert(
            "Hybrid".to_string(),
            StationModel {
                storages: None,
                transport: Some(Transport {
                    range: 1.0,
                    parts: vec![],
                }),
                activities: Some(vec!["A1".to_string()]),
                obstacles: None,
            },
        );

        assert_eq!(
            spec.validate(),
            Err(SpecificationError::TransportWithActivities {
                station: "Hybrid".to_string()
            })
        );
    }

    #[test]
    fn degenerate_obstacle_is_rejected() {
        let mut spec = minimal_spec();
        spec.stations.models.insert(
            "Blocked".to_string(),
            StationModel {
                storages: None,
                transport: None,
                activities: None,
                obstacles: Some(vec![Polygon::new(vec![
                    Point::new(0.0, 0.0),
                    Point::new(1.0, 0.0),
                ])]),
            },
        );

        assert_eq!(
            spec.validate(),
            Err(SpecificationError::DegenerateObstacle {
                station: "Blocked".to_string(),
                vertices: 2
            })
        );
    }

    #[test]
    fn schema_field_names_round_trip() {
        let raw = serde_json::json!({
            "Stations": {
                "Grid": {
                    "Size": {"X": 5, "Y": 5},
                    "Measures": {"X": 0.8, "Y": 0.8}
                },
                "Models": {
                    "InOut": {
                        "Storage": [{
                            "Id": "out",
                            "Place": {"X": 0.0, "Y": 0.0},
                            "Type": [{"Part": "Part3", "Add": 1, "Remove": 0}]
                        }]
                    },
                    "Robot": {
                        "Transport": {"Range": 2.0, "Parts": ["Part3"]},
                        "Obstacles": [[
                            {"X": 0.2, "Y": 0.2},
                            {"X": 0.6, "Y": 0.2},
                            {"X": 0.6, "Y": 0.6}
                        ]]
                    }
                }
            },
            "Parts": {"Part3": {"Activities": ["A1"]}},
            "Activities": {
                "A1": {"Requires": ["Part1"], "Returns": ["Part3"], "TimeSpend": 5.0}
            }
        });

        let spec: Specification = serde_json::from_value(raw).unwrap();
        assert_eq!(spec.validate(), Ok(()));

        let robot = spec.station("Robot").unwrap();
        assert!(robot.is_transport());
        assert_eq!(robot.obstacles.as_ref().unwrap()[0].len(), 3);
        assert!(robot.transport.as_ref().unwrap().carries("Part3"));

        let slot = &spec.station(INOUT_STATION).unwrap().storages.as_ref().unwrap()[0];
        assert!(slot.types[0].accepts());
        assert!(!slot.types[0].yields());
        assert!(slot.types[0].requires.is_empty());
    }
}
