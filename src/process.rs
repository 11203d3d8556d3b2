/*!
The manufacturing process graph: which part flows must exist between
storage positions, and which transports can realise each hop.

Nodes and edges live in flat vectors and reference each other by index,
which keeps the graph cycle-free to borrow and trivially serialisable.
*/

use hashbrown::HashSet;
use serde::Serialize;
use tracing::debug;

use crate::geometry::Point;
use crate::model::Specification;

pub type StationNodeId = usize;
pub type StorageNodeId = usize;

/// One node per station model of the specification.
#[derive(Debug, Clone, Serialize)]
pub struct StationNode {
    pub name: String,
    pub storages: Vec<StorageNodeId>,
}

/// One node per storage slot of each station.
#[derive(Debug, Clone, Serialize)]
pub struct StorageNode {
    pub station: StationNodeId,
    pub slot_index: usize,
    pub id: String,
    pub relative_position: Point,
}

/// Direction of a routing edge, seen from the storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Transport deposits into the storage (the slot accepts the part).
    Input,
    /// Transport picks up from the storage (the slot yields the part).
    Output,
}

/// A transport's ability to serve one storage slot for one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingEdge {
    pub part: String,
    pub transport: StationNodeId,
    pub storage: StorageNodeId,
    pub direction: Direction,
}

/// A part flow the plant must realise, from the storage yielding the
/// part to the storage accepting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEdge {
    pub part: String,
    pub origin: StorageNodeId,
    pub destiny: StorageNodeId,
}

/// The process graph derived once from a specification.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessGraph {
    pub stations: Vec<StationNode>,
    pub storages: Vec<StorageNode>,
    pub routing_edges: Vec<RoutingEdge>,
    pub path_edges: Vec<PathEdge>,

    /// Target parts of the production goal.
    pub parts_to_produce: Vec<String>,
    /// Activities required to produce the target parts.
    pub required_activities: Vec<String>,
    /// Stations executing at least one required activity.
    pub producing_stations: Vec<StationNodeId>,
}

impl ProcessGraph {
    /// Derive the process graph from a specification. All target parts
    /// of the specification are part of the production goal.
    pub fn build(spec: &Specification) -> Self {
        let parts_to_produce: Vec<String> = spec.parts.keys().cloned().collect();

        let mut required_activities: Vec<String> = Vec::new();
        let mut seen_activities = HashSet::new();
        for part in spec.parts.values() {
            for activity in &part.activities {
                if seen_activities.insert(activity.clone()) {
                    required_activities.push(activity.clone());
                }
            }
        }

        let mut stations = Vec::new();
        let mut storages: Vec<StorageNode> = Vec::new();
        let mut producing_stations = Vec::new();

        for (name, model) in &spec.stations.models {
            let station_id = stations.len();
            let mut storage_ids = Vec::new();

            for (slot_index, slot) in model.storages.iter().flatten().enumerate() {
                storage_ids.push(storages.len());
                storages.push(StorageNode {
                    station: station_id,
                    slot_index,
                    id: format!("{}-{}", name, slot.id),
                    relative_position: slot.position,
                });
            }

            if model
                .activities
                .iter()
                .flatten()
                .any(|activity| required_activities.contains(activity))
            {
                producing_stations.push(station_id);
            }

            stations.push(StationNode {
                name: name.clone(),
                storages: storage_ids,
            });
        }

        let routing_edges = Self::routing_edges(spec, &stations, &storages);
        let path_edges = Self::path_edges(spec, &stations, &storages);

        debug!(
            stations = stations.len(),
            storages = storages.len(),
            routing = routing_edges.len(),
            pathing = path_edges.len(),
            "process graph built"
        );

        Self {
            stations,
            storages,
            routing_edges,
            path_edges,
            parts_to_produce,
            required_activities,
            producing_stations,
        }
    }

    /// Transport-to-storage capability edges, de-duplicated by
    /// (part, transport, storage, direction).
    fn routing_edges(
        spec: &Specification,
        stations: &[StationNode],
        storages: &[StorageNode],
    ) -> Vec<RoutingEdge> {
        let mut edges = Vec::new();
        let mut seen = HashSet::new();

        for (transport_id, transport_node) in stations.iter().enumerate() {
            let Some(transport) = &spec.stations.models[&transport_node.name].transport
            else {
                continue;
            };

            for (storage_id, storage) in storages.iter().enumerate() {
                let station = &stations[storage.station];
                let Some(slots) = &spec.stations.models[&station.name].storages else {
                    continue;
                };
                let slot = &slots[storage.slot_index];

                for storage_type in &slot.types {
                    if !transport.carries(&storage_type.part) {
                        continue;
                    }

                    let mut push = |direction: Direction| {
                        let key =
                            (storage_type.part.clone(), transport_id, storage_id, direction);
                        if seen.insert(key) {
                            edges.push(RoutingEdge {
                                part: storage_type.part.clone(),
                                transport: transport_id,
                                storage: storage_id,
                                direction,
                            });
                        }
                    };

                    if storage_type.accepts() {
                        push(Direction::Input);
                    }
                    if storage_type.yields() {
                        push(Direction::Output);
                    }
                }
            }
        }

        edges
    }

    /// Storage-to-storage part flows, de-duplicated by
    /// (part, origin, destiny). A flow exists whenever one station's
    /// slot yields a part another station's slot accepts.
    fn path_edges(
        spec: &Specification,
        stations: &[StationNode],
        storages: &[StorageNode],
    ) -> Vec<PathEdge> {
        let mut edges = Vec::new();
        let mut seen = HashSet::new();

        for (origin_id, origin) in storages.iter().enumerate() {
            for (destiny_id, destiny) in storages.iter().enumerate() {
                if origin.station == destiny.station {
                    continue;
                }

                let Some(origin_slots) =
                    &spec.stations.models[&stations[origin.station].name].storages
                else {
                    continue;
                };
                let Some(destiny_slots) =
                    &spec.stations.models[&stations[destiny.station].name].storages
                else {
                    continue;
                };
                let origin_slot = &origin_slots[origin.slot_index];
                let destiny_slot = &destiny_slots[destiny.slot_index];

                for origin_type in &origin_slot.types {
                    for destiny_type in &destiny_slot.types {
                        if origin_type.part != destiny_type.part {
                            continue;
                        }
                        if !(origin_type.yields() && destiny_type.accepts()) {
                            continue;
                        }
                        let key = (origin_type.part.clone(), origin_id, destiny_id);
                        if seen.insert(key) {
                            edges.push(PathEdge {
                                part: origin_type.part.clone(),
                                origin: origin_id,
                                destiny: destiny_id,
                            });
                        }
                    }
                }
            }
        }

        edges
    }

    pub fn station_node(&self, name: &str) -> Option<StationNodeId> {
        self.stations.iter().position(|node| node.name == name)
    }
}
