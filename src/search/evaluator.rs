//! Feasibility and cost of a placed plant.

use tracing::trace;

use crate::geometry::{path_length, Point};
use crate::plant::{Plant, PlantVisibility};
use crate::process::{ProcessGraph, StorageNodeId};

/// Absolute position of a storage slot: the parent station's cell
/// scaled to physical coordinates, plus the slot's relative offset.
/// `None` while the parent station is unplaced.
pub fn storage_position(
    plant: &Plant<'_>,
    graph: &ProcessGraph,
    storage: StorageNodeId,
) -> Option<Point> {
    let node = &graph.storages[storage];
    let station = &graph.stations[node.station];
    let cell = plant.station_cell(&station.name)?;
    Some(plant.spec().grid().cell_origin(cell) + node.relative_position)
}

/// Whether every routing edge fits its transport: the transport centre
/// must lie outside all obstacles and the obstacle-aware path to the
/// storage must not exceed the transport's range.
pub fn check_configuration(
    plant: &Plant<'_>,
    graph: &ProcessGraph,
    visibility: &PlantVisibility,
) -> bool {
    let grid = plant.spec().grid();

    for edge in &graph.routing_edges {
        let transport_name = &graph.stations[edge.transport].name;

        let Some(transport) = plant
            .spec()
            .station(transport_name)
            .and_then(|model| model.transport.as_ref())
        else {
            return false;
        };
        let Some(vis) = visibility.get(transport_name) else {
            return false;
        };
        let Some(transport_cell) = plant.station_cell(transport_name) else {
            return false;
        };
        let Some(target) = storage_position(plant, graph, edge.storage) else {
            return false;
        };

        let centre = grid.cell_centre(transport_cell);
        if vis.point_inside(centre) {
            return false;
        }

        let Ok(path) = vis.shortest_path(centre, target) else {
            return false;
        };
        let distance = path_length(&path);
        if distance > transport.range {
            trace!(
                transport = transport_name.as_str(),
                part = edge.part.as_str(),
                distance,
                range = transport.range,
                "routing edge out of range"
            );
            return false;
        }
    }

    true
}

/// Cost of a placed plant: the sum, over every part flow and every
/// transport's visibility graph, of the obstacle-aware shortest-path
/// length between the flow's storage positions. `None` when any flow
/// endpoint is geometrically unreachable.
pub fn evaluate_plant(
    plant: &Plant<'_>,
    graph: &ProcessGraph,
    visibility: &PlantVisibility,
) -> Option<f64> {
    let mut total = 0.0;

    for (_, vis) in visibility.iter() {
        for edge in &graph.path_edges {
            let origin = storage_position(plant, graph, edge.origin)?;
            let destiny = storage_position(plant, graph, edge.destiny)?;
            let path = vis.shortest_path(origin, destiny).ok()?;
            total += path_length(&path);
        }
    }

    Some(total)
}
