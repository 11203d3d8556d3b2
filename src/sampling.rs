/*!
Random plant construction. A debugging and benchmarking aid, not part
of the layout search itself.
*/

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::model::{Specification, INOUT_STATION};
use crate::plant::{PlacementError, Plant};

/// Fill a plant by repeatedly placing a random unused station on a
/// random adjacency candidate, starting from InOut at its reserved
/// cell. Deterministic for a given seed.
pub fn random_plant(spec: &Specification, seed: u64) -> Result<Plant<'_>, PlacementError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut plant = Plant::new(spec);
    plant.place(INOUT_STATION, spec.grid().inout_cell())?;

    let mut remaining: Vec<&str> = plant.unused_stations().collect();

    while !remaining.is_empty() {
        let candidates = plant.adjacent_empty_cells();
        if candidates.is_empty() {
            warn!(
                unplaced = remaining.len(),
                "no adjacency candidates left, returning a partial plant"
            );
            break;
        }

        let cell = candidates[rng.gen_range(0..candidates.len())];
        let station = remaining.swap_remove(rng.gen_range(0..remaining.len()));
        plant.place(station, cell)?;
    }

    Ok(plant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::model::{GridParams, StationModel, Stations};
    use std::collections::BTreeMap;

    fn spec() -> Specification {
        let mut models = BTreeMap::new();
        for name in [INOUT_STATION, "A", "B", "C", "D"] {
            models.insert(
                name.to_string(),
                StationModel {
                    storages: None,
                    transport: None,
                    activities: None,
                    obstacles: None,
                },
            );
        }

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
    fn seeded_sampling_places_every_station() {
        let spec = spec();
        let plant = random_plant(&spec, 7).unwrap();

        assert!(plant.is_complete());
        assert_eq!(
            plant.station_cell(INOUT_STATION),
            Some(spec.grid().inout_cell())
        );
    }

    #[test]
    fn same_seed_reproduces_the_same_plant() {
        let spec = spec();
        let first = random_plant(&spec, 42).unwrap();
        let second = random_plant(&spec, 42).unwrap();

        assert_eq!(first.canonical_string(), second.canonical_string());
    }
}
