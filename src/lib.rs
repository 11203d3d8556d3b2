/*!
# Plant Layout Engine

Search engine for two-dimensional layouts of small manufacturing
plants. Given a specification of station models (storage slots,
transport capability, manufacturing activities, obstacle polygons) and
a production goal, the engine enumerates grid placements, filters the
geometrically feasible ones, and ranks them by obstacle-aware
shortest-path distances between storage positions.

## Modules

- `geometry` - vectors, polygons, polygon union, visibility graphs
- `model` - the specification data model
- `plant` - the placement grid and per-transport visibility graphs
- `process` - the manufacturing process graph (routing and part flows)
- `search` - the configuration tree, evaluator and best-layout search
- `config` - engine configuration
- `sampling` - random plant construction for experiments

Parsing specification documents, serving the engine over a network and
rendering layouts are collaborator concerns and live outside this
crate.
*/

pub mod config;
pub mod geometry;
pub mod model;
pub mod plant;
pub mod process;
pub mod sampling;
pub mod search;

pub use config::{Config, ConfigError, GeometryConfig, SearchConfig};
pub use geometry::{Point, Polygon, Vector, VisibilityGraph};
pub use model::{Cell, Specification, SpecificationError, INOUT_STATION};
pub use plant::{PlacementError, Plant, PlantVisibility};
pub use process::ProcessGraph;
pub use search::{
    BestLayout, LayoutSearch, LogReporter, NullReporter, SearchError, SearchOutcome,
    SearchReporter, SearchStats,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validate a specification, derive its process graph and run the full
/// layout search with log reporting.
pub fn search_layout(
    spec: &Specification,
    config: &Config,
) -> Result<SearchOutcome, SearchError> {
    let graph = ProcessGraph::build(spec);
    LayoutSearch::new(spec, &graph, config)?.run(&mut LogReporter)
}
