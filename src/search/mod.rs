/*!
The configuration search: build a tree of partial placements, prune
infeasible branches, and keep the cheapest feasible layout.

The tree is built depth first. Before a candidate placement is linked
in, the configuration it induces is canonicalised and checked against
every configuration seen so far, so equivalent orderings are expanded
only once. Leaves are then evaluated (feasibility and cost), infeasible
branches are unlinked bottom-up, and the best leaf is selected by
strict cost comparison in discovery order, which makes the result
deterministic even with parallel evaluation enabled.
*/

mod evaluator;
mod reporter;
mod stats;
mod tree;

pub use evaluator::{check_configuration, evaluate_plant, storage_position};
pub use reporter::{LogReporter, NullReporter, SearchReporter};
pub use stats::SearchStats;
pub use tree::{NodeId, SearchTree, TreeNode};

use std::collections::BTreeMap;

use ahash::AHashSet;
use hashbrown::HashMap;
use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::model::{Cell, Specification, SpecificationError, INOUT_STATION};
use crate::plant::{Plant, PlacementError, PlantVisibility};
use crate::process::ProcessGraph;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Specification(#[from] SpecificationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// The cheapest feasible layout found by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct BestLayout {
    /// Station name to grid cell.
    pub placements: BTreeMap<String, Cell>,
    pub cost: f64,
    pub canonical: String,
}

/// Result of a completed search. `best` is `None` when no feasible
/// layout exists; that is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Option<BestLayout>,
    pub stats: SearchStats,
}

/// One layout search over a specification and its process graph.
pub struct LayoutSearch<'a> {
    spec: &'a Specification,
    graph: &'a ProcessGraph,
    config: &'a Config,
    tree: SearchTree,
    configs_seen: AHashSet<String>,
    stats: SearchStats,
}

impl<'a> LayoutSearch<'a> {
    /// Validate the inputs and seed the tree with the InOut station at
    /// its reserved cell.
    pub fn new(
        spec: &'a Specification,
        graph: &'a ProcessGraph,
        config: &'a Config,
    ) -> Result<Self, SearchError> {
        spec.validate()?;
        config.validate(spec.grid())?;

        let root_cell = spec.grid().inout_cell();
        let tree = SearchTree::with_root(INOUT_STATION, root_cell);

        let mut configs_seen = AHashSet::new();
        configs_seen.insert(format!(
            "{}({},{})",
            INOUT_STATION, root_cell.x, root_cell.y
        ));

        Ok(Self {
            spec,
            graph,
            config,
            tree,
            configs_seen,
            stats: SearchStats {
                nodes_created: 1,
                ..SearchStats::default()
            },
        })
    }

    /// Run the search to completion: expansion, pruning, selection.
    pub fn run(mut self, reporter: &mut dyn SearchReporter) -> Result<SearchOutcome, SearchError> {
        info!(
            stations = self.spec.stations.models.len(),
            routing_edges = self.graph.routing_edges.len(),
            path_edges = self.graph.path_edges.len(),
            "starting layout search"
        );

        self.expand(SearchTree::ROOT)?;
        info!(
            nodes = self.tree.len(),
            leaves = self.tree.leaf_count(),
            duplicates_skipped = self.stats.duplicates_skipped,
            "configuration tree built"
        );

        let evaluated = self.evaluate_leaves()?;

        let costs: HashMap<NodeId, Option<f64>> = evaluated.iter().copied().collect();
        Self::prune_node(&mut self.tree, SearchTree::ROOT, &costs);

        let best = self.select(&evaluated, reporter);
        reporter.search_complete(&self.stats);

        Ok(SearchOutcome {
            best,
            stats: self.stats,
        })
    }

    /// The tree of placements. Pruned after [`run`]; mainly useful for
    /// inspection and tests.
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Rebuild the plant a node's ancestry describes.
    fn plant_for(&self, node: NodeId) -> Result<Plant<'a>, PlacementError> {
        let mut plant = Plant::new(self.spec);
        for step in self.tree.ancestry(node) {
            plant.place(&step.station, step.cell)?;
        }
        Ok(plant)
    }

    fn expand(&mut self, node: NodeId) -> Result<(), PlacementError> {
        let plant = self.plant_for(node)?;
        let candidates = plant.adjacent_empty_cells();
        let unused: Vec<&str> = plant.unused_stations().collect();

        if candidates.is_empty() || unused.is_empty() {
            self.tree.mark_terminal(node);
            return Ok(());
        }

        let base = plant.canonical_set();
        for cell in candidates {
            for &station in &unused {
                let mut fragments = base.clone();
                fragments.insert(format!("{}({},{})", station, cell.x, cell.y));
                let canonical: String = fragments.into_iter().collect();

                if !self.configs_seen.insert(canonical) {
                    self.stats.duplicates_skipped += 1;
                    continue;
                }

                let child = self.tree.add_child(node, station, cell);
                self.stats.nodes_created += 1;
                self.expand(child)?;
            }
        }

        Ok(())
    }

    /// Feasibility and cost per reachable leaf, in depth-first
    /// discovery order. Infeasible leaves evaluate to `None`.
    fn evaluate_leaves(&self) -> Result<Vec<(NodeId, Option<f64>)>, PlacementError> {
        let leaves = self.tree.reachable_leaves();
        let inflation = self.config.geometry.obstacle_inflation;

        let evaluate = |&id: &NodeId| -> Result<(NodeId, Option<f64>), PlacementError> {
            let plant = self.plant_for(id)?;
            let visibility = PlantVisibility::build(&plant, inflation);
            let cost = if check_configuration(&plant, self.graph, &visibility) {
                evaluate_plant(&plant, self.graph, &visibility)
            } else {
                None
            };
            Ok((id, cost))
        };

        if self.config.search.parallel_evaluation {
            leaves.par_iter().map(evaluate).collect()
        } else {
            leaves.iter().map(evaluate).collect()
        }
    }

    /// Bottom-up prune: a subtree survives only if some leaf below it
    /// is feasible.
    fn prune_node(
        tree: &mut SearchTree,
        id: NodeId,
        costs: &HashMap<NodeId, Option<f64>>,
    ) -> bool {
        if tree.node(id).terminal {
            return matches!(costs.get(&id), Some(Some(_)));
        }

        let children: Vec<NodeId> = tree.node(id).children.to_vec();
        let mut any_feasible = false;
        for child in children {
            if Self::prune_node(tree, child, costs) {
                any_feasible = true;
            } else {
                tree.unlink(child);
            }
        }
        any_feasible
    }

    /// Scan leaves in discovery order and keep the strictly cheapest
    /// feasible one, so equal-cost layouts resolve to the first found.
    fn select(
        &mut self,
        evaluated: &[(NodeId, Option<f64>)],
        reporter: &mut dyn SearchReporter,
    ) -> Option<BestLayout> {
        let mut best: Option<(NodeId, f64)> = None;

        for &(id, cost) in evaluated {
            self.stats.configurations_total += 1;
            let canonical = self.canonical_for(id);
            reporter.leaf_evaluated(&canonical, cost);

            let Some(cost) = cost else { continue };
            self.stats.configurations_valid += 1;

            if best.map_or(true, |(_, current)| cost < current) {
                best = Some((id, cost));
                self.stats.best_updates += 1;
                reporter.best_updated(&canonical, cost);
            }
        }

        best.map(|(id, cost)| {
            let placements: BTreeMap<String, Cell> = self
                .tree
                .ancestry(id)
                .map(|node| (node.station.clone(), node.cell))
                .collect();
            BestLayout {
                placements,
                cost,
                canonical: self.canonical_for(id),
            }
        })
    }

    fn canonical_for(&self, node: NodeId) -> String {
        let fragments: std::collections::BTreeSet<String> = self
            .tree
            .ancestry(node)
            .map(|step| format!("{}({},{})", step.station, step.cell.x, step.cell.y))
            .collect();
        fragments.into_iter().collect()
    }
}
