/*!
Engine configuration: search behaviour and geometry tunables.
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GridParams;

/// Default distance by which hidden silhouette edges are pushed away
/// from a transport. Inherited from the reference plant geometry; any
/// value comfortably above the cell extents works.
pub const DEFAULT_OBSTACLE_INFLATION: f64 = 20.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("obstacle inflation {inflation} must exceed the largest cell extent {extent}")]
    InflationTooSmall { inflation: f64, extent: f64 },

    #[error("obstacle inflation must be a finite number")]
    InflationNotFinite,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub geometry: GeometryConfig,
}

/// Search behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Evaluate leaves on the rayon thread pool. The selected best
    /// layout is identical either way.
    #[serde(default)]
    pub parallel_evaluation: bool,
}

/// Geometry tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Distance by which invisible polygon edges are extruded when
    /// building a transport's visibility graph.
    pub obstacle_inflation: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            obstacle_inflation: DEFAULT_OBSTACLE_INFLATION,
        }
    }
}

impl Config {
    /// Check the configuration against the grid it will be used with.
    /// The inflation distance must exceed the cell extents, otherwise
    /// extruded vertices could land inside neighbouring cells and
    /// leave hidden regions traversable.
    pub fn validate(&self, grid: &GridParams) -> Result<(), ConfigError> {
        let inflation = self.geometry.obstacle_inflation;
        if !inflation.is_finite() {
            return Err(ConfigError::InflationNotFinite);
        }

        let extent = grid.measures.x.max(grid.measures.y);
        if inflation <= extent {
            return Err(ConfigError::InflationTooSmall { inflation, extent });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;

    fn grid() -> GridParams {
        GridParams {
            size: Vector::new(5, 5),
            measures: Vector::new(0.8, 0.8),
        }
    }

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(Config::default().validate(&grid()), Ok(()));
    }

    #[test]
    fn inflation_below_cell_extent_is_rejected() {
        let mut config = Config::default();
        config.geometry.obstacle_inflation = 0.5;

        assert_eq!(
            config.validate(&grid()),
            Err(ConfigError::InflationTooSmall {
                inflation: 0.5,
                extent: 0.8
            })
        );
    }

    #[test]
    fn non_finite_inflation_is_rejected() {
        let mut config = Config::default();
        config.geometry.obstacle_inflation = f64::NAN;

        assert_eq!(config.validate(&grid()), Err(ConfigError::InflationNotFinite));
    }
}
