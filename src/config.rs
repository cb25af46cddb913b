//! Simulation parameters and their validation
//!
//! Defaults follow the last revision of the tool: a unit canvas, 500
//! iterations, `c1 = 3e-3` and `c2 = 3e-2`. A config file (YAML or JSON) may
//! override any subset of fields; missing fields keep their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boundary::BoundaryShape;

/// Default iteration budget
pub const DEFAULT_ITERATIONS: usize = 500;

/// Default number of steps between observer callbacks
pub const DEFAULT_REFRESH_INTERVAL: usize = 1;

/// Default repulsion coefficient (c1)
pub const DEFAULT_REPULSION: f64 = 3e-3;

/// Default attraction coefficient (c2)
pub const DEFAULT_ATTRACTION: f64 = 3e-2;

/// Default canvas extent, in layout units
pub const DEFAULT_CANVAS_SIZE: f64 = 1.0;

/// Invalid simulation setup. Fatal before the first step runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The graph has no nodes, so the ideal edge length is undefined
    #[error("graph has no nodes; at least one node is required")]
    EmptyGraph,

    #[error("canvas must have positive finite dimensions, got {width} x {height}")]
    NonPositiveCanvas { width: f64, height: f64 },

    #[error("{name} coefficient must be finite, got {value}")]
    NonFiniteCoefficient { name: &'static str, value: f64 },

    #[error("{name} coefficient must not be negative, got {value}")]
    NegativeCoefficient { name: &'static str, value: f64 },

    /// Supplied positions don't line up with the graph's nodes
    #[error("expected {expected} position(s), one per node, got {found}")]
    PositionCountMismatch { expected: usize, found: usize },

    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid YAML config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported config file extension: {0} (expected .yaml, .yml or .json)")]
    UnsupportedExtension(String),
}

/// Immutable parameters of one layout run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of steps to run
    pub iterations: usize,

    /// Steps between observer callbacks; 0 disables all but the final one
    pub refresh_interval: usize,

    /// Repulsion coefficient (c1)
    pub repulsion: f64,

    /// Attraction coefficient (c2)
    pub attraction: f64,

    pub canvas_width: f64,

    pub canvas_height: f64,

    /// Containment shape applied after every move
    pub boundary: BoundaryShape,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            repulsion: DEFAULT_REPULSION,
            attraction: DEFAULT_ATTRACTION,
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            boundary: BoundaryShape::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a config file, choosing the decoder by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let read = || {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        };

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&read()?).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            "json" => serde_json::from_str(&read()?).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(ConfigError::UnsupportedExtension(path.display().to_string())),
        }
    }

    /// Check the parameters that do not depend on the graph
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::NonPositiveCanvas { width, height });
        }

        for (name, value) in [("repulsion", self.repulsion), ("attraction", self.attraction)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteCoefficient { name, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeCoefficient { name, value });
            }
        }

        Ok(())
    }

    pub fn canvas_area(&self) -> f64 {
        self.canvas_width * self.canvas_height
    }

    /// Starting temperature: a tenth of the canvas width
    pub fn initial_temperature(&self) -> f64 {
        self.canvas_width / 10.0
    }

    /// Per-step cooling, chosen so the temperature would reach zero one step
    /// after the last
    pub fn cooling_step(&self) -> f64 {
        self.initial_temperature() / (self.iterations as f64 + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.iterations, 500);
        assert_eq!(config.refresh_interval, 1);
        assert_eq!(config.boundary, BoundaryShape::Rectangle);
    }

    #[test]
    fn derived_temperature_constants() {
        let config = SimulationConfig {
            canvas_width: 2.0,
            iterations: 9,
            ..Default::default()
        };

        assert!((config.initial_temperature() - 0.2).abs() < 1e-12);
        assert!((config.cooling_step() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let config = SimulationConfig {
            canvas_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCanvas { .. })
        ));

        let config = SimulationConfig {
            canvas_width: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveCanvas { .. })
        ));
    }

    #[test]
    fn rejects_bad_coefficients() {
        let config = SimulationConfig {
            repulsion: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteCoefficient {
                name: "repulsion",
                ..
            })
        ));

        let config = SimulationConfig {
            attraction: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeCoefficient {
                name: "attraction",
                ..
            })
        ));
    }

    #[test]
    fn loads_partial_yaml_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        fs::write(&path, "iterations: 50\nboundary: ellipse\nrepulsion: 0.01\n").unwrap();

        let config = SimulationConfig::load(&path).unwrap();

        assert_eq!(config.iterations, 50);
        assert_eq!(config.boundary, BoundaryShape::Ellipse);
        assert_eq!(config.repulsion, 0.01);
        assert_eq!(config.attraction, DEFAULT_ATTRACTION);
    }

    #[test]
    fn loads_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"canvas_width": 800, "canvas_height": 600}"#).unwrap();

        let config = SimulationConfig::load(&path).unwrap();

        assert_eq!(config.canvas_width, 800.0);
        assert_eq!(config.canvas_height, 600.0);
    }

    #[test]
    fn negative_iterations_fail_to_decode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.yml");
        fs::write(&path, "iterations: -3\n").unwrap();

        assert!(matches!(
            SimulationConfig::load(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"iters": 10}"#).unwrap();

        assert!(matches!(
            SimulationConfig::load(&path),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn unsupported_extension() {
        assert!(matches!(
            SimulationConfig::load(Path::new("layout.toml")),
            Err(ConfigError::UnsupportedExtension(_))
        ));
    }
}
