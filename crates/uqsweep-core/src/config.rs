//! Sweep configuration: built-in scenario tables and the optional YAML sweep file.
//!
//! ```yaml
//! runner:
//!   program: ./run_atan
//!   args: ["--seed", "1"]
//! sparse_grid:
//!   uniform:
//!     gridType: [modPoly]
//!     level: [2]
//!     refinement: [null, simple]
//!     maxGridPoints: [1000, 3000]
//! pce:
//!   normal:
//!     sampler: [leja]
//!     expansion: [total_degree]
//!     max_num_samples: [3000]
//! ```
//!
//! Mapping order in the file is enumeration order. A missing table means no scenarios of
//! that kind.

use crate::errors::ConfigurationError;
use crate::model::{axis, ParamValue, SurrogateKind};
use crate::space::{ConfigSpace, ParameterSchema};
use anyhow::Context;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

const DISTRIBUTIONS: [&str; 2] = ["uniform", "normal"];
const GRID_TYPES: [&str; 4] = [
    "polyBoundary",
    "modPoly",
    "polyClenshawCurtisBoundary",
    "modPolyClenshawCurtis",
];
const REFINEMENTS: [&str; 5] = ["simple", "weighted", "squared", "var", "exp"];
const SAMPLERS: [&str; 3] = ["fekete", "leja", "gauss"];
const EXPANSIONS: [&str; 2] = ["full_tensor", "total_degree"];

/// `runner:` section of a sweep file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSection {
    #[serde(default)]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SweepFile {
    #[serde(default)]
    runner: RunnerSection,
    #[serde(default)]
    sparse_grid: Option<Mapping>,
    #[serde(default)]
    pce: Option<Mapping>,
}

/// Scenario spaces for both surrogate kinds plus runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub runner: RunnerSection,
    pub sparse_grid: ConfigSpace,
    pub pce: ConfigSpace,
}

impl SweepConfig {
    /// The atan benchmark tables: four grid types × six refinement settings for SG and
    /// three samplers × two expansions for PCE, over uniform and normal inputs.
    pub fn builtin() -> Self {
        builtin_tables().expect("builtin scenario tables are valid")
    }

    /// Load a sweep file from disk (YAML; JSON is accepted as a YAML subset).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("sweep file not found: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("invalid sweep file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigurationError> {
        let file: SweepFile =
            serde_yaml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        Ok(Self {
            runner: file.runner,
            sparse_grid: parse_space(SurrogateKind::SparseGrid, file.sparse_grid.as_ref())?,
            pce: parse_space(SurrogateKind::PolynomialChaosExpansion, file.pce.as_ref())?,
        })
    }

    pub fn space(&self, kind: SurrogateKind) -> &ConfigSpace {
        match kind {
            SurrogateKind::SparseGrid => &self.sparse_grid,
            SurrogateKind::PolynomialChaosExpansion => &self.pce,
        }
    }
}

fn builtin_tables() -> Result<SweepConfig, ConfigurationError> {
    let mut sparse_grid = ConfigSpace::new(SurrogateKind::SparseGrid);
    let mut pce = ConfigSpace::new(SurrogateKind::PolynomialChaosExpansion);
    for distribution in DISTRIBUTIONS {
        let mut refinements = vec![ParamValue::None];
        refinements.extend(REFINEMENTS.iter().map(|r| ParamValue::from(*r)));
        let sg = ParameterSchema::builder(SurrogateKind::SparseGrid)
            .axis(axis::GRID_TYPE, GRID_TYPES)
            .axis(axis::LEVEL, [2u64])
            .axis(axis::REFINEMENT, refinements)
            .budget([3000])
            .build(distribution)?;
        sparse_grid = sparse_grid.with_distribution(distribution, sg)?;

        let table = ParameterSchema::builder(SurrogateKind::PolynomialChaosExpansion)
            .axis(axis::SAMPLER, SAMPLERS)
            .axis(axis::EXPANSION, EXPANSIONS)
            .budget([3000])
            .build(distribution)?;
        pce = pce.with_distribution(distribution, table)?;
    }
    Ok(SweepConfig {
        runner: RunnerSection::default(),
        sparse_grid,
        pce,
    })
}

fn parse_space(
    kind: SurrogateKind,
    table: Option<&Mapping>,
) -> Result<ConfigSpace, ConfigurationError> {
    let mut space = ConfigSpace::new(kind);
    let Some(table) = table else {
        return Ok(space);
    };
    for (key, value) in table {
        let distribution = key_str(key)?;
        let axes = value.as_mapping().ok_or_else(|| {
            ConfigurationError::Parse(format!(
                "distribution '{}' must map parameter names to lists",
                distribution
            ))
        })?;
        let schema = parse_schema(kind, distribution, axes)?;
        space = space.with_distribution(distribution, schema)?;
    }
    Ok(space)
}

fn parse_schema(
    kind: SurrogateKind,
    distribution: &str,
    axes: &Mapping,
) -> Result<ParameterSchema, ConfigurationError> {
    let mut builder = ParameterSchema::builder(kind);
    let mut budget_seen = false;
    for (key, value) in axes {
        let name = key_str(key)?;
        if name == kind.budget_axis() {
            if budget_seen {
                return Err(ConfigurationError::DuplicateParameter {
                    name: name.to_string(),
                });
            }
            budget_seen = true;
            let budgets: Vec<u64> = serde_yaml::from_value(value.clone()).map_err(|_| {
                ConfigurationError::InvalidValue {
                    name: name.to_string(),
                    expected: "a list of positive integers",
                    found: describe(value),
                }
            })?;
            builder = builder.budget(budgets);
        } else {
            let candidates: Vec<ParamValue> =
                serde_yaml::from_value(value.clone()).map_err(|_| {
                    ConfigurationError::InvalidValue {
                        name: name.to_string(),
                        expected: "a list of strings, integers or nulls",
                        found: describe(value),
                    }
                })?;
            builder = builder.axis(name, candidates);
        }
    }
    builder.build(distribution)
}

fn key_str(key: &Value) -> Result<&str, ConfigurationError> {
    key.as_str().ok_or_else(|| {
        ConfigurationError::Parse(format!("expected a string key, got {}", describe(key)))
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string '{}'", s),
        Value::Sequence(_) => "a list with unsupported items".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(_) => "a tagged value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SWEEP: &str = r#"
runner:
  program: ./run_atan
  args: ["--seed", "1"]
sparse_grid:
  uniform:
    gridType: [modPoly]
    level: [2]
    refinement: [null, simple]
    maxGridPoints: [1000, 3000]
"#;

    #[test]
    fn builtin_tables_match_atan_benchmark() {
        let cfg = SweepConfig::builtin();
        assert_eq!(
            cfg.sparse_grid.distributions().collect::<Vec<_>>(),
            vec!["uniform", "normal"]
        );
        assert_eq!(cfg.sparse_grid.scenario_count(), 2 * 4 * 6);
        assert_eq!(cfg.pce.scenario_count(), 2 * 3 * 2);
        let (first, budget) = cfg.sparse_grid.scenarios().next().unwrap();
        assert_eq!(first.to_string(), "uniform, polyBoundary, 2, None");
        assert_eq!(budget.values(), &[3000]);
    }

    #[test]
    fn sweep_file_keeps_declared_order_and_missing_tables_are_empty() {
        let cfg = SweepConfig::from_yaml_str(SWEEP).unwrap();
        assert_eq!(cfg.runner.program, Some(PathBuf::from("./run_atan")));
        assert_eq!(cfg.runner.args, vec!["--seed", "1"]);
        assert_eq!(cfg.sparse_grid.scenario_count(), 2);
        assert!(cfg.pce.is_empty());
        let budgets: Vec<_> = cfg
            .sparse_grid
            .scenarios()
            .map(|(_, b)| b.values().to_vec())
            .collect();
        assert_eq!(budgets, vec![vec![1000, 3000], vec![1000, 3000]]);
    }

    #[test]
    fn json_is_accepted() {
        let json = r#"{"pce": {"normal": {"sampler": ["leja"], "expansion": ["total_degree"], "max_num_samples": [10, 20]}}}"#;
        let cfg = SweepConfig::from_yaml_str(json).unwrap();
        assert_eq!(cfg.pce.scenario_count(), 1);
        assert!(cfg.sparse_grid.is_empty());
    }

    #[test]
    fn unknown_section_and_parameter_rejected() {
        let err = SweepConfig::from_yaml_str("plots: {}").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));

        let err = SweepConfig::from_yaml_str(
            "pce:\n  uniform:\n    sampler: [leja]\n    expansion: [x]\n    level: [1]\n    max_num_samples: [1]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownParameter { .. }));
    }

    #[test]
    fn negative_budget_rejected() {
        let err = SweepConfig::from_yaml_str(
            "pce:\n  uniform:\n    sampler: [leja]\n    expansion: [x]\n    max_num_samples: [-5]\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'max_num_samples' expects a list of positive integers, got a list with unsupported items"
        );
    }

    #[test]
    fn mistyped_candidate_rejected_at_load() {
        let err = SweepConfig::from_yaml_str(
            "sparse_grid:\n  uniform:\n    gridType: [modPoly]\n    level: [2]\n    refinement: [simple, 5]\n    maxGridPoints: [3000]\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'refinement' expects null or a strategy name, got integer 5"
        );

        let err = SweepConfig::from_yaml_str(
            "pce:\n  normal:\n    sampler: [leja]\n    expansion: [null]\n    max_num_samples: [10]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn load_reads_file_and_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SWEEP.as_bytes()).unwrap();
        let cfg = SweepConfig::load(file.path()).unwrap();
        assert_eq!(cfg.sparse_grid.scenario_count(), 2);

        let err = SweepConfig::load(Path::new("/nonexistent/sweep.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("sweep file not found"));
    }
}
