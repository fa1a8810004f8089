use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate model family. Selects the parameter schema and the runner entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurrogateKind {
    SparseGrid,
    PolynomialChaosExpansion,
}

impl SurrogateKind {
    /// Short name used on the command line and in runner argv.
    pub fn short_name(self) -> &'static str {
        match self {
            SurrogateKind::SparseGrid => "sg",
            SurrogateKind::PolynomialChaosExpansion => "pce",
        }
    }

    /// Ordered non-budget axes of the kind's schema.
    pub fn scenario_axes(self) -> &'static [&'static str] {
        match self {
            SurrogateKind::SparseGrid => &[axis::GRID_TYPE, axis::LEVEL, axis::REFINEMENT],
            SurrogateKind::PolynomialChaosExpansion => &[axis::SAMPLER, axis::EXPANSION],
        }
    }

    /// Name of the budget axis.
    pub fn budget_axis(self) -> &'static str {
        match self {
            SurrogateKind::SparseGrid => axis::MAX_GRID_POINTS,
            SurrogateKind::PolynomialChaosExpansion => axis::MAX_NUM_SAMPLES,
        }
    }
}

impl fmt::Display for SurrogateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Parameter names as they appear in scenario tables.
pub mod axis {
    pub const GRID_TYPE: &str = "gridType";
    pub const LEVEL: &str = "level";
    pub const REFINEMENT: &str = "refinement";
    pub const MAX_GRID_POINTS: &str = "maxGridPoints";
    pub const SAMPLER: &str = "sampler";
    pub const EXPANSION: &str = "expansion";
    pub const MAX_NUM_SAMPLES: &str = "max_num_samples";
}

/// One candidate value of a scenario axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    None,
    Int(u64),
    Str(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn type_label(&self) -> String {
        match self {
            ParamValue::None => "null".to_string(),
            ParamValue::Int(n) => format!("integer {}", n),
            ParamValue::Str(s) => format!("string '{}'", s),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => f.write_str("None"),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        ParamValue::Int(n)
    }
}

/// Adaptive refinement strategy of a sparse-grid scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefinementSetting {
    None,
    Named(String),
}

impl RefinementSetting {
    pub fn is_adaptive(&self) -> bool {
        matches!(self, RefinementSetting::Named(_))
    }

    /// Label passed to runners; `none` for the non-adaptive setting.
    pub fn label(&self) -> &str {
        match self {
            RefinementSetting::None => "none",
            RefinementSetting::Named(name) => name,
        }
    }

    pub fn from_value(value: &ParamValue) -> Result<Self, ConfigurationError> {
        match value {
            ParamValue::None => Ok(RefinementSetting::None),
            ParamValue::Str(s) if s.eq_ignore_ascii_case("none") => Ok(RefinementSetting::None),
            ParamValue::Str(s) if !s.trim().is_empty() => Ok(RefinementSetting::Named(s.clone())),
            other => Err(invalid(axis::REFINEMENT, "null or a strategy name", other)),
        }
    }
}

/// One concrete value assignment for every scenario axis of one kind and distribution.
///
/// Parameters keep their declared axis order. Scenarios are never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub kind: SurrogateKind,
    pub distribution: String,
    pub params: Vec<(String, ParamValue)>,
}

impl Scenario {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn require(&self, name: &str) -> Result<&ParamValue, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::MissingParameter {
                kind: self.kind.to_string(),
                distribution: self.distribution.clone(),
                name: name.to_string(),
            })
    }

    fn require_str(&self, name: &str) -> Result<String, ConfigurationError> {
        let value = self.require(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid(name, "a string", value))
    }

    /// Refinement setting; PCE scenarios have none.
    pub fn refinement(&self) -> Result<RefinementSetting, ConfigurationError> {
        match self.kind {
            SurrogateKind::SparseGrid => {
                RefinementSetting::from_value(self.require(axis::REFINEMENT)?)
            }
            SurrogateKind::PolynomialChaosExpansion => Ok(RefinementSetting::None),
        }
    }

    pub fn sparse_grid(&self) -> Result<SparseGridParams, ConfigurationError> {
        let level = self.require(axis::LEVEL)?;
        Ok(SparseGridParams {
            grid_type: self.require_str(axis::GRID_TYPE)?,
            level: level
                .as_u64()
                .ok_or_else(|| invalid(axis::LEVEL, "an integer", level))?,
            refinement: self.refinement()?,
        })
    }

    pub fn pce(&self) -> Result<PceParams, ConfigurationError> {
        Ok(PceParams {
            sampler: self.require_str(axis::SAMPLER)?,
            expansion: self.require_str(axis::EXPANSION)?,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.distribution)?;
        for (_, value) in &self.params {
            write!(f, ", {}", value)?;
        }
        Ok(())
    }
}

/// Typed view of a sparse-grid scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseGridParams {
    pub grid_type: String,
    pub level: u64,
    pub refinement: RefinementSetting,
}

/// Typed view of a polynomial-chaos scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PceParams {
    pub sampler: String,
    pub expansion: String,
}

/// Sweep-wide flags forwarded to every runner invocation.
///
/// `full` and `reduced` are opaque: the harness never validates them against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub full: bool,
    pub reduced: bool,
    pub write_out: bool,
    pub plot: bool,
}

/// Typed arguments of one runner entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    /// `run_atan_sg(distribution, gridType, maxGridPoints, level, isFull, refinement, writeOut)`
    SparseGrid {
        distribution: String,
        grid_type: String,
        max_grid_points: u64,
        level: u64,
        is_full: bool,
        refinement: RefinementSetting,
        write_out: bool,
    },
    /// `run_atan_pce(distribution, sampler, expansion, max_num_samples, writeOut)`
    PolynomialChaos {
        distribution: String,
        sampler: String,
        expansion: String,
        max_num_samples: u64,
        write_out: bool,
    },
}

/// Everything needed for one runner invocation.
///
/// Construction validates the scenario against its kind, so a request always maps to a
/// well-typed [`RunnerCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    index: usize,
    scenario: Scenario,
    budget: u64,
    options: RunOptions,
    call: RunnerCall,
}

impl RunRequest {
    pub fn new(
        index: usize,
        scenario: Scenario,
        budget: u64,
        options: RunOptions,
    ) -> Result<Self, ConfigurationError> {
        let distribution = scenario.distribution.clone();
        let call = match scenario.kind {
            SurrogateKind::SparseGrid => {
                let sg = scenario.sparse_grid()?;
                RunnerCall::SparseGrid {
                    distribution,
                    grid_type: sg.grid_type,
                    max_grid_points: budget,
                    level: sg.level,
                    is_full: options.full,
                    refinement: sg.refinement,
                    write_out: options.write_out,
                }
            }
            SurrogateKind::PolynomialChaosExpansion => {
                let pce = scenario.pce()?;
                RunnerCall::PolynomialChaos {
                    distribution,
                    sampler: pce.sampler,
                    expansion: pce.expansion,
                    max_num_samples: budget,
                    write_out: options.write_out,
                }
            }
        };
        Ok(Self {
            index,
            scenario,
            budget,
            options,
            call,
        })
    }

    /// 0-based position in dispatch order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> SurrogateKind {
        self.scenario.kind
    }

    pub fn distribution(&self) -> &str {
        &self.scenario.distribution
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    pub fn call(&self) -> &RunnerCall {
        &self.call
    }

    /// Scenario banner text, e.g. `(uniform, modPoly, 2, simple, 3000)`.
    pub fn label(&self) -> String {
        format!("({}, {})", self.scenario, self.budget)
    }
}

/// Type check for one candidate of a scenario axis.
pub(crate) fn check_candidate(name: &str, value: &ParamValue) -> Result<(), ConfigurationError> {
    match name {
        axis::REFINEMENT => RefinementSetting::from_value(value).map(|_| ()),
        axis::LEVEL => match value {
            ParamValue::Int(_) => Ok(()),
            other => Err(invalid(name, "an integer", other)),
        },
        _ => match value {
            ParamValue::Str(_) => Ok(()),
            other => Err(invalid(name, "a string", other)),
        },
    }
}

fn invalid(name: &str, expected: &'static str, found: &ParamValue) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        name: name.to_string(),
        expected,
        found: found.type_label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sg_scenario(refinement: ParamValue) -> Scenario {
        Scenario {
            kind: SurrogateKind::SparseGrid,
            distribution: "uniform".into(),
            params: vec![
                (axis::GRID_TYPE.into(), "modPoly".into()),
                (axis::LEVEL.into(), 2u64.into()),
                (axis::REFINEMENT.into(), refinement),
            ],
        }
    }

    #[test]
    fn refinement_null_and_none_string_are_non_adaptive() {
        assert_eq!(
            RefinementSetting::from_value(&ParamValue::None).unwrap(),
            RefinementSetting::None
        );
        assert_eq!(
            RefinementSetting::from_value(&"None".into()).unwrap(),
            RefinementSetting::None
        );
        let named = RefinementSetting::from_value(&"weighted".into()).unwrap();
        assert!(named.is_adaptive());
        assert_eq!(named.label(), "weighted");
    }

    #[test]
    fn refinement_rejects_integers() {
        let err = RefinementSetting::from_value(&ParamValue::Int(1)).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn sparse_grid_view_extracts_typed_fields() {
        let params = sg_scenario("simple".into()).sparse_grid().unwrap();
        assert_eq!(params.grid_type, "modPoly");
        assert_eq!(params.level, 2);
        assert_eq!(params.refinement, RefinementSetting::Named("simple".into()));
    }

    #[test]
    fn sparse_grid_view_rejects_string_level() {
        let mut scenario = sg_scenario(ParamValue::None);
        scenario.params[1].1 = "two".into();
        let err = scenario.sparse_grid().unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'level' expects an integer, got string 'two'"
        );
    }

    #[test]
    fn pce_scenarios_have_no_refinement() {
        let scenario = Scenario {
            kind: SurrogateKind::PolynomialChaosExpansion,
            distribution: "normal".into(),
            params: vec![
                (axis::SAMPLER.into(), "leja".into()),
                (axis::EXPANSION.into(), "total_degree".into()),
            ],
        };
        assert_eq!(scenario.refinement().unwrap(), RefinementSetting::None);
        assert_eq!(scenario.pce().unwrap().sampler, "leja");
    }

    #[test]
    fn label_matches_banner_format() {
        let request =
            RunRequest::new(0, sg_scenario(ParamValue::None), 3000, RunOptions::default())
                .unwrap();
        assert_eq!(request.label(), "(uniform, modPoly, 2, None, 3000)");
    }

    #[test]
    fn request_maps_scenario_to_sparse_grid_call() {
        let options = RunOptions {
            full: true,
            write_out: true,
            ..RunOptions::default()
        };
        let request = RunRequest::new(4, sg_scenario("var".into()), 1000, options).unwrap();
        assert_eq!(
            request.call(),
            &RunnerCall::SparseGrid {
                distribution: "uniform".into(),
                grid_type: "modPoly".into(),
                max_grid_points: 1000,
                level: 2,
                is_full: true,
                refinement: RefinementSetting::Named("var".into()),
                write_out: true,
            }
        );
    }

    #[test]
    fn request_rejects_invalid_scenario() {
        let mut scenario = sg_scenario(ParamValue::None);
        scenario.params.remove(0);
        let err = RunRequest::new(0, scenario, 10, RunOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingParameter { .. }));
    }

    #[test]
    fn param_value_deserializes_untagged() {
        let values: Vec<ParamValue> = serde_yaml::from_str("[null, 3000, simple]").unwrap();
        assert_eq!(
            values,
            vec![ParamValue::None, ParamValue::Int(3000), "simple".into()]
        );
    }
}
