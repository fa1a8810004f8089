//! Scenario spaces: ordered parameter axes and their Cartesian product.
//!
//! Enumeration order is nested iteration over the declared axes, first axis outermost, each
//! axis walked in declared candidate order. Sparse-grid and PCE spaces are separate
//! [`ConfigSpace`] values and are never merged.

use crate::budget::BudgetList;
use crate::errors::ConfigurationError;
use crate::model::{check_candidate, ParamValue, Scenario, SurrogateKind};
use std::collections::HashSet;

/// One parameter and its candidate values, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub name: String,
    pub candidates: Vec<ParamValue>,
}

/// Validated axes plus the budget list for one kind and distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSchema {
    kind: SurrogateKind,
    axes: Vec<Axis>,
    budget: BudgetList,
}

impl ParameterSchema {
    pub fn builder(kind: SurrogateKind) -> SchemaBuilder {
        SchemaBuilder::new(kind)
    }

    pub fn kind(&self) -> SurrogateKind {
        self.kind
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn budget(&self) -> &BudgetList {
        &self.budget
    }

    /// Product of the axis cardinalities.
    pub fn scenario_count(&self) -> usize {
        self.axes.iter().map(|a| a.candidates.len()).product()
    }

    /// Lazily enumerate every scenario of this schema for `distribution`.
    pub fn scenarios<'a>(&'a self, distribution: &'a str) -> Scenarios<'a> {
        Scenarios {
            schema: self,
            distribution,
            cursor: vec![0; self.axes.len()],
            remaining: self.scenario_count(),
        }
    }
}

/// Builder for [`ParameterSchema`]. Axes keep the order in which they are added.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    kind: SurrogateKind,
    axes: Vec<Axis>,
    budget: Option<Vec<u64>>,
}

impl SchemaBuilder {
    pub fn new(kind: SurrogateKind) -> Self {
        Self {
            kind,
            axes: Vec::new(),
            budget: None,
        }
    }

    pub fn axis<I, V>(mut self, name: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.axes.push(Axis {
            name: name.to_string(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn budget<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.budget = Some(values.into_iter().collect());
        self
    }

    pub fn build(self, distribution: &str) -> Result<ParameterSchema, ConfigurationError> {
        let allowed = self.kind.scenario_axes();
        let mut seen = HashSet::new();
        for axis in &self.axes {
            if !allowed.contains(&axis.name.as_str()) {
                return Err(ConfigurationError::UnknownParameter {
                    kind: self.kind.to_string(),
                    name: axis.name.clone(),
                });
            }
            if !seen.insert(axis.name.as_str()) {
                return Err(ConfigurationError::DuplicateParameter {
                    name: axis.name.clone(),
                });
            }
            if axis.candidates.is_empty() {
                return Err(ConfigurationError::EmptyCandidates {
                    name: axis.name.clone(),
                });
            }
            for value in &axis.candidates {
                check_candidate(&axis.name, value)?;
            }
        }
        let missing = |name: &str| ConfigurationError::MissingParameter {
            kind: self.kind.to_string(),
            distribution: distribution.to_string(),
            name: name.to_string(),
        };
        if let Some(name) = allowed.iter().find(|name| !seen.contains(**name)) {
            return Err(missing(name));
        }
        let budget_name = self.kind.budget_axis();
        let values = self.budget.clone().ok_or_else(|| missing(budget_name))?;
        let budget = BudgetList::new(budget_name, values)?;

        Ok(ParameterSchema {
            kind: self.kind,
            axes: self.axes,
            budget,
        })
    }
}

/// Lazy Cartesian product over a schema's axes (odometer order, last axis fastest).
#[derive(Debug, Clone)]
pub struct Scenarios<'a> {
    schema: &'a ParameterSchema,
    distribution: &'a str,
    cursor: Vec<usize>,
    remaining: usize,
}

impl Iterator for Scenarios<'_> {
    type Item = Scenario;

    fn next(&mut self) -> Option<Scenario> {
        if self.remaining == 0 {
            return None;
        }
        let axes = &self.schema.axes;
        let params = axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &i)| (axis.name.clone(), axis.candidates[i].clone()))
            .collect();
        self.remaining -= 1;

        for (slot, axis) in self.cursor.iter_mut().zip(axes).rev() {
            *slot += 1;
            if *slot < axis.candidates.len() {
                break;
            }
            *slot = 0;
        }

        Some(Scenario {
            kind: self.schema.kind,
            distribution: self.distribution.to_string(),
            params,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Scenarios<'_> {}

/// Scenario space of one surrogate kind: one schema per distribution, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSpace {
    kind: SurrogateKind,
    tables: Vec<(String, ParameterSchema)>,
}

impl ConfigSpace {
    pub fn new(kind: SurrogateKind) -> Self {
        Self {
            kind,
            tables: Vec::new(),
        }
    }

    pub fn kind(&self) -> SurrogateKind {
        self.kind
    }

    /// Append a distribution table. The schema must belong to this space's kind.
    pub fn with_distribution(
        mut self,
        distribution: &str,
        schema: ParameterSchema,
    ) -> Result<Self, ConfigurationError> {
        if schema.kind() != self.kind {
            return Err(ConfigurationError::Parse(format!(
                "distribution '{}' declares a {} schema inside the {} table",
                distribution,
                schema.kind(),
                self.kind
            )));
        }
        self.tables.push((distribution.to_string(), schema));
        Ok(self)
    }

    pub fn distributions(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(d, _)| d.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn scenario_count(&self) -> usize {
        self.tables.iter().map(|(_, s)| s.scenario_count()).sum()
    }

    /// Every scenario of every distribution, paired with that distribution's budget list.
    pub fn scenarios(&self) -> impl Iterator<Item = (Scenario, &BudgetList)> {
        self.tables.iter().flat_map(|(distribution, schema)| {
            schema
                .scenarios(distribution)
                .map(move |scenario| (scenario, schema.budget()))
        })
    }
}
