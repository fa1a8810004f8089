//! Budget resolution.
//!
//! A non-adaptive sparse grid is built once at a fixed size, so only the last declared budget
//! runs. Adaptive runs repeat once per declared checkpoint. PCE scenarios run every declared
//! sample budget.

use crate::errors::ConfigurationError;
use crate::model::{RefinementSetting, Scenario, SurrogateKind};
use serde::Serialize;

/// Declared budgets of one scenario table, in declaration order.
///
/// Non-empty, every value positive. The last element is treated as the maximum budget
/// whether or not the list is sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetList {
    name: String,
    values: Vec<u64>,
}

impl BudgetList {
    pub fn new(name: &str, values: Vec<u64>) -> Result<Self, ConfigurationError> {
        if values.is_empty() {
            return Err(ConfigurationError::EmptyBudget {
                name: name.to_string(),
            });
        }
        if values.contains(&0) {
            return Err(ConfigurationError::NonPositiveBudget {
                name: name.to_string(),
                value: 0,
            });
        }
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn last(&self) -> u64 {
        // Non-empty by construction.
        self.values[self.values.len() - 1]
    }
}

/// Budgets to execute for one refinement setting.
pub fn resolve(refinement: &RefinementSetting, budgets: &BudgetList) -> Vec<u64> {
    match refinement {
        RefinementSetting::None => vec![budgets.last()],
        RefinementSetting::Named(_) => budgets.values().to_vec(),
    }
}

/// Budgets to execute for one scenario.
pub fn budgets_for(
    scenario: &Scenario,
    budgets: &BudgetList,
) -> Result<Vec<u64>, ConfigurationError> {
    match scenario.kind {
        SurrogateKind::SparseGrid => Ok(resolve(&scenario.refinement()?, budgets)),
        SurrogateKind::PolynomialChaosExpansion => Ok(budgets.values().to_vec()),
    }
}
