//! Scenario runner for batch projections
//!
//! Evaluates many projects (or many variants of one project) with a single
//! engine configuration, in parallel.

use rayon::prelude::*;

use crate::params::ProjectParameters;
use crate::projection::{OverrideMap, ProjectionConfig, ProjectionEngine, ProjectionResult};

/// A project to evaluate: parameters plus its manual overrides
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub parameters: ProjectParameters,
    pub overrides: OverrideMap,
}

impl Scenario {
    pub fn new(parameters: ProjectParameters, overrides: OverrideMap) -> Self {
        Self {
            parameters,
            overrides,
        }
    }
}

/// Batch projection runner
///
/// # Example
/// ```
/// use lease_roi::{ProjectParameters, ScenarioRunner, Scenario};
///
/// let runner = ScenarioRunner::new();
/// let scenarios: Vec<Scenario> = [70_000.0, 80_000.0, 90_000.0]
///     .iter()
///     .map(|&income| Scenario {
///         parameters: ProjectParameters { monthly_income: income, ..Default::default() },
///         ..Default::default()
///     })
///     .collect();
///
/// let results = runner.run_batch(&scenarios);
/// assert_eq!(results.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with the default engine configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    /// Run a single projection
    pub fn run(&self, scenario: &Scenario) -> ProjectionResult {
        self.engine.project(&scenario.parameters, &scenario.overrides)
    }

    /// Run projections in parallel; results keep input order
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<ProjectionResult> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }
}
