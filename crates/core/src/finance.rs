//! Derived financial values for tasks, projects and workers.
//!
//! Stored aggregates are always raw sums over child rows:
//!
//! - `tasks.cost` = [`compute_task_cost`]
//! - `projects.total_cost` = sum of the project's task costs
//! - `projects.paid_amount` = sum of the project's PAID payments
//! - `workers.total_earned` = sum of the worker's assigned task costs
//! - `workers.total_paid` = sum of PAID payments addressed to the worker
//!
//! The budget fallback and the outstanding balance are presentation-only
//! and are never written back to storage.

use serde::Serialize;

/// Cost of a task: `hourly_rate * hours`, where `hours` is `actual_hours`
/// when positive and `estimated_hours` otherwise. Missing operands count
/// as zero, so a task without a rate costs nothing.
pub fn compute_task_cost(
    hourly_rate: Option<f64>,
    estimated_hours: Option<f64>,
    actual_hours: Option<f64>,
) -> f64 {
    let rate = hourly_rate.unwrap_or(0.0);
    let actual = actual_hours.unwrap_or(0.0);
    let hours = if actual > 0.0 {
        actual
    } else {
        estimated_hours.unwrap_or(0.0)
    };
    rate * hours
}

/// Nominal project cost shown to users.
///
/// A project whose tasks carry no cost displays its manual budget instead;
/// with neither, the cost is zero.
pub fn display_total_cost(task_cost_sum: f64, budget: Option<f64>) -> f64 {
    if task_cost_sum != 0.0 {
        task_cost_sum
    } else {
        budget.unwrap_or(0.0)
    }
}

/// Balance still owed on a project, floored at zero.
pub fn outstanding_amount(total_cost: f64, paid_amount: f64) -> f64 {
    (total_cost - paid_amount).max(0.0)
}

/// Presentation view of a project's money, derived from stored aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectFinancials {
    /// Task-cost sum, or the budget when that sum is zero.
    pub total_cost: f64,
    pub paid_amount: f64,
    pub outstanding_amount: f64,
}

impl ProjectFinancials {
    pub fn from_stored(stored_total_cost: f64, paid_amount: f64, budget: Option<f64>) -> Self {
        let total_cost = display_total_cost(stored_total_cost, budget);
        Self {
            total_cost,
            paid_amount,
            outstanding_amount: outstanding_amount(total_cost, paid_amount),
        }
    }
}

/// Whether a freshly computed aggregate differs from the stored one.
///
/// Sums of `DOUBLE PRECISION` values can differ in the last bits depending
/// on summation order, so values within a cent of each other match.
pub fn aggregate_drifted(stored: f64, fresh: f64) -> bool {
    (stored - fresh).abs() >= 0.005
}
