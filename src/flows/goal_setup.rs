//! Goal creation followed by waiting for the backend's task generation.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::FitnessBackend;
use crate::error::{ApiError, InputError};
use crate::models::{Goal, GoalCreate, GoalType, TaskItem};
use crate::retry::{RetryPolicy, poll_until};

/// Result of [`submit_goal`].
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSetup {
    pub goal: Goal,
    /// Empty when generation did not finish within the poll budget.
    pub tasks: Vec<TaskItem>,
    pub tasks_generated: bool,
    pub attempts: u32,
}

/// Create a goal, then poll its task list until it is non-empty or the
/// policy runs out. Only the creation call can fail.
pub async fn submit_goal(
    backend: &dyn FitnessBackend,
    create: &GoalCreate,
    policy: RetryPolicy,
) -> Result<GoalSetup, ApiError> {
    let goal = backend.create_goal(create).await?;
    info!(goal_id = %goal.id, max_attempts = policy.max_attempts, "Waiting for generated tasks");

    let outcome = poll_until(
        policy,
        || backend.list_goal_tasks(&goal.id),
        |tasks: &Vec<TaskItem>| !tasks.is_empty(),
    )
    .await;

    let attempts = outcome.attempts();
    let tasks_generated = outcome.is_ready();
    if !tasks_generated {
        warn!(goal_id = %goal.id, attempts, "No tasks generated within poll budget");
    }
    let tasks = outcome.into_value().unwrap_or_default();

    Ok(GoalSetup {
        goal,
        tasks,
        tasks_generated,
        attempts,
    })
}

/// Raw inputs from the goal screen.
#[derive(Debug, Clone, Default)]
pub struct GoalForm {
    pub goal_type: String,
    pub target_value: String,
    pub target_date: String,
}

impl GoalForm {
    /// Build the create payload. A blank or non-numeric target value is
    /// dropped; a target date must be `YYYY-MM-DD` when given.
    pub fn to_create(&self) -> Result<GoalCreate, InputError> {
        let goal_type: GoalType = self.goal_type.parse().map_err(|_| InputError::InvalidChoice {
            field: "goal type",
            value: self.goal_type.trim().to_string(),
            choices: GoalType::ALL
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        })?;

        let mut create = GoalCreate::new(goal_type);
        if let Ok(value) = self.target_value.trim().parse::<f64>() {
            if value.is_finite() {
                create = create.with_target_value(value);
            }
        }

        let date = self.target_date.trim();
        if !date.is_empty() {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| InputError::InvalidDate {
                field: "target date",
                value: date.to_string(),
            })?;
            create = create.with_target_date(parsed);
        }

        Ok(create)
    }
}
