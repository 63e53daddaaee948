//! Screen-level flows built on top of [`FitnessBackend`](crate::api::FitnessBackend).

pub mod coach;
pub mod goal_setup;
pub mod routing;

#[cfg(test)]
pub(crate) mod stub;

pub use coach::{COACH_GREETING, CoachConversation};
pub use goal_setup::{GoalForm, GoalSetup, submit_goal};
pub use routing::{AppRoute, resolve_route};
