//! Which screen a signed-in user lands on.

use tracing::{debug, warn};

use crate::api::FitnessBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    Onboarding,
    GoalSelection,
    Home,
}

impl std::fmt::Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onboarding => write!(f, "onboarding"),
            Self::GoalSelection => write!(f, "goal_selection"),
            Self::Home => write!(f, "home"),
        }
    }
}

/// Resolve the landing route for the current session.
///
/// A missing profile, or any error fetching it, sends the user to
/// onboarding. With a profile, any goal means home; no goals or a failed
/// goal fetch means goal selection.
pub async fn resolve_route(backend: &dyn FitnessBackend) -> AppRoute {
    match backend.fetch_my_profile().await {
        Ok(Some(_)) => {}
        Ok(None) => return AppRoute::Onboarding,
        Err(e) => {
            warn!(error = %e, "Profile check failed; routing to onboarding");
            return AppRoute::Onboarding;
        }
    }

    let route = match backend.list_goals().await {
        Ok(goals) if !goals.is_empty() => AppRoute::Home,
        Ok(_) => AppRoute::GoalSelection,
        Err(e) => {
            warn!(error = %e, "Goal check failed; routing to goal selection");
            AppRoute::GoalSelection
        }
    };
    debug!(%route, "Resolved route");
    route
}
