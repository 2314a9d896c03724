//! Search and status filtering over the target list.

use super::classify::HealthStatus;
use super::target::Target;

/// Which health state the monitoring list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Up,
    Down,
}

impl StatusFilter {
    /// Cycle All → Up → Down → All.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Up,
            StatusFilter::Up => StatusFilter::Down,
            StatusFilter::Down => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Up => "up",
            StatusFilter::Down => "down",
        }
    }

    pub fn matches(&self, health: HealthStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Up => health == HealthStatus::Healthy,
            StatusFilter::Down => health == HealthStatus::Unhealthy,
        }
    }
}

/// Case-insensitive substring match of `search_term` in `address`.
pub fn matches_search(address: &str, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    address.to_lowercase().contains(&search_term.to_lowercase())
}

/// Select the targets matching both the search term and the status filter.
///
/// Input order is preserved.
pub fn filter_targets<'a, I>(targets: I, search_term: &str, status: StatusFilter) -> Vec<&'a Target>
where
    I: IntoIterator<Item = &'a Target>,
{
    targets
        .into_iter()
        .filter(|t| matches_search(&t.address, search_term) && status.matches(t.health()))
        .collect()
}
