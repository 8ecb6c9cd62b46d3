//! Substring filtering for list views. No ranking: input order is kept.

use super::{CatalogEntity, Project, ProjectStatus};

/// Entities matching `query` (case-insensitive substring), in input order.
pub fn search<'a, E: CatalogEntity>(items: &'a [E], query: &str) -> Vec<&'a E> {
    items.iter().filter(|e| e.matches(query)).collect()
}

/// Projects matching `query` and, if given, `status`.
pub fn filter_projects<'a>(
    items: &'a [Project],
    query: &str,
    status: Option<ProjectStatus>,
) -> Vec<&'a Project> {
    items
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .filter(|p| p.matches(query))
        .collect()
}
