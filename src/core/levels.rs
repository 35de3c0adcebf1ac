//! Permission level reduction
//!
//! Role definition bindings arrive as a list of level names. Placeholder
//! levels that SharePoint attaches for internal bookkeeping are dropped,
//! the rest are joined into the single display string used on every
//! output record.

const EXCLUDED_LEVELS: [&str; 2] = ["Limited Access", "Web-Only Limited Access"];

const LEVEL_SEPARATOR: &str = " | ";

/// Reduce role definition names to the effective permission-levels string.
///
/// Returns an empty string when nothing but placeholder levels was bound;
/// callers skip the whole assignment in that case.
pub fn resolve_permission_levels(role_definitions: &[String]) -> String {
    role_definitions
        .iter()
        .filter(|name| !EXCLUDED_LEVELS.contains(&name.as_str()))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LEVEL_SEPARATOR)
}
