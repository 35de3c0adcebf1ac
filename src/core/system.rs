//! Built-in everyone-principal recognition
//!
//! SharePoint models tenant-wide access through two built-in claims
//! principals. They look like security groups in role assignments but must
//! never be expanded; the resolver emits a single sentinel row instead.

const SYSTEM_PRINCIPALS: [&str; 2] = ["Everyone", "Everyone except external users"];

/// True when the display name is one of the built-in everyone principals.
pub fn is_system_principal(display_name: &str) -> bool {
    SYSTEM_PRINCIPALS.contains(&display_name)
}
