//! Name validation with helpful error messages
//!
//! Project packages, apps and Docker project names all end up as Python
//! package names, so they share one set of rules.

use std::sync::OnceLock;

use regex::Regex;

use super::defaults::{DJANGO_RESERVED, PYTHON_KEYWORDS};
use crate::error::{hints, PorosError};

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Whether `name` is a Python keyword or a name Django reserves
pub fn is_reserved(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name) || DJANGO_RESERVED.contains(&name)
}

/// Validate that a name is a legal Django/Python identifier
///
/// Returns the name unchanged so it can be used inline.
pub fn validate_app_name(name: &str) -> Result<&str, PorosError> {
    if !identifier_pattern().is_match(name) {
        return Err(PorosError::invalid_app_name(
            name,
            format!(
                "'{}' is not a valid Python identifier. \
                 Use only letters, numbers, and underscores, and don't start with a number.",
                name
            ),
            hints::identifier(),
        ));
    }

    if is_reserved(name) {
        return Err(PorosError::invalid_app_name(
            name,
            format!("'{}' is a reserved Python or Django name and cannot be used.", name),
            format!("Choose a different name, e.g., '{}_app' or 'my_{}'", name, name),
        ));
    }

    Ok(name)
}
