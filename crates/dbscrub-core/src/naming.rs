//! Template-driven placeholder naming.
//!
//! Every display value written by the engine is rebuilt from a configured
//! prefix and the entity's numeric id. The prefix is optional: a kind whose
//! prefix is absent (or configured empty) falls back to the kind's own label,
//! so the output is deterministic with or without settings.

/// Builds the placeholder name for an entity.
///
/// Returns `"{prefix} {id}"` when a non-empty prefix is configured and
/// `"{kind} {id}"` otherwise.
#[must_use]
pub fn templated_name(prefix: Option<&str>, kind: &str, id: i64) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p} {id}"),
        _ => format!("{kind} {id}"),
    }
}
