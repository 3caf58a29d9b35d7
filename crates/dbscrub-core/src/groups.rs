//! Platform-wide group scrubbing.
//!
//! Rewrites the name and description of the central groups table and of the
//! platform domain's own group storage. Structure (parents, memberships) is
//! not touched here.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonGroup;

/// Anonymizes every platform group and returns how many rows were rewritten.
///
/// # Errors
///
/// Returns an error if any update fails.
pub fn anonymize_groups(conn: &Connection, config: &Config) -> Result<u64, ScrubError> {
    let mut count = 0;
    for table in ["groups", "domain_platform_group"] {
        let ids = {
            let mut stmt = conn.prepare(&format!("SELECT id FROM {table} ORDER BY id"))?;
            let out = stmt.query_map([], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            out
        };
        let mut update = conn.prepare(&format!(
            "UPDATE {table} SET name = ?1, description = ?2 WHERE id = ?3"
        ))?;
        for id in ids {
            let anon = AnonGroup::new(id, config);
            update.execute(params![anon.name, anon.description, id])?;
            count += 1;
        }
    }
    Ok(count)
}
