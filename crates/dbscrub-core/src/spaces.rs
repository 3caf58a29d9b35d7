//! Collaborative space scrubbing.
//!
//! Personal spaces are excluded: they are deleted wholesale by other means
//! and their names would only leak the owner's identity into the audit
//! file.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonSpace;
use crate::ssv::SsvLogger;

const PERSONAL_SPACE_PATTERN: &str = "Personal space%";

/// Anonymizes the spaces and their translations; returns how many rows were
/// rewritten.
///
/// # Errors
///
/// Returns an error if any update or the audit write fails.
pub fn anonymize_spaces(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let locale = &config.platform.default_language;
    let mut count = 0;

    let ids = {
        let mut stmt =
            conn.prepare("SELECT id FROM spaces WHERE name NOT LIKE ?1 ORDER BY id")?;
        let out = stmt.query_map(params![PERSONAL_SPACE_PATTERN], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update =
            conn.prepare("UPDATE spaces SET name = ?1, description = ?2 WHERE id = ?3")?;
        for id in ids {
            let anon = AnonSpace::new(id, locale, config);
            update.execute(params![anon.name, anon.description, id])?;
            ssv.write_space(id)?;
            count += 1;
        }
    }

    let translations = {
        let mut stmt = conn.prepare("SELECT id, space_id, lang FROM space_i18n ORDER BY id")?;
        let out = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update =
            conn.prepare("UPDATE space_i18n SET name = ?1, description = ?2 WHERE id = ?3")?;
        for (row_id, space_id, lang) in translations {
            let anon = AnonSpace::new(space_id, &lang, config);
            update.execute(params![anon.name, anon.description, row_id])?;
            count += 1;
        }
    }

    Ok(count)
}
