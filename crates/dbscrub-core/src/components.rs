//! Application instance scrubbing.
//!
//! An application instance is a compartmentalized application (document
//! library, wiki, blog, media gallery, ...) plugged into a space. Its kind
//! is technical data and stays; the name and description a user gave it are
//! replaced, with the kind itself as the fallback name prefix.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonAppInst;
use crate::ssv::SsvLogger;

/// Anonymizes the application instances and their translations; returns how
/// many rows were rewritten.
///
/// # Errors
///
/// Returns an error if any update or the audit write fails.
pub fn anonymize_components(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let locale = &config.platform.default_language;
    let mut count = 0;

    let instances = {
        let mut stmt = conn.prepare("SELECT id, kind FROM component_instances ORDER BY id")?;
        let out = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update = conn
            .prepare("UPDATE component_instances SET name = ?1, description = ?2 WHERE id = ?3")?;
        for (id, kind) in instances {
            let anon = AnonAppInst::new(&kind, id, locale, config);
            update.execute(params![anon.name, anon.description, id])?;
            ssv.write_component(&anon)?;
            count += 1;
        }
    }

    let translations = {
        let mut stmt = conn.prepare(
            "SELECT i.id, c.id, c.kind, i.lang
             FROM component_instance_i18n i
             JOIN component_instances c ON c.id = i.component_id
             ORDER BY i.id",
        )?;
        let out = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update = conn.prepare(
            "UPDATE component_instance_i18n SET name = ?1, description = ?2 WHERE id = ?3",
        )?;
        for (row_id, component_id, kind, lang) in translations {
            let anon = AnonAppInst::new(&kind, component_id, &lang, config);
            update.execute(params![anon.name, anon.description, row_id])?;
            count += 1;
        }
    }

    Ok(count)
}
