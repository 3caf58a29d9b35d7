//! Publication scrubbing.
//!
//! A publication is a user contribution linking texts and attachments,
//! filed under a node. Its name, description and keywords are free text and
//! all get replaced; the filing links are kept so the audit file can locate
//! each publication afterwards.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonPublication;
use crate::ssv::SsvLogger;

/// Anonymizes the publications and their translations; returns how many
/// rows were rewritten.
///
/// # Errors
///
/// Returns an error if any update or the audit write fails.
pub fn anonymize_publications(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let default_locale = &config.platform.default_language;
    let mut count = 0;

    let publications = {
        let mut stmt = conn.prepare(
            "SELECT p.id, p.instance_id, p.lang, f.node_id
             FROM publications p
             LEFT JOIN publication_parents f ON f.publication_id = p.id
             ORDER BY p.id",
        )?;
        let out = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update = conn.prepare(
            "UPDATE publications SET name = ?1, description = ?2, keywords = ?3 WHERE id = ?4",
        )?;
        for (id, instance_id, lang, node_id) in publications {
            let locale = lang.as_deref().unwrap_or(default_locale);
            let anon = AnonPublication::new(id, &instance_id, node_id, locale, config);
            update.execute(params![anon.name, anon.description, anon.keywords, id])?;
            ssv.write_publication(&anon)?;
            count += 1;
        }
    }

    let translations = {
        let mut stmt = conn.prepare(
            "SELECT i.id, i.publication_id, p.instance_id, i.lang
             FROM publication_i18n i
             JOIN publications p ON p.id = i.publication_id
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
            "UPDATE publication_i18n SET name = ?1, description = ?2, keywords = ?3 WHERE id = ?4",
        )?;
        for (row_id, publication_id, instance_id, lang) in translations {
            let anon = AnonPublication::new(publication_id, &instance_id, None, &lang, config);
            update.execute(params![anon.name, anon.description, anon.keywords, row_id])?;
            count += 1;
        }
    }

    Ok(count)
}
