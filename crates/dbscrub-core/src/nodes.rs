//! Node scrubbing.
//!
//! Nodes are the labelled containers that classify contributions: folders
//! in a document library, albums in a media gallery, categories in a blog.
//! Each instance reserves low ids for technical nodes (0 the root, 1 the
//! recycle bin, 2 the unclassified bucket); those keep their names, except
//! where the application kind actually stores user content under them.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonNode;
use crate::ssv::SsvLogger;

/// Whether a node id is a reserved technical node of its instance.
fn is_reserved(node_id: i64, instance_id: &str) -> bool {
    match node_id {
        0 => true,
        1 => !instance_id.starts_with("media"),
        2 => !(instance_id.starts_with("blog") || instance_id.starts_with("media")),
        _ => false,
    }
}

/// Anonymizes the nodes and their translations; returns how many rows were
/// rewritten (deletions of orphaned translations included).
///
/// # Errors
///
/// Returns an error if any update or the audit write fails.
pub fn anonymize_nodes(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let locale = &config.platform.default_language;
    let mut count = 0;

    let nodes = {
        let mut stmt = conn
            .prepare("SELECT id, instance_id, parent_id FROM nodes ORDER BY instance_id, id")?;
        let out = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update = conn.prepare(
            "UPDATE nodes SET name = ?1, description = ?2 WHERE id = ?3 AND instance_id = ?4",
        )?;
        for (id, instance_id, parent_id) in nodes {
            if is_reserved(id, &instance_id) {
                continue;
            }
            let anon = AnonNode::new(id, &instance_id, parent_id, locale, config);
            update.execute(params![anon.name, anon.description, id, instance_id])?;
            ssv.write_node(&anon)?;
            count += 1;
        }
    }

    // Translations: ones whose node is gone are dropped, the others follow
    // their node's classification and locale.
    let translations = {
        let mut stmt = conn.prepare(
            "SELECT i.id, i.node_id, i.lang, n.instance_id
             FROM node_i18n i
             LEFT JOIN nodes n ON n.id = i.node_id AND n.instance_id = i.instance_id
             ORDER BY i.id",
        )?;
        let out = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update =
            conn.prepare("UPDATE node_i18n SET name = ?1, description = ?2 WHERE id = ?3")?;
        let mut delete = conn.prepare("DELETE FROM node_i18n WHERE id = ?1")?;
        for (row_id, node_id, lang, instance_id) in translations {
            match instance_id {
                None => {
                    delete.execute(params![row_id])?;
                    count += 1;
                }
                Some(instance_id) => {
                    if is_reserved(node_id, &instance_id) {
                        continue;
                    }
                    let anon = AnonNode::new(node_id, &instance_id, None, &lang, config);
                    update.execute(params![anon.name, anon.description, row_id])?;
                    count += 1;
                }
            }
        }
    }

    Ok(count)
}
