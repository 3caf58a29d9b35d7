//! Platform-wide user scrubbing.
//!
//! Rewrites the identity columns of the central users table, whatever the
//! domain, and of the platform domain's own user storage. The platform
//! administrator (id 0) is left untouched so the installation stays
//! operable. Deleted users keep their login (it may be referenced by
//! recycle-bin content); removed users are rewritten but not advertised in
//! the audit file.

use rusqlite::{Connection, params};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonUser;
use crate::ssv::SsvLogger;

/// Anonymizes every platform user and returns how many rows were rewritten.
///
/// # Errors
///
/// Returns an error if any update or the audit write fails.
pub fn anonymize_users(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let mut count = 0;

    let rows = {
        let mut stmt =
            conn.prepare("SELECT id, domain_id, state FROM users ORDER BY id")?;
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
        let mut update_identity = conn.prepare(
            "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3 WHERE id = ?4",
        )?;
        let mut update_login = conn.prepare("UPDATE users SET login = ?1 WHERE id = ?2")?;
        for (id, domain_id, state) in rows {
            if id == 0 {
                continue;
            }
            let anon = AnonUser::new(id, config);
            update_identity.execute(params![anon.first_name, anon.last_name, anon.email, id])?;
            if state != "DELETED" {
                update_login.execute(params![anon.login, id])?;
                if state != "REMOVED" {
                    ssv.write_user(&anon, domain_id)?;
                }
            }
            count += 1;
        }
    }

    let ids = {
        let mut stmt =
            conn.prepare("SELECT id FROM domain_platform_user WHERE id <> 0 ORDER BY id")?;
        let out = stmt.query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        out
    };
    {
        let mut update = conn.prepare(
            "UPDATE domain_platform_user
             SET first_name = ?1, last_name = ?2, email = ?3,
                 login = ?4, password = ?5, company = ?6
             WHERE id = ?7",
        )?;
        for id in ids {
            let anon = AnonUser::new(id, config);
            update.execute(params![
                anon.first_name,
                anon.last_name,
                anon.email,
                anon.login,
                anon.password_digest,
                anon.company,
                id,
            ])?;
            count += 1;
        }
    }

    Ok(count)
}
