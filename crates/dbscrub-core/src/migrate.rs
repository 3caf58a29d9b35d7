//! Domain storage migration.
//!
//! Both migration paths move a domain's users, groups and memberships into
//! freshly provisioned storage named after the domain's new technical name.
//! A directory-backed domain is *converted*: its rows are synthesized from
//! the central user/group records linked to the directory, under new numeric
//! ids derived from the directory identifiers. An SQL-backed domain is
//! *renamed*: its rows are copied with their identifiers intact and only the
//! display data replaced, then the old tables are dropped.

use rusqlite::{Connection, params};
use tracing::debug;

use crate::config::Config;
use crate::error::ScrubError;
use crate::hierarchy::resolve_parent;
use crate::ident::encode_specific_id;
use crate::model::{AnonDomain, AnonGroup, AnonUser};
use crate::ssv::SsvLogger;
use crate::store::{self, DomainRow, SourceGroup, SourceUser, StorageNames};

/// Row counts of one domain migration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStats {
    /// Users written to the new storage.
    pub users: u64,
    /// Groups written to the new storage.
    pub groups: u64,
    /// Membership links written to the new storage.
    pub memberships: u64,
}

/// Converts a directory-backed domain into SQL storage.
///
/// Every active user and every group of the domain receives a new numeric
/// id derived from its directory identifier; that id is also written back
/// onto the central row's specific-id column, so the membership pass (and
/// any later pass) observes the new mapping. The directory itself is not
/// touched.
///
/// # Errors
///
/// Returns an error on a storage-name conflict or any database failure;
/// the caller's transaction makes the partial work invisible.
pub fn convert_directory_domain(
    conn: &Connection,
    domain: &DomainRow,
    new_domain: &AnonDomain,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<MigrationStats, ScrubError> {
    let names = StorageNames::from_descriptor(&new_domain.descriptor);
    store::create_domain_storage(conn, &names)?;
    let mut stats = MigrationStats::default();

    // Users first: their write-back must be visible to the membership pass.
    let users = select_domain_users(conn, domain.id)?;
    {
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (id, first_name, last_name, email, login, password, company)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            names.users
        ))?;
        let mut write_back = conn.prepare("UPDATE users SET specific_id = ?1 WHERE id = ?2")?;
        for user in &users {
            let new_id = encode_specific_id(&user.specific_id);
            let anon = AnonUser::new(user.id, config);
            insert.execute(params![
                new_id,
                anon.first_name,
                anon.last_name,
                anon.email,
                anon.login,
                anon.password_digest,
                anon.company,
            ])?;
            write_back.execute(params![new_id.to_string(), user.id])?;
            ssv.write_user(&anon, domain.id)?;
            stats.users += 1;
        }
    }

    // Groups: parent links reference specific ids, so resolution runs
    // against a snapshot taken before any write-back of this pass.
    let snapshot = select_domain_groups(conn, domain.id)?;
    {
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (id, parent_id, name, description) VALUES (?1, ?2, ?3, ?4)",
            names.groups
        ))?;
        let mut write_back = conn.prepare("UPDATE groups SET specific_id = ?1 WHERE id = ?2")?;
        for group in &snapshot {
            let new_id = encode_specific_id(&group.specific_id);
            let parent_id = resolve_parent(domain.id, group, &snapshot);
            let anon = AnonGroup::new(group.id, config);
            insert.execute(params![new_id, parent_id, anon.name, anon.description])?;
            write_back.execute(params![new_id.to_string(), group.id])?;
            stats.groups += 1;
        }
    }

    // Memberships last, from the specific ids as updated above: both ends
    // are numeric by now, so encoding is a passthrough and stays consistent
    // with the ids already written.
    {
        let mut select = conn.prepare(
            "SELECT u.specific_id, g.specific_id
             FROM group_user_memberships m
             JOIN users u ON u.id = m.user_id
             JOIN groups g ON g.id = m.group_id
             WHERE u.domain_id = ?1 AND g.domain_id = ?1
             ORDER BY m.user_id, m.group_id",
        )?;
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (user_id, group_id) VALUES (?1, ?2)",
            names.memberships
        ))?;
        let links = select
            .query_map(params![domain.id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (user_specific, group_specific) in links {
            insert.execute(params![
                encode_specific_id(&user_specific),
                encode_specific_id(&group_specific),
            ])?;
            stats.memberships += 1;
        }
    }

    debug!(
        domain_id = domain.id,
        users = stats.users,
        groups = stats.groups,
        memberships = stats.memberships,
        "converted directory domain"
    );
    Ok(stats)
}

/// Moves an SQL-backed domain's storage under its new technical name.
///
/// Identifiers are already numeric and stable, so rows are copied verbatim
/// apart from the anonymized display data; the old tables are dropped once
/// the copy succeeded.
///
/// # Errors
///
/// Returns an error on a storage-name conflict or any database failure;
/// the caller's transaction makes the partial work invisible.
pub fn rename_sql_domain(
    conn: &Connection,
    domain: &DomainRow,
    new_domain: &AnonDomain,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<MigrationStats, ScrubError> {
    let old_names = StorageNames::from_descriptor(&domain.descriptor);
    old_names.validate()?;
    let new_names = StorageNames::from_descriptor(&new_domain.descriptor);
    store::create_domain_storage(conn, &new_names)?;
    let mut stats = MigrationStats::default();

    {
        let mut select = conn.prepare(&format!(
            "SELECT id, title, position FROM {} ORDER BY id",
            old_names.users
        ))?;
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (id, first_name, last_name, email, login, password, company, title, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            new_names.users
        ))?;
        let users = select
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, title, position) in users {
            let anon = AnonUser::new(id, config);
            insert.execute(params![
                id,
                anon.first_name,
                anon.last_name,
                anon.email,
                anon.login,
                anon.password_digest,
                anon.company,
                title,
                position,
            ])?;
            ssv.write_user(&anon, domain.id)?;
            stats.users += 1;
        }
    }

    {
        let mut select = conn.prepare(&format!(
            "SELECT id, parent_id FROM {} ORDER BY id",
            old_names.groups
        ))?;
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (id, parent_id, name, description) VALUES (?1, ?2, ?3, ?4)",
            new_names.groups
        ))?;
        let groups = select
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, parent_id) in groups {
            let anon = AnonGroup::new(id, config);
            insert.execute(params![id, parent_id, anon.name, anon.description])?;
            stats.groups += 1;
        }
    }

    {
        let mut select = conn.prepare(&format!(
            "SELECT user_id, group_id FROM {} ORDER BY user_id, group_id",
            old_names.memberships
        ))?;
        let mut insert = conn.prepare(&format!(
            "INSERT INTO {} (user_id, group_id) VALUES (?1, ?2)",
            new_names.memberships
        ))?;
        let links = select
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (user_id, group_id) in links {
            insert.execute(params![user_id, group_id])?;
            stats.memberships += 1;
        }
    }

    store::drop_domain_storage(conn, &old_names)?;
    debug!(
        domain_id = domain.id,
        users = stats.users,
        groups = stats.groups,
        memberships = stats.memberships,
        "renamed SQL domain storage"
    );
    Ok(stats)
}

fn select_domain_users(conn: &Connection, domain_id: i64) -> Result<Vec<SourceUser>, ScrubError> {
    let mut stmt = conn.prepare(
        "SELECT id, specific_id FROM users
         WHERE domain_id = ?1 AND state <> 'DELETED'
         ORDER BY id",
    )?;
    let users = stmt
        .query_map(params![domain_id], |row| {
            Ok(SourceUser {
                id: row.get(0)?,
                specific_id: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

fn select_domain_groups(conn: &Connection, domain_id: i64) -> Result<Vec<SourceGroup>, ScrubError> {
    let mut stmt = conn.prepare(
        "SELECT id, specific_id, parent_specific_id FROM groups
         WHERE domain_id = ?1
         ORDER BY id",
    )?;
    let groups = stmt
        .query_map(params![domain_id], |row| {
            Ok(SourceGroup {
                id: row.get(0)?,
                specific_id: row.get(1)?,
                parent_specific_id: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(groups)
}
