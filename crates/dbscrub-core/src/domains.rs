//! Domain anonymization.
//!
//! Iterates the domains in ascending id order inside the run transaction.
//! The platform domain (id 0) keeps its storage and descriptive row; only
//! its server URL is replaced. Every other domain has its storage migrated
//! according to its driver, its descriptor files rewritten, and finally its
//! own row anonymized — after which the domain is SQL-backed whatever it
//! was before.

use rusqlite::{Connection, params};
use tracing::info;

use crate::config::Config;
use crate::descriptor::sync_descriptors;
use crate::error::ScrubError;
use crate::migrate::{convert_directory_domain, rename_sql_domain};
use crate::model::AnonDomain;
use crate::ssv::SsvLogger;
use crate::store::DomainRow;

/// Storage driver classification of a domain.
///
/// Only SQL-backed domains own relational tables to rename; every other
/// driver value designates some external directory whose mirror rows get
/// converted into SQL storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DomainDriver {
    Sql,
    Directory,
}

impl DomainDriver {
    fn classify(driver: &str) -> Self {
        if driver.eq_ignore_ascii_case("sql") {
            Self::Sql
        } else {
            Self::Directory
        }
    }
}

/// Anonymizes every domain and returns how many were processed.
///
/// # Errors
///
/// Returns the first migration, descriptor or database error; the caller's
/// transaction rolls back every domain processed so far.
pub fn anonymize_domains(
    conn: &Connection,
    config: &Config,
    ssv: &mut SsvLogger,
) -> Result<u64, ScrubError> {
    let domains = select_domains(conn)?;
    let mut count = 0;
    for domain in domains {
        let anon = AnonDomain::new(domain.id, config);
        if domain.id == 0 {
            conn.execute(
                "UPDATE domains SET server_url = ?1 WHERE id = ?2",
                params![anon.server_url, domain.id],
            )?;
            count += 1;
            continue;
        }

        let stats = match DomainDriver::classify(&domain.driver) {
            DomainDriver::Sql => rename_sql_domain(conn, &domain, &anon, config, ssv)?,
            DomainDriver::Directory => {
                convert_directory_domain(conn, &domain, &anon, config, ssv)?
            }
        };
        sync_descriptors(config, &domain, &anon)?;
        conn.execute(
            "UPDATE domains
             SET name = ?1, description = ?2, server_url = ?3,
                 driver = ?4, auth_server = ?5, descriptor = ?6
             WHERE id = ?7",
            params![
                anon.name,
                anon.description,
                anon.server_url,
                anon.driver(),
                anon.auth_server,
                anon.descriptor,
                domain.id,
            ],
        )?;
        info!(
            domain_id = domain.id,
            users = stats.users,
            groups = stats.groups,
            memberships = stats.memberships,
            "anonymized domain"
        );
        count += 1;
    }
    Ok(count)
}

fn select_domains(conn: &Connection) -> Result<Vec<DomainRow>, ScrubError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, descriptor, auth_server, driver FROM domains ORDER BY id",
    )?;
    let domains = stmt
        .query_map([], |row| {
            Ok(DomainRow {
                id: row.get(0)?,
                name: row.get(1)?,
                descriptor: row.get(2)?,
                auth_server: row.get(3)?,
                driver: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(domains)
}
