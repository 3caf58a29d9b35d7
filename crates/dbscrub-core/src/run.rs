//! The run orchestrator.
//!
//! One run is one transaction: every unit of work executes against the same
//! `IMMEDIATE` transaction, so either every table of every unit is rewritten
//! or none is. The audit channel lives outside the transaction — it is
//! opened before the first unit and closed after the last one, on the
//! failure path too — so a failed run still leaves well-formed (if partial)
//! audit files behind, matching a database that was left untouched.

use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::config::Config;
use crate::error::ScrubError;
use crate::ssv::SsvLogger;
use crate::{components, domains, groups, nodes, publications, spaces, users};

/// Progress of a run, reported once per unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitProgress<'a> {
    /// The unit started.
    Started(&'a str),
    /// The unit finished, with the number of rows it rewrote.
    Completed(&'a str, u64),
}

/// Rows rewritten per unit of work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Spaces and space translations.
    pub spaces: u64,
    /// Application instances and translations.
    pub components: u64,
    /// Domains processed (storage migrations included).
    pub domains: u64,
    /// Users, central and platform-domain.
    pub users: u64,
    /// Groups, central and platform-domain.
    pub groups: u64,
    /// Nodes and node translations.
    pub nodes: u64,
    /// Publications and publication translations.
    pub publications: u64,
}

/// Opens the configured database and anonymizes it.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the run fails; a
/// failed run is fully rolled back.
pub fn run<F>(config: &Config, progress: F) -> Result<RunSummary, ScrubError>
where
    F: FnMut(UnitProgress<'_>),
{
    let mut conn = Connection::open(&config.database.path)?;
    run_with_connection(&mut conn, config, progress)
}

/// Anonymizes the database behind an existing connection.
///
/// # Errors
///
/// Returns an error if any unit fails; the transaction is rolled back and
/// the audit channel is still flushed and closed.
pub fn run_with_connection<F>(
    conn: &mut Connection,
    config: &Config,
    progress: F,
) -> Result<RunSummary, ScrubError>
where
    F: FnMut(UnitProgress<'_>),
{
    let mut ssv = SsvLogger::open(&config.audit.dir)?;
    let outcome = execute_units(conn, config, &mut ssv, progress);
    let closed = ssv.close();
    let summary = outcome?;
    closed?;
    Ok(summary)
}

fn execute_units<F>(
    conn: &mut Connection,
    config: &Config,
    ssv: &mut SsvLogger,
    mut progress: F,
) -> Result<RunSummary, ScrubError>
where
    F: FnMut(UnitProgress<'_>),
{
    // IMMEDIATE takes the write lock up front: the run is the sole writer
    // from the first statement on.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut summary = RunSummary::default();

    progress(UnitProgress::Started("spaces"));
    summary.spaces = spaces::anonymize_spaces(&tx, config, ssv)?;
    progress(UnitProgress::Completed("spaces", summary.spaces));

    progress(UnitProgress::Started("components"));
    summary.components = components::anonymize_components(&tx, config, ssv)?;
    progress(UnitProgress::Completed("components", summary.components));

    progress(UnitProgress::Started("domains"));
    summary.domains = domains::anonymize_domains(&tx, config, ssv)?;
    progress(UnitProgress::Completed("domains", summary.domains));

    progress(UnitProgress::Started("users"));
    summary.users = users::anonymize_users(&tx, config, ssv)?;
    progress(UnitProgress::Completed("users", summary.users));

    progress(UnitProgress::Started("groups"));
    summary.groups = groups::anonymize_groups(&tx, config)?;
    progress(UnitProgress::Completed("groups", summary.groups));

    progress(UnitProgress::Started("nodes"));
    summary.nodes = nodes::anonymize_nodes(&tx, config, ssv)?;
    progress(UnitProgress::Completed("nodes", summary.nodes));

    progress(UnitProgress::Started("publications"));
    summary.publications = publications::anonymize_publications(&tx, config, ssv)?;
    progress(UnitProgress::Completed("publications", summary.publications));

    tx.commit()?;
    info!(
        spaces = summary.spaces,
        components = summary.components,
        domains = summary.domains,
        users = summary.users,
        groups = summary.groups,
        nodes = summary.nodes,
        publications = summary.publications,
        "anonymization committed"
    );
    Ok(summary)
}
