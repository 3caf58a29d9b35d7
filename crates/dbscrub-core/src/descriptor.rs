//! Domain descriptor file synchronization.
//!
//! A domain is described outside the database by two property files under
//! the platform home: the domain descriptor (storage settings) and the
//! authentication descriptor. After a domain's storage moves, both files
//! are regenerated from the installation's generic SQL templates with the
//! new table names, and the old files are deleted.
//!
//! This step is filesystem-only and runs inside the database transaction
//! without being protected by it: a failure after commit leaves the files
//! out of sync with the database, which is why missing per-domain files are
//! a warning, not an error.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ScrubError;
use crate::model::AnonDomain;
use crate::store::{DomainRow, StorageNames};

/// Template descriptor shipped with every installation for SQL domains.
const DOMAIN_SQL_TEMPLATE: &str = "domainSQL.properties";

/// Template descriptor for SQL authentication servers.
const AUTH_SQL_TEMPLATE: &str = "authSQL.properties";

const USER_TABLE_KEY: &str = "database.user_table";
const GROUP_TABLE_KEY: &str = "database.group_table";
const MEMBERSHIP_TABLE_KEY: &str = "database.group_user_rel_table";
const AUTH_USER_TABLE_KEY: &str = "server0.user_table";

/// Rewrites the two descriptor files of a migrated domain.
///
/// Does nothing when no platform home is configured. When the home is
/// configured but either per-domain file is absent, the synchronization is
/// skipped with a warning: the database side has already moved and a later
/// manual repair is preferable to failing the whole run.
///
/// # Errors
///
/// Returns an error if a template cannot be read or a new descriptor
/// cannot be written: the templates are installation artifacts, and their
/// absence means the configured home is not a platform home.
pub fn sync_descriptors(
    config: &Config,
    domain: &DomainRow,
    new_domain: &AnonDomain,
) -> Result<(), ScrubError> {
    let Some(home) = &config.platform.home else {
        return Ok(());
    };
    let domains_dir = home.join("properties").join("domains");
    let auth_dir = home.join("properties").join("authentication");

    let old_domain_path = domains_dir.join(format!("{}.properties", domain.descriptor));
    let old_auth_path = auth_dir.join(format!("{}.properties", domain.auth_server));
    if !old_domain_path.exists() || !old_auth_path.exists() {
        warn!(
            domain_id = domain.id,
            descriptor = %old_domain_path.display(),
            "descriptor files not found under the platform home, skipping"
        );
        return Ok(());
    }

    let names = StorageNames::from_descriptor(&new_domain.descriptor);

    let mut props = load_properties(&domains_dir.join(DOMAIN_SQL_TEMPLATE))?;
    set_property(&mut props, USER_TABLE_KEY, &names.users);
    set_property(&mut props, GROUP_TABLE_KEY, &names.groups);
    set_property(&mut props, MEMBERSHIP_TABLE_KEY, &names.memberships);
    store_properties(&domains_dir.join(new_domain.descriptor_file()), &props)?;

    let mut props = load_properties(&auth_dir.join(AUTH_SQL_TEMPLATE))?;
    set_property(&mut props, AUTH_USER_TABLE_KEY, &names.users);
    store_properties(&auth_dir.join(new_domain.auth_descriptor_file()), &props)?;

    fs::remove_file(&old_domain_path).map_err(|e| ScrubError::io(&old_domain_path, e))?;
    fs::remove_file(&old_auth_path).map_err(|e| ScrubError::io(&old_auth_path, e))?;

    debug!(
        domain_id = domain.id,
        new_descriptor = new_domain.descriptor_file(),
        "descriptor files rewritten"
    );
    Ok(())
}

/// Parses a property file into ordered key/value pairs.
///
/// Comments (`#` or `!`) and blank lines are dropped; values keep their
/// surrounding text verbatim apart from trimming.
fn load_properties(path: &Path) -> Result<Vec<(String, String)>, ScrubError> {
    let content = fs::read_to_string(path).map_err(|e| ScrubError::io(path, e))?;
    let mut props = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            props.push((key.trim().to_string(), value.trim().to_string()));
        }
    }
    Ok(props)
}

fn set_property(props: &mut Vec<(String, String)>, key: &str, value: &str) {
    match props.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => props.push((key.to_string(), value.to_string())),
    }
}

fn store_properties(path: &Path, props: &[(String, String)]) -> Result<(), ScrubError> {
    let mut content = String::new();
    for (key, value) in props {
        content.push_str(key);
        content.push('=');
        content.push_str(value);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| ScrubError::io(path, e))
}
