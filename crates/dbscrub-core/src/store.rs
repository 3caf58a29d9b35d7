//! Shared storage access: row types and per-domain storage provisioning.
//!
//! A user domain's storage is a triple of tables (users, groups, group/user
//! memberships) whose names are computed at runtime from the domain's
//! descriptor. Table names cannot be bound as SQL parameters, so every
//! runtime-computed name is validated as a plain identifier before it is
//! spliced into a statement.

use rusqlite::{Connection, params};

use crate::error::ScrubError;

/// A row of the central domains table.
#[derive(Debug, Clone)]
pub struct DomainRow {
    /// Domain id; 0 is the platform domain.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Descriptor base name, from which the domain's storage and descriptor
    /// file names derive.
    pub descriptor: String,
    /// Authentication server entry name.
    pub auth_server: String,
    /// Storage driver: `sql` for domains backed by their own tables,
    /// anything else for directory-backed domains.
    pub driver: String,
}

/// A user row of the central users table, as read before migration.
#[derive(Debug, Clone)]
pub struct SourceUser {
    /// Central user id.
    pub id: i64,
    /// Identifier of the user in the domain's backing store.
    pub specific_id: String,
}

/// A group row of the central groups table, as read before migration.
///
/// The parent reference carries the parent's specific id, not its numeric
/// id: directory-backed stores link groups by their own identifiers.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    /// Central group id.
    pub id: i64,
    /// Identifier of the group in the domain's backing store.
    pub specific_id: String,
    /// Specific id of the parent group within the same domain, if any.
    pub parent_specific_id: Option<String>,
}

/// The three table names making up one domain's storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNames {
    /// Name of the domain's user table.
    pub users: String,
    /// Name of the domain's group table.
    pub groups: String,
    /// Name of the domain's membership table.
    pub memberships: String,
}

impl StorageNames {
    /// Derives the storage names from a domain descriptor base name.
    #[must_use]
    pub fn from_descriptor(descriptor: &str) -> Self {
        let prefix = descriptor.to_lowercase();
        Self {
            users: format!("{prefix}_user"),
            groups: format!("{prefix}_group"),
            memberships: format!("{prefix}_group_user_rel"),
        }
    }

    fn all(&self) -> [&str; 3] {
        [&self.users, &self.groups, &self.memberships]
    }

    pub(crate) fn validate(&self) -> Result<(), ScrubError> {
        for name in self.all() {
            if !is_valid_identifier(name) {
                return Err(ScrubError::InvalidStorageName {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether a table of that name exists in the database.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool, ScrubError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Creates the three tables of a domain's storage.
///
/// # Errors
///
/// Returns [`ScrubError::StorageConflict`] if any of the names is already
/// taken: this tool is one-shot and never overwrites existing storage.
pub fn create_domain_storage(conn: &Connection, names: &StorageNames) -> Result<(), ScrubError> {
    names.validate()?;
    for table in names.all() {
        if table_exists(conn, table)? {
            return Err(ScrubError::StorageConflict {
                table: table.to_string(),
            });
        }
    }
    conn.execute_batch(&format!(
        "CREATE TABLE {users} (
             id INTEGER PRIMARY KEY,
             first_name TEXT,
             last_name TEXT NOT NULL,
             email TEXT,
             login TEXT NOT NULL,
             password TEXT,
             password_valid TEXT NOT NULL DEFAULT 'Y',
             company TEXT,
             title TEXT,
             position TEXT
         );
         CREATE TABLE {groups} (
             id INTEGER PRIMARY KEY,
             parent_id INTEGER REFERENCES {groups} (id),
             name TEXT NOT NULL,
             description TEXT
         );
         CREATE TABLE {memberships} (
             user_id INTEGER NOT NULL REFERENCES {users} (id),
             group_id INTEGER NOT NULL REFERENCES {groups} (id)
         );",
        users = names.users,
        groups = names.groups,
        memberships = names.memberships,
    ))?;
    Ok(())
}

/// Drops the three tables of a domain's storage.
///
/// The membership table goes first so that, on stores enforcing foreign
/// keys, the referencing table never outlives the referenced ones.
///
/// # Errors
///
/// Returns an error if any table cannot be dropped.
pub fn drop_domain_storage(conn: &Connection, names: &StorageNames) -> Result<(), ScrubError> {
    names.validate()?;
    conn.execute_batch(&format!(
        "DROP TABLE {memberships};
         DROP TABLE {users};
         DROP TABLE {groups};",
        memberships = names.memberships,
        users = names.users,
        groups = names.groups,
    ))?;
    Ok(())
}
