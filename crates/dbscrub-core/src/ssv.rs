//! The SSV audit channel.
//!
//! Every anonymized entity is appended to a semicolon-separated-value file
//! so the scrubbed dataset can be driven from tests afterwards (logging in
//! as a generated user requires knowing its generated login and password).
//! One file per entity kind, a header record on creation, and an explicit
//! close that flushes everything: the run orchestrator closes the channel on
//! the failure path too, where the database work is rolled back but the
//! audit files remain on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ScrubError;
use crate::model::{AnonAppInst, AnonNode, AnonPublication, AnonUser};

/// One append-only semicolon-delimited file.
#[derive(Debug)]
struct SsvFile {
    writer: BufWriter<File>,
}

impl SsvFile {
    fn create(dir: &Path, filename: &str, header: &[&str]) -> Result<Self, ScrubError> {
        let file = File::create(dir.join(filename)).map_err(ScrubError::Audit)?;
        let mut ssv = Self {
            writer: BufWriter::new(file),
        };
        ssv.write_record(header)?;
        Ok(ssv)
    }

    fn write_record(&mut self, fields: &[&str]) -> Result<(), ScrubError> {
        writeln!(self.writer, "{}", fields.join(";")).map_err(ScrubError::Audit)
    }

    fn close(mut self) -> Result<(), ScrubError> {
        self.writer.flush().map_err(ScrubError::Audit)
    }
}

/// The set of audit files of one run.
///
/// Opened once before the first unit runs and closed once after the last,
/// on the success and failure paths alike.
#[derive(Debug)]
pub struct SsvLogger {
    users: SsvFile,
    spaces: SsvFile,
    components: SsvFile,
    nodes: SsvFile,
    publications: SsvFile,
}

impl SsvLogger {
    /// Creates the audit files under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be created.
    pub fn open(dir: &Path) -> Result<Self, ScrubError> {
        Ok(Self {
            users: SsvFile::create(
                dir,
                "users.ssv",
                &["Id", "Firstname", "Lastname", "Login", "Password", "DomainId"],
            )?,
            spaces: SsvFile::create(dir, "spaces.ssv", &["Id"])?,
            components: SsvFile::create(dir, "components.ssv", &["Id", "Type"])?,
            nodes: SsvFile::create(dir, "nodes.ssv", &["Id", "Parent", "AppInstId"])?,
            publications: SsvFile::create(dir, "publications.ssv", &["Id", "AppInstId", "NodeId"])?,
        })
    }

    /// Records an anonymized user and the domain it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_user(&mut self, user: &AnonUser, domain_id: i64) -> Result<(), ScrubError> {
        self.users.write_record(&[
            &user.id.to_string(),
            &user.first_name,
            &user.last_name,
            &user.login,
            &user.plain_password,
            &domain_id.to_string(),
        ])
    }

    /// Records an anonymized space.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_space(&mut self, id: i64) -> Result<(), ScrubError> {
        self.spaces.write_record(&[&id.to_string()])
    }

    /// Records an anonymized application instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_component(&mut self, app: &AnonAppInst) -> Result<(), ScrubError> {
        self.components.write_record(&[&app.instance_id, &app.kind])
    }

    /// Records an anonymized node.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_node(&mut self, node: &AnonNode) -> Result<(), ScrubError> {
        let parent = node.parent_id.map(|id| id.to_string()).unwrap_or_default();
        self.nodes
            .write_record(&[&node.id.to_string(), &parent, &node.instance_id])
    }

    /// Records an anonymized publication.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write_publication(&mut self, publication: &AnonPublication) -> Result<(), ScrubError> {
        let node = publication
            .node_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.publications.write_record(&[
            &publication.id.to_string(),
            &publication.instance_id,
            &node,
        ])
    }

    /// Flushes and closes every audit file.
    ///
    /// # Errors
    ///
    /// Returns the first flush error; the remaining files are still closed.
    pub fn close(self) -> Result<(), ScrubError> {
        let results = [
            self.users.close(),
            self.spaces.close(),
            self.components.close(),
            self.nodes.close(),
            self.publications.close(),
        ];
        results.into_iter().collect()
    }
}
