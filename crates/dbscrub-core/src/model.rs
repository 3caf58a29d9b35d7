//! Anonymous entity values.
//!
//! Each type here is the anonymized rendition of one platform entity,
//! computed purely from the settings, the entity's numeric id and, for
//! localized entities, a locale. Building one has no side effect; the
//! scrubbers decide which columns of which rows receive the values.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::naming::templated_name;

/// Driver value recorded on every domain once anonymized: after a run, every
/// domain is SQL-backed.
pub const SQL_DRIVER: &str = "sql";

/// An anonymized user domain, with the technical name from which its storage
/// and descriptor names all derive.
#[derive(Debug, Clone)]
pub struct AnonDomain {
    /// The domain's id, unchanged by anonymization.
    pub id: i64,
    /// Placeholder display name.
    pub name: String,
    /// Replacement description (always cleared).
    pub description: Option<String>,
    /// Replacement server URL.
    pub server_url: Option<String>,
    /// New deterministic name, base of every derived name below.
    pub technical_name: String,
    /// Value of the domain's descriptor column; also the stem of the domain
    /// descriptor file and, lowercased, the prefix of the storage tables.
    pub descriptor: String,
    /// Name of the domain's authentication server entry.
    pub auth_server: String,
}

impl AnonDomain {
    /// Builds the anonymized rendition of the domain `id`.
    #[must_use]
    pub fn new(id: i64, config: &Config) -> Self {
        let prefix = config.naming.domain.name.as_deref();
        let technical_name = format!("{}{id}", prefix.unwrap_or("Domain").replace(' ', ""));
        Self {
            id,
            name: templated_name(prefix, "Domain", id),
            description: None,
            server_url: config.platform.server_url.clone(),
            descriptor: format!("domain{technical_name}"),
            auth_server: format!("auth{technical_name}"),
            technical_name,
        }
    }

    /// Driver recorded on the domain once its storage is SQL-backed.
    #[must_use]
    pub const fn driver(&self) -> &'static str {
        SQL_DRIVER
    }

    /// File name of the domain descriptor after anonymization.
    #[must_use]
    pub fn descriptor_file(&self) -> String {
        format!("{}.properties", self.descriptor)
    }

    /// File name of the authentication descriptor after anonymization.
    #[must_use]
    pub fn auth_descriptor_file(&self) -> String {
        format!("{}.properties", self.auth_server)
    }
}

/// An anonymized user identity.
#[derive(Debug, Clone)]
pub struct AnonUser {
    /// The user's central id, from which every placeholder field derives.
    pub id: i64,
    /// Placeholder first name.
    pub first_name: String,
    /// Placeholder last name.
    pub last_name: String,
    /// Shared placeholder email.
    pub email: String,
    /// Placeholder login, unique per user.
    pub login: String,
    /// The plaintext placeholder password, written to the audit file only.
    pub plain_password: String,
    /// SHA-256 hex digest of the placeholder password, written to the
    /// password columns.
    pub password_digest: String,
    /// Placeholder company.
    pub company: String,
}

impl AnonUser {
    /// Builds the anonymized identity of the user `id`.
    #[must_use]
    pub fn new(id: i64, config: &Config) -> Self {
        let user = &config.naming.user;
        let login = format!(
            "{first}{id}.{last}{id}",
            first = user.first_name.replace(' ', "").to_lowercase(),
            last = user.last_name.replace(' ', "").to_lowercase(),
        );
        Self {
            id,
            first_name: templated_name(Some(user.first_name.as_str()), "Firstname", id),
            last_name: templated_name(Some(user.last_name.as_str()), "Lastname", id),
            email: user.email.clone(),
            login,
            plain_password: user.password.clone(),
            password_digest: sha256_hex(user.password.as_bytes()),
            company: user.company.clone(),
        }
    }
}

/// An anonymized user group.
#[derive(Debug, Clone)]
pub struct AnonGroup {
    /// The group's central id.
    pub id: i64,
    /// Placeholder name.
    pub name: String,
    /// Replacement description (always cleared).
    pub description: Option<String>,
}

impl AnonGroup {
    /// Builds the anonymized rendition of the group `id`.
    #[must_use]
    pub fn new(id: i64, config: &Config) -> Self {
        Self {
            id,
            name: templated_name(config.naming.group.name.as_deref(), "Group", id),
            description: None,
        }
    }
}

/// An anonymized collaborative space.
#[derive(Debug, Clone)]
pub struct AnonSpace {
    /// The space's id.
    pub id: i64,
    /// Placeholder name in the requested locale.
    pub name: String,
    /// Replacement description in the requested locale.
    pub description: Option<String>,
}

impl AnonSpace {
    /// Builds the anonymized rendition of the space `id` for `locale`.
    #[must_use]
    pub fn new(id: i64, locale: &str, config: &Config) -> Self {
        let space = &config.naming.space;
        Self {
            id,
            name: templated_name(space.name_prefix(locale), "Space", id),
            description: space.description_for(locale).map(str::to_string),
        }
    }
}

/// An anonymized application instance.
#[derive(Debug, Clone)]
pub struct AnonAppInst {
    /// Technical id of the instance: its kind followed by its numeric id.
    pub instance_id: String,
    /// Kind of application the instance was created from.
    pub kind: String,
    /// Placeholder name; the fallback prefix is the application kind.
    pub name: String,
    /// Replacement description in the requested locale.
    pub description: Option<String>,
}

impl AnonAppInst {
    /// Builds the anonymized rendition of the instance `id` of `kind`.
    #[must_use]
    pub fn new(kind: &str, id: i64, locale: &str, config: &Config) -> Self {
        let app = &config.naming.app;
        Self {
            instance_id: format!("{kind}{id}"),
            kind: kind.to_string(),
            name: templated_name(app.name_prefix(locale), kind, id),
            description: app.description_for(locale).map(str::to_string),
        }
    }
}

/// Classification of a node by the kind of application instance owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A document folder.
    Folder,
    /// A media album.
    Album,
    /// A classification category (blogs and everything else).
    Category,
}

impl NodeKind {
    /// Classifies a node from the technical id of its owning instance
    /// (the application kind followed by the instance number).
    #[must_use]
    pub fn of_instance(instance_id: &str) -> Self {
        let kind: String = instance_id
            .chars()
            .take_while(|c| !c.is_ascii_digit())
            .collect();
        match kind.as_str() {
            "docs" | "toolbox" => Self::Folder,
            "media" => Self::Album,
            _ => Self::Category,
        }
    }

    fn fallback_label(self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::Album => "Album",
            Self::Category => "Category",
        }
    }
}

/// An anonymized node (folder, album or category).
#[derive(Debug, Clone)]
pub struct AnonNode {
    /// The node's id within its instance.
    pub id: i64,
    /// Technical id of the owning application instance.
    pub instance_id: String,
    /// Id of the parent node, if any.
    pub parent_id: Option<i64>,
    /// Placeholder name in the requested locale.
    pub name: String,
    /// Replacement description in the requested locale.
    pub description: Option<String>,
}

impl AnonNode {
    /// Builds the anonymized rendition of a node for `locale`.
    #[must_use]
    pub fn new(
        id: i64,
        instance_id: &str,
        parent_id: Option<i64>,
        locale: &str,
        config: &Config,
    ) -> Self {
        let kind = NodeKind::of_instance(instance_id);
        let naming = match kind {
            NodeKind::Folder => &config.naming.folder,
            NodeKind::Album => &config.naming.album,
            NodeKind::Category => &config.naming.category,
        };
        Self {
            id,
            instance_id: instance_id.to_string(),
            parent_id,
            name: templated_name(naming.name_prefix(locale), kind.fallback_label(), id),
            description: naming.description_for(locale).map(str::to_string),
        }
    }
}

/// An anonymized publication.
#[derive(Debug, Clone)]
pub struct AnonPublication {
    /// The publication's id.
    pub id: i64,
    /// Technical id of the owning application instance.
    pub instance_id: String,
    /// Id of the parent node the publication is filed under, if any.
    pub node_id: Option<i64>,
    /// Placeholder name in the requested locale.
    pub name: String,
    /// Replacement description in the requested locale.
    pub description: Option<String>,
    /// Replacement keywords in the requested locale.
    pub keywords: Option<String>,
}

impl AnonPublication {
    /// Builds the anonymized rendition of the publication `id` for `locale`.
    #[must_use]
    pub fn new(
        id: i64,
        instance_id: &str,
        node_id: Option<i64>,
        locale: &str,
        config: &Config,
    ) -> Self {
        let publication = &config.naming.publication;
        Self {
            id,
            instance_id: instance_id.to_string(),
            node_id,
            name: templated_name(publication.name_prefix(locale), "Publication", id),
            description: publication.description_for(locale).map(str::to_string),
            keywords: publication.keywords_for(locale).map(str::to_string),
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
