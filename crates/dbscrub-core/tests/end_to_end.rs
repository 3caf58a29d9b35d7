//! End-to-end runs against a database file, through the public API.

use std::collections::HashSet;

use rusqlite::Connection;
use tempfile::TempDir;

use dbscrub_core::ident::encode_specific_id;
use dbscrub_core::store::{StorageNames, create_domain_storage, table_exists};
use dbscrub_core::{Config, run};

const PLATFORM_SCHEMA: &str = "
    CREATE TABLE domains (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        descriptor TEXT NOT NULL,
        auth_server TEXT NOT NULL,
        driver TEXT NOT NULL,
        server_url TEXT
    );
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        domain_id INTEGER NOT NULL,
        specific_id TEXT NOT NULL,
        first_name TEXT,
        last_name TEXT NOT NULL,
        email TEXT,
        login TEXT NOT NULL,
        state TEXT NOT NULL
    );
    CREATE TABLE groups (
        id INTEGER PRIMARY KEY,
        domain_id INTEGER NOT NULL,
        specific_id TEXT NOT NULL,
        parent_specific_id TEXT,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE group_user_memberships (
        user_id INTEGER NOT NULL,
        group_id INTEGER NOT NULL
    );
    CREATE TABLE domain_platform_user (
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
    CREATE TABLE domain_platform_group (
        id INTEGER PRIMARY KEY,
        parent_id INTEGER,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE spaces (
        id INTEGER PRIMARY KEY,
        parent_id INTEGER,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE space_i18n (
        id INTEGER PRIMARY KEY,
        space_id INTEGER NOT NULL,
        lang TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE component_instances (
        id INTEGER PRIMARY KEY,
        space_id INTEGER,
        kind TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE component_instance_i18n (
        id INTEGER PRIMARY KEY,
        component_id INTEGER NOT NULL,
        lang TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE nodes (
        id INTEGER NOT NULL,
        instance_id TEXT NOT NULL,
        parent_id INTEGER,
        name TEXT NOT NULL,
        description TEXT,
        PRIMARY KEY (id, instance_id)
    );
    CREATE TABLE node_i18n (
        id INTEGER PRIMARY KEY,
        node_id INTEGER NOT NULL,
        instance_id TEXT,
        lang TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE publications (
        id INTEGER PRIMARY KEY,
        instance_id TEXT NOT NULL,
        lang TEXT,
        name TEXT NOT NULL,
        description TEXT,
        keywords TEXT
    );
    CREATE TABLE publication_i18n (
        id INTEGER PRIMARY KEY,
        publication_id INTEGER NOT NULL,
        lang TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        keywords TEXT
    );
    CREATE TABLE publication_parents (
        publication_id INTEGER NOT NULL,
        node_id INTEGER
    );
";

struct Env {
    dir: TempDir,
    config: Config,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let mut config = Config::default();
        config.database.path = dir.path().join("platform.db");
        config.audit.dir = dir.path().to_path_buf();
        Self { dir, config }
    }

    fn connect(&self) -> Connection {
        Connection::open(&self.config.database.path).expect("failed to open database")
    }

    fn seed(&self, statements: &str) {
        let conn = self.connect();
        conn.execute_batch(PLATFORM_SCHEMA)
            .expect("failed to create schema");
        conn.execute_batch(statements).expect("failed to seed");
    }
}

#[test]
fn directory_domain_conversion_end_to_end() {
    let env = Env::new();
    env.seed(
        "INSERT INTO domains (id, name, descriptor, auth_server, driver, server_url)
         VALUES (5, 'People', 'domainPeople', 'authPeople', 'ldap', 'https://old.example.org');
         INSERT INTO users (id, domain_id, specific_id, last_name, login, state)
         VALUES (10, 5, 'alice01', 'Aldrin', 'alice', 'VALID');
         INSERT INTO groups (id, domain_id, specific_id, parent_specific_id, name)
         VALUES (20, 5, 'grp-eng', NULL, 'Engineering');
         INSERT INTO group_user_memberships (user_id, group_id) VALUES (10, 20);",
    );

    let summary = run(&env.config, |_| {}).expect("run failed");
    assert_eq!(summary.domains, 1);

    let conn = env.connect();
    let user_id = encode_specific_id("alice01");
    let group_id = encode_specific_id("grp-eng");

    let stored_user: i64 = conn
        .query_row("SELECT id FROM domaindomain5_user", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored_user, user_id);

    let (stored_group, parent): (i64, Option<i64>) = conn
        .query_row("SELECT id, parent_id FROM domaindomain5_group", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(stored_group, group_id);
    assert_eq!(parent, None);

    let link: (i64, i64) = conn
        .query_row(
            "SELECT user_id, group_id FROM domaindomain5_group_user_rel",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(link, (user_id, group_id));

    let specific: String = conn
        .query_row("SELECT specific_id FROM users WHERE id = 10", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(specific, user_id.to_string());

    let audit = std::fs::read_to_string(env.dir.path().join("users.ssv")).unwrap();
    assert!(audit.contains("10;Firstname 10;Lastname 10;firstname10.lastname10;password;5"));
}

#[test]
fn sql_domain_rename_keeps_the_membership_graph() {
    let env = Env::new();
    env.seed(
        "INSERT INTO domains (id, name, descriptor, auth_server, driver)
         VALUES (2, 'Customers', 'domainCustomers', 'authCustomers', 'sql');",
    );
    {
        let conn = env.connect();
        create_domain_storage(&conn, &StorageNames::from_descriptor("domainCustomers")).unwrap();
        conn.execute_batch(
            "INSERT INTO domaincustomers_user (id, last_name, login) VALUES (1, 'Hay', 'rhay');
             INSERT INTO domaincustomers_user (id, last_name, login) VALUES (2, 'Lim', 'slim');
             INSERT INTO domaincustomers_group (id, parent_id, name) VALUES (101, NULL, 'Sales');
             INSERT INTO domaincustomers_group (id, parent_id, name) VALUES (102, 101, 'EMEA');
             INSERT INTO domaincustomers_group_user_rel (user_id, group_id) VALUES (1, 101);
             INSERT INTO domaincustomers_group_user_rel (user_id, group_id) VALUES (2, 102);",
        )
        .unwrap();
    }

    run(&env.config, |_| {}).expect("run failed");

    let conn = env.connect();
    let links: HashSet<(i64, i64)> = conn
        .prepare("SELECT user_id, group_id FROM domaindomain2_group_user_rel")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(links, HashSet::from([(1, 101), (2, 102)]));

    assert!(!table_exists(&conn, "domaincustomers_user").unwrap());

    // Identity was replaced, ids were not.
    let (id, last_name): (i64, String) = conn
        .query_row(
            "SELECT id, last_name FROM domaindomain2_user WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(last_name, "Lastname 1");
}

#[test]
fn platform_domain_keeps_its_storage() {
    let env = Env::new();
    env.seed(
        "INSERT INTO domains (id, name, descriptor, auth_server, driver, server_url)
         VALUES (0, 'Platform', 'domainPlatform', 'authPlatform', 'sql', 'https://old.example.org');",
    );
    let mut config = env.config.clone();
    config.platform.server_url = Some("https://scrubbed.example.org".to_string());

    run(&config, |_| {}).expect("run failed");

    let conn = env.connect();
    let (name, descriptor, server_url): (String, String, Option<String>) = conn
        .query_row(
            "SELECT name, descriptor, server_url FROM domains WHERE id = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(name, "Platform");
    assert_eq!(descriptor, "domainPlatform");
    assert_eq!(server_url.as_deref(), Some("https://scrubbed.example.org"));
    assert!(!table_exists(&conn, "domaindomain0_user").unwrap());
}
