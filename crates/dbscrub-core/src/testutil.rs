//! Shared fixtures for the engine tests: an in-memory database carrying the
//! platform schema, and seeding helpers.

use rusqlite::{Connection, params};

pub(crate) const PLATFORM_SCHEMA: &str = "
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

pub(crate) fn platform_conn() -> Connection {
    let conn = Connection::open_in_memory().expect("failed to open in-memory database");
    conn.execute_batch(PLATFORM_SCHEMA)
        .expect("failed to create platform schema");
    conn
}

pub(crate) fn insert_domain(
    conn: &Connection,
    id: i64,
    name: &str,
    descriptor: &str,
    auth_server: &str,
    driver: &str,
) {
    conn.execute(
        "INSERT INTO domains (id, name, description, descriptor, auth_server, driver, server_url)
         VALUES (?1, ?2, NULL, ?3, ?4, ?5, 'https://intranet.example.org')",
        params![id, name, descriptor, auth_server, driver],
    )
    .expect("failed to insert domain");
}

pub(crate) fn insert_user(conn: &Connection, id: i64, domain_id: i64, specific_id: &str, state: &str) {
    conn.execute(
        "INSERT INTO users (id, domain_id, specific_id, first_name, last_name, email, login, state)
         VALUES (?1, ?2, ?3, 'Ada', 'Lovelace', 'ada@example.org', 'ada', ?4)",
        params![id, domain_id, specific_id, state],
    )
    .expect("failed to insert user");
}

pub(crate) fn insert_group(
    conn: &Connection,
    id: i64,
    domain_id: i64,
    specific_id: &str,
    parent_specific_id: Option<&str>,
) {
    conn.execute(
        "INSERT INTO groups (id, domain_id, specific_id, parent_specific_id, name, description)
         VALUES (?1, ?2, ?3, ?4, 'Engineering', 'the engineers')",
        params![id, domain_id, specific_id, parent_specific_id],
    )
    .expect("failed to insert group");
}

pub(crate) fn insert_membership(conn: &Connection, user_id: i64, group_id: i64) {
    conn.execute(
        "INSERT INTO group_user_memberships (user_id, group_id) VALUES (?1, ?2)",
        params![user_id, group_id],
    )
    .expect("failed to insert membership");
}
