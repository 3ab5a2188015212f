//! Database schema and migrations for giveaway-scout.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The `schema_version`
/// table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: subscriber -> destination channel mapping
    r#"
CREATE TABLE subscriber_channels (
    subscriber_id  TEXT PRIMARY KEY,
    channel_id     INTEGER NOT NULL,
    updated_at     TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
