//! SQL schema for the Leadbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS customers (
    record_id            TEXT PRIMARY KEY,
    created_at           TEXT NOT NULL,    -- RFC 3339 UTC; store-assigned
    lead_id              TEXT NOT NULL,
    tenant               TEXT,             -- NULL marks a legacy/global row
    name                 TEXT NOT NULL DEFAULT '',
    phone                TEXT NOT NULL DEFAULT '',
    email                TEXT,
    country              TEXT,
    source               TEXT,             -- LeadSource discriminant
    date_added           TEXT,
    first_call_date      TEXT,
    first_call_status    TEXT,
    notes                TEXT,
    second_call_date     TEXT,
    second_call_status   TEXT,
    second_call_notes    TEXT,
    final_call_date      TEXT,
    final_status         TEXT,
    final_notes          TEXT,
    pronouns             TEXT,
    device               TEXT,
    lead_score           REAL,
    last_updated         TEXT,             -- RFC 3339 UTC or NULL
    last_message_snippet TEXT,
    message_count        INTEGER,
    duplicate_phones     TEXT NOT NULL DEFAULT '[]',  -- JSON string arrays
    duplicate_lead_ids   TEXT NOT NULL DEFAULT '[]',
    duplicate_date_adds  TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS customers_tenant_idx      ON customers(tenant);
CREATE INDEX IF NOT EXISTS customers_tenant_lead_idx ON customers(tenant, lead_id);

-- Exactly one settings row per scope, upserted in place.
-- The empty string keys the global row.
CREATE TABLE IF NOT EXISTS brand_settings (
    scope         TEXT PRIMARY KEY,
    settings_json TEXT NOT NULL
);

PRAGMA user_version = 1;
";
