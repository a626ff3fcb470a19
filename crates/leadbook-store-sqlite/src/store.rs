//! [`SqliteStore`] — the SQLite implementation of [`CustomerStore`] and
//! [`SettingsStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{types::Value, OptionalExtension as _};
use uuid::Uuid;

use leadbook_core::{
  record::{CustomerRecord, NewCustomerRecord, RecordPatch, Scope},
  settings::BrandSettings,
  store::{CustomerStore, SettingsStore},
};

use crate::{
  encode::{
    encode_uuid, patch_columns, record_values, scope_key, RawCustomer,
    CUSTOMER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Leadbook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a customer SELECT and decode every row.
  async fn query_records(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<CustomerRecord>> {
    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCustomer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomer::into_record).collect()
  }
}

// ─── CustomerStore impl ──────────────────────────────────────────────────────

impl CustomerStore for SqliteStore {
  type Error = Error;

  async fn list_by_scope(&self, scope: &Scope) -> Result<Vec<CustomerRecord>> {
    // Global selects only unscoped legacy rows; the populations never mix.
    let (sql, params) = match scope.as_tenant() {
      Some(tenant) => (
        format!(
          "SELECT {CUSTOMER_COLUMNS} FROM customers \
           WHERE tenant = ?1 ORDER BY created_at, record_id"
        ),
        vec![Value::from(tenant.to_owned())],
      ),
      None => (
        format!(
          "SELECT {CUSTOMER_COLUMNS} FROM customers \
           WHERE tenant IS NULL ORDER BY created_at, record_id"
        ),
        Vec::new(),
      ),
    };

    self.query_records(sql, params).await
  }

  async fn list_all(&self) -> Result<Vec<CustomerRecord>> {
    let sql = format!(
      "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at, record_id"
    );
    self.query_records(sql, Vec::new()).await
  }

  async fn insert(&self, input: NewCustomerRecord) -> Result<CustomerRecord> {
    let record = CustomerRecord {
      record_id: Uuid::new_v4(),
      created_at: Utc::now(),
      lead_id: input.lead_id,
      scope: input.scope,
      name: input.name,
      phone: input.phone,
      email: input.email,
      country: input.country,
      source: input.source,
      date_added: input.date_added,
      first_call_date: input.first_call_date,
      first_call_status: input.first_call_status,
      notes: input.notes,
      second_call_date: input.second_call_date,
      second_call_status: input.second_call_status,
      second_call_notes: input.second_call_notes,
      final_call_date: input.final_call_date,
      final_status: input.final_status,
      final_notes: input.final_notes,
      pronouns: input.pronouns,
      device: input.device,
      lead_score: input.lead_score,
      last_updated: input.last_updated,
      last_message_snippet: input.last_message_snippet,
      message_count: input.message_count,
      duplicate_phones: input.duplicate_phones,
      duplicate_lead_ids: input.duplicate_lead_ids,
      duplicate_date_adds: input.duplicate_date_adds,
    };

    let values = record_values(&record)?;
    let placeholders = (1..=values.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO customers ({CUSTOMER_COLUMNS}) VALUES ({placeholders})"),
          rusqlite::params_from_iter(values),
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn patch(&self, record_id: Uuid, patch: &RecordPatch) -> Result<()> {
    let columns = patch_columns(patch)?;
    if columns.is_empty() {
      return Ok(());
    }

    let assignments = columns
      .iter()
      .enumerate()
      .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "UPDATE customers SET {assignments} WHERE record_id = ?{}",
      columns.len() + 1
    );

    let mut params: Vec<Value> =
      columns.into_iter().map(|(_, value)| value).collect();
    params.push(Value::from(encode_uuid(record_id)));

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete(&self, record_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(record_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM customers WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SettingsStore impl ──────────────────────────────────────────────────────

impl SettingsStore for SqliteStore {
  type Error = Error;

  async fn get_brand(&self, scope: &Scope) -> Result<Option<BrandSettings>> {
    let key = scope_key(scope);

    let json: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT settings_json FROM brand_settings WHERE scope = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    json
      .as_deref()
      .map(serde_json::from_str)
      .transpose()
      .map_err(Error::from)
  }

  async fn put_brand(&self, scope: &Scope, settings: &BrandSettings) -> Result<()> {
    let key = scope_key(scope);
    let json = serde_json::to_string(settings)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO brand_settings (scope, settings_json) VALUES (?1, ?2)
           ON CONFLICT(scope) DO UPDATE SET settings_json = excluded.settings_json",
          rusqlite::params![key, json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
