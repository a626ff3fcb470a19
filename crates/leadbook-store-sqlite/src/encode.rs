//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The duplicate-audit sets
//! are stored as compact JSON string arrays. UUIDs are stored as hyphenated
//! lowercase strings. `Scope::Global` maps to a NULL `tenant` column on
//! customer rows and to the empty-string key on settings rows.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use leadbook_core::record::{CustomerRecord, LeadSource, RecordPatch, Scope};
use rusqlite::types::Value;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// `tenant` column form: NULL for global rows.
pub fn encode_tenant(scope: &Scope) -> Option<String> {
  scope.as_tenant().map(str::to_owned)
}

/// Settings primary-key form: the empty string keys the global row.
pub fn scope_key(scope: &Scope) -> String {
  scope.as_tenant().unwrap_or("").to_owned()
}

// ─── LeadSource ──────────────────────────────────────────────────────────────

pub fn encode_source(source: LeadSource) -> String {
  source.to_string()
}

pub fn decode_source(s: &str) -> Result<LeadSource> {
  s.parse().map_err(|_| Error::UnknownSource(s.to_owned()))
}

// ─── Audit sets ──────────────────────────────────────────────────────────────

pub fn encode_set(set: &BTreeSet<String>) -> Result<String> {
  Ok(serde_json::to_string(set)?)
}

pub fn decode_set(s: &str) -> Result<BTreeSet<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every customer SELECT; must match the field order
/// of [`RawCustomer`] and the value order of [`record_values`].
pub const CUSTOMER_COLUMNS: &str = "record_id, created_at, lead_id, tenant, \
  name, phone, email, country, source, date_added, \
  first_call_date, first_call_status, notes, \
  second_call_date, second_call_status, second_call_notes, \
  final_call_date, final_status, final_notes, \
  pronouns, device, lead_score, last_updated, last_message_snippet, \
  message_count, duplicate_phones, duplicate_lead_ids, duplicate_date_adds";

/// Raw strings read directly from a `customers` row.
pub struct RawCustomer {
  pub record_id:  String,
  pub created_at: String,
  pub lead_id:    String,
  pub tenant:     Option<String>,

  pub name:       String,
  pub phone:      String,
  pub email:      Option<String>,
  pub country:    Option<String>,
  pub source:     Option<String>,
  pub date_added: Option<String>,

  pub first_call_date:    Option<String>,
  pub first_call_status:  Option<String>,
  pub notes:              Option<String>,
  pub second_call_date:   Option<String>,
  pub second_call_status: Option<String>,
  pub second_call_notes:  Option<String>,
  pub final_call_date:    Option<String>,
  pub final_status:       Option<String>,
  pub final_notes:        Option<String>,

  pub pronouns:             Option<String>,
  pub device:               Option<String>,
  pub lead_score:           Option<f64>,
  pub last_updated:         Option<String>,
  pub last_message_snippet: Option<String>,
  pub message_count:        Option<i64>,

  pub duplicate_phones:    String,
  pub duplicate_lead_ids:  String,
  pub duplicate_date_adds: String,
}

impl RawCustomer {
  /// Read one row; column order must match [`CUSTOMER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:            row.get(0)?,
      created_at:           row.get(1)?,
      lead_id:              row.get(2)?,
      tenant:               row.get(3)?,
      name:                 row.get(4)?,
      phone:                row.get(5)?,
      email:                row.get(6)?,
      country:              row.get(7)?,
      source:               row.get(8)?,
      date_added:           row.get(9)?,
      first_call_date:      row.get(10)?,
      first_call_status:    row.get(11)?,
      notes:                row.get(12)?,
      second_call_date:     row.get(13)?,
      second_call_status:   row.get(14)?,
      second_call_notes:    row.get(15)?,
      final_call_date:      row.get(16)?,
      final_status:         row.get(17)?,
      final_notes:          row.get(18)?,
      pronouns:             row.get(19)?,
      device:               row.get(20)?,
      lead_score:           row.get(21)?,
      last_updated:         row.get(22)?,
      last_message_snippet: row.get(23)?,
      message_count:        row.get(24)?,
      duplicate_phones:     row.get(25)?,
      duplicate_lead_ids:   row.get(26)?,
      duplicate_date_adds:  row.get(27)?,
    })
  }

  pub fn into_record(self) -> Result<CustomerRecord> {
    Ok(CustomerRecord {
      record_id: decode_uuid(&self.record_id)?,
      created_at: decode_dt(&self.created_at)?,
      lead_id: self.lead_id,
      scope: Scope::from(self.tenant),
      name: self.name,
      phone: self.phone,
      email: self.email,
      country: self.country,
      source: self.source.as_deref().map(decode_source).transpose()?,
      date_added: self.date_added,
      first_call_date: self.first_call_date,
      first_call_status: self.first_call_status,
      notes: self.notes,
      second_call_date: self.second_call_date,
      second_call_status: self.second_call_status,
      second_call_notes: self.second_call_notes,
      final_call_date: self.final_call_date,
      final_status: self.final_status,
      final_notes: self.final_notes,
      pronouns: self.pronouns,
      device: self.device,
      lead_score: self.lead_score,
      last_updated: self.last_updated.as_deref().map(decode_dt).transpose()?,
      last_message_snippet: self.last_message_snippet,
      message_count: self.message_count,
      duplicate_phones: decode_set(&self.duplicate_phones)?,
      duplicate_lead_ids: decode_set(&self.duplicate_lead_ids)?,
      duplicate_date_adds: decode_set(&self.duplicate_date_adds)?,
    })
  }
}

// ─── Write encoding ──────────────────────────────────────────────────────────

/// A full record as SQL values, in [`CUSTOMER_COLUMNS`] order; used by
/// INSERT.
pub fn record_values(record: &CustomerRecord) -> Result<Vec<Value>> {
  Ok(vec![
    Value::from(encode_uuid(record.record_id)),
    Value::from(encode_dt(record.created_at)),
    Value::from(record.lead_id.clone()),
    Value::from(encode_tenant(&record.scope)),
    Value::from(record.name.clone()),
    Value::from(record.phone.clone()),
    Value::from(record.email.clone()),
    Value::from(record.country.clone()),
    Value::from(record.source.map(encode_source)),
    Value::from(record.date_added.clone()),
    Value::from(record.first_call_date.clone()),
    Value::from(record.first_call_status.clone()),
    Value::from(record.notes.clone()),
    Value::from(record.second_call_date.clone()),
    Value::from(record.second_call_status.clone()),
    Value::from(record.second_call_notes.clone()),
    Value::from(record.final_call_date.clone()),
    Value::from(record.final_status.clone()),
    Value::from(record.final_notes.clone()),
    Value::from(record.pronouns.clone()),
    Value::from(record.device.clone()),
    Value::from(record.lead_score),
    Value::from(record.last_updated.map(encode_dt)),
    Value::from(record.last_message_snippet.clone()),
    Value::from(record.message_count),
    Value::from(encode_set(&record.duplicate_phones)?),
    Value::from(encode_set(&record.duplicate_lead_ids)?),
    Value::from(encode_set(&record.duplicate_date_adds)?),
  ])
}

/// The provided columns of a patch as `(column, value)` pairs; used to build
/// the dynamic UPDATE statement. `None` fields contribute nothing.
pub fn patch_columns(patch: &RecordPatch) -> Result<Vec<(&'static str, Value)>> {
  let mut columns: Vec<(&'static str, Value)> = Vec::new();

  if let Some(v) = &patch.tenant {
    columns.push(("tenant", Value::from(v.clone())));
  }
  if let Some(v) = &patch.name {
    columns.push(("name", Value::from(v.clone())));
  }
  if let Some(v) = &patch.phone {
    columns.push(("phone", Value::from(v.clone())));
  }
  if let Some(v) = &patch.email {
    columns.push(("email", Value::from(v.clone())));
  }
  if let Some(v) = &patch.country {
    columns.push(("country", Value::from(v.clone())));
  }
  if let Some(v) = patch.source {
    columns.push(("source", Value::from(encode_source(v))));
  }
  if let Some(v) = &patch.date_added {
    columns.push(("date_added", Value::from(v.clone())));
  }
  if let Some(v) = &patch.first_call_date {
    columns.push(("first_call_date", Value::from(v.clone())));
  }
  if let Some(v) = &patch.first_call_status {
    columns.push(("first_call_status", Value::from(v.clone())));
  }
  if let Some(v) = &patch.notes {
    columns.push(("notes", Value::from(v.clone())));
  }
  if let Some(v) = &patch.second_call_date {
    columns.push(("second_call_date", Value::from(v.clone())));
  }
  if let Some(v) = &patch.second_call_status {
    columns.push(("second_call_status", Value::from(v.clone())));
  }
  if let Some(v) = &patch.second_call_notes {
    columns.push(("second_call_notes", Value::from(v.clone())));
  }
  if let Some(v) = &patch.final_call_date {
    columns.push(("final_call_date", Value::from(v.clone())));
  }
  if let Some(v) = &patch.final_status {
    columns.push(("final_status", Value::from(v.clone())));
  }
  if let Some(v) = &patch.final_notes {
    columns.push(("final_notes", Value::from(v.clone())));
  }
  if let Some(v) = &patch.pronouns {
    columns.push(("pronouns", Value::from(v.clone())));
  }
  if let Some(v) = &patch.device {
    columns.push(("device", Value::from(v.clone())));
  }
  if let Some(v) = patch.lead_score {
    columns.push(("lead_score", Value::from(v)));
  }
  if let Some(v) = patch.last_updated {
    columns.push(("last_updated", Value::from(encode_dt(v))));
  }
  if let Some(v) = &patch.last_message_snippet {
    columns.push(("last_message_snippet", Value::from(v.clone())));
  }
  if let Some(v) = patch.message_count {
    columns.push(("message_count", Value::from(v)));
  }
  if let Some(set) = &patch.duplicate_phones {
    columns.push(("duplicate_phones", Value::from(encode_set(set)?)));
  }
  if let Some(set) = &patch.duplicate_lead_ids {
    columns.push(("duplicate_lead_ids", Value::from(encode_set(set)?)));
  }
  if let Some(set) = &patch.duplicate_date_adds {
    columns.push(("duplicate_date_adds", Value::from(encode_set(set)?)));
  }

  Ok(columns)
}
