//! Customer record types — the canonical entities of the Leadbook store.
//!
//! A [`CustomerRecord`] is the persisted row; [`IncomingRecord`] is one row
//! of a client-supplied batch; [`NewCustomerRecord`] is the insert input
//! (the store assigns `record_id` and `created_at`); [`RecordPatch`] is a
//! partial update where `None` leaves a column untouched.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::normalize_phone;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Minimum normalized digit count for a phone to identify a record on its
/// own. A heuristic threshold, so it lives here as a named constant.
pub const MIN_PHONE_DIGITS: usize = 5;

/// Final-stage status marking a fully registered lead.
pub const REGISTERED: &str = "Registered";

/// Name values that carry no identifying signal, compared case-insensitively.
pub const PLACEHOLDER_NAMES: [&str; 2] = ["unknown", "unnamed"];

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Tenant scope of a record. `Global` marks legacy rows written before
/// tenant separation existed; the customer core never merges the two sets.
///
/// Serialises as the tenant id string, or `null` for `Global`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Scope {
  #[default]
  Global,
  Tenant(String),
}

impl Scope {
  pub fn as_tenant(&self) -> Option<&str> {
    match self {
      Self::Tenant(id) => Some(id),
      Self::Global => None,
    }
  }
}

impl From<Option<String>> for Scope {
  fn from(value: Option<String>) -> Self {
    match value {
      Some(id) if !id.trim().is_empty() => Self::Tenant(id),
      _ => Self::Global,
    }
  }
}

impl From<Scope> for Option<String> {
  fn from(scope: Scope) -> Self {
    match scope {
      Scope::Global => None,
      Scope::Tenant(id) => Some(id),
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Global => f.write_str("global"),
      Self::Tenant(id) => f.write_str(id),
    }
  }
}

// ─── LeadSource ──────────────────────────────────────────────────────────────

/// Acquisition channel for a lead. Absent means the channel is unknown.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeadSource {
  Instagram,
  Facebook,
  TikTok,
  WhatsApp,
  WebForm,
}

// ─── CustomerRecord ──────────────────────────────────────────────────────────

/// The canonical persisted customer/lead entity.
///
/// `record_id` and `created_at` are assigned by the store and never patched.
/// The duplicate-audit sets are monotonically non-decreasing: merging only
/// ever adds to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
  pub record_id:  Uuid,
  pub created_at: DateTime<Utc>,
  pub lead_id:    String,
  pub scope:      Scope,

  pub name:       String,
  /// Raw phone exactly as received; matching uses the normalized key.
  pub phone:      String,
  pub email:      Option<String>,
  pub country:    Option<String>,
  pub source:     Option<LeadSource>,
  pub date_added: Option<String>,

  // Pipeline stages: contact → first call → second call → final.
  pub first_call_date:    Option<String>,
  pub first_call_status:  Option<String>,
  pub notes:              Option<String>,
  pub second_call_date:   Option<String>,
  pub second_call_status: Option<String>,
  pub second_call_notes:  Option<String>,
  pub final_call_date:    Option<String>,
  pub final_status:       Option<String>,
  pub final_notes:        Option<String>,

  // Enrichment.
  pub pronouns:             Option<String>,
  pub device:               Option<String>,
  pub lead_score:           Option<f64>,
  pub last_updated:         Option<DateTime<Utc>>,
  pub last_message_snippet: Option<String>,
  pub message_count:        Option<i64>,

  // Duplicate-audit trail.
  #[serde(default)]
  pub duplicate_phones:    BTreeSet<String>,
  #[serde(default)]
  pub duplicate_lead_ids:  BTreeSet<String>,
  #[serde(default)]
  pub duplicate_date_adds: BTreeSet<String>,
}

impl CustomerRecord {
  pub fn is_registered(&self) -> bool {
    self.final_status.as_deref() == Some(REGISTERED)
  }

  /// Whether this record carries any identifying signal at all.
  pub fn is_meaningful(&self) -> bool {
    meaningful(&self.name, &self.phone, self.email.as_deref())
  }

  /// Mirror `patch` onto this in-memory record, the same way the store
  /// applies it to the persisted row.
  pub fn apply(&mut self, patch: &RecordPatch) {
    if let Some(tenant) = &patch.tenant {
      self.scope = Scope::Tenant(tenant.clone());
    }
    if let Some(name) = &patch.name {
      self.name = name.clone();
    }
    if let Some(phone) = &patch.phone {
      self.phone = phone.clone();
    }
    if let Some(email) = &patch.email {
      self.email = Some(email.clone());
    }
    if let Some(country) = &patch.country {
      self.country = Some(country.clone());
    }
    if let Some(source) = patch.source {
      self.source = Some(source);
    }
    if let Some(date_added) = &patch.date_added {
      self.date_added = Some(date_added.clone());
    }
    if let Some(v) = &patch.first_call_date {
      self.first_call_date = Some(v.clone());
    }
    if let Some(v) = &patch.first_call_status {
      self.first_call_status = Some(v.clone());
    }
    if let Some(v) = &patch.notes {
      self.notes = Some(v.clone());
    }
    if let Some(v) = &patch.second_call_date {
      self.second_call_date = Some(v.clone());
    }
    if let Some(v) = &patch.second_call_status {
      self.second_call_status = Some(v.clone());
    }
    if let Some(v) = &patch.second_call_notes {
      self.second_call_notes = Some(v.clone());
    }
    if let Some(v) = &patch.final_call_date {
      self.final_call_date = Some(v.clone());
    }
    if let Some(v) = &patch.final_status {
      self.final_status = Some(v.clone());
    }
    if let Some(v) = &patch.final_notes {
      self.final_notes = Some(v.clone());
    }
    if let Some(v) = &patch.pronouns {
      self.pronouns = Some(v.clone());
    }
    if let Some(v) = &patch.device {
      self.device = Some(v.clone());
    }
    if let Some(v) = patch.lead_score {
      self.lead_score = Some(v);
    }
    if let Some(v) = patch.last_updated {
      self.last_updated = Some(v);
    }
    if let Some(v) = &patch.last_message_snippet {
      self.last_message_snippet = Some(v.clone());
    }
    if let Some(v) = patch.message_count {
      self.message_count = Some(v);
    }
    if let Some(set) = &patch.duplicate_phones {
      self.duplicate_phones = set.clone();
    }
    if let Some(set) = &patch.duplicate_lead_ids {
      self.duplicate_lead_ids = set.clone();
    }
    if let Some(set) = &patch.duplicate_date_adds {
      self.duplicate_date_adds = set.clone();
    }
  }
}

/// A record with no usable name, no phone of at least [`MIN_PHONE_DIGITS`]
/// digits, and no email cannot be matched to a real lead; it is skipped on
/// import and purged by maintenance.
pub fn meaningful(name: &str, phone: &str, email: Option<&str>) -> bool {
  let trimmed = name.trim();
  let named = !trimmed.is_empty()
    && !PLACEHOLDER_NAMES
      .iter()
      .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder));

  named
    || normalize_phone(phone).len() >= MIN_PHONE_DIGITS
    || email.is_some_and(|e| !e.trim().is_empty())
}

// ─── NewCustomerRecord ───────────────────────────────────────────────────────

/// Input to [`crate::store::CustomerStore::insert`].
/// `record_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Default)]
pub struct NewCustomerRecord {
  pub lead_id:    String,
  pub scope:      Scope,
  pub name:       String,
  pub phone:      String,
  pub email:      Option<String>,
  pub country:    Option<String>,
  pub source:     Option<LeadSource>,
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
  pub last_updated:         Option<DateTime<Utc>>,
  pub last_message_snippet: Option<String>,
  pub message_count:        Option<i64>,

  pub duplicate_phones:    BTreeSet<String>,
  pub duplicate_lead_ids:  BTreeSet<String>,
  pub duplicate_date_adds: BTreeSet<String>,
}

// ─── IncomingRecord ──────────────────────────────────────────────────────────

/// One client-supplied row of a bulk-upsert batch. Every field is optional;
/// a missing `lead_id` is synthesized by the reconciler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingRecord {
  pub lead_id:    Option<String>,
  pub name:       Option<String>,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub country:    Option<String>,
  pub source:     Option<LeadSource>,
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
  pub last_updated:         Option<DateTime<Utc>>,
  pub last_message_snippet: Option<String>,
  pub message_count:        Option<i64>,
}

impl IncomingRecord {
  pub fn is_meaningful(&self) -> bool {
    meaningful(
      self.name.as_deref().unwrap_or(""),
      self.phone.as_deref().unwrap_or(""),
      self.email.as_deref(),
    )
  }

  /// Patch carrying every provided field. The tenant column is set only for
  /// a concrete call scope, so an existing assignment is never cleared.
  pub fn to_patch(&self, scope: &Scope) -> RecordPatch {
    RecordPatch {
      tenant: scope.as_tenant().map(str::to_owned),
      name: self.name.clone(),
      phone: self.phone.clone(),
      email: self.email.clone(),
      country: self.country.clone(),
      source: self.source,
      date_added: self.date_added.clone(),
      first_call_date: self.first_call_date.clone(),
      first_call_status: self.first_call_status.clone(),
      notes: self.notes.clone(),
      second_call_date: self.second_call_date.clone(),
      second_call_status: self.second_call_status.clone(),
      second_call_notes: self.second_call_notes.clone(),
      final_call_date: self.final_call_date.clone(),
      final_status: self.final_status.clone(),
      final_notes: self.final_notes.clone(),
      pronouns: self.pronouns.clone(),
      device: self.device.clone(),
      lead_score: self.lead_score,
      last_updated: self.last_updated,
      last_message_snippet: self.last_message_snippet.clone(),
      message_count: self.message_count,
      duplicate_phones: None,
      duplicate_lead_ids: None,
      duplicate_date_adds: None,
    }
  }

  /// Convert into an insert input under `lead_id` and the call scope.
  pub fn into_new_record(self, lead_id: String, scope: &Scope) -> NewCustomerRecord {
    NewCustomerRecord {
      lead_id,
      scope: scope.clone(),
      name: self.name.unwrap_or_default(),
      phone: self.phone.unwrap_or_default(),
      email: self.email,
      country: self.country,
      source: self.source,
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
      last_updated: self.last_updated,
      last_message_snippet: self.last_message_snippet,
      message_count: self.message_count,
      duplicate_phones: BTreeSet::new(),
      duplicate_lead_ids: BTreeSet::new(),
      duplicate_date_adds: BTreeSet::new(),
    }
  }
}

// ─── RecordPatch ─────────────────────────────────────────────────────────────

/// Partial update against a stored record. `None` leaves the column
/// untouched. Audit-set members are whole replacement values computed as
/// unions, so applying a patch can never shrink a set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
  pub tenant:     Option<String>,
  pub name:       Option<String>,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub country:    Option<String>,
  pub source:     Option<LeadSource>,
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
  pub last_updated:         Option<DateTime<Utc>>,
  pub last_message_snippet: Option<String>,
  pub message_count:        Option<i64>,

  pub duplicate_phones:    Option<BTreeSet<String>>,
  pub duplicate_lead_ids:  Option<BTreeSet<String>>,
  pub duplicate_date_adds: Option<BTreeSet<String>>,
}

impl RecordPatch {
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }

  /// Fold `other` into `self`. Scalars already claimed by an earlier patch
  /// win; audit sets union.
  pub fn merge(&mut self, other: RecordPatch) {
    self.tenant = self.tenant.take().or(other.tenant);
    self.name = self.name.take().or(other.name);
    self.phone = self.phone.take().or(other.phone);
    self.email = self.email.take().or(other.email);
    self.country = self.country.take().or(other.country);
    self.source = self.source.take().or(other.source);
    self.date_added = self.date_added.take().or(other.date_added);
    self.first_call_date = self.first_call_date.take().or(other.first_call_date);
    self.first_call_status = self.first_call_status.take().or(other.first_call_status);
    self.notes = self.notes.take().or(other.notes);
    self.second_call_date = self.second_call_date.take().or(other.second_call_date);
    self.second_call_status =
      self.second_call_status.take().or(other.second_call_status);
    self.second_call_notes = self.second_call_notes.take().or(other.second_call_notes);
    self.final_call_date = self.final_call_date.take().or(other.final_call_date);
    self.final_status = self.final_status.take().or(other.final_status);
    self.final_notes = self.final_notes.take().or(other.final_notes);
    self.pronouns = self.pronouns.take().or(other.pronouns);
    self.device = self.device.take().or(other.device);
    self.lead_score = self.lead_score.take().or(other.lead_score);
    self.last_updated = self.last_updated.take().or(other.last_updated);
    self.last_message_snippet = self
      .last_message_snippet
      .take()
      .or(other.last_message_snippet);
    self.message_count = self.message_count.take().or(other.message_count);
    self.duplicate_phones =
      union(self.duplicate_phones.take(), other.duplicate_phones);
    self.duplicate_lead_ids =
      union(self.duplicate_lead_ids.take(), other.duplicate_lead_ids);
    self.duplicate_date_adds =
      union(self.duplicate_date_adds.take(), other.duplicate_date_adds);
  }
}

fn union(
  a: Option<BTreeSet<String>>,
  b: Option<BTreeSet<String>>,
) -> Option<BTreeSet<String>> {
  match (a, b) {
    (Some(mut a), Some(b)) => {
      a.extend(b);
      Some(a)
    }
    (a, b) => a.or(b),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_from_option() {
    assert_eq!(Scope::from(None), Scope::Global);
    assert_eq!(Scope::from(Some("  ".to_owned())), Scope::Global);
    assert_eq!(
      Scope::from(Some("acme".to_owned())),
      Scope::Tenant("acme".to_owned())
    );
  }

  #[test]
  fn scope_serde_roundtrip() {
    let json = serde_json::to_string(&Scope::Tenant("acme".to_owned())).unwrap();
    assert_eq!(json, "\"acme\"");
    let back: Scope = serde_json::from_str("null").unwrap();
    assert_eq!(back, Scope::Global);
  }

  #[test]
  fn meaningful_requires_some_signal() {
    assert!(!meaningful("", "", None));
    assert!(!meaningful("Unknown", "", None));
    assert!(!meaningful("unnamed", "123", Some("  ")));
    assert!(meaningful("Jo", "", None));
    assert!(meaningful("", "555-12", None));
    assert!(!meaningful("", "55-51", None)); // only four digits
    assert!(meaningful("", "", Some("jo@x.com")));
  }

  #[test]
  fn incoming_meaningful_mirrors_record_predicate() {
    let junk = IncomingRecord {
      name: Some("Unknown".to_owned()),
      phone: Some("".to_owned()),
      ..Default::default()
    };
    assert!(!junk.is_meaningful());

    let ok = IncomingRecord {
      email: Some("jo@x.com".to_owned()),
      ..Default::default()
    };
    assert!(ok.is_meaningful());
  }

  #[test]
  fn to_patch_keeps_global_scope_out() {
    let incoming = IncomingRecord {
      name: Some("Jo".to_owned()),
      ..Default::default()
    };
    assert_eq!(incoming.to_patch(&Scope::Global).tenant, None);
    assert_eq!(
      incoming
        .to_patch(&Scope::Tenant("acme".to_owned()))
        .tenant
        .as_deref(),
      Some("acme")
    );
  }

  #[test]
  fn merge_prefers_earlier_scalars_and_unions_sets() {
    let mut first = RecordPatch {
      email: Some("first@x.com".to_owned()),
      duplicate_lead_ids: Some(BTreeSet::from(["a".to_owned()])),
      ..Default::default()
    };
    let second = RecordPatch {
      email: Some("second@x.com".to_owned()),
      country: Some("US".to_owned()),
      duplicate_lead_ids: Some(BTreeSet::from(["b".to_owned()])),
      ..Default::default()
    };
    first.merge(second);

    assert_eq!(first.email.as_deref(), Some("first@x.com"));
    assert_eq!(first.country.as_deref(), Some("US"));
    assert_eq!(
      first.duplicate_lead_ids,
      Some(BTreeSet::from(["a".to_owned(), "b".to_owned()]))
    );
  }

  #[test]
  fn patch_is_empty() {
    assert!(RecordPatch::default().is_empty());
    let patch = RecordPatch {
      name: Some("Jo".to_owned()),
      ..Default::default()
    };
    assert!(!patch.is_empty());
  }
}
