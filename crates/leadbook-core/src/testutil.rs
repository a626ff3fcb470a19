//! Record factories shared by the unit tests.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::record::{CustomerRecord, Scope};

/// A blank record under `lead_id`, created at a fixed instant so tests can
/// control relative creation order explicitly.
pub fn blank(lead_id: &str) -> CustomerRecord {
  CustomerRecord {
    record_id: Uuid::new_v4(),
    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    lead_id: lead_id.to_owned(),
    scope: Scope::Global,
    name: String::new(),
    phone: String::new(),
    email: None,
    country: None,
    source: None,
    date_added: None,
    first_call_date: None,
    first_call_status: None,
    notes: None,
    second_call_date: None,
    second_call_status: None,
    second_call_notes: None,
    final_call_date: None,
    final_status: None,
    final_notes: None,
    pronouns: None,
    device: None,
    lead_score: None,
    last_updated: None,
    last_message_snippet: None,
    message_count: None,
    duplicate_phones: Default::default(),
    duplicate_lead_ids: Default::default(),
    duplicate_date_adds: Default::default(),
  }
}

/// A named record with a phone, the common duplicate-sweep shape.
pub fn with_phone(lead_id: &str, name: &str, phone: &str) -> CustomerRecord {
  let mut record = blank(lead_id);
  record.name = name.to_owned();
  record.phone = phone.to_owned();
  record
}
