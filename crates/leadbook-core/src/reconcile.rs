//! Field reconciliation — folding a sparse donor into a canonical record.
//!
//! Scalars fill only where the canonical value is empty; a non-empty
//! canonical field is never overwritten. The duplicate-audit sets union in
//! the donor's own identifiers so the merge trail survives the donor's
//! deletion.

use crate::record::{CustomerRecord, RecordPatch, Scope};

/// Compute the patch that folds `donor` into `canonical`.
///
/// The donor's raw phone joins `duplicate_phones` unless it equals the
/// canonical's phone; its `lead_id` always joins `duplicate_lead_ids`; its
/// `date_added` joins `duplicate_date_adds` when present. The donor's own
/// audit sets carry over wholesale.
pub fn reconcile(canonical: &CustomerRecord, donor: &CustomerRecord) -> RecordPatch {
  let mut patch = RecordPatch::default();

  // Scope only ever upgrades from legacy to a concrete tenant.
  if canonical.scope == Scope::Global
    && let Scope::Tenant(id) = &donor.scope
  {
    patch.tenant = Some(id.clone());
  }

  if canonical.name.trim().is_empty() && !donor.name.trim().is_empty() {
    patch.name = Some(donor.name.clone());
  }
  if canonical.phone.trim().is_empty() && !donor.phone.trim().is_empty() {
    patch.phone = Some(donor.phone.clone());
  }
  patch.email = fill(&canonical.email, &donor.email);
  patch.country = fill(&canonical.country, &donor.country);
  if canonical.source.is_none() {
    patch.source = donor.source;
  }
  patch.date_added = fill(&canonical.date_added, &donor.date_added);
  patch.first_call_date = fill(&canonical.first_call_date, &donor.first_call_date);
  patch.first_call_status =
    fill(&canonical.first_call_status, &donor.first_call_status);
  patch.notes = fill(&canonical.notes, &donor.notes);
  patch.second_call_date = fill(&canonical.second_call_date, &donor.second_call_date);
  patch.second_call_status =
    fill(&canonical.second_call_status, &donor.second_call_status);
  patch.second_call_notes =
    fill(&canonical.second_call_notes, &donor.second_call_notes);
  patch.final_call_date = fill(&canonical.final_call_date, &donor.final_call_date);
  patch.final_status = fill(&canonical.final_status, &donor.final_status);
  patch.final_notes = fill(&canonical.final_notes, &donor.final_notes);
  patch.pronouns = fill(&canonical.pronouns, &donor.pronouns);
  patch.device = fill(&canonical.device, &donor.device);
  if canonical.lead_score.is_none() {
    patch.lead_score = donor.lead_score;
  }
  if canonical.last_updated.is_none() {
    patch.last_updated = donor.last_updated;
  }
  patch.last_message_snippet =
    fill(&canonical.last_message_snippet, &donor.last_message_snippet);
  if canonical.message_count.is_none() {
    patch.message_count = donor.message_count;
  }

  let mut phones = canonical.duplicate_phones.clone();
  phones.extend(donor.duplicate_phones.iter().cloned());
  if !donor.phone.trim().is_empty() && donor.phone != canonical.phone {
    phones.insert(donor.phone.clone());
  }
  if phones != canonical.duplicate_phones {
    patch.duplicate_phones = Some(phones);
  }

  let mut lead_ids = canonical.duplicate_lead_ids.clone();
  lead_ids.extend(donor.duplicate_lead_ids.iter().cloned());
  lead_ids.insert(donor.lead_id.clone());
  if lead_ids != canonical.duplicate_lead_ids {
    patch.duplicate_lead_ids = Some(lead_ids);
  }

  let mut date_adds = canonical.duplicate_date_adds.clone();
  date_adds.extend(donor.duplicate_date_adds.iter().cloned());
  if let Some(added) = donor.date_added.as_deref().filter(|d| !d.trim().is_empty()) {
    date_adds.insert(added.to_owned());
  }
  if date_adds != canonical.duplicate_date_adds {
    patch.duplicate_date_adds = Some(date_adds);
  }

  patch
}

fn fill(canonical: &Option<String>, donor: &Option<String>) -> Option<String> {
  if canonical.as_deref().is_some_and(|v| !v.trim().is_empty()) {
    return None;
  }
  donor
    .as_deref()
    .filter(|v| !v.trim().is_empty())
    .map(str::to_owned)
}
