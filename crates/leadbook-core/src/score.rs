//! Record completeness scoring — picks the canonical survivor among
//! duplicates.
//!
//! Scores are counted in half-points so the ranking stays a total order over
//! integers: a richness field is worth two half-points and the `last_updated`
//! marker one. Recency of `last_updated` itself never factors into ranking.

use crate::record::CustomerRecord;

/// A registered lead outranks any non-registered one regardless of how many
/// fields either carries (eleven richness fields at two half-points each is
/// 22 at most).
const REGISTERED_BONUS: u32 = 200;
const FIELD_POINTS: u32 = 2;
const LAST_UPDATED_POINTS: u32 = 1;

/// Completeness of `record`, in half-points. Higher is better; ties are
/// broken by the caller's stable ordering.
pub fn completeness(record: &CustomerRecord) -> u32 {
  let mut score = 0;

  if record.is_registered() {
    score += REGISTERED_BONUS;
  }

  let richness = [
    !record.name.trim().is_empty(),
    filled(&record.email),
    filled(&record.country),
    record.source.is_some(),
    filled(&record.first_call_date),
    filled(&record.second_call_date),
    filled(&record.final_call_date),
    filled(&record.notes),
    filled(&record.second_call_notes),
    filled(&record.final_notes),
    filled(&record.last_message_snippet),
  ];
  score += richness.iter().filter(|present| **present).count() as u32 * FIELD_POINTS;

  if record.last_updated.is_some() {
    score += LAST_UPDATED_POINTS;
  }

  score
}

fn filled(field: &Option<String>) -> bool {
  field.as_deref().is_some_and(|v| !v.trim().is_empty())
}
