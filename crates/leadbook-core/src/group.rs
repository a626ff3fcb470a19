//! Duplicate grouping by normalized phone key and by lead identifier.

use std::collections::BTreeMap;

use crate::{normalize::normalize_phone, record::CustomerRecord};

/// Group `records` by normalized phone key. Records whose phone holds no
/// digits are excluded entirely. Member order preserves input order; key
/// order is deterministic.
pub fn by_normalized_phone(
  records: &[CustomerRecord],
) -> BTreeMap<String, Vec<&CustomerRecord>> {
  let mut groups: BTreeMap<String, Vec<&CustomerRecord>> = BTreeMap::new();
  for record in records {
    let key = normalize_phone(&record.phone);
    if key.is_empty() {
      continue;
    }
    groups.entry(key).or_default().push(record);
  }
  groups
}

/// Group `records` by `lead_id`, preserving input order within each group.
pub fn by_lead_id(records: &[CustomerRecord]) -> BTreeMap<String, Vec<&CustomerRecord>> {
  let mut groups: BTreeMap<String, Vec<&CustomerRecord>> = BTreeMap::new();
  for record in records {
    groups.entry(record.lead_id.clone()).or_default().push(record);
  }
  groups
}

/// Retain only groups of two or more members — the actionable duplicates.
pub fn duplicates_only<'a>(
  groups: BTreeMap<String, Vec<&'a CustomerRecord>>,
) -> BTreeMap<String, Vec<&'a CustomerRecord>> {
  groups
    .into_iter()
    .filter(|(_, members)| members.len() >= 2)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil;

  #[test]
  fn groups_across_formatting_differences() {
    let records = vec![
      testutil::with_phone("a", "Jo", "+1 (555) 111-2222"),
      testutil::with_phone("b", "Jo Smith", "1.555.111.2222"),
      testutil::with_phone("c", "Sam", "999 888 7777"),
    ];

    let groups = by_normalized_phone(&records);

    assert_eq!(groups.len(), 2);
    let dupes = &groups["15551112222"];
    assert_eq!(dupes.len(), 2);
    // Input order survives grouping.
    assert_eq!(dupes[0].lead_id, "a");
    assert_eq!(dupes[1].lead_id, "b");
  }

  #[test]
  fn digitless_phones_are_never_grouped() {
    let records = vec![
      testutil::with_phone("a", "Jo", ""),
      testutil::with_phone("b", "Sam", "n/a"),
    ];
    assert!(by_normalized_phone(&records).is_empty());
  }

  #[test]
  fn singletons_are_not_duplicates() {
    let records = vec![
      testutil::with_phone("a", "Jo", "5551112222"),
      testutil::with_phone("b", "Jo2", "5551112222"),
      testutil::with_phone("c", "Sam", "9998887777"),
    ];

    let dupes = duplicates_only(by_normalized_phone(&records));

    assert_eq!(dupes.len(), 1);
    assert!(dupes.contains_key("5551112222"));
  }

  #[test]
  fn lead_id_groups_preserve_order() {
    let records = vec![
      testutil::with_phone("a", "first", "111111"),
      testutil::with_phone("b", "other", "222222"),
      testutil::with_phone("a", "second", "333333"),
    ];

    let groups = by_lead_id(&records);

    assert_eq!(groups["a"].len(), 2);
    assert_eq!(groups["a"][0].name, "first");
    assert_eq!(groups["a"][1].name, "second");
    assert_eq!(groups["b"].len(), 1);
  }
}
