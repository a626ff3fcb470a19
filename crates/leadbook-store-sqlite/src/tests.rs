//! Integration tests for `SqliteStore` against an in-memory database,
//! including the reconciliation operations that run on top of it.

use std::collections::HashSet;

use leadbook_core::{
  record::{
    CustomerRecord, IncomingRecord, LeadSource, NewCustomerRecord, RecordPatch,
    Scope, REGISTERED,
  },
  settings::{self, BrandSettings, MAX_BRAND_PAYLOAD_BYTES},
  store::{CustomerStore, SettingsStore},
  sweep, upsert,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn acme() -> Scope {
  Scope::Tenant("acme".to_owned())
}

fn seed(lead_id: &str, scope: &Scope, name: &str, phone: &str) -> NewCustomerRecord {
  NewCustomerRecord {
    lead_id: lead_id.to_owned(),
    scope: scope.clone(),
    name: name.to_owned(),
    phone: phone.to_owned(),
    ..Default::default()
  }
}

fn incoming(lead_id: &str, name: &str, phone: &str) -> IncomingRecord {
  IncomingRecord {
    lead_id: Some(lead_id.to_owned()),
    name: Some(name.to_owned()),
    phone: Some(phone.to_owned()),
    ..Default::default()
  }
}

// ─── Storage primitives ──────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_list_roundtrip() {
  let s = store().await;

  let mut input = seed("a", &acme(), "Jo", "+1 555 111 2222");
  input.email = Some("jo@x.com".to_owned());
  input.source = Some(LeadSource::Instagram);
  input.lead_score = Some(7.5);
  input.message_count = Some(3);
  input.duplicate_lead_ids = ["b".to_owned()].into();

  let record = s.insert(input).await.unwrap();

  let listed = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(listed.len(), 1);
  let got = &listed[0];
  assert_eq!(got.record_id, record.record_id);
  assert_eq!(got.lead_id, "a");
  assert_eq!(got.scope, acme());
  assert_eq!(got.name, "Jo");
  assert_eq!(got.email.as_deref(), Some("jo@x.com"));
  assert_eq!(got.source, Some(LeadSource::Instagram));
  assert_eq!(got.lead_score, Some(7.5));
  assert_eq!(got.message_count, Some(3));
  assert!(got.duplicate_lead_ids.contains("b"));
}

#[tokio::test]
async fn scopes_are_isolated() {
  let s = store().await;

  s.insert(seed("t", &acme(), "Tenant Row", "111111")).await.unwrap();
  s.insert(seed("g", &Scope::Global, "Legacy Row", "222222"))
    .await
    .unwrap();

  let tenant_rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(tenant_rows.len(), 1);
  assert_eq!(tenant_rows[0].lead_id, "t");

  let legacy_rows = s.list_by_scope(&Scope::Global).await.unwrap();
  assert_eq!(legacy_rows.len(), 1);
  assert_eq!(legacy_rows[0].lead_id, "g");

  assert_eq!(s.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn patch_touches_only_provided_columns() {
  let s = store().await;
  let record = s
    .insert(seed("a", &acme(), "Jo", "555 111 2222"))
    .await
    .unwrap();

  let patch = RecordPatch {
    email: Some("jo@x.com".to_owned()),
    final_status: Some(REGISTERED.to_owned()),
    ..Default::default()
  };
  s.patch(record.record_id, &patch).await.unwrap();

  let got = &s.list_by_scope(&acme()).await.unwrap()[0];
  assert_eq!(got.email.as_deref(), Some("jo@x.com"));
  assert_eq!(got.final_status.as_deref(), Some(REGISTERED));
  // Untouched columns survive.
  assert_eq!(got.name, "Jo");
  assert_eq!(got.phone, "555 111 2222");
}

#[tokio::test]
async fn empty_patch_is_a_no_op() {
  let s = store().await;
  let record = s
    .insert(seed("a", &acme(), "Jo", "555 111 2222"))
    .await
    .unwrap();

  s.patch(record.record_id, &RecordPatch::default())
    .await
    .unwrap();

  assert_eq!(s.list_by_scope(&acme()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_row() {
  let s = store().await;
  let record = s
    .insert(seed("a", &acme(), "Jo", "555 111 2222"))
    .await
    .unwrap();

  s.delete(record.record_id).await.unwrap();
  assert!(s.list_by_scope(&acme()).await.unwrap().is_empty());
}

// ─── Bulk upsert ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_upsert_inserts_new_records() {
  let s = store().await;

  let summary = upsert::bulk_upsert(
    &s,
    &acme(),
    vec![
      incoming("a", "Jo", "555 111 2222"),
      incoming("b", "Sam", "999 888 7777"),
    ],
  )
  .await
  .unwrap();

  assert_eq!(summary.count, 2);
  assert_eq!(summary.skipped, 0);
  assert_eq!(summary.collapsed_duplicates, 0);
  assert!(summary.errors.is_empty());

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.scope == acme()));
}

#[tokio::test]
async fn bulk_upsert_patches_existing_with_all_incoming_fields() {
  let s = store().await;
  s.insert(seed("a", &acme(), "Old Name", "555 111 2222"))
    .await
    .unwrap();

  let mut update = incoming("a", "New Name", "555 111 2222");
  update.phone = None; // not provided this time
  update.email = Some("jo@x.com".to_owned());

  let summary = upsert::bulk_upsert(&s, &acme(), vec![update]).await.unwrap();
  assert_eq!(summary.count, 1);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  // Incoming fields overwrite; missing ones are left alone.
  assert_eq!(rows[0].name, "New Name");
  assert_eq!(rows[0].phone, "555 111 2222");
  assert_eq!(rows[0].email.as_deref(), Some("jo@x.com"));
}

#[tokio::test]
async fn duplicate_lead_id_within_one_batch_inserts_once() {
  let s = store().await;

  let mut second = incoming("a", "Jo Smith", "555 111 2222");
  second.email = Some("jo@x.com".to_owned());

  let summary = upsert::bulk_upsert(
    &s,
    &acme(),
    vec![incoming("a", "Jo", "555 111 2222"), second],
  )
  .await
  .unwrap();

  // One insert plus one patch, both counted as applied.
  assert_eq!(summary.count, 2);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].name, "Jo Smith");
  assert_eq!(rows[0].email.as_deref(), Some("jo@x.com"));
}

#[tokio::test]
async fn junk_records_are_skipped() {
  let s = store().await;

  let junk = IncomingRecord {
    lead_id: Some("junk".to_owned()),
    name: Some("Unknown".to_owned()),
    phone: Some("".to_owned()),
    ..Default::default()
  };

  let summary = upsert::bulk_upsert(&s, &acme(), vec![junk]).await.unwrap();

  assert_eq!(summary.count, 0);
  assert_eq!(summary.skipped, 1);
  assert!(s.list_by_scope(&acme()).await.unwrap().is_empty());
}

#[tokio::test]
async fn collapse_keeps_earliest_duplicate_lead_id() {
  let s = store().await;

  let first = s
    .insert(seed("a", &acme(), "First", "111111"))
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.insert(seed("a", &acme(), "Second", "222222"))
    .await
    .unwrap();

  let mut update = incoming("a", "Patched", "111111");
  update.email = Some("jo@x.com".to_owned());
  let summary = upsert::bulk_upsert(&s, &acme(), vec![update]).await.unwrap();

  assert_eq!(summary.collapsed_duplicates, 1);
  assert_eq!(summary.count, 1);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  // The earliest-created row survived and took the patch.
  assert_eq!(rows[0].record_id, first.record_id);
  assert_eq!(rows[0].name, "Patched");
  assert_eq!(rows[0].email.as_deref(), Some("jo@x.com"));
}

#[tokio::test]
async fn global_call_never_touches_tenant_rows() {
  let s = store().await;
  s.insert(seed("a", &acme(), "Tenant Jo", "111111"))
    .await
    .unwrap();

  let summary =
    upsert::bulk_upsert(&s, &Scope::Global, vec![incoming("a", "Legacy Jo", "222222")])
      .await
      .unwrap();
  assert_eq!(summary.count, 1);

  // The tenant row is a different population; the global call inserted anew.
  assert_eq!(s.list_by_scope(&acme()).await.unwrap()[0].name, "Tenant Jo");
  assert_eq!(
    s.list_by_scope(&Scope::Global).await.unwrap()[0].name,
    "Legacy Jo"
  );
}

#[tokio::test]
async fn missing_lead_id_is_synthesized() {
  let s = store().await;

  let record = IncomingRecord {
    name: Some("Jo".to_owned()),
    ..Default::default()
  };
  let summary = upsert::bulk_upsert(&s, &acme(), vec![record]).await.unwrap();
  assert_eq!(summary.count, 1);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert!(!rows[0].lead_id.trim().is_empty());
}

// ─── Bulk upsert failure capture ─────────────────────────────────────────────

/// Delegates to a real store but fails inserts for chosen lead ids.
struct FlakyStore {
  inner:         SqliteStore,
  fail_lead_ids: HashSet<String>,
}

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("injected failure")]
  Injected,
  #[error(transparent)]
  Store(#[from] Error),
}

impl CustomerStore for FlakyStore {
  type Error = FlakyError;

  async fn list_by_scope(
    &self,
    scope: &Scope,
  ) -> Result<Vec<CustomerRecord>, FlakyError> {
    Ok(self.inner.list_by_scope(scope).await?)
  }

  async fn list_all(&self) -> Result<Vec<CustomerRecord>, FlakyError> {
    Ok(self.inner.list_all().await?)
  }

  async fn insert(
    &self,
    input: NewCustomerRecord,
  ) -> Result<CustomerRecord, FlakyError> {
    if self.fail_lead_ids.contains(&input.lead_id) {
      return Err(FlakyError::Injected);
    }
    Ok(self.inner.insert(input).await?)
  }

  async fn patch(
    &self,
    record_id: Uuid,
    patch: &RecordPatch,
  ) -> Result<(), FlakyError> {
    Ok(self.inner.patch(record_id, patch).await?)
  }

  async fn delete(&self, record_id: Uuid) -> Result<(), FlakyError> {
    Ok(self.inner.delete(record_id).await?)
  }
}

#[tokio::test]
async fn per_record_failures_do_not_abort_the_batch() {
  let flaky = FlakyStore {
    inner:         store().await,
    fail_lead_ids: HashSet::from(["bad".to_owned()]),
  };

  let summary = upsert::bulk_upsert(
    &flaky,
    &acme(),
    vec![
      incoming("a", "Jo", "111111"),
      incoming("bad", "Doomed", "222222"),
      incoming("b", "Sam", "333333"),
    ],
  )
  .await
  .unwrap();

  assert_eq!(summary.count, 2);
  assert_eq!(summary.errors.len(), 1);
  assert_eq!(summary.errors[0].lead_id, "bad");
  assert!(!summary.errors_truncated);

  // Both healthy records landed.
  assert_eq!(flaky.inner.list_by_scope(&acme()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reported_errors_are_capped() {
  let fail_lead_ids: HashSet<String> =
    (0..30).map(|i| format!("bad-{i}")).collect();
  let batch: Vec<IncomingRecord> = (0..30)
    .map(|i| incoming(&format!("bad-{i}"), "Jo", "555 111 2222"))
    .collect();

  let flaky = FlakyStore {
    inner: store().await,
    fail_lead_ids,
  };

  let summary = upsert::bulk_upsert(&flaky, &acme(), batch).await.unwrap();

  assert_eq!(summary.count, 0);
  assert_eq!(summary.errors.len(), upsert::MAX_REPORTED_ERRORS);
  assert!(summary.errors_truncated);
}

// ─── Phone dedup sweep ───────────────────────────────────────────────────────

#[tokio::test]
async fn dedupe_merges_registered_canonical_without_overwriting() {
  let s = store().await;

  let mut registered = seed("a", &acme(), "Jo", "+1 (555) 111-2222");
  registered.final_status = Some(REGISTERED.to_owned());
  let kept = s.insert(registered).await.unwrap();

  tokio::time::sleep(std::time::Duration::from_millis(5)).await;

  let mut richer = seed("b", &acme(), "Jo Smith", "1.555.111.2222");
  richer.email = Some("jo@x.com".to_owned());
  richer.country = Some("US".to_owned());
  richer.date_added = Some("2023-11-02".to_owned());
  s.insert(richer).await.unwrap();

  let summary = sweep::dedupe_phones(&s, &acme()).await.unwrap();

  assert_eq!(summary.groups_processed, 1);
  assert_eq!(summary.merged, 1);
  assert_eq!(summary.removed, 1);
  assert_eq!(summary.details.len(), 1);
  assert_eq!(summary.details[0].phone, "15551112222");
  assert_eq!(summary.details[0].kept_lead_id, "a");
  assert_eq!(summary.details[0].merged_lead_ids, vec!["b".to_owned()]);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  let survivor = &rows[0];
  // Registered record wins despite being sparser.
  assert_eq!(survivor.record_id, kept.record_id);
  assert_eq!(survivor.name, "Jo"); // non-empty, never overwritten
  assert_eq!(survivor.email.as_deref(), Some("jo@x.com")); // filled from donor
  assert_eq!(survivor.country.as_deref(), Some("US"));
  assert!(survivor.duplicate_lead_ids.contains("b"));
  assert!(survivor.duplicate_phones.contains("1.555.111.2222"));
  assert!(survivor.duplicate_date_adds.contains("2023-11-02"));
}

#[tokio::test]
async fn dedupe_is_idempotent() {
  let s = store().await;
  s.insert(seed("a", &acme(), "Jo", "5551112222")).await.unwrap();
  s.insert(seed("b", &acme(), "Jo Smith", "555.111.2222"))
    .await
    .unwrap();

  let first = sweep::dedupe_phones(&s, &acme()).await.unwrap();
  assert_eq!(first.removed, 1);

  let second = sweep::dedupe_phones(&s, &acme()).await.unwrap();
  assert_eq!(second.removed, 0);
  assert_eq!(second.merged, 0);
  assert_eq!(second.groups_processed, 0);
  assert!(second.details.is_empty());
}

#[tokio::test]
async fn dedupe_tie_keeps_the_earlier_record() {
  let s = store().await;
  let first = s
    .insert(seed("a", &acme(), "Jo", "5551112222"))
    .await
    .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.insert(seed("b", &acme(), "Jo", "5551112222")).await.unwrap();

  sweep::dedupe_phones(&s, &acme()).await.unwrap();

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].record_id, first.record_id);
}

#[tokio::test]
async fn dedupe_never_picks_a_junk_canonical() {
  let s = store().await;

  // Rich in fields, but four digits and no name or email: still junk.
  let mut junk = seed("x", &acme(), "", "1234");
  junk.country = Some("US".to_owned());
  junk.source = Some(LeadSource::Facebook);
  junk.notes = Some("imported".to_owned());
  s.insert(junk).await.unwrap();

  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.insert(seed("y", &acme(), "Jo", "12-34")).await.unwrap();

  sweep::dedupe_phones(&s, &acme()).await.unwrap();

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].lead_id, "y");
  // The junk record's fields were still folded in before deletion.
  assert_eq!(rows[0].country.as_deref(), Some("US"));
}

#[tokio::test]
async fn dedupe_skips_groups_with_no_meaningful_member() {
  let s = store().await;
  s.insert(seed("x", &acme(), "", "1234")).await.unwrap();
  s.insert(seed("y", &acme(), "", "12.34")).await.unwrap();

  let summary = sweep::dedupe_phones(&s, &acme()).await.unwrap();

  assert_eq!(summary.groups_processed, 0);
  assert_eq!(summary.removed, 0);
  // Junk rows are the purge's job, not the sweep's.
  assert_eq!(s.list_by_scope(&acme()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn dedupe_ignores_digitless_phones() {
  let s = store().await;
  s.insert(seed("a", &acme(), "Jo", "")).await.unwrap();
  s.insert(seed("b", &acme(), "Sam", "")).await.unwrap();

  let summary = sweep::dedupe_phones(&s, &acme()).await.unwrap();
  assert_eq!(summary.groups_processed, 0);
  assert_eq!(s.list_by_scope(&acme()).await.unwrap().len(), 2);
}

// ─── Unknown purge ───────────────────────────────────────────────────────────

#[tokio::test]
async fn purge_removes_only_unknown_records() {
  let s = store().await;
  s.insert(seed("a", &acme(), "Jo", "5551112222")).await.unwrap();
  s.insert(seed("b", &acme(), "Unknown", "1234")).await.unwrap();
  s.insert(seed("c", &acme(), "unnamed", "")).await.unwrap();

  let summary = sweep::purge_unknown(&s, &acme()).await.unwrap();

  assert_eq!(summary.scanned, 3);
  assert_eq!(summary.removed, 2);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].lead_id, "a");
}

// ─── Legacy migration ────────────────────────────────────────────────────────

#[tokio::test]
async fn migrate_dry_run_counts_without_writing() {
  let s = store().await;
  s.insert(seed("g1", &Scope::Global, "Jo", "111111")).await.unwrap();
  s.insert(seed("g2", &Scope::Global, "Sam", "222222")).await.unwrap();

  let summary = sweep::migrate_legacy(&s, "acme", true).await.unwrap();

  assert_eq!(summary.legacy, 2);
  assert_eq!(summary.updated, 0);
  assert!(summary.dry_run);
  assert_eq!(s.list_by_scope(&Scope::Global).await.unwrap().len(), 2);
}

#[tokio::test]
async fn migrate_adopts_legacy_rows_then_reports_zero() {
  let s = store().await;
  s.insert(seed("g1", &Scope::Global, "Jo", "111111")).await.unwrap();
  s.insert(seed("t1", &acme(), "Sam", "222222")).await.unwrap();

  let first = sweep::migrate_legacy(&s, "acme", false).await.unwrap();
  assert_eq!(first.legacy, 1);
  assert_eq!(first.updated, 1);

  assert!(s.list_by_scope(&Scope::Global).await.unwrap().is_empty());
  assert_eq!(s.list_by_scope(&acme()).await.unwrap().len(), 2);

  let second = sweep::migrate_legacy(&s, "acme", false).await.unwrap();
  assert_eq!(second.legacy, 0);
  assert_eq!(second.updated, 0);
}

// ─── Remove ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_every_match() {
  let s = store().await;
  // Two rows with the same lead id — a pre-collapse defect.
  s.insert(seed("a", &acme(), "Jo", "111111")).await.unwrap();
  s.insert(seed("a", &acme(), "Jo Copy", "222222")).await.unwrap();
  s.insert(seed("b", &acme(), "Sam", "333333")).await.unwrap();

  let summary = upsert::remove(&s, &acme(), "a").await.unwrap();
  assert!(summary.removed);

  let rows = s.list_by_scope(&acme()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].lead_id, "b");
}

#[tokio::test]
async fn remove_missing_lead_reports_false() {
  let s = store().await;
  let summary = upsert::remove(&s, &acme(), "ghost").await.unwrap();
  assert!(!summary.removed);
}

// ─── Brand settings ──────────────────────────────────────────────────────────

#[tokio::test]
async fn brand_upsert_keeps_one_row_per_scope() {
  let s = store().await;

  let first = BrandSettings {
    brand_name: Some("Acme".to_owned()),
    ..Default::default()
  };
  settings::save_brand(&s, &acme(), &first).await.unwrap();

  let second = BrandSettings {
    brand_name: Some("Acme Rebranded".to_owned()),
    ..Default::default()
  };
  settings::save_brand(&s, &acme(), &second).await.unwrap();

  let loaded = settings::load_brand(&s, &acme()).await.unwrap().unwrap();
  assert_eq!(loaded.brand_name.as_deref(), Some("Acme Rebranded"));
}

#[tokio::test]
async fn brand_falls_back_from_tenant_to_global() {
  let s = store().await;

  let global = BrandSettings {
    brand_name: Some("Default Brand".to_owned()),
    ..Default::default()
  };
  settings::save_brand(&s, &Scope::Global, &global).await.unwrap();

  // Tenant has no row of its own yet: the global row answers.
  let loaded = settings::load_brand(&s, &acme()).await.unwrap().unwrap();
  assert_eq!(loaded.brand_name.as_deref(), Some("Default Brand"));

  let own = BrandSettings {
    brand_name: Some("Acme".to_owned()),
    ..Default::default()
  };
  settings::save_brand(&s, &acme(), &own).await.unwrap();

  let loaded = settings::load_brand(&s, &acme()).await.unwrap().unwrap();
  assert_eq!(loaded.brand_name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn oversized_brand_payload_is_rejected_before_write() {
  let s = store().await;

  let oversized = BrandSettings {
    logo_data_url: Some("x".repeat(MAX_BRAND_PAYLOAD_BYTES + 1)),
    ..Default::default()
  };

  let err = settings::save_brand(&s, &acme(), &oversized)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    leadbook_core::Error::PayloadTooLarge { .. }
  ));
  assert!(settings::load_brand(&s, &acme()).await.unwrap().is_none());
}
