//! End-to-end repository behavior against the in-memory source.

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use keel_core::{
    Entity, FieldDef, FieldRegistry, MemorySource, Operator, Predicate, Query, Repository,
    Session, Value, ValueKind,
    audit::{AuditSlot, AuditSpec, stamp_creation},
};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct Track {
    id: i64,
    title: String,
    plays: u64,
    created_at: Option<DateTime<Utc>>,
    created_by: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    updated_by: Option<String>,
}

impl Entity for Track {
    type Key = i64;

    const NAME: &'static str = "track";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: FieldRegistry<Self> = FieldRegistry::new(
        &[
            FieldDef {
                name: "id",
                kind: ValueKind::Int,
                get: |e: &Track| Value::Int(e.id),
            },
            FieldDef {
                name: "title",
                kind: ValueKind::Text,
                get: |e: &Track| Value::Text(e.title.clone()),
            },
            FieldDef {
                name: "plays",
                kind: ValueKind::Uint,
                get: |e: &Track| Value::Uint(e.plays),
            },
        ],
        &[],
    );
    const AUDIT: AuditSpec<Self> = AuditSpec {
        creation_time: Some(AuditSlot {
            get: |e: &Track| e.created_at,
            set: |e: &mut Track, v| e.created_at = v,
        }),
        creator: Some(AuditSlot {
            get: |e: &Track| e.created_by.clone(),
            set: |e: &mut Track, v| e.created_by = v,
        }),
        modification_time: Some(AuditSlot {
            get: |e: &Track| e.updated_at,
            set: |e: &mut Track, v| e.updated_at = v,
        }),
        modifier: Some(AuditSlot {
            get: |e: &Track| e.updated_by.clone(),
            set: |e: &mut Track, v| e.updated_by = v,
        }),
        ..AuditSpec::NONE
    };

    fn key(&self) -> i64 {
        self.id
    }
}

fn track(id: i64, title: &str, plays: u64) -> Track {
    Track {
        id,
        title: title.to_owned(),
        plays,
        ..Track::default()
    }
}

fn repo_with(rows: Vec<Track>, session: Session) -> Repository<Track, MemorySource<Track>> {
    Repository::new(Arc::new(MemorySource::with_rows(rows)), session)
}

fn seed_ten() -> Vec<Track> {
    (1..=10)
        .map(|i| track(i, &format!("track-{i:02}"), (i as u64) * 10))
        .collect()
}

#[tokio::test]
async fn get_by_key_finds_the_row_or_nothing() {
    let repo = repo_with(seed_ten(), Session::anonymous());

    let found = repo.get(7).await.unwrap().expect("row 7 exists");
    assert_eq!(found.title, "track-07");

    assert!(repo.get(99).await.unwrap().is_none());
}

#[tokio::test]
async fn first_matching_respects_the_predicate() {
    let repo = repo_with(seed_ten(), Session::anonymous());
    let p = Predicate::build("plays", Operator::Gt, 85u64).unwrap();

    let found = repo.first(p, None, false).await.unwrap().expect("match");
    assert_eq!(found.id, 9);

    let none = Predicate::build("plays", Operator::Gt, 1000u64).unwrap();
    assert!(repo.first(none, None, false).await.unwrap().is_none());
}

#[tokio::test]
async fn paging_returns_the_second_page_deterministically() {
    let mut rows = seed_ten();
    rows.extend((11..=25).map(|i| track(i, &format!("track-{i:02}"), 0)));
    // scramble insertion order so only the explicit ordering can win
    rows.reverse();
    let repo = repo_with(rows, Session::anonymous());

    for _ in 0..3 {
        let page = repo
            .list(Query::new().order_by("id").page_index(2).page_size(10))
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|t| t.id).collect();
        assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
    }
}

#[tokio::test]
async fn page_index_without_size_skips_by_the_default() {
    let mut rows = seed_ten();
    rows.extend((11..=12).map(|i| track(i, "tail", 0)));
    let repo = repo_with(rows, Session::anonymous());

    let page = repo
        .list(Query::new().order_by("id").page_index(2))
        .await
        .unwrap();
    let ids: Vec<i64> = page.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![11, 12]);
}

#[tokio::test]
async fn insert_stamps_creation_audit_first_writer_wins() {
    let repo = repo_with(Vec::new(), Session::new("alice"));

    let stored = repo.insert(track(0, "new", 0)).await.unwrap();
    assert!(stored.created_at.is_some());
    assert_eq!(stored.created_by.as_deref(), Some("alice"));

    // a second stamp with a different user must not steal the creator
    let mut restamped = stored.clone();
    stamp_creation(&mut restamped, Some("bob"));
    assert_eq!(restamped.created_by.as_deref(), Some("alice"));
    assert_eq!(restamped.created_at, stored.created_at);
}

#[tokio::test]
async fn update_overwrites_the_modifier_every_time() {
    let source = Arc::new(MemorySource::with_rows(vec![track(1, "t", 0)]));

    let alice = Repository::new(Arc::clone(&source), Session::new("alice"));
    let updated = alice.update(track(1, "t2", 5)).await.unwrap();
    assert_eq!(updated.updated_by.as_deref(), Some("alice"));

    let bob = Repository::new(Arc::clone(&source), Session::new("bob"));
    let updated = bob.update(updated).await.unwrap();
    assert_eq!(updated.updated_by.as_deref(), Some("bob"));
}

#[tokio::test]
async fn upsert_routes_on_transience() {
    let source = Arc::new(MemorySource::with_rows(vec![track(5, "kept", 1)]));
    let repo = Repository::new(Arc::clone(&source), Session::new("alice"));

    // transient key: insert path, creation stamped
    let inserted = repo.upsert(track(0, "fresh", 0)).await.unwrap();
    assert!(inserted.created_at.is_some());
    assert!(inserted.updated_at.is_none());

    // persisted key: update path, modification stamped
    let updated = repo.upsert(track(5, "kept", 2)).await.unwrap();
    assert!(updated.created_at.is_none());
    assert!(updated.updated_at.is_some());

    repo.commit().await.unwrap();
    assert_eq!(source.len(), 2);
}

#[tokio::test]
async fn update_by_key_mutates_the_loaded_row() {
    let repo = repo_with(seed_ten(), Session::new("alice"));

    let updated = repo
        .update_by_key(3, |t| t.plays += 1)
        .await
        .unwrap();
    assert_eq!(updated.plays, 31);
    assert_eq!(updated.updated_by.as_deref(), Some("alice"));

    repo.commit().await.unwrap();
    let reloaded = repo.get(3).await.unwrap().unwrap();
    assert_eq!(reloaded.plays, 31);
}

#[tokio::test]
async fn update_by_key_never_runs_the_mutation_on_a_missing_row() {
    let repo = repo_with(seed_ten(), Session::anonymous());
    let mut invoked = false;

    let err = repo
        .update_by_key(42, |_| invoked = true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!invoked);
}

#[tokio::test]
async fn delete_by_key_requires_the_row() {
    let repo = repo_with(seed_ten(), Session::anonymous());

    repo.delete_by_key(4).await.unwrap();
    repo.commit().await.unwrap();
    assert!(repo.get(4).await.unwrap().is_none());

    let err = repo.delete_by_key(4).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_matching_removes_exactly_the_matched_set() {
    let repo = repo_with(seed_ten(), Session::anonymous());

    // plays > 70: tracks 8, 9, 10
    let p = Predicate::build("plays", Operator::Gt, 70u64).unwrap();
    let deleted = repo.delete_matching(p).await.unwrap();
    assert_eq!(deleted, 3);
    repo.commit().await.unwrap();

    let remaining = repo.list_all().await.unwrap();
    let ids: Vec<i64> = remaining.iter().map(|t| t.id).collect();
    assert_eq!(ids, (1..=7).collect::<Vec<i64>>());
}

#[tokio::test]
async fn like_filters_by_substring() {
    let repo = repo_with(
        vec![track(1, "abide", 0), track(2, "bad", 0), track(3, "core", 0)],
        Session::anonymous(),
    );

    let p = Predicate::build("title", Operator::Like, "ab").unwrap();
    let rows = repo.list(Query::new().filter(p)).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn null_valued_filter_lists_everything() {
    let repo = repo_with(seed_ten(), Session::anonymous());

    let p = Predicate::build("title", Operator::Eq, None::<String>).unwrap();
    let rows = repo.list(Query::new().filter(p)).await.unwrap();
    assert_eq!(rows.len(), 10);
}
