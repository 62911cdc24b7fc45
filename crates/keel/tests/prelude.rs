//! The prelude must be enough to define an entity and drive the
//! repository end to end.

use chrono::{DateTime, Utc};
use keel::prelude::*;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct Document {
    id: i64,
    title: String,
    deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl Entity for Document {
    type Key = i64;

    const NAME: &'static str = "document";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: FieldRegistry<Self> = FieldRegistry::new(
        &[
            FieldDef {
                name: "id",
                kind: ValueKind::Int,
                get: |e: &Document| Value::Int(e.id),
            },
            FieldDef {
                name: "title",
                kind: ValueKind::Text,
                get: |e: &Document| Value::Text(e.title.clone()),
            },
        ],
        &[],
    );
    const AUDIT: AuditSpec<Self> = AuditSpec {
        deleted: Some(AuditSlot {
            get: |e: &Document| e.deleted,
            set: |e: &mut Document, v| e.deleted = v,
        }),
        deletion_time: Some(AuditSlot {
            get: |e: &Document| e.deleted_at,
            set: |e: &mut Document, v| e.deleted_at = v,
        }),
        deleter: Some(AuditSlot {
            get: |e: &Document| e.deleted_by.clone(),
            set: |e: &mut Document, v| e.deleted_by = v,
        }),
        ..AuditSpec::NONE
    };

    fn key(&self) -> i64 {
        self.id
    }
}

fn doc(id: i64, title: &str) -> Document {
    Document {
        id,
        title: title.to_owned(),
        ..Document::default()
    }
}

#[tokio::test]
async fn prelude_covers_the_whole_flow() {
    let source = Arc::new(MemorySource::with_rows(vec![
        doc(1, "alpha"),
        doc(2, "beta"),
        doc(3, "gamma"),
    ]));
    let repo = Repository::new(Arc::clone(&source), Session::new("alice"));

    // dynamic filter through the prelude surface
    let filter = Predicate::build("title", Operator::Like, "a").unwrap();
    let rows = repo
        .list(Query::new().filter(filter).order_by_desc("id"))
        .await
        .unwrap();
    let ids: Vec<i64> = rows.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    // identity helpers
    assert!(is_transient(&doc(0, "new")));
    assert!(entity_eq(&doc(2, "x"), &doc(2, "y")));
    assert_eq!(entity_hash(&doc(2, "x")), entity_hash(&doc(2, "y")));

    // soft-delete capability round trip
    let mut target = repo.get(2).await.unwrap().unwrap();
    soft_delete(&mut target, Some("alice"));
    assert!(is_deleted(&target));
    assert_eq!(target.deleted_by.as_deref(), Some("alice"));
    undelete(&mut target);
    assert!(!is_deleted(&target));

    // keyed delete plus commit shrinks the extent
    repo.delete_by_key(1).await.unwrap();
    repo.commit().await.unwrap();
    assert_eq!(repo.list_all().await.unwrap().len(), 2);

    // transports are reachable from the same prelude
    let _http = HttpClient::new();
    let ftp = RemoteFileClient::new(RemoteConfig {
        host: "files.example.org".into(),
        port: 21,
        username: "u".into(),
        password: "p".into(),
    });
    assert!(!ftp.is_connected().await);
    assert!(matches!(
        Auth::basic("", "p").validate(),
        Err(ClientError::Config(_))
    ));
}
