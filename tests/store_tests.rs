use chrono::{NaiveDate, NaiveTime};
use taskal::blobs::BlobStore;
use taskal::models::{DocumentDraft, NewTask, TaskPatch, TaskStatus, DEFAULT_CATEGORY};
use taskal::store::{NoteBook, TaskStore};
use uuid::Uuid;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_create_assigns_id_and_pending_status() {
    let mut store = TaskStore::new();
    let mut fields = NewTask::new("Call client");
    fields.date = Some(date("2024-03-15"));
    fields.time = NaiveTime::from_hms_opt(9, 0, 0);

    let a = store.create(fields.clone());
    let b = store.create(fields);

    assert_ne!(a, b);
    assert_eq!(store.len(), 2);
    let task = store.get(a).unwrap();
    assert_eq!(task.title, "Call client");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.category(), DEFAULT_CATEGORY);
    assert!(task.documents.is_empty());
}

#[test]
fn test_create_preserves_insertion_order() {
    let mut store = TaskStore::new();
    let ids: Vec<Uuid> = ["first", "second", "third"]
        .iter()
        .map(|t| store.create(NewTask::new(*t)))
        .collect();

    let listed: Vec<Uuid> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn test_create_gives_documents_fresh_ids() {
    let mut blobs = BlobStore::new();
    let key = blobs.put("application/pdf", b"%PDF-1.4".to_vec());
    let stale = Uuid::new_v4();

    let mut store = TaskStore::new();
    let mut fields = NewTask::new("Sign contract");
    let mut first = DocumentDraft::new("a.pdf", key, "application/pdf");
    first.id = Some(stale);
    fields.documents = vec![first, DocumentDraft::new("b.pdf", key, "application/pdf")];

    let id = store.create(fields);
    let docs = &store.get(id).unwrap().documents;
    assert_eq!(docs.len(), 2);
    assert_ne!(docs[0].id, stale);
    assert_ne!(docs[0].id, docs[1].id);
    assert_eq!(docs[0].name, "a.pdf");
    assert_eq!(docs[1].name, "b.pdf");
}

#[test]
fn test_update_merges_only_given_fields() {
    let mut store = TaskStore::new();
    let mut fields = NewTask::new("Invoice");
    fields.client = Some("ACME".into());
    fields.comment = Some("urgent".into());
    let id = store.create(fields);

    let patch = TaskPatch {
        title: Some("Send invoice".into()),
        comment: Some(None),
        ..Default::default()
    };
    assert!(store.update(id, patch));

    let task = store.get(id).unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.title, "Send invoice");
    assert_eq!(task.client.as_deref(), Some("ACME"));
    assert_eq!(task.comment, None);
}

#[test]
fn test_update_unknown_id_is_noop() {
    let mut store = TaskStore::new();
    let id = store.create(NewTask::new("Keep me"));

    assert!(!store.update(Uuid::new_v4(), TaskPatch::status(TaskStatus::Completed)));
    assert_eq!(store.get(id).unwrap().status, TaskStatus::Pending);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_update_documents_keeps_and_assigns_ids() {
    let mut blobs = BlobStore::new();
    let key = blobs.put("image/png", vec![1, 2, 3]);
    let mut store = TaskStore::new();
    let mut fields = NewTask::new("Scan");
    fields.documents = vec![DocumentDraft::new("one.png", key, "image/png")];
    let id = store.create(fields);
    let kept = store.get(id).unwrap().documents[0].clone();

    let drafts = vec![
        DocumentDraft::from(kept.clone()),
        DocumentDraft::new("two.png", key, "image/png"),
        DocumentDraft::from(kept.clone()),
    ];
    store.update(id, TaskPatch { documents: Some(drafts), ..Default::default() });

    let docs = &store.get(id).unwrap().documents;
    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0].id, kept.id);
    assert_ne!(docs[1].id, kept.id);
    // Duplicate ids are not allowed within one task.
    assert_ne!(docs[2].id, kept.id);
    assert_ne!(docs[2].id, docs[1].id);
}

#[test]
fn test_append_document_leaves_siblings() {
    let mut blobs = BlobStore::new();
    let key = blobs.put("application/pdf", b"x".to_vec());
    let mut store = TaskStore::new();
    let id = store.create(NewTask::new("Docs"));

    let first = store.append_document(id, DocumentDraft::new("a.pdf", key, "application/pdf")).unwrap();
    let second = store.append_document(id, DocumentDraft::new("b.pdf", key, "application/pdf")).unwrap();

    let docs = &store.get(id).unwrap().documents;
    assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![first, second]);
    assert!(store.append_document(Uuid::new_v4(), DocumentDraft::new("c.pdf", key, "application/pdf")).is_none());
}

#[test]
fn test_delete() {
    let mut store = TaskStore::new();
    let a = store.create(NewTask::new("a"));
    let b = store.create(NewTask::new("b"));

    assert!(store.delete(a));
    assert!(!store.delete(a));
    assert_eq!(store.len(), 1);
    assert_eq!(store.tasks()[0].id, b);
    assert!(store.get(a).is_none());
}

#[test]
fn test_notes_newest_first_and_blank_ignored() {
    let mut notes = NoteBook::new();
    let morning = date("2024-03-15").and_hms_opt(9, 0, 0).unwrap();
    let noon = date("2024-03-15").and_hms_opt(12, 0, 0).unwrap();

    let first = notes.add("call back Mr. Martin", morning).unwrap();
    assert!(notes.add("   ", noon).is_none());
    let second = notes.add("order toner", noon).unwrap();

    assert_eq!(notes.len(), 2);
    assert_eq!(notes.notes()[0].id, second);
    assert_eq!(notes.notes()[1].id, first);
    assert_eq!(notes.notes()[1].created_at, morning);

    assert!(notes.delete(first));
    assert!(!notes.delete(first));
    assert_eq!(notes.len(), 1);
}

#[test]
fn test_empty_patch_leaves_task_unchanged() {
    let mut store = TaskStore::new();
    let mut fields = NewTask::new("Unchanged");
    fields.date = Some(date("2024-03-15"));
    let id = store.create(fields);
    let before = store.get(id).unwrap().clone();

    assert!(store.update(id, TaskPatch::default()));
    assert_eq!(store.get(id).unwrap(), &before);
}

#[test]
fn test_update_documents_on_empty_task() {
    let mut blobs = BlobStore::new();
    let key = blobs.put("application/pdf", b"a".to_vec());
    let mut store = TaskStore::new();
    let id = store.create(NewTask::new("Paperwork"));

    let drafts = vec![DocumentDraft::new("a.pdf", key, "application/pdf")];
    store.update(id, TaskPatch { documents: Some(drafts), ..Default::default() });

    let docs = &store.get(id).unwrap().documents;
    assert_eq!(docs.len(), 1);
    assert!(!docs[0].id.is_nil());
    assert_eq!(docs[0].name, "a.pdf");
}
