use repeater_core::db::open_db_in_memory;
use repeater_core::{
    ChildFilter, ChildRepository, ChildSchema, FieldMap, FormFieldOptions, MediaFields,
    OwnerScope, ParentRecord, RepoError, SqliteChildRepository,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn slide_schema() -> ChildSchema {
    ChildSchema::new("Slide")
        .with_foreign_key("page_id")
        .with_translated_fields(["title"])
}

fn fields(value: Value) -> FieldMap {
    value.as_object().cloned().expect("object literal")
}

#[test]
fn create_and_get_roundtrip_splits_translations_and_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();

    let created = repo
        .create(&fields(json!({
            "title": {"en": "Hello", "fr": "Bonjour"},
            "link": "/hello",
            "position": 1,
            "page_id": 7
        })))
        .unwrap();

    let loaded = repo.get(created.id, false).unwrap().unwrap();
    assert_eq!(loaded.model, "Slide");
    assert_eq!(loaded.position, 1);
    assert_eq!(loaded.attributes.get("link"), Some(&json!("/hello")));
    assert!(!loaded.attributes.contains_key("page_id"));
    assert_eq!(
        loaded.translations.get("title"),
        Some(&json!({"en": "Hello", "fr": "Bonjour"}))
    );
    assert!(loaded.is_active());

    let parent = ParentRecord::new(7, "Page");
    let children = repo.list_children(&OwnerScope::foreign_key(&parent)).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, created.id);
}

#[test]
fn create_ignores_submitted_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();

    let created = repo
        .create(&fields(json!({"id": 999, "link": "/a"})))
        .unwrap();
    assert_ne!(created.id, 999);
    assert!(!created.attributes.contains_key("id"));
}

#[test]
fn update_merges_fields_and_keeps_unsubmitted_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    let created = repo
        .create(&fields(json!({
            "title": {"en": "Hello"},
            "link": "/a",
            "caption": "keep me",
            "position": 3
        })))
        .unwrap();

    let updated = repo
        .update(
            created.id,
            &fields(json!({"title": {"en": "Hi"}, "link": "/b", "position": 1})),
        )
        .unwrap();

    assert_eq!(updated.position, 1);
    assert_eq!(updated.attributes.get("link"), Some(&json!("/b")));
    assert_eq!(updated.attributes.get("caption"), Some(&json!("keep me")));
    assert_eq!(updated.translations.get("title"), Some(&json!({"en": "Hi"})));
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn update_missing_or_deleted_child_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();

    let err = repo.update(404, &FieldMap::new()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));

    let created = repo.create(&fields(json!({"page_id": 7}))).unwrap();
    let changed = repo
        .soft_delete_where(&ChildFilter::Ids(vec![created.id]))
        .unwrap();
    assert_eq!(changed, 1);

    let err = repo
        .update(created.id, &fields(json!({"link": "/back"})))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == created.id));
    let tombstone = repo.get(created.id, true).unwrap().unwrap();
    assert!(tombstone.deleted_at.is_some());
    assert!(repo.get(created.id, false).unwrap().is_none());
}

#[test]
fn repositories_only_touch_rows_of_their_model() {
    let conn = open_db_in_memory().unwrap();
    let slides = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    let cards = SqliteChildRepository::try_new(
        &conn,
        ChildSchema::new("Card").with_foreign_key("page_id"),
    )
    .unwrap();

    let slide = slides.create(&fields(json!({"page_id": 7}))).unwrap();
    cards.create(&fields(json!({"page_id": 7}))).unwrap();

    assert!(matches!(
        cards.update(slide.id, &FieldMap::new()),
        Err(RepoError::NotFound(_))
    ));

    let parent = ParentRecord::new(7, "Page");
    let deleted = cards
        .soft_delete_where(&ChildFilter::Owner(OwnerScope::foreign_key(&parent)))
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(
        slides
            .list_children(&OwnerScope::foreign_key(&parent))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn soft_delete_with_empty_id_list_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    repo.create(&fields(json!({"page_id": 7}))).unwrap();

    assert_eq!(repo.soft_delete_where(&ChildFilter::Ids(Vec::new())).unwrap(), 0);
    assert_eq!(active_count(&conn), 1);
}

#[test]
fn list_children_orders_by_position_then_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    let third = repo
        .create(&fields(json!({"page_id": 7, "position": 2})))
        .unwrap();
    let first = repo
        .create(&fields(json!({"page_id": 7, "position": 1})))
        .unwrap();
    let second = repo
        .create(&fields(json!({"page_id": 7, "position": 1})))
        .unwrap();
    repo.create(&fields(json!({"page_id": 8, "position": 1})))
        .unwrap();

    let ids: Vec<i64> = repo
        .list_children(&OwnerScope::foreign_key(&ParentRecord::new(7, "Page")))
        .unwrap()
        .into_iter()
        .map(|child| child.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn link_supports_morph_and_pivot_scopes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, ChildSchema::new("Slide")).unwrap();
    let parent = ParentRecord::new(7, "Page");

    let morph_child = repo.create(&FieldMap::new()).unwrap();
    let morph = OwnerScope::morph(&parent, "slideable");
    repo.link(morph_child.id, &morph).unwrap();

    let pivot_child = repo.create(&FieldMap::new()).unwrap();
    let pivot = OwnerScope::pivot(&parent, "tags");
    repo.link(pivot_child.id, &pivot).unwrap();
    repo.link(pivot_child.id, &pivot).unwrap();

    let morph_ids: Vec<i64> = repo
        .list_children(&morph)
        .unwrap()
        .iter()
        .map(|child| child.id)
        .collect();
    assert_eq!(morph_ids, vec![morph_child.id]);

    let pivot_ids: Vec<i64> = repo
        .list_children(&pivot)
        .unwrap()
        .iter()
        .map(|child| child.id)
        .collect();
    assert_eq!(pivot_ids, vec![pivot_child.id]);

    let other_parent = OwnerScope::morph(&ParentRecord::new(7, "Post"), "slideable");
    assert!(repo.list_children(&other_parent).unwrap().is_empty());

    assert!(matches!(
        repo.link(404, &pivot),
        Err(RepoError::NotFound(404))
    ));
}

#[test]
fn force_delete_removes_row_with_links_and_attachments() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, ChildSchema::new("Slide")).unwrap();
    let parent = ParentRecord::new(7, "Page");
    let pivot = OwnerScope::pivot(&parent, "tags");

    let child = repo
        .create(&fields(json!({"medias": {"cover": [1]}})))
        .unwrap();
    repo.link(child.id, &pivot).unwrap();

    repo.force_delete(child.id).unwrap();
    assert!(repo.get(child.id, true).unwrap().is_none());
    assert_eq!(row_count(&conn, "repeater_pivots"), 0);
    assert_eq!(row_count(&conn, "repeater_attachments"), 0);
    assert!(matches!(
        repo.force_delete(child.id),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn invalid_position_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();

    let err = repo
        .create(&fields(json!({"position": "first"})))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidInput(_)));
    assert_eq!(active_count(&conn), 0);
}

#[test]
fn form_fields_group_medias_and_files_per_options() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    let child = repo
        .create(&fields(json!({
            "title": {"en": "Hello"},
            "link": "/a",
            "medias": {"cover": {"en": [1], "fr": [2]}},
            "files": {"pdf": [9]},
            "browsers": {"related": [{"id": 4}]}
        })))
        .unwrap();

    let extracted = repo
        .form_fields(&child, &FormFieldOptions::default())
        .unwrap();
    assert_eq!(
        extracted.translations.get("title"),
        Some(&json!({"en": "Hello"}))
    );
    assert_eq!(
        extracted.medias,
        Some(MediaFields::ByRole(BTreeMap::from([(
            "cover".to_string(),
            json!([1])
        )])))
    );
    assert_eq!(
        extracted.files,
        Some(MediaFields::ByLocale(BTreeMap::from([(
            "en".to_string(),
            BTreeMap::from([("pdf".to_string(), json!([9]))])
        )])))
    );
    assert_eq!(
        extracted.browsers.get("related"),
        Some(&json!([{"id": 4}]))
    );
    assert_eq!(extracted.attributes.get("id"), Some(&json!(child.id)));
    assert_eq!(extracted.attributes.get("link"), Some(&json!("/a")));
    assert!(extracted.repeater_attributes.is_none());

    let translated = repo
        .form_fields(
            &child,
            &FormFieldOptions {
                translated_media_fields: true,
                locale_grouped_files: false,
            },
        )
        .unwrap();
    match translated.medias {
        Some(MediaFields::ByLocale(locales)) => {
            assert_eq!(locales["en"]["cover"], json!([1]));
            assert_eq!(locales["fr"]["cover"], json!([2]));
        }
        other => panic!("expected locale grouping, got {other:?}"),
    }
    assert_eq!(
        translated.files,
        Some(MediaFields::ByRole(BTreeMap::from([(
            "pdf".to_string(),
            json!([9])
        )])))
    );
}

#[test]
fn update_replaces_only_submitted_attachment_kinds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(&conn, slide_schema()).unwrap();
    let child = repo
        .create(&fields(json!({
            "medias": {"cover": [1]},
            "files": {"pdf": [9]}
        })))
        .unwrap();

    repo.update(child.id, &fields(json!({"medias": {"thumb": [5]}})))
        .unwrap();

    let reloaded = repo.get(child.id, false).unwrap().unwrap();
    let extracted = repo
        .form_fields(&reloaded, &FormFieldOptions::default())
        .unwrap();
    assert_eq!(
        extracted.medias,
        Some(MediaFields::ByRole(BTreeMap::from([(
            "thumb".to_string(),
            json!([5])
        )])))
    );
    assert!(extracted.files.is_some());
}

#[test]
fn form_fields_use_custom_repeater_serializer() {
    fn summary(child: &repeater_core::ChildRecord) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("summary".to_string(), json!(format!("slide #{}", child.position)));
        map
    }

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChildRepository::try_new(
        &conn,
        slide_schema().with_repeater_serializer(summary),
    )
    .unwrap();
    let child = repo
        .create(&fields(json!({"position": 2, "link": "/a"})))
        .unwrap();

    let extracted = repo
        .form_fields(&child, &FormFieldOptions::default())
        .unwrap();
    assert_eq!(
        extracted.repeater_attributes,
        Some(fields(json!({"summary": "slide #2"})))
    );
}

fn active_count(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM repeater_items WHERE deleted_at IS NULL;",
        [],
        |row| row.get(0),
    )
    .unwrap()
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
