use content_portal::models::{ContentItem, ContentKind, PostDraft, Profile, Role};
use serde_json::json;

#[test]
fn test_content_item_flattens_payload_columns() {
    // A PostgREST row: fixed columns plus whatever the collection schema adds.
    let row = json!({
        "id": "00000000-0000-0000-0000-000000000001",
        "user_id": "00000000-0000-0000-0000-000000000002",
        "author_email": "a@x.com",
        "created_at": "2026-01-15T10:30:00Z",
        "title": "Interview at Acme",
        "body": "Three rounds.",
    });

    let item: ContentItem = serde_json::from_value(row).expect("row should deserialize");
    assert_eq!(item.author_email, "a@x.com");
    assert_eq!(item.fields.get("title"), Some(&json!("Interview at Acme")));
    assert_eq!(item.fields.get("body"), Some(&json!("Three rounds.")));
    // Fixed columns are not duplicated into the flattened map.
    assert!(!item.fields.contains_key("user_id"));

    // Serialization round-trips to the same flat shape: no nested "fields" key.
    let out = serde_json::to_value(&item).expect("item should serialize");
    assert_eq!(out["title"], json!("Interview at Acme"));
    assert!(out.get("fields").is_none());
}

#[test]
fn test_profile_tolerates_sparse_rows() {
    // A profiles row with nothing beyond the id must still deserialize; the
    // resolver treats missing attributes as guest signals, not parse errors.
    let row = json!({ "id": "00000000-0000-0000-0000-000000000003" });
    let profile: Profile = serde_json::from_value(row).expect("sparse row should deserialize");
    assert!(profile.role.is_none());
    assert!(profile.email.is_none());
}

#[test]
fn test_post_draft_omits_absent_optionals() {
    let draft = PostDraft {
        title: "T".to_string(),
        body: "B".to_string(),
        company: None,
    };
    let out = serde_json::to_string(&draft).expect("draft should serialize");
    assert!(!out.contains("company"));
}

#[test]
fn test_role_display_and_serde_agree() {
    assert_eq!(Role::Guest.to_string(), "guest");
    assert_eq!(Role::Admin.to_string(), "admin");
    assert_eq!(serde_json::to_value(Role::Authenticated).unwrap(), json!("authenticated"));
    assert!(Role::Admin.is_admin());
    assert!(!Role::Authenticated.is_admin());
}

#[test]
fn test_content_kind_collection_mapping() {
    assert_eq!(ContentKind::Post.collection(), "posts");
    assert_eq!(ContentKind::Blog.collection(), "blogs");
    assert_eq!(ContentKind::Blog.to_string(), "blog");
}
