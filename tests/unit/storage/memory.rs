use super::*;
use crate::foundation::core::Dimensions;
use crate::jobs::model::JobType;
use crate::scene::model::SceneDocument;
use serde_json::json;

fn canvas() -> CanvasData {
    CanvasData::Single(SceneDocument::new(Dimensions::new(100.0, 100.0).unwrap()))
}

#[test]
fn jobs_are_listed_oldest_first() {
    let store = MemoryStore::new();
    let mut a = Job::new("s", JobType::GenerateVariants, json!({}));
    let mut b = Job::new("s", JobType::GenerateVariants, json!({}));
    a.created_at = chrono::Utc::now() - chrono::Duration::seconds(10);
    b.created_at = chrono::Utc::now();
    store.insert_job(&b).unwrap();
    store.insert_job(&a).unwrap();
    assert!(store.insert_job(&a).is_err());

    let pending = store.jobs_with_status(JobStatus::Pending).unwrap();
    let ids: Vec<_> = pending.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, [a.id.as_str(), b.id.as_str()]);

    a.start().unwrap();
    store.update_job(&a).unwrap();
    assert_eq!(store.jobs_with_status(JobStatus::Pending).unwrap().len(), 1);
    assert_eq!(store.get_job(&a.id).unwrap().unwrap().status, JobStatus::Processing);

    let ghost = Job::new("s", JobType::RenderThumbnails, json!({}));
    assert!(matches!(store.update_job(&ghost), Err(SwatchError::JobNotFound(_))));
}

#[test]
fn dependents_are_found_by_parent() {
    let store = MemoryStore::new();
    let parent = Job::new("s", JobType::GenerateVariants, json!({}));
    let child = Job::new("s", JobType::RenderThumbnails, json!({})).depending_on(&parent.id);
    store.insert_job(&parent).unwrap();
    store.insert_job(&child).unwrap();
    let deps = store.dependents_of(&parent.id).unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].id, child.id);
    assert!(store.dependents_of(&child.id).unwrap().is_empty());
}

#[test]
fn variants_are_scoped_to_their_master() {
    let store = MemoryStore::new();
    let m1 = Template::new_master("s", "one", canvas(), Some("red".into()), None).unwrap();
    let m2 = Template::new_master("s", "two", canvas(), Some("red".into()), None).unwrap();
    store.insert(&m1).unwrap();
    store.insert(&m2).unwrap();
    for chip in ["blue", "gray"] {
        store.insert(&Template::new_variant(&m1, chip, None, canvas())).unwrap();
    }
    store.insert(&Template::new_variant(&m2, "blue", None, canvas())).unwrap();

    assert_eq!(store.variants_of(&m1.id).unwrap().len(), 2);
    assert_eq!(store.delete_variants_of(&m1.id).unwrap(), 2);
    assert!(store.variants_of(&m1.id).unwrap().is_empty());
    assert_eq!(store.variants_of(&m2.id).unwrap().len(), 1);
    assert!(store.get(&m1.id).unwrap().is_some(), "the master itself is kept");
}

#[test]
fn template_updates_go_through_the_model_rules() {
    let store = MemoryStore::new();
    let m = Template::new_master("s", "one", canvas(), Some("red".into()), None).unwrap();
    store.insert(&m).unwrap();
    let v = Template::new_variant(&m, "blue", None, canvas());
    store.insert(&v).unwrap();

    store.bind_variants(&v.id, "gid://Product/1", &["gid://V/1".to_string()]).unwrap();
    assert!(store.update_canvas(&v.id, canvas()).is_err());
    store.set_thumbnail(&v.id, "https://cdn/v.png").unwrap();

    let got = store.get(&v.id).unwrap().unwrap();
    assert_eq!(got.shopify_variant_ids, ["gid://V/1"]);
    assert_eq!(got.thumbnail_url.as_deref(), Some("https://cdn/v.png"));
    assert!(store.set_thumbnail("missing", "x").is_err());
}
