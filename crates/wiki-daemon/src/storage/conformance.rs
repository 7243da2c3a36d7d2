//! Behaviour every `Storage` backend must share
//!
//! Titles are namespaced by `prefix` and counts are taken relative to the
//! starting count, so the suite can run against a database that already
//! holds pages.

use super::traits::Storage;
use crate::error::StorageError;
use wiki_types::{Page, PageId, Title};

/// Alphanumeric prefix unique to this process and moment
pub(crate) fn unique_prefix() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("T{}x{}", std::process::id(), nanos.unsigned_abs())
}

pub(crate) async fn exercise_storage(storage: &dyn Storage, prefix: &str) {
    let title = |name: &str| Title::parse(&format!("{prefix}{name}")).unwrap();
    let baseline = storage.count_pages().await.unwrap();

    storage.ping().await.unwrap();
    assert!(storage.load_page(&title("Missing")).await.unwrap().is_none());

    // Create assigns an identity and the row loads back unchanged.
    let created = storage
        .save_page(Page::new(title("Welcome"), "Hello World"))
        .await
        .unwrap();
    let id = created.id.expect("created page has an identity");
    let loaded = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(storage.count_pages().await.unwrap(), baseline + 1);

    // Saving the same title without an identity adopts the stored row.
    let resaved = storage
        .save_page(Page::new(title("Welcome"), "Updated"))
        .await
        .unwrap();
    assert_eq!(resaved.id, Some(id));
    assert_eq!(storage.count_pages().await.unwrap(), baseline + 1);

    // Update by identity, then an identical update.
    let mut page = resaved;
    page.body = b"v3".to_vec();
    let updated = storage.save_page(page.clone()).await.unwrap();
    assert_eq!(updated.id, Some(id));
    let again = storage.save_page(page).await.unwrap();
    assert_eq!(again, updated);
    let loaded = storage.load_page(&title("Welcome")).await.unwrap().unwrap();
    assert_eq!(loaded.body, b"v3");

    // An update may not move a record to another title.
    let other = storage
        .save_page(Page::new(title("Other"), "other"))
        .await
        .unwrap();
    assert_ne!(other.id, Some(id));
    for target in ["Other", "Renamed"] {
        let mut moved = loaded.clone();
        moved.title = title(target);
        let err = storage.save_page(moved).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)), "{target}: {err}");
    }
    assert!(storage.load_page(&title("Renamed")).await.unwrap().is_none());
    let kept = storage.load_page(&title("Other")).await.unwrap().unwrap();
    assert_eq!(kept.body, b"other");

    // Unknown identities are not created on update.
    let ghost = Page::blank(title("Ghost")).with_id(PageId::new(i64::MAX));
    let err = storage.save_page(ghost).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)), "{err}");
    assert!(storage.load_page(&title("Ghost")).await.unwrap().is_none());

    // Content is opaque bytes.
    let binary = vec![0u8, 159, 146, 150, 255];
    storage
        .save_page(Page::new(title("Bin"), binary.clone()))
        .await
        .unwrap();
    let loaded = storage.load_page(&title("Bin")).await.unwrap().unwrap();
    assert_eq!(loaded.body, binary);

    // Titles match exactly.
    storage
        .save_page(Page::new(title("Case"), "upper"))
        .await
        .unwrap();
    assert!(storage.load_page(&title("case")).await.unwrap().is_none());
    storage
        .save_page(Page::new(title("case"), "lower"))
        .await
        .unwrap();
    let upper = storage.load_page(&title("Case")).await.unwrap().unwrap();
    let lower = storage.load_page(&title("case")).await.unwrap().unwrap();
    assert_ne!(upper.id, lower.id);
    assert_eq!(upper.body, b"upper");

    assert_eq!(storage.count_pages().await.unwrap(), baseline + 5);
}
