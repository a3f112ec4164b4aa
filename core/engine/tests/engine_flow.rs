//! End-to-end engine behavior against fake registry and provider.

use std::sync::Arc;

use docmirror_common::{Error, ProviderKind, StoredFile};
use docmirror_engine::MirrorEngine;
use docmirror_registry::{FileStore, MemoryStore};
use docmirror_storage::MemoryCloudProvider;

fn local_engine() -> (Arc<MemoryStore>, MirrorEngine) {
    let store = Arc::new(MemoryStore::new());
    (store.clone(), MirrorEngine::new(store))
}

fn synced_engine(kind: ProviderKind) -> (Arc<MemoryStore>, Arc<MemoryCloudProvider>, MirrorEngine) {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MemoryCloudProvider::new(kind));
    let engine = MirrorEngine::with_provider(store.clone(), provider.clone());
    (store, provider, engine)
}

#[tokio::test]
async fn no_provider_save_then_list() {
    let (_, engine) = local_engine();

    engine.save_file("notes.txt", "hello").await.unwrap();
    let listing = engine.list_files().await.unwrap();

    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].name, "notes.txt");
    assert!(listing.conflicts.is_empty());
}

#[tokio::test]
async fn save_with_ready_provider_marks_synced() {
    let (_, provider, engine) = synced_engine(ProviderKind::Dropbox);

    let receipt = engine.save_file("notes.txt", "hello").await.unwrap();

    assert!(receipt.sync_error.is_none());
    assert_eq!(receipt.file.synced_provider, Some(ProviderKind::Dropbox));
    assert_eq!(provider.remote_content("notes.txt").unwrap(), "hello");
}

#[tokio::test]
async fn save_with_unready_provider_skips_sync_silently() {
    let (_, provider, engine) = synced_engine(ProviderKind::Dropbox);
    provider.set_ready(false);

    let receipt = engine.save_file("notes.txt", "hello").await.unwrap();

    assert!(receipt.sync_error.is_none());
    assert_eq!(receipt.file.synced_provider, None);
    assert_eq!(provider.remote_count(), 0);
}

#[tokio::test]
async fn upload_failure_reports_partial_success() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);
    provider.fail_uploads(true);

    let receipt = engine.save_file("notes.txt", "hello").await.unwrap();

    // Saved but not synced: local state committed, error carried alongside.
    assert!(matches!(
        receipt.sync_error,
        Some(Error::CloudSync { provider: ProviderKind::Dropbox, .. })
    ));
    assert_eq!(receipt.file.synced_provider, None);

    let persisted = store.read().await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].content, "hello");
    assert_eq!(persisted[0].synced_provider, None);
}

#[tokio::test]
async fn remote_content_wins_on_both_sides() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);

    store
        .write(&[StoredFile::new("a.txt", "B")])
        .await
        .unwrap();
    provider.insert_remote("a.txt", "A");

    let listing = engine.list_files().await.unwrap();

    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].content, "A");
    assert_eq!(listing.files[0].synced_provider, Some(ProviderKind::Dropbox));
    assert!(listing.conflicts.is_empty());
}

#[tokio::test]
async fn local_only_file_lands_in_conflict_queue() {
    let (store, _, engine) = synced_engine(ProviderKind::Dropbox);

    store
        .write(&[StoredFile::new("orphan.txt", "body")])
        .await
        .unwrap();

    let listing = engine.list_files().await.unwrap();

    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].synced_provider, None);
    assert_eq!(listing.conflicts.len(), 1);
    assert_eq!(listing.conflicts[0].name, "orphan.txt");
}

#[tokio::test]
async fn remote_only_file_materializes_and_is_loadable() {
    let (store, provider, engine) = synced_engine(ProviderKind::GoogleDrive);
    provider.insert_remote("cloud.txt", "from above");

    let loaded = engine.load_file("cloud.txt").await.unwrap();
    assert_eq!(loaded.content, "from above");
    assert_eq!(loaded.synced_provider, Some(ProviderKind::GoogleDrive));

    // The pass is self-healing: the record is now persisted locally.
    let persisted = store.read().await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].name, "cloud.txt");
}

#[tokio::test]
async fn fetch_failure_degrades_to_local_view() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);

    store
        .write(&[StoredFile::new("a.txt", "body")])
        .await
        .unwrap();
    provider.insert_remote("b.txt", "other");
    provider.fail_fetches(true);

    let listing = engine.list_files().await.unwrap();

    // Local set unchanged, no conflicts, no error.
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].name, "a.txt");
    assert!(listing.conflicts.is_empty());
}

#[tokio::test]
async fn upload_local_only_resolves_conflict() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);

    store
        .write(&[StoredFile::new("orphan.txt", "body")])
        .await
        .unwrap();

    let conflicts = engine.list_files().await.unwrap().conflicts;
    assert_eq!(conflicts.len(), 1);

    let listing = engine.upload_local_only_file(&conflicts[0]).await.unwrap();

    assert!(listing.conflicts.is_empty());
    let record = listing.files.iter().find(|f| f.name == "orphan.txt").unwrap();
    assert_eq!(record.synced_provider, Some(ProviderKind::Dropbox));
    assert_eq!(provider.remote_content("orphan.txt").unwrap(), "body");
}

#[tokio::test]
async fn upload_local_only_requires_ready_provider() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);
    provider.set_ready(false);

    store
        .write(&[StoredFile::new("orphan.txt", "body")])
        .await
        .unwrap();
    let record = StoredFile::new("orphan.txt", "body");

    assert!(matches!(
        engine.upload_local_only_file(&record).await,
        Err(Error::CloudSync { .. })
    ));
}

#[tokio::test]
async fn discarded_file_never_reappears() {
    let (store, _, engine) = synced_engine(ProviderKind::Dropbox);

    store
        .write(&[StoredFile::new("orphan.txt", "body")])
        .await
        .unwrap();

    engine.discard_local_only_file("orphan.txt").await.unwrap();

    let listing = engine.list_files().await.unwrap();
    assert!(listing.files.is_empty());
    assert!(listing.conflicts.is_empty());

    // A later pass cannot resurrect it: the remote never held it.
    let listing = engine.list_files().await.unwrap();
    assert!(listing.files.is_empty());
}

#[tokio::test]
async fn discard_unknown_name_is_not_found() {
    let (_, _, engine) = synced_engine(ProviderKind::Dropbox);
    assert!(matches!(
        engine.discard_local_only_file("ghost.txt").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn clear_all_leaves_remote_intact() {
    let (_, provider, engine) = synced_engine(ProviderKind::Dropbox);

    let saved = engine.save_file("keep.txt", "body").await.unwrap().file;
    engine.clear_all().await.unwrap();
    assert_eq!(provider.remote_count(), 1);

    // The remote copy reappears as a fresh remote-only record.
    let listing = engine.list_files().await.unwrap();
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].content, "body");
    assert_ne!(listing.files[0].id, saved.id);
}

#[tokio::test]
async fn delete_is_local_first_and_remote_best_effort() {
    let (store, provider, engine) = synced_engine(ProviderKind::Dropbox);

    engine.save_file("doomed.txt", "body").await.unwrap();
    provider.fail_deletes(true);

    // Remote failure does not roll back or fail the local deletion.
    engine.delete_file("doomed.txt").await.unwrap();
    assert!(store.read().await.unwrap().is_empty());
    assert_eq!(provider.remote_count(), 1);
}

#[tokio::test]
async fn delete_removes_remote_copy_when_possible() {
    let (_, provider, engine) = synced_engine(ProviderKind::Dropbox);

    engine.save_file("doomed.txt", "body").await.unwrap();
    engine.delete_file("doomed.txt").await.unwrap();

    assert_eq!(provider.remote_count(), 0);
    assert!(!engine.file_exists("doomed.txt").await.unwrap());
}

#[tokio::test]
async fn size_tracks_byte_length_not_char_count() {
    let (_, engine) = local_engine();

    let receipt = engine.save_file("unicode.txt", "héllo").await.unwrap();
    assert_eq!(receipt.file.size, "héllo".len() as u64);
    assert_eq!(receipt.file.size, 6);
}

#[tokio::test]
async fn file_info_and_exists_reflect_reconciled_state() {
    let (_, provider, engine) = synced_engine(ProviderKind::GoogleDrive);
    provider.insert_remote("cloud.txt", "body");

    assert!(engine.file_exists("cloud.txt").await.unwrap());
    let info = engine.file_info("cloud.txt").await.unwrap().unwrap();
    assert_eq!(info.size, 4);
    assert!(engine.file_info("nope.txt").await.unwrap().is_none());
    assert!(matches!(
        engine.load_file("nope.txt").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn storage_info_reports_usage() {
    let (_, engine) = local_engine();

    engine.save_file("a.txt", "12345").await.unwrap();
    engine.save_file("b.txt", "123").await.unwrap();

    let info = engine.storage_info().await.unwrap();
    assert_eq!(info.used, 8);
    assert_eq!(info.file_count, 2);
    assert_eq!(info.total, docmirror_common::MAX_TOTAL_BYTES);
    assert_eq!(info.available, info.total - 8);
}
