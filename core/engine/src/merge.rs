//! Merge algorithm for one reconciliation pass.

use std::collections::HashMap;

use docmirror_common::{ProviderKind, RemoteFile, StoredFile};

/// Result of merging the local and remote file sets.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The full merged set, sorted by name.
    pub files: Vec<StoredFile>,
    /// Records known locally but absent from the remote listing.
    ///
    /// The engine cannot tell "not yet uploaded" from "deleted remotely",
    /// so these are neither pushed nor dropped; the caller decides.
    pub conflicts: Vec<StoredFile>,
}

/// Merge local records against a remote listing from `provider`.
///
/// Remote content is authoritative when both sides know a name: the merged
/// record keeps the local identity (`id`, `created_at`) but adopts the
/// remote body. Remote-only names materialize as fresh local records;
/// local-only names lose their sync marker and join the conflict queue.
pub fn merge_listings(
    local: Vec<StoredFile>,
    remote: Vec<RemoteFile>,
    provider: ProviderKind,
) -> MergeOutcome {
    let mut remote_by_name: HashMap<String, RemoteFile> = remote
        .into_iter()
        .map(|file| (file.name.clone(), file))
        .collect();

    let mut files = Vec::with_capacity(local.len() + remote_by_name.len());
    let mut conflicts = Vec::new();

    for mut file in local {
        match remote_by_name.remove(&file.name) {
            Some(remote_file) => {
                file.content = remote_file.content;
                file.size = file.content.len() as u64;
                file.synced_provider = Some(provider);
                files.push(file);
            }
            None => {
                file.synced_provider = None;
                conflicts.push(file.clone());
                files.push(file);
            }
        }
    }

    for (_, remote_file) in remote_by_name {
        files.push(StoredFile {
            id: uuid::Uuid::new_v4().to_string(),
            name: remote_file.name,
            size: remote_file.content.len() as u64,
            content: remote_file.content,
            created_at: remote_file.modified,
            synced_provider: Some(provider),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    conflicts.sort_by(|a, b| a.name.cmp(&b.name));

    MergeOutcome { files, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn remote(name: &str, content: &str) -> RemoteFile {
        RemoteFile {
            name: name.to_string(),
            remote_id: format!("id-{}", name),
            modified: Utc::now(),
            size: content.len() as u64,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_remote_content_wins_when_both_sides_know_a_name() {
        let local = vec![StoredFile::new("a.txt", "local body")];
        let local_id = local[0].id.clone();
        let local_created = local[0].created_at;

        let outcome = merge_listings(local, vec![remote("a.txt", "remote body")], ProviderKind::Dropbox);

        assert_eq!(outcome.files.len(), 1);
        let merged = &outcome.files[0];
        assert_eq!(merged.content, "remote body");
        assert_eq!(merged.size, "remote body".len() as u64);
        assert_eq!(merged.synced_provider, Some(ProviderKind::Dropbox));
        // Local identity survives.
        assert_eq!(merged.id, local_id);
        assert_eq!(merged.created_at, local_created);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_local_only_record_is_a_conflict_with_cleared_marker() {
        let mut orphan = StoredFile::new("orphan.txt", "body");
        orphan.synced_provider = Some(ProviderKind::Dropbox);

        let outcome = merge_listings(vec![orphan], vec![], ProviderKind::Dropbox);

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].synced_provider, None);
        assert_eq!(outcome.conflicts.len(), 1);
        assert_eq!(outcome.conflicts[0].name, "orphan.txt");
    }

    #[test]
    fn test_remote_only_record_materializes_fresh() {
        let remote_file = remote("new.txt", "hello");
        let modified = remote_file.modified;

        let outcome = merge_listings(vec![], vec![remote_file], ProviderKind::GoogleDrive);

        assert_eq!(outcome.files.len(), 1);
        let materialized = &outcome.files[0];
        assert!(!materialized.id.is_empty());
        assert_eq!(materialized.created_at, modified);
        assert_eq!(materialized.content, "hello");
        assert_eq!(materialized.synced_provider, Some(ProviderKind::GoogleDrive));
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn test_merged_set_is_sorted_by_name() {
        let local = vec![StoredFile::new("c.txt", "c"), StoredFile::new("a.txt", "a")];
        let outcome = merge_listings(local, vec![remote("b.txt", "b")], ProviderKind::Dropbox);

        let names: Vec<_> = outcome.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }
}
