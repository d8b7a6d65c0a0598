//! Sweep for objects that were published but never committed.
//!
//! A commit failure leaves the published object in the store with no record
//! pointing at it. This service lists the store and reports (and optionally
//! deletes) every such object.

use crate::domain::key::ObjectKey;
use crate::error::ReconcileError;
use crate::ports::repository::VideoRepository;
use crate::ports::storage::ObjectPublisher;
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, SystemTime};

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileReport {
    /// Objects with a key this crate could have derived
    pub scanned: usize,
    /// Keys no record references
    pub orphaned: Vec<String>,
    pub deleted: usize,
    pub failed: usize,
}

pub struct ReconcileService<P, R> {
    publisher: P,
    repo: R,
}

impl<P, R> ReconcileService<P, R>
where
    P: ObjectPublisher,
    R: VideoRepository,
{
    pub fn new(publisher: P, repo: R) -> Self {
        Self { publisher, repo }
    }

    /// Find orphaned objects older than `grace`, deleting them when `delete` is set.
    ///
    /// Objects younger than `grace` may belong to a run that has not committed
    /// yet, and objects of unknown age are never touched. Records are matched by
    /// key, so references committed under an older base URL still count.
    pub async fn sweep(
        &self,
        grace: Duration,
        delete: bool,
    ) -> Result<ReconcileReport, ReconcileError> {
        let objects = self.publisher.list().await?;
        let referenced: HashSet<ObjectKey> = self
            .repo
            .video_urls()
            .await?
            .iter()
            .filter_map(|url| ObjectKey::from_reference(url))
            .collect();
        let now = SystemTime::now();

        let mut report = ReconcileReport::default();
        for object in objects {
            let Some(key) = ObjectKey::parse(&object.key) else {
                continue;
            };
            report.scanned += 1;

            if referenced.contains(&key) {
                continue;
            }

            let old_enough = object
                .last_modified
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age >= grace);
            if !old_enough {
                tracing::debug!(key = %object.key, "unreferenced object within grace period");
                continue;
            }

            let reference = self.publisher.reference_for(&object.key);
            tracing::warn!(key = %object.key, reference = %reference, "orphaned object");
            if delete {
                match self.publisher.delete(&object.key).await {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        tracing::error!(key = %object.key, error = %e, "failed to delete orphan");
                        report.failed += 1;
                    }
                }
            }
            report.orphaned.push(object.key);
        }

        tracing::info!(
            scanned = report.scanned,
            orphaned = report.orphaned.len(),
            deleted = report.deleted,
            failed = report.failed,
            "reconciliation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::av::aspect::AspectClass;
    use crate::domain::key::derive_key;
    use crate::domain::video::PublishedReference;
    use crate::error::{RepositoryError, StorageError};
    use crate::ports::repository::MockVideoRepository;
    use crate::ports::storage::{MockObjectPublisher, StoredObject};
    use std::collections::HashSet;

    const BASE: &str = "https://cdn.example.com";
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn key() -> String {
        derive_key("video/mp4", AspectClass::Landscape).path()
    }

    fn aged(key: &str, age: Duration) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            last_modified: Some(SystemTime::now() - age),
        }
    }

    fn publisher(objects: Vec<StoredObject>) -> MockObjectPublisher {
        let mut publisher = MockObjectPublisher::new();
        publisher
            .expect_list()
            .times(1)
            .return_once(move || Ok(objects));
        publisher
            .expect_reference_for()
            .returning(|key| PublishedReference::new(format!("{BASE}/{key}")));
        publisher
    }

    fn repo(urls: Vec<String>) -> MockVideoRepository {
        let mut repo = MockVideoRepository::new();
        repo.expect_video_urls()
            .times(1)
            .return_once(move || Ok(urls.into_iter().collect::<HashSet<_>>()));
        repo
    }

    #[tokio::test]
    async fn test_referenced_objects_are_kept() {
        let committed = key();
        let mut publisher = publisher(vec![aged(&committed, DAY)]);
        publisher.expect_delete().never();

        let report = ReconcileService::new(publisher, repo(vec![format!("{BASE}/{committed}")]))
            .sweep(Duration::from_secs(3600), true)
            .await
            .unwrap();

        assert_eq!(report.scanned, 1);
        assert!(report.orphaned.is_empty());
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_records_under_another_base_url_are_kept() {
        let committed = key();
        let mut publisher = publisher(vec![aged(&committed, 7 * DAY)]);
        publisher.expect_delete().never();
        let repo = repo(vec![format!(
            "https://videos.s3.us-east-1.amazonaws.com/{committed}"
        )]);

        let report = ReconcileService::new(publisher, repo)
            .sweep(DAY, true)
            .await
            .unwrap();

        assert_eq!(report.scanned, 1);
        assert!(report.orphaned.is_empty());
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_deleting() {
        let orphan = key();
        let mut publisher = publisher(vec![aged(&orphan, DAY)]);
        publisher.expect_delete().never();

        let report = ReconcileService::new(publisher, repo(vec![]))
            .sweep(Duration::from_secs(3600), false)
            .await
            .unwrap();

        assert_eq!(report.orphaned, vec![orphan]);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_old_orphans_are_deleted() {
        let orphan = key();
        let mut publisher = publisher(vec![aged(&orphan, DAY)]);
        publisher
            .expect_delete()
            .withf({
                let orphan = orphan.clone();
                move |key| key == orphan
            })
            .times(1)
            .returning(|_| Ok(()));

        let report = ReconcileService::new(publisher, repo(vec![]))
            .sweep(Duration::from_secs(3600), true)
            .await
            .unwrap();

        assert_eq!(report.orphaned, vec![orphan]);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_recent_and_undated_objects_are_skipped() {
        let fresh = key();
        let undated = StoredObject {
            key: key(),
            last_modified: None,
        };
        let mut publisher = publisher(vec![aged(&fresh, Duration::from_secs(5)), undated]);
        publisher.expect_delete().never();

        let report = ReconcileService::new(publisher, repo(vec![]))
            .sweep(Duration::from_secs(3600), true)
            .await
            .unwrap();

        assert_eq!(report.scanned, 2);
        assert!(report.orphaned.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_ignored() {
        let mut publisher = publisher(vec![
            aged("thumbnails/cover.jpg", DAY),
            aged("landscape/short.mp4", DAY),
        ]);
        publisher.expect_delete().never();

        let report = ReconcileService::new(publisher, repo(vec![]))
            .sweep(Duration::ZERO, true)
            .await
            .unwrap();

        assert_eq!(report.scanned, 0);
        assert!(report.orphaned.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failures_are_counted() {
        let orphan = key();
        let mut publisher = publisher(vec![aged(&orphan, DAY)]);
        publisher
            .expect_delete()
            .returning(|_| Err(StorageError::DeleteFailed("AccessDenied".into())));

        let report = ReconcileService::new(publisher, repo(vec![]))
            .sweep(Duration::from_secs(3600), true)
            .await
            .unwrap();

        assert_eq!(report.orphaned.len(), 1);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_repository_failure_aborts_sweep() {
        let mut publisher = MockObjectPublisher::new();
        publisher.expect_list().returning(|| Ok(vec![]));
        publisher.expect_delete().never();
        let mut repo = MockVideoRepository::new();
        repo.expect_video_urls()
            .returning(|| Err(RepositoryError::Backend("connection refused".into())));

        let err = ReconcileService::new(publisher, repo)
            .sweep(DAY, true)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Repository(_)));
    }
}
