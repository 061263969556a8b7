//! Background creation of person records for owners saved while the
//! people service was failing (the `deferred` person sync policy).

use std::sync::Arc;

use models::person::NewPerson;
use remote::retry::{retry_when, RetryPolicy};
use remote::{PeopleApi, RemoteError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::ServiceError;
use crate::owners::repository::OwnerRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub owner_id: i32,
    pub person: NewPerson,
}

/// Sender side handed to the orchestrator. Cheap to clone.
#[derive(Clone)]
pub struct PersonSyncHandle {
    tx: mpsc::UnboundedSender<SyncJob>,
}

impl PersonSyncHandle {
    pub fn enqueue(&self, owner_id: i32, person: NewPerson) {
        if self.tx.send(SyncJob { owner_id, person }).is_err() {
            // Worker gone (shutdown). The flag stays false and the owner is resumed at next start.
            warn!(owner_id, "person sync worker stopped, job dropped");
        }
    }

    /// Re-enqueue every owner whose person record is still missing.
    pub async fn resume_pending(&self, repo: &dyn OwnerRepository) -> Result<usize, ServiceError> {
        let pending = repo.list_unsynced().await?;
        let count = pending.len();
        for owner in &pending {
            self.enqueue(owner.id, NewPerson::from(owner));
        }
        if count > 0 {
            info!(count, "resumed pending person syncs");
        }
        Ok(count)
    }
}

#[derive(Clone)]
pub struct PersonSyncWorker {
    repo: Arc<dyn OwnerRepository>,
    people: Arc<dyn PeopleApi>,
    policy: RetryPolicy,
}

impl PersonSyncWorker {
    pub fn new(repo: Arc<dyn OwnerRepository>, people: Arc<dyn PeopleApi>, policy: RetryPolicy) -> Self {
        Self { repo, people, policy }
    }

    /// Start the worker task. It ends once every handle has been dropped.
    pub fn spawn(self) -> (PersonSyncHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (PersonSyncHandle { tx }, task)
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<SyncJob>) {
        info!("person sync worker started");
        while let Some(job) = rx.recv().await {
            // One task per owner so a long backoff does not hold up the queue.
            let worker = self.clone();
            tokio::spawn(async move {
                let owner_id = job.owner_id;
                if let Err(e) = worker.sync_one(job).await {
                    error!(owner_id, error = %e, "person sync gave up; owner stays unsynced until next start");
                }
            });
        }
        info!("person sync worker stopped");
    }

    /// Create the person (retrying transient failures) and mark the owner synced.
    pub async fn sync_one(&self, job: SyncJob) -> Result<(), ServiceError> {
        let people = &self.people;
        let person = &job.person;
        let created = retry_when(&self.policy, || people.create_person(person), RemoteError::is_transient).await?;
        if self.repo.set_person_synced(job.owner_id, true).await? {
            info!(owner_id = job.owner_id, person_id = created.id, "owner person synced");
        } else {
            warn!(owner_id = job.owner_id, person_id = created.id, "owner vanished before sync completed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::owners::repository::InMemoryOwnerRepository;
    use crate::test_support::{jean_coleman, rejected, unreachable, FakePeople};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::with_retries(retries, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn sync_one_gives_up_after_budget() {
        let repo = Arc::new(InMemoryOwnerRepository::new());
        let people = Arc::new(FakePeople::failing_with((0..5).map(|_| unreachable("people-service"))));
        let owner = repo.insert(&jean_coleman(), false).await.unwrap();
        let worker = PersonSyncWorker::new(repo.clone(), people.clone(), fast_policy(2));

        let job = SyncJob { owner_id: owner.id, person: NewPerson::from(&owner) };
        assert!(worker.sync_one(job).await.is_err());
        assert_eq!(people.calls(), 3);
        assert!(!repo.find(owner.id).await.unwrap().unwrap().person_synced);
    }

    #[tokio::test]
    async fn sync_one_does_not_retry_rejections() {
        let repo = Arc::new(InMemoryOwnerRepository::new());
        let people = Arc::new(FakePeople::failing_with([rejected("people-service", 422)]));
        let owner = repo.insert(&jean_coleman(), false).await.unwrap();
        let worker = PersonSyncWorker::new(repo.clone(), people.clone(), fast_policy(4));

        let job = SyncJob { owner_id: owner.id, person: NewPerson::from(&owner) };
        assert!(matches!(worker.sync_one(job).await, Err(ServiceError::DependencyRejected { status: 422, .. })));
        assert_eq!(people.calls(), 1);
    }

    #[tokio::test]
    async fn resume_pending_requeues_unsynced_owners() {
        let repo = Arc::new(InMemoryOwnerRepository::new());
        let people = Arc::new(FakePeople::default());
        let pending = repo.insert(&jean_coleman(), false).await.unwrap();
        repo.insert(&jean_coleman(), true).await.unwrap();

        let (handle, _task) = PersonSyncWorker::new(repo.clone(), people.clone(), fast_policy(1)).spawn();
        assert_eq!(handle.resume_pending(repo.as_ref()).await.unwrap(), 1);

        for _ in 0..200 {
            if repo.list_unsynced().await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(repo.find(pending.id).await.unwrap().unwrap().person_synced);
        assert_eq!(people.calls(), 1);
    }
}
