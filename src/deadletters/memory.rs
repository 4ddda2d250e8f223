//! In-memory dead-letter store.
//!
//! Reference implementation of [`EventDeadLetters`]: nested maps behind one
//! `tokio::sync::RwLock`. Every operation takes the lock once, so the store
//! is linearizable as a whole — stronger than the per-group requirement of
//! the contract.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use tokio::sync::RwLock;

use crate::deadletters::{EventDeadLetters, InsertionId};
use crate::error::DeadLetterError;
use crate::events::EventRef;
use crate::registrations::{Group, GroupRef};

struct GroupEntries {
    group: GroupRef,
    events: HashMap<InsertionId, EventRef>,
}

/// Dead-letter store keeping everything in process memory.
///
/// Suited for single-node deployments and tests; distributed deployments
/// implement [`EventDeadLetters`] over a shared table instead.
pub struct MemoryEventDeadLetters {
    groups: RwLock<HashMap<String, GroupEntries>>,
}

impl MemoryEventDeadLetters {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    fn group_key(group: &dyn Group) -> Result<String, DeadLetterError> {
        let key = group.as_string();
        if key.is_empty() {
            return Err(DeadLetterError::InvalidGroup);
        }
        Ok(key)
    }
}

impl Default for MemoryEventDeadLetters {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventDeadLetters for MemoryEventDeadLetters {
    async fn store(
        &self,
        group: GroupRef,
        event: EventRef,
    ) -> Result<InsertionId, DeadLetterError> {
        let key = Self::group_key(group.as_ref())?;
        let insertion_id = InsertionId::random();

        let mut groups = self.groups.write().await;
        groups
            .entry(key)
            .or_insert_with(|| GroupEntries {
                group,
                events: HashMap::new(),
            })
            .events
            .insert(insertion_id, event);
        Ok(insertion_id)
    }

    async fn remove(
        &self,
        group: &dyn Group,
        insertion_id: InsertionId,
    ) -> Result<(), DeadLetterError> {
        let key = Self::group_key(group)?;

        let mut groups = self.groups.write().await;
        if let Some(entries) = groups.get_mut(&key) {
            entries.events.remove(&insertion_id);
            if entries.events.is_empty() {
                groups.remove(&key);
            }
        }
        Ok(())
    }

    async fn remove_group(&self, group: &dyn Group) -> Result<(), DeadLetterError> {
        let key = Self::group_key(group)?;
        self.groups.write().await.remove(&key);
        Ok(())
    }

    async fn failed_event(
        &self,
        group: &dyn Group,
        insertion_id: InsertionId,
    ) -> Result<Option<EventRef>, DeadLetterError> {
        let key = Self::group_key(group)?;

        let groups = self.groups.read().await;
        Ok(groups
            .get(&key)
            .and_then(|entries| entries.events.get(&insertion_id))
            .cloned())
    }

    async fn failed_ids(
        &self,
        group: &dyn Group,
    ) -> Result<BoxStream<'static, InsertionId>, DeadLetterError> {
        let key = Self::group_key(group)?;

        let groups = self.groups.read().await;
        let ids: Vec<InsertionId> = groups
            .get(&key)
            .map(|entries| entries.events.keys().copied().collect())
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(ids)))
    }

    async fn failed_events(
        &self,
        group: &dyn Group,
    ) -> Result<BoxStream<'static, EventRef>, DeadLetterError> {
        let key = Self::group_key(group)?;

        let groups = self.groups.read().await;
        let events: Vec<EventRef> = groups
            .get(&key)
            .map(|entries| entries.events.values().cloned().collect())
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(events)))
    }

    async fn groups_with_failed_events(
        &self,
    ) -> Result<BoxStream<'static, GroupRef>, DeadLetterError> {
        let groups = self.groups.read().await;
        let with_entries: Vec<GroupRef> = groups
            .values()
            .filter(|entries| !entries.events.is_empty())
            .map(|entries| entries.group.clone())
            .collect();
        Ok(Box::pin(stream::iter(with_entries)))
    }

    async fn contain_events(&self) -> Result<bool, DeadLetterError> {
        let groups = self.groups.read().await;
        Ok(groups.values().any(|entries| !entries.events.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{event, group_a, group_b};
    use futures::StreamExt;
    use std::sync::Arc;

    #[tokio::test]
    async fn store_then_lookup_returns_event() {
        let store = MemoryEventDeadLetters::new();
        let ev = event();

        let id = store.store(group_a(), ev.clone()).await.unwrap();
        let found = store.failed_event(group_a().as_ref(), id).await.unwrap();

        assert_eq!(found.unwrap().event_id(), ev.event_id());
    }

    #[tokio::test]
    async fn lookup_does_not_remove() {
        let store = MemoryEventDeadLetters::new();
        let id = store.store(group_a(), event()).await.unwrap();

        store.failed_event(group_a().as_ref(), id).await.unwrap();

        assert!(store
            .failed_event(group_a().as_ref(), id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn unmatched_lookup_returns_none() {
        let store = MemoryEventDeadLetters::new();
        let found = store
            .failed_event(group_a().as_ref(), InsertionId::random())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn remove_drops_matched_and_keeps_others() {
        let store = MemoryEventDeadLetters::new();
        let id_1 = store.store(group_a(), event()).await.unwrap();
        let id_2 = store.store(group_a(), event()).await.unwrap();

        store.remove(group_a().as_ref(), id_1).await.unwrap();

        assert!(store
            .failed_event(group_a().as_ref(), id_1)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .failed_event(group_a().as_ref(), id_2)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn remove_of_unmatched_group_or_id_is_a_noop() {
        let store = MemoryEventDeadLetters::new();
        let id = store.store(group_a(), event()).await.unwrap();

        store
            .remove(group_a().as_ref(), InsertionId::random())
            .await
            .unwrap();
        store
            .remove(group_b().as_ref(), InsertionId::random())
            .await
            .unwrap();
        store.remove_group(group_b().as_ref()).await.unwrap();

        assert!(store
            .failed_event(group_a().as_ref(), id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn remove_group_drops_only_that_group() {
        let store = MemoryEventDeadLetters::new();
        store.store(group_a(), event()).await.unwrap();
        store.store(group_a(), event()).await.unwrap();
        let kept = store.store(group_b(), event()).await.unwrap();

        store.remove_group(group_a().as_ref()).await.unwrap();

        let ids: Vec<_> = store
            .failed_ids(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        assert!(ids.is_empty());
        assert!(store
            .failed_event(group_b().as_ref(), kept)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn failed_ids_reflects_current_state() {
        let store = MemoryEventDeadLetters::new();
        let id_1 = store.store(group_a(), event()).await.unwrap();
        let id_2 = store.store(group_a(), event()).await.unwrap();

        let mut ids: Vec<_> = store
            .failed_ids(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        ids.sort_by_key(|id| id.to_string());
        let mut expected = vec![id_1, id_2];
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(ids, expected);

        store.remove(group_a().as_ref(), id_1).await.unwrap();

        let ids: Vec<_> = store
            .failed_ids(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(ids, vec![id_2]);
    }

    #[tokio::test]
    async fn failed_events_lists_without_removing() {
        let store = MemoryEventDeadLetters::new();
        store.store(group_a(), event()).await.unwrap();
        store.store(group_a(), event()).await.unwrap();

        let events: Vec<_> = store
            .failed_events(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(events.len(), 2);

        let again: Vec<_> = store
            .failed_events(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(again.len(), 2);
    }

    #[tokio::test]
    async fn groups_with_failed_events_tracks_membership() {
        let store = MemoryEventDeadLetters::new();
        let id_a = store.store(group_a(), event()).await.unwrap();
        store.store(group_b(), event()).await.unwrap();

        let mut groups: Vec<String> = store
            .groups_with_failed_events()
            .await
            .unwrap()
            .map(|g| g.as_string())
            .collect()
            .await;
        groups.sort();
        assert_eq!(groups, vec!["alpha".to_string(), "beta".to_string()]);

        store.remove(group_a().as_ref(), id_a).await.unwrap();

        let groups: Vec<String> = store
            .groups_with_failed_events()
            .await
            .unwrap()
            .map(|g| g.as_string())
            .collect()
            .await;
        assert_eq!(groups, vec!["beta".to_string()]);
    }

    #[tokio::test]
    async fn contain_events_follows_store_and_remove() {
        let store = MemoryEventDeadLetters::new();
        assert!(!store.contain_events().await.unwrap());

        let id_a = store.store(group_a(), event()).await.unwrap();
        let id_b = store.store(group_b(), event()).await.unwrap();
        assert!(store.contain_events().await.unwrap());

        store.remove(group_a().as_ref(), id_a).await.unwrap();
        assert!(store.contain_events().await.unwrap());

        store.remove(group_b().as_ref(), id_b).await.unwrap();
        assert!(!store.contain_events().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stores_all_remain_retrievable() {
        const CALLERS: usize = 10;
        const OPS: usize = 20;

        let store = Arc::new(MemoryEventDeadLetters::new());

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::with_capacity(OPS);
                for _ in 0..OPS {
                    ids.push(store.store(group_a(), event()).await.unwrap());
                }
                ids
            }));
        }

        let mut all_ids = Vec::new();
        for handle in handles {
            all_ids.extend(handle.await.unwrap());
        }

        assert_eq!(all_ids.len(), CALLERS * OPS);
        let stored: Vec<_> = store
            .failed_ids(group_a().as_ref())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(stored.len(), CALLERS * OPS);

        for id in &all_ids {
            assert!(store
                .failed_event(group_a().as_ref(), *id)
                .await
                .unwrap()
                .is_some());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_removes_drain_the_store() {
        let store = Arc::new(MemoryEventDeadLetters::new());

        let mut ids = Vec::new();
        for _ in 0..100 {
            ids.push(store.store(group_a(), event()).await.unwrap());
        }

        let mut handles = Vec::new();
        for chunk in ids.chunks(10) {
            let store = store.clone();
            let chunk = chunk.to_vec();
            handles.push(tokio::spawn(async move {
                for id in chunk {
                    store.remove(group_a().as_ref(), id).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(!store.contain_events().await.unwrap());
    }
}
