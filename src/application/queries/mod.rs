//! Read-side queries.
//!
//! Everything here derives from stored state at call time; lifecycle and
//! unread counts are never persisted, so these views cannot go stale.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::discussion::{latest_foreign_message, unread_count};
use crate::domain::foundation::{DomainError, ErrorCode, MessageId, UserId, WorkCycleId, WorkItemId};
use crate::domain::workcycle::{LifecycleState, WorkCycle};
use crate::domain::workitem::{SubmissionTiming, WorkItem};
use crate::ports::{Clock, DiscussionStore, NotificationStore, WorkCycleRepository,
    WorkItemRepository};

/// One work item joined with its cycle, as the owner's dashboard shows it.
#[derive(Debug, Clone)]
pub struct OwnerWorkItem {
    pub item: WorkItem,
    pub cycle: WorkCycle,
    pub lifecycle: LifecycleState,
    pub timing: Option<SubmissionTiming>,
}

/// Unread summary for one discussion thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub work_item: WorkItemId,
    pub unread: usize,
    pub latest_foreign_message: Option<MessageId>,
}

pub struct WorkQueries {
    cycles: Arc<dyn WorkCycleRepository>,
    items: Arc<dyn WorkItemRepository>,
    discussions: Arc<dyn DiscussionStore>,
    notifications: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
}

impl WorkQueries {
    pub fn new(
        cycles: Arc<dyn WorkCycleRepository>,
        items: Arc<dyn WorkItemRepository>,
        discussions: Arc<dyn DiscussionStore>,
        notifications: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            items,
            discussions,
            notifications,
            clock,
        }
    }

    /// The owner's dashboard: every active item with its cycle's derived
    /// lifecycle and, once submitted, the on-time/late classification.
    pub async fn active_work_for(
        &self,
        owner: &UserId,
    ) -> Result<Vec<OwnerWorkItem>, DomainError> {
        let now = self.clock.now();
        let items = self.items.list_active_for_owner(owner).await?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let cycle = self
                .cycles
                .find_by_id(item.cycle_id())
                .await?
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::CycleNotFound,
                        format!("Work item {} references a missing cycle", item.id()),
                    )
                })?;
            let lifecycle = cycle.lifecycle(now);
            let timing = item.submission_timing(cycle.due_at());
            out.push(OwnerWorkItem {
                item,
                cycle,
                lifecycle,
                timing,
            });
        }
        Ok(out)
    }

    /// Derived lifecycle of one cycle, right now.
    pub async fn lifecycle_of(&self, cycle_id: WorkCycleId) -> Result<LifecycleState, DomainError> {
        let cycle = self.cycles.find_by_id(cycle_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::CycleNotFound, format!("No work cycle {cycle_id}"))
        })?;
        Ok(cycle.lifecycle(self.clock.now()))
    }

    /// Lifecycle histogram over every cycle in the system, archived included.
    pub async fn lifecycle_counts(&self) -> Result<HashMap<LifecycleState, usize>, DomainError> {
        let now = self.clock.now();
        let mut counts = HashMap::new();
        for cycle in self.cycles.list_all().await? {
            *counts.entry(cycle.lifecycle(now)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Unread message count for one user in one thread.
    pub async fn thread_unread(
        &self,
        work_item: WorkItemId,
        user: &UserId,
    ) -> Result<usize, DomainError> {
        let messages = self.discussions.messages_for_item(work_item).await?;
        let cursor = self.discussions.cursor(work_item, user).await?;
        Ok(unread_count(&messages, user, cursor.as_ref()))
    }

    /// Thread summaries across all of a user's active items, for dashboard
    /// badges.
    pub async fn thread_summaries_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<ThreadSummary>, DomainError> {
        let items = self.items.list_active_for_owner(user).await?;
        let mut summaries = Vec::with_capacity(items.len());
        for item in items {
            let messages = self.discussions.messages_for_item(item.id()).await?;
            let cursor = self.discussions.cursor(item.id(), user).await?;
            summaries.push(ThreadSummary {
                work_item: item.id(),
                unread: unread_count(&messages, user, cursor.as_ref()),
                latest_foreign_message: latest_foreign_message(&messages, user).map(|m| m.id()),
            });
        }
        Ok(summaries)
    }

    /// Total unread across every thread the user participates in.
    pub async fn total_thread_unread(&self, user: &UserId) -> Result<usize, DomainError> {
        Ok(self
            .thread_summaries_for(user)
            .await?
            .iter()
            .map(|s| s.unread)
            .sum())
    }

    /// Unread in-app notification count.
    pub async fn unread_notifications(&self, user: &UserId) -> Result<u64, DomainError> {
        self.notifications.unread_count(user).await
    }
}
