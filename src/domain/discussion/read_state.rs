//! Per-user read cursors over discussion threads.
//!
//! A cursor records the highest message id a user has seen in one thread.
//! Unread counting excludes the user's own messages: sending does not mark a
//! thread read, and your own words are never unread to you.

use crate::domain::foundation::{MessageId, Timestamp, UserId, WorkItemId};

/// Where one user has read up to in one work item's thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCursor {
    work_item: WorkItemId,
    user: UserId,
    last_read_message: MessageId,
    last_read_at: Timestamp,
}

impl ReadCursor {
    pub fn new(
        work_item: WorkItemId,
        user: UserId,
        last_read_message: MessageId,
        now: Timestamp,
    ) -> Self {
        Self {
            work_item,
            user,
            last_read_message,
            last_read_at: now,
        }
    }

    pub fn work_item(&self) -> WorkItemId {
        self.work_item
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn last_read_message(&self) -> MessageId {
        self.last_read_message
    }

    pub fn last_read_at(&self) -> Timestamp {
        self.last_read_at
    }

    /// Moves the cursor forward. A stale or equal id is ignored so that
    /// concurrent or repeated reads can never roll the cursor back.
    pub fn advance(&mut self, to: MessageId, now: Timestamp) -> bool {
        if to > self.last_read_message {
            self.last_read_message = to;
            self.last_read_at = now;
            true
        } else {
            false
        }
    }
}

/// Counts messages in `messages` that `user` has not read.
///
/// Own messages never count. Without a cursor every foreign message is
/// unread.
pub fn unread_count(
    messages: &[crate::domain::discussion::ThreadMessage],
    user: &UserId,
    cursor: Option<&ReadCursor>,
) -> usize {
    let floor = cursor.map(|c| c.last_read_message).unwrap_or(MessageId::zero());
    messages
        .iter()
        .filter(|m| m.sender() != user && m.id() > floor)
        .count()
}

/// The newest message in the thread not sent by `user`, if any.
///
/// This is what "mark read" advances to; advancing to an own message would
/// silently swallow foreign messages posted in between.
pub fn latest_foreign_message<'a>(
    messages: &'a [crate::domain::discussion::ThreadMessage],
    user: &UserId,
) -> Option<&'a crate::domain::discussion::ThreadMessage> {
    messages
        .iter()
        .filter(|m| m.sender() != user)
        .max_by_key(|m| m.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discussion::ThreadMessage;
    use crate::domain::org::Role;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn msg(item: WorkItemId, id: i64, sender: &str) -> ThreadMessage {
        ThreadMessage::new(item, uid(sender), Role::User, format!("message {id}"), Timestamp::now())
            .unwrap()
            .with_id(MessageId::from_i64(id))
    }

    fn thread() -> (WorkItemId, Vec<ThreadMessage>) {
        let item = WorkItemId::new();
        let messages = vec![
            msg(item, 1, "alice"),
            msg(item, 2, "bob"),
            msg(item, 3, "alice"),
            msg(item, 4, "bob"),
        ];
        (item, messages)
    }

    #[test]
    fn everything_foreign_is_unread_without_a_cursor() {
        let (_, messages) = thread();
        assert_eq!(unread_count(&messages, &uid("alice"), None), 2);
        assert_eq!(unread_count(&messages, &uid("bob"), None), 2);
        // A third party has read nothing and sent nothing.
        assert_eq!(unread_count(&messages, &uid("carol"), None), 4);
    }

    #[test]
    fn cursor_floors_the_count() {
        let (item, messages) = thread();
        let cursor = ReadCursor::new(item, uid("alice"), MessageId::from_i64(2), Timestamp::now());
        // Only bob's message 4 is beyond the cursor.
        assert_eq!(unread_count(&messages, &uid("alice"), Some(&cursor)), 1);
    }

    #[test]
    fn own_messages_never_count_as_unread() {
        let item = WorkItemId::new();
        let messages = vec![msg(item, 1, "alice"), msg(item, 2, "alice")];
        assert_eq!(unread_count(&messages, &uid("alice"), None), 0);
    }

    #[test]
    fn latest_foreign_skips_own_tail() {
        let (_, messages) = thread();
        // Alice's own message 3 is not a read target; bob's 4 is.
        let latest = latest_foreign_message(&messages, &uid("bob")).unwrap();
        assert_eq!(latest.id(), MessageId::from_i64(3));
    }

    #[test]
    fn cursor_only_moves_forward() {
        let item = WorkItemId::new();
        let mut cursor =
            ReadCursor::new(item, uid("alice"), MessageId::from_i64(5), Timestamp::now());
        assert!(!cursor.advance(MessageId::from_i64(3), Timestamp::now()));
        assert!(!cursor.advance(MessageId::from_i64(5), Timestamp::now()));
        assert_eq!(cursor.last_read_message(), MessageId::from_i64(5));
        assert!(cursor.advance(MessageId::from_i64(7), Timestamp::now()));
        assert_eq!(cursor.last_read_message(), MessageId::from_i64(7));
    }
}
