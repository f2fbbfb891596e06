//! Deferred timed actions
//!
//! Invitation and application expiries are scheduled here rather than acted
//! on inline. Entries fire inside the serialized tick context; each carries
//! a cancellation token so a superseding mutation (resident joins another
//! town, application withdrawn) can turn the pending expiry into a no-op.
//! Fired actions still re-validate preconditions against current state.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{Millis, ResidentId, TownId};

/// Handle to a scheduled action. Token 0 is reserved for "none".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Actions that may fire later than they were scheduled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// A town invitation to a resident ran out
    TownInviteExpiry { resident: ResidentId },
    /// A join application to a town ran out
    ApplicationExpiry { town: TownId, resident: ResidentId },
    /// A nation invitation to a town ran out
    NationInviteExpiry { town: TownId },
}

#[derive(Clone, Debug)]
struct Entry {
    fire_at: Millis,
    token: TimerToken,
    action: DeferredAction,
}

// BinaryHeap is a max-heap; order entries so the earliest fire time wins.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.token.0.cmp(&self.token.0))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for Entry {}

/// Min-heap of scheduled actions with token-based cancellation
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Entry>,
    cancelled: AHashSet<TimerToken>,
    next_token: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an action and return its cancellation token
    pub fn schedule(&mut self, fire_at: Millis, action: DeferredAction) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.heap.push(Entry {
            fire_at,
            token,
            action,
        });
        token
    }

    /// Mark a token cancelled; the entry becomes a silent no-op at fire time
    pub fn cancel(&mut self, token: TimerToken) {
        if token != TimerToken::default() {
            self.cancelled.insert(token);
        }
    }

    /// Pop every non-cancelled action due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Vec<(TimerToken, DeferredAction)> {
        let mut due = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.fire_at > now {
                break;
            }
            let entry = self.heap.pop().expect("peeked entry exists");
            if self.cancelled.remove(&entry.token) {
                continue;
            }
            due.push((entry.token, entry.action));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invite(resident: ResidentId) -> DeferredAction {
        DeferredAction::TownInviteExpiry { resident }
    }

    #[test]
    fn test_fires_in_time_order() {
        let mut queue = TimerQueue::new();
        let r1 = ResidentId::new();
        let r2 = ResidentId::new();
        queue.schedule(200, invite(r2));
        queue.schedule(100, invite(r1));

        let due = queue.pop_due(300);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].1, invite(r1));
        assert_eq!(due[1].1, invite(r2));
    }

    #[test]
    fn test_not_due_yet_stays_queued() {
        let mut queue = TimerQueue::new();
        queue.schedule(500, invite(ResidentId::new()));
        assert!(queue.pop_due(499).is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(500).len(), 1);
    }

    #[test]
    fn test_cancelled_entry_is_silent() {
        let mut queue = TimerQueue::new();
        let keep = ResidentId::new();
        let token = queue.schedule(100, invite(ResidentId::new()));
        queue.schedule(100, invite(keep));
        queue.cancel(token);

        let due = queue.pop_due(100);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, invite(keep));
    }

    #[test]
    fn test_cancel_default_token_is_noop() {
        let mut queue = TimerQueue::new();
        queue.cancel(TimerToken::default());
        let token = queue.schedule(10, invite(ResidentId::new()));
        assert_ne!(token, TimerToken::default());
        assert_eq!(queue.pop_due(10).len(), 1);
    }
}
