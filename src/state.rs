use std::collections::HashSet;

use tokio::sync::watch;
use uuid::Uuid;

use crate::entities::RideRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    Reject,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Reject => "reject",
        }
    }

    pub fn confirmation(&self) -> &'static str {
        match self {
            Self::Delete => "Are you sure you want to delete this ride?",
            Self::Reject => "Are you sure you want to reject this ride?",
        }
    }
}

/// View-wide lock over destructive actions. At most one sequence is in
/// flight, whichever row or action it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Idle,
    InFlight {
        action_id: Uuid,
        kind: ActionKind,
        request_id: i64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RideListState {
    pub created: Vec<RideRequest>,
    pub accepted: Vec<RideRequest>,
    pub activity: Activity,
}

impl Default for RideListState {
    fn default() -> Self {
        Self {
            created: vec![],
            accepted: vec![],
            activity: Activity::Idle,
        }
    }
}

impl RideListState {
    pub fn is_busy(&self) -> bool {
        !matches!(self.activity, Activity::Idle)
    }
}

/// Owner of the ride list state. Readers subscribe to a `watch` channel and
/// only ever observe whole transitions.
#[derive(Debug)]
pub struct StateContainer {
    tx: watch::Sender<RideListState>,
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateContainer {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RideListState::default());

        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<RideListState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> RideListState {
        self.tx.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.tx.borrow().is_busy()
    }

    pub fn activity(&self) -> Activity {
        self.tx.borrow().activity
    }

    /// Swaps both sequences in a single transition.
    pub fn replace_all(&self, created: Vec<RideRequest>, accepted: Vec<RideRequest>) {
        let created = unique_by_id(created);
        let accepted = unique_by_id(accepted);

        self.tx.send_modify(|state| {
            state.created = created;
            state.accepted = accepted;
        });
    }

    /// Marks an action as in flight unless another one already is. The
    /// returned guard puts the container back to `Idle` when dropped.
    pub fn begin(&self, kind: ActionKind, request_id: i64) -> Option<InFlight<'_>> {
        let action_id = Uuid::new_v4();

        let started = self.tx.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }

            state.activity = Activity::InFlight {
                action_id,
                kind,
                request_id,
            };
            true
        });

        if !started {
            return None;
        }

        Some(InFlight {
            container: self,
            action_id,
        })
    }

    fn release(&self, action_id: Uuid) {
        self.tx.send_if_modified(|state| match state.activity {
            Activity::InFlight { action_id: id, .. } if id == action_id => {
                state.activity = Activity::Idle;
                true
            }
            _ => false,
        });
    }
}

#[derive(Debug)]
pub struct InFlight<'a> {
    container: &'a StateContainer,
    action_id: Uuid,
}

impl InFlight<'_> {
    pub fn action_id(&self) -> Uuid {
        self.action_id
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.container.release(self.action_id);
    }
}

fn unique_by_id(requests: Vec<RideRequest>) -> Vec<RideRequest> {
    let mut seen = HashSet::new();

    requests
        .into_iter()
        .filter(|request| {
            if seen.insert(request.request_id) {
                return true;
            }

            tracing::warn!(
                request_id = request.request_id,
                "dropping duplicate ride request from response"
            );
            false
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RideStatus;
    use chrono::{TimeZone, Utc};
    use tokio_test::block_on;

    fn ride(request_id: i64) -> RideRequest {
        RideRequest {
            request_id,
            user_id: 1,
            origin: "A".into(),
            destination: "B".into(),
            total_fare: 10.0,
            vehicle_type: "sedan".into(),
            total_passengers: 2,
            total_accepted: 0,
            ride_time: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            status: RideStatus::Open,
        }
    }

    #[test]
    fn replace_all_is_one_transition() {
        let container = StateContainer::new();
        let mut rx = container.subscribe();

        container.replace_all(vec![ride(1), ride(2)], vec![ride(3)]);

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.created.len(), 2);
        assert_eq!(state.accepted.len(), 1);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn replace_all_discards_previous_contents() {
        let container = StateContainer::new();

        container.replace_all(vec![ride(1), ride(2)], vec![ride(3)]);
        container.replace_all(vec![ride(2)], vec![]);

        let state = container.snapshot();
        assert_eq!(state.created, vec![ride(2)]);
        assert!(state.accepted.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let container = StateContainer::new();
        let mut changed = ride(1);
        changed.origin = "C".into();

        container.replace_all(vec![ride(1), changed, ride(2)], vec![]);

        let created = container.snapshot().created;
        assert_eq!(created.iter().map(|r| r.request_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(created[0].origin, "A");
    }

    #[test]
    fn only_one_action_in_flight() {
        let container = StateContainer::new();

        let guard = container.begin(ActionKind::Delete, 1).unwrap();
        assert!(container.is_busy());
        assert!(container.begin(ActionKind::Reject, 2).is_none());

        match container.activity() {
            Activity::InFlight {
                action_id,
                kind,
                request_id,
            } => {
                assert_eq!(action_id, guard.action_id());
                assert_eq!(kind, ActionKind::Delete);
                assert_eq!(request_id, 1);
            }
            Activity::Idle => panic!("expected an in-flight action"),
        }

        drop(guard);
        assert_eq!(container.activity(), Activity::Idle);
        assert!(container.begin(ActionKind::Reject, 2).is_some());
    }

    #[test]
    fn subscribers_see_busy_transitions() {
        let container = StateContainer::new();
        let mut rx = container.subscribe();

        let guard = container.begin(ActionKind::Reject, 5).unwrap();
        block_on(rx.changed()).unwrap();
        assert!(rx.borrow_and_update().is_busy());

        drop(guard);
        block_on(rx.changed()).unwrap();
        assert!(!rx.borrow_and_update().is_busy());
    }
}
