use std::future::Future;
use std::time::Duration;

use futures::future::try_join;
use tokio::sync::{watch, OnceCell, SetError};

use crate::{
    api::{DynNotificationAPI, DynPrompt, DynRideRequestAPI, Notice},
    auth::User,
    config::AppConfig,
    error::{invalid_state_error, unauthenticated_error, Error},
    state::{ActionKind, Activity, RideListState, StateContainer},
};

/// How a destructive action ended, from the caller's point of view.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// Another action was already in flight; nothing was sent.
    Busy,
    Succeeded,
    Failed(Failure),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Failure {
    /// The mutation itself failed or timed out.
    Mutation(Error),
    /// The rejection was committed but the participants were not notified.
    /// The user sees the same notice as for a failed rejection.
    Notification(Error),
}

impl Failure {
    pub fn error(&self) -> &Error {
        match self {
            Self::Mutation(err) | Self::Notification(err) => err,
        }
    }

    /// Whether the backend holds the mutation despite the failure.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Notification(_))
    }
}

/// Drives the ride list view: loads both collections and sequences the
/// delete and reject actions against the backend.
pub struct Coordinator {
    rides: DynRideRequestAPI,
    notifications: DynNotificationAPI,
    prompt: DynPrompt,
    user: OnceCell<User>,
    state: StateContainer,
    timeout: Duration,
}

impl Coordinator {
    pub fn new(
        rides: DynRideRequestAPI,
        notifications: DynNotificationAPI,
        prompt: DynPrompt,
        user: Option<User>,
        timeout: Duration,
    ) -> Self {
        Self {
            rides,
            notifications,
            prompt,
            user: OnceCell::new_with(user),
            state: StateContainer::new(),
            timeout,
        }
    }

    pub fn from_config(
        rides: DynRideRequestAPI,
        notifications: DynNotificationAPI,
        prompt: DynPrompt,
        user: Option<User>,
        config: &AppConfig,
    ) -> Self {
        Self::new(rides, notifications, prompt, user, config.request_timeout())
    }

    pub fn user(&self) -> Option<User> {
        self.user.get().copied()
    }

    pub fn subscribe(&self) -> watch::Receiver<RideListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RideListState {
        self.state.snapshot()
    }

    pub fn activity(&self) -> Activity {
        self.state.activity()
    }

    /// Records the user once the session resolves and performs the initial
    /// load. The identity of a view never changes afterwards.
    #[tracing::instrument(skip(self))]
    pub async fn attach_user(&self, user: User) -> Result<(), Error> {
        match self.user.set(user) {
            Ok(()) => {}
            Err(SetError::AlreadyInitializedError(_)) if self.user.get() == Some(&user) => {}
            Err(err) => {
                tracing::error!(
                    error = %err,
                    current = ?self.user.get(),
                    "view already belongs to another user"
                );
                return Err(invalid_state_error());
            }
        }

        self.refresh().await
    }

    /// Fetches both collections and swaps them into the view together. On
    /// failure the previous state stays in place.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), Error> {
        let user = self.require_user()?;

        let fetched = try_join(
            self.bounded(self.rides.fetch_created(user.id)),
            self.bounded(self.rides.fetch_accepted(user.id)),
        )
        .await;

        match fetched {
            Ok((created, accepted)) => {
                tracing::info!(
                    created = created.len(),
                    accepted = accepted.len(),
                    "replacing ride lists"
                );
                self.state.replace_all(created, accepted);
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch rides, keeping previous lists");
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_request(&self, request_id: i64) -> Result<Outcome, Error> {
        self.require_user()?;

        if !self.confirm(ActionKind::Delete) {
            return Ok(self.unstarted_outcome());
        }

        let guard = match self.state.begin(ActionKind::Delete, request_id) {
            Some(guard) => guard,
            None => return Ok(Outcome::Busy),
        };
        tracing::info!(action_id = %guard.action_id(), "deleting ride request");

        let outcome = match self.bounded(self.rides.delete_request(request_id)).await {
            Ok(()) => {
                self.prompt.notice(Notice::Deleted);
                Outcome::Succeeded
            }
            Err(err) => {
                tracing::error!(error = %err, "error deleting ride request");
                self.prompt.notice(Notice::DeleteFailed);
                Outcome::Failed(Failure::Mutation(err))
            }
        };

        if outcome == Outcome::Succeeded {
            self.refresh_after_mutation().await;
        }

        drop(guard);
        Ok(outcome)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reject_request(&self, request_id: i64) -> Result<Outcome, Error> {
        let user = self.require_user()?;

        if !self.confirm(ActionKind::Reject) {
            return Ok(self.unstarted_outcome());
        }

        let guard = match self.state.begin(ActionKind::Reject, request_id) {
            Some(guard) => guard,
            None => return Ok(Outcome::Busy),
        };
        tracing::info!(action_id = %guard.action_id(), "rejecting ride request");

        let result = match self
            .bounded(self.rides.reject_request(request_id, user.id))
            .await
        {
            Ok(()) => self
                .bounded(self.notifications.ride_rejected(request_id, user.id))
                .await
                .map_err(|err| {
                    tracing::warn!(
                        error = %err,
                        "ride rejected but participants were not notified"
                    );
                    Failure::Notification(err)
                }),
            Err(err) => {
                tracing::error!(error = %err, "error rejecting ride request");
                Err(Failure::Mutation(err))
            }
        };

        let outcome = match result {
            Ok(()) => {
                self.prompt.notice(Notice::Rejected);
                Outcome::Succeeded
            }
            Err(failure) => {
                self.prompt.notice(Notice::RejectFailed);
                Outcome::Failed(failure)
            }
        };

        if outcome == Outcome::Succeeded {
            self.refresh_after_mutation().await;
        }

        drop(guard);
        Ok(outcome)
    }

    /// A failed mutation leaves the lists as they were; only a successful one
    /// is followed by a refresh. A failed refresh here is logged by `refresh`
    /// and keeps the previous lists.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "lists may be stale after the action");
        }
    }

    fn require_user(&self) -> Result<User, Error> {
        self.user.get().copied().ok_or_else(|| {
            tracing::info!("no session yet, staying idle");
            unauthenticated_error()
        })
    }

    /// Controls are disabled while an action is in flight, so a busy view
    /// never prompts.
    fn confirm(&self, kind: ActionKind) -> bool {
        if self.state.is_busy() {
            tracing::info!(action = kind.name(), "another action is in flight, ignoring");
            return false;
        }

        let confirmed = self.prompt.confirm(kind.confirmation());
        if !confirmed {
            tracing::info!(action = kind.name(), "action declined");
        }

        confirmed
    }

    fn unstarted_outcome(&self) -> Outcome {
        if self.state.is_busy() {
            Outcome::Busy
        } else {
            Outcome::Declined
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        tokio::time::timeout(self.timeout, fut).await?
    }
}
