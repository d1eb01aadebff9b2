use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::RideRequest;
use crate::error::Error;

#[async_trait]
pub trait RideRequestAPI {
    async fn fetch_created(&self, user_id: i64) -> Result<Vec<RideRequest>, Error>;
    async fn fetch_accepted(&self, user_id: i64) -> Result<Vec<RideRequest>, Error>;
    async fn delete_request(&self, request_id: i64) -> Result<(), Error>;
    async fn reject_request(&self, request_id: i64, user_id: i64) -> Result<(), Error>;
}

#[async_trait]
pub trait NotificationAPI {
    /// Tells the other participants of `request_id` that `user_id` withdrew.
    async fn ride_rejected(&self, request_id: i64, user_id: i64) -> Result<(), Error>;
}

/// Blocking interaction points shown to the user. Both calls return only once
/// the user answered or dismissed them.
pub trait Prompt {
    fn confirm(&self, message: &str) -> bool;
    fn notice(&self, notice: Notice);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Deleted,
    DeleteFailed,
    Rejected,
    RejectFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Deleted => "Ride deleted successfully.",
            Self::DeleteFailed => "Failed to delete the ride.",
            Self::Rejected => "You have rejected the ride.",
            Self::RejectFailed => "Failed to reject the ride.",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DeleteFailed | Self::RejectFailed)
    }
}

pub type DynRideRequestAPI = Arc<dyn RideRequestAPI + Send + Sync>;
pub type DynNotificationAPI = Arc<dyn NotificationAPI + Send + Sync>;
pub type DynPrompt = Arc<dyn Prompt + Send + Sync>;
