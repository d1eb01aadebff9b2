use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{upstream_error, Error};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub request_id: i64,
    pub user_id: i64,
    pub origin: String,
    pub destination: String,
    pub total_fare: f64,
    pub vehicle_type: String,
    pub total_passengers: u32,
    pub total_accepted: u32,
    pub ride_time: DateTime<Utc>,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Open => "open".into(),
            Self::Accepted => "accepted".into(),
            Self::Rejected => "rejected".into(),
            Self::Cancelled => "cancelled".into(),
            Self::Completed => "completed".into(),
            Self::Unknown => "unknown".into(),
        }
    }
}

impl RideRequest {
    /// Rejects records the backend should never produce: negative fares and
    /// more accepted passengers than requested seats.
    pub fn validate(&self) -> Result<(), Error> {
        if self.total_accepted > self.total_passengers {
            tracing::warn!(
                request_id = self.request_id,
                total_accepted = self.total_accepted,
                total_passengers = self.total_passengers,
                "ride request has more accepted passengers than seats"
            );
            return Err(upstream_error());
        }

        if !(self.total_fare >= 0.0) {
            tracing::warn!(request_id = self.request_id, "ride request has an invalid fare");
            return Err(upstream_error());
        }

        Ok(())
    }

    pub fn seats_remaining(&self) -> u32 {
        self.total_passengers.saturating_sub(self.total_accepted)
    }

    pub fn local_ride_time(&self) -> DateTime<Local> {
        self.ride_time.with_timezone(&Local)
    }

    pub fn summary(&self) -> String {
        format!(
            "#{} {} -> {} | fare {:.2} | {} | {}",
            self.request_id,
            self.origin,
            self.destination,
            self.total_fare,
            self.local_ride_time().format("%Y-%m-%d %H:%M"),
            self.status.name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(status: &str, passengers: u32, accepted: u32) -> String {
        format!(
            r#"{{
                "request_id": 7,
                "user_id": 3,
                "origin": "Airport",
                "destination": "Old Town",
                "total_fare": 42.5,
                "vehicle_type": "sedan",
                "total_passengers": {},
                "total_accepted": {},
                "ride_time": "2024-05-01T08:30:00Z",
                "status": "{}"
            }}"#,
            passengers, accepted, status
        )
    }

    #[test]
    fn decodes_backend_record() {
        let request: RideRequest = serde_json::from_str(&sample_json("open", 3, 1)).unwrap();

        assert_eq!(request.request_id, 7);
        assert_eq!(request.status, Status::Open);
        assert_eq!(request.seats_remaining(), 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let request: RideRequest =
            serde_json::from_str(&sample_json("awaiting_payment", 2, 0)).unwrap();

        assert_eq!(request.status, Status::Unknown);
        assert_eq!(request.status.name(), "unknown");
    }

    #[test]
    fn over_accepted_request_is_invalid() {
        let request: RideRequest = serde_json::from_str(&sample_json("accepted", 2, 3)).unwrap();

        assert_eq!(request.validate().unwrap_err(), upstream_error());
        assert_eq!(request.seats_remaining(), 0);
    }

    #[test]
    fn summary_names_route_and_status() {
        let request: RideRequest = serde_json::from_str(&sample_json("cancelled", 1, 0)).unwrap();
        let summary = request.summary();

        assert!(summary.starts_with("#7 Airport -> Old Town | fare 42.50"));
        assert!(summary.ends_with("cancelled"));
    }
}
