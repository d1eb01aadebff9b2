mod ride_request;

pub use ride_request::RideRequest;
pub use ride_request::Status as RideStatus;
