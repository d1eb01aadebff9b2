use std::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    /// Codes below 100 are transport or environment faults, the rest are caused
    /// by the caller or by the current view state.
    pub fn is_internal(&self) -> bool {
        (1..=99).contains(&self.code)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        timeout_error()
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: 100,
        message: "invalid state".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unauthenticated_error() -> Error {
    Error {
        code: 102,
        message: "no authenticated user".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return timeout_error();
    }

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn timeout_error() -> Error {
    Error {
        code: 6,
        message: "request timed out".into(),
    }
}

#[test]
fn error_classes() {
    assert!(upstream_error().is_internal());
    assert!(timeout_error().is_internal());
    assert!(!invalid_input_error().is_internal());
    assert!(!unauthenticated_error().is_internal());
    assert_eq!(timeout_error().to_string(), "request timed out (code 6)");
}
