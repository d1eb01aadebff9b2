use crate::auth::User;
use crate::config::AppConfig;

/// Source of the currently authenticated user. `None` means the session has
/// not resolved yet (or there is none), in which case nothing may be fetched.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;
}

/// Identity taken from `RIDE_USER_ID`, used by the terminal shell.
#[derive(Debug, Clone)]
pub struct EnvIdentity {
    user_id: Option<i64>,
}

impl EnvIdentity {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            user_id: config.user_id,
        }
    }
}

impl IdentityProvider for EnvIdentity {
    fn current_user(&self) -> Option<User> {
        self.user_id.map(User::new)
    }
}
