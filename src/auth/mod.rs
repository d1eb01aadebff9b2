mod identity;
mod user;

pub use identity::{EnvIdentity, IdentityProvider};
pub use user::User;
