mod envelope;
pub use self::envelope::{Envelope, Notification};

mod auth;
pub use self::auth::{LoginCredentials, RegisteredUser};
