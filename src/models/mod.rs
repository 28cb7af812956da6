mod password;
pub mod user;

pub use user::{User, ValidationErrors};
pub use password::PasswordError;
