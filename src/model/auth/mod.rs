mod rights;
mod token;

pub use rights::{Admin, Member, Rights};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
