//! Local email + password accounts and bearer-token authentication.

mod extract;
mod password;
mod token;

pub use extract::{AuthUser, NO_TOKEN, TOKEN_FAILED};
pub use password::{hash_password, verify_password};
pub use token::TokenKeys;
