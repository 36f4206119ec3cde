//! Request and response bodies of the REST surface.

mod forms;
mod user;

pub use forms::*;
pub use user::{AuthResponse, LoginRequest, RegisterRequest};
