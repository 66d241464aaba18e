//! # Authentication
//!
//! Bearer token issuance and verification, password hashing, session
//! lifecycle, and the HTTP authentication middleware.

pub mod hashing;
pub mod middleware;
pub mod models;
pub mod session;
pub mod token;

pub use middleware::{authenticate, require_admin};
pub use models::{AuthError, CurrentUser, SessionTokens, SignInResponse};
pub use session::SessionService;
pub use token::{BearerToken, TokenCodec, ValidityClass};
