//! Authentication and authorization system.
//!
//! Sessions are opaque tokens: a login mints a random value, stores it in the
//! `user_tokens` table, and hands the raw value to the client. A token is
//! valid exactly while its row exists, so revocation is a row delete and no
//! token carries decodable structure.
//!
//! # Modules
//!
//! - [`password`]: Password hashing and verification using Argon2
//! - [`token`]: Session token value generation
//! - [`service`]: Transactional register/login/logout flows
//! - [`current_user`]: Extractor resolving the authenticated user in handlers
//! - [`middleware`]: Resource-ownership route guards
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use ripple::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//! ```
//!
//! A missing `Authorization` header rejects with 401; a header that does not
//! resolve to a stored token rejects with 403. Ownership guards in
//! [`middleware`] run after authentication and compare the resource's author
//! against the resolved identity.

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;
