//! Time-bounded credentials.
//!
//! Both token kinds share the same shape: an immutable identity and expiry
//! plus a revocation instant that can be set once. Expiry is never stored
//! as a flag; every read compares against a clock.

mod access_token;
mod factories;
mod refresh_token;

pub use access_token::{AccessToken, AccessTokenProps};
pub use factories::{AccessTokenFactory, RefreshTokenFactory};
pub use refresh_token::{RefreshToken, RefreshTokenProps};
