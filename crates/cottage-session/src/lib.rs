//! Session persistence for inspection state.
//!
//! - [`store`] — `SessionStore` trait with in-memory and JSON-file backends,
//!   both expiring idle sessions after a TTL.
//! - [`cookie`] — `CookieSigner`, HMAC-SHA256 signed session cookies.

pub mod cookie;
pub mod store;

pub use cookie::{CookieSigner, SESSION_COOKIE};
pub use store::{
    DEFAULT_SESSION_TTL, FileSessionStore, InMemorySessionStore, SessionStore, spawn_sweeper,
};
