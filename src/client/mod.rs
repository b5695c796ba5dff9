//! Client side of the marketplace: an HTTP client for the `/api` surface, the
//! persisted session, navigation guards and the view-models behind each page.
//! Rendering is left to whatever front end embeds this module.

pub mod api;
pub mod router;
pub mod session;
pub mod views;

pub use api::{ApiClient, ClientError};
pub use router::{guard, Navigation, Route};
pub use session::{FileSessionStore, MemorySessionStore, Profile, Session, SessionManager, SessionStore};
