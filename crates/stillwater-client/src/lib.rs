//! Client side of Stillwater.
//!
//! - [`ApiClient`]: one async method per endpoint, decoding the response
//!   envelope into typed data or a [`ClientError`].
//! - [`AuthContext`]: the signed-in identity, persisted through a
//!   [`SessionStore`] and passed explicitly to whatever needs it.
//! - [`AutoSaver`]: debounced, single-flight saving of an editor's draft.

pub mod autosave;
pub mod client;
pub mod context;
pub mod error;
pub mod models;

pub use autosave::{AutoSaveConfig, AutoSaver, DraftSink, RemoteDraft, SaveStatus, parse_tags};
pub use client::{ApiClient, ListQuery, SearchParams};
pub use context::{AuthContext, FileStore, MemoryStore, SessionStore, StoredAuth};
pub use error::ClientError;
pub use models::{Session, SessionDraft, SessionStatus, User};
