//! Client for the Kodik video metadata search API.
//!
//! [`KodikApi`] builds `search` requests from a [`SourceConfig`], sends them
//! through a [`Transport`], turns failures into [`KodikError`]s and hands every
//! usable result record to a [`VideoFactory`].

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod interpret;
pub mod record;
pub mod request;
pub mod storage;
pub mod transport;
pub mod video;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::{KodikApi, KodikError, ErrorKind, SourceConfig, Transport, TokenCache, VideoFactory, RawRecord};
    pub use crate::{HttpTransport, MemoryTokenCache, Database, KodikVideo, KodikVideoFactory, Feed};
}

pub use api::KodikApi;
pub use config::SourceConfig;
pub use db::Database;
pub use error::{ErrorKind, KodikError, Result};
pub use feed::Feed;
pub use record::{RawRecord, VideoFactory};
pub use storage::{MemoryTokenCache, TokenCache};
pub use transport::{HttpTransport, Response, Transport, TransportFailure};
pub use video::{KodikVideo, KodikVideoFactory};
