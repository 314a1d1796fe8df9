pub mod client;
pub mod decode;
pub mod document;
pub mod walker;

pub use client::HttpSource;
pub use decode::{decode_page, FromResource, IncludedTable};
pub use document::Document;
pub use walker::{walk_collection, PageSource};

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed document: {0}")]
    Document(String),
    #[error("page size must be at least 1")]
    InvalidPageSize,
}
