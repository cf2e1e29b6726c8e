//! Thin adapter for the remote semantic search service.
//!
//! One health probe, one `POST /search` round trip, and the query builder
//! that turns a request context into a search phrase.

mod client;
mod types;

pub use client::{build_search_query, SemanticSearchClient};
pub use types::{HitMetadata, SearchHit, SearchRequest, SearchResponse};

/// Hits requested per search; the top one is shown, the rest are kept as
/// alternatives in the result details.
pub const SEARCH_TOP_K: u32 = 3;

/// Seen ids sent as exclusions with each search request.
pub const SEARCH_EXCLUDE_WINDOW: usize = 30;
