//! MCP tools for sitedex

pub mod search;

pub use search::{
    DEFAULT_LIMIT, SearchContext, SearchParams, SearchResult, SearchRun, SearchToolOutput,
    handle_search,
};
