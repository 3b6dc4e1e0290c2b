//! Web search used to research unfamiliar imports

mod client;
mod error;
mod google;
mod mock;

pub use client::{DisabledSearch, SearchHit, WebSearch};
pub use error::SearchError;
pub use google::GoogleCustomSearch;
pub use mock::MockWebSearch;
