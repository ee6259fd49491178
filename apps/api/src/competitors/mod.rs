// Competitor snapshot: live SERP results for the target query.
// Degrades to an empty list; never surfaces an error to the caller.

pub mod fetcher;
pub mod handlers;
pub mod transform;

pub use fetcher::{CompetitorFetcher, SerperBackend};
pub use transform::CompetitorResult;
