// AEO engine: score prediction, concise answers, rewrites and schema markup.
// All LLM calls go through aeo::invoker — no direct provider calls here.

pub mod analysis;
pub mod concise;
pub mod handlers;
pub mod invoker;
pub mod prompts;
pub mod rewrite;
pub mod schema_markup;
pub mod score;

pub use invoker::PromptInvoker;
