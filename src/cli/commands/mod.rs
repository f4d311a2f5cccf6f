//! CLI command implementations.

mod ask;
mod config;
mod history;
mod ingest;
mod list;

pub use ask::run_ask;
pub use config::run_config;
pub use history::run_history;
pub use ingest::run_ingest;
pub use list::run_list;
