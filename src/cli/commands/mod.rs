//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod export;
mod list;
mod process;
mod resection;
mod search;
mod show;
mod summarize;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use export::run_export;
pub use list::run_list;
pub use process::run_process;
pub use resection::run_resection;
pub use search::run_search;
pub use show::{print_document, run_show};
pub use summarize::run_summarize;
