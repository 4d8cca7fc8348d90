//! CLI command implementations

mod config_gen;
mod links;
mod stats;

pub use config_gen::config_generate;
pub use links::{list_links, remove_link};
pub use stats::show_stats;
