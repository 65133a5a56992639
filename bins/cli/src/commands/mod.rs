//! CLI command handlers.

pub mod article;
pub mod config;

pub use article::{FormOperation, run_article_list, run_article_show, run_article_submit};
pub use config::{run_config_schema, run_config_show};
