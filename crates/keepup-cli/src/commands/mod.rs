pub mod account;
pub mod bug_report;
pub mod catalog;
pub mod config;
pub mod context;
pub mod prompts;
pub mod reviews;
pub mod tracked;
pub mod watch;
