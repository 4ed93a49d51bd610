pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod format;
pub mod handler;
pub mod llm;
pub mod masking;
pub mod output;
pub mod server;
pub mod validation;
pub mod verbose;
