pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod ingest;
pub mod model;
pub mod parsers;
pub mod report;
pub mod resolve;
pub mod settings;
