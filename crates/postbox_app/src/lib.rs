//! Command-line front end for the postbox batch downloader.
pub mod config;
pub mod effects;
pub mod session;
pub mod settings;
