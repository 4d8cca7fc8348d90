//! snappylink - A small URL shortener service
//!
//! Users register, create short links to long URLs, and visitors following a
//! short link are redirected to the destination while its click counter is
//! incremented.
//!
//! # Features
//! - **cli**: management subcommands (default)
//!
//! # Architecture
//! - `storage`: SeaORM backed persistence for users and links
//! - `services`: link and account business logic
//! - `api`: HTTP handlers, middleware and JWT handling
//! - `interfaces`: command-line management interface
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
