//! jobq — asynchronous job queue with a broker, worker pool, progress
//! reporting and result retrieval.

pub mod broker;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod job;
pub mod pool;
pub mod registry;
pub mod service;
