// Shared library for the bucket poller and topic tail consumers

pub mod config;
pub mod errors;
pub mod output;
pub mod poller;
pub mod queue;
pub mod storage;
pub mod telemetry;
