pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod stats;
pub mod storage;
pub mod task_store;

#[cfg(test)]
mod testing;
