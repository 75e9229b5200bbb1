// Library for the binary and integration tests

pub mod address;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod observer;
pub mod projector;
pub mod provider;
pub mod sampler;
pub mod version;
pub mod worker;
