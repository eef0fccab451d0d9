//! Integration test modules for consort

pub mod concurrency;
pub mod engine;
pub mod introspection;
pub mod registry;
