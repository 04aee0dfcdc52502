//! Test support: mock providers, scripted submitters and fixtures.
//!
//! Exposed as a public module so downstream crates can reuse the mocks in
//! their own tests.

mod fixtures;
mod mocks;

pub use fixtures::{city_registry, tokyo_record};
pub use mocks::{
    DeferringProvider, FailingProvider, OrphaningProvider, RoutingProvider, ScriptedSubmitter,
    ValueProvider,
};
