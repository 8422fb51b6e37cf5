//! Executor interface used by every data-fetching call site.
//!
//! Keep the public surface small: build a [`RequestExecutor`] once, clone it
//! into whatever needs to talk to the network.

pub mod builder;
pub mod executor;

pub use builder::RequestExecutorBuilder;
pub use executor::RequestExecutor;
