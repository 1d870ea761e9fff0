//! Shared types for the nota fiscal query agent.
//!
//! Used by the tabular engine (`nf-tabular`) and the HTTP API
//! (`nf-agent-api`) so both sides agree on record shapes, intents and
//! wire bodies.

pub mod api;
pub mod intent;
pub mod records;
pub mod summary;

pub use api::*;
pub use intent::*;
pub use records::*;
pub use summary::*;
