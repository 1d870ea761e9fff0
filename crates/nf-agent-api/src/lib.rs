//! Invoice agent API: library crate behind the `nf-agent-api` binary.
//!
//! Re-exports all modules so the binary (`main.rs`) and the end-to-end
//! test crate can reach `AppState`, `build_router`, `AgentContext` and
//! the text-generation seam.

pub mod agent;
pub mod config;
pub mod error;
pub mod inference;
pub mod router;
pub mod routes;
pub mod state;
