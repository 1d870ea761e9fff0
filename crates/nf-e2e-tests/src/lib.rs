//! End-to-end tests for the invoice agent live under `tests/`.
//!
//! They drive the HTTP router in-process against real archive fixtures on
//! disk, with the text-generation tier mocked or pointed at a local mock
//! server.
