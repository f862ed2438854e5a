//! Library wrapper around the `refq` CLI implementation.
//!
//! The CLI is primarily exercised via its binary (`src/main.rs`) and integration tests.
//! Compiling the binary crate root as a module here lets `cargo test -p refq-cli --lib` run
//! its unit tests without building the full binary test suite.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
