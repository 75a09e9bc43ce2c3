//! Command-line client for 3-D Secure MPI services.
//!
//! The `mpi-cli` binary runs lookups, queries and updates against a
//! configured service, or against the built-in fixture transport with
//! `--mock`.

pub mod args;
pub mod config;
