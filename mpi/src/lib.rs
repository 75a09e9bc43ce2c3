#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Version-agnostic client for 3-D Secure MPI services.
//!
//! An MPI (Merchant Plug-In) service authenticates cardholders for online
//! card payments. It exposes three operations: **lookup** starts an
//! authentication session, **query** reads the authentication status of a
//! transaction, and **update** attaches settlement metadata to it. Two
//! incompatible protocol versions exist; [`MpiService`] hides the difference
//! behind one set of canonical types.
//!
//! # Modules
//!
//! - [`service`] - The facade and its builder
//! - [`dialect`] - Per-version request mapping and response classification
//! - [`transport`] - Transport trait, `reqwest` transport and fixture mock
//! - [`model`] - Canonical request and result types
//! - [`outcome`] - Success or declared service error
//! - [`endpoint`] - Endpoint templates and operations
//! - [`config`] - Serde configuration
//! - [`error`] - Error types
//!
//! # Feature Flags
//!
//! - `http` (default) - `reqwest`-backed [`HttpTransport`]
//! - `telemetry` - `tracing` spans and events for each operation
//! - `full` - All of the above

pub mod config;
pub mod dialect;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod outcome;
pub mod service;
pub mod transport;
pub mod version;

pub use config::MpiConfig;
pub use dialect::{Dialect, DialectRegistry};
pub use endpoint::{EndpointSet, Operation};
pub use error::{ConfigurationError, MpiError, TransportError};
pub use model::{
    AuthenticationStatus, BrowserInfo, Card, LookupRequest, LookupSession, QueryOptions,
    TransStatus, TransactionId, TransactionType, UpdateTransactionRequest, UpdatedTransaction,
};
pub use outcome::{LookupResult, Outcome, QueryResult, ServiceError, UpdateResult};
pub use service::{MpiService, MpiServiceBuilder};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{MockTransport, Transport, TransportRequest};
pub use version::ProtocolVersion;

pub use mpi_proto as proto;
