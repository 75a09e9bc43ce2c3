//! Wire format types for 3-D Secure MPI services.
//!
//! This crate defines the serialization-level data structures spoken by the
//! two MPI protocol dialects. It depends only on `serde`, `serde_json` and
//! `serde_with` and is shared by every crate of the workspace.
//!
//! # Modules
//!
//! - [`v1`]: Legacy dialect (`/api/lookup`, snake_case field names)
//! - [`v2`]: EMV 3-D Secure 2 dialect (`/api/threeds/v2/...`, camelCase EMV names)
//! - [`responses`]: Payloads shared by both dialects: declared errors,
//!   transaction updates and settlement records
//! - [`id`]: Opaque identifiers that may travel as strings or integers

pub mod id;
pub mod responses;
pub mod v1;
pub mod v2;

pub use id::OpaqueId;
pub use responses::{
    ErrorPayload, FieldErrors, PaymentUpdate, SettlementRecord, UpdateTransactionPayload,
};

/// Name of the field whose presence marks a body as a declared service error.
pub const ERROR_NUMBER_FIELD: &str = "error_number";

/// `Accept` header value expected by every MPI endpoint.
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.api.v1+json";

/// `Content-Type` header value used for request bodies.
pub const CONTENT_MEDIA_TYPE: &str = "application/json";
