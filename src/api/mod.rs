//! Backend REST API client.
//!
//! Every endpoint the client consumes, with typed request and response
//! bodies. Any non-success HTTP status surfaces as
//! [`DermxError::Rejected`](crate::DermxError::Rejected); the diagnosis
//! endpoint reports the response text instead.

mod client;
pub mod types;

pub use client::{BackendClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use types::{
    DiagnosisResult, LoginRequest, LoginResponse, Profile, RankedCondition,
    SignupCompleteRequest,
};
