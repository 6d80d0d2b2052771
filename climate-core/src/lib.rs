//! Core library for the `climate` CLI.
//!
//! This crate defines:
//! - Request building against the World Bank climate data API
//! - Transport and validator seams injected into the client
//! - XML decoding of annual rainfall records
//! - Exact decimal averaging of the decoded values
//! - Configuration handling
//!
//! It is used by `climate-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod request;
pub mod transport;
pub mod validate;

pub use client::ClimateClient;
pub use config::{Config, DEFAULT_BASE_URL};
pub use error::ClimateError;
pub use model::{ClimateDataList, ClimateDataPoint, QueryArgs};
pub use request::{CallContext, GetRequest};
pub use transport::{HttpResponse, Transport};
pub use validate::{RuleValidator, Validate, Validator};
