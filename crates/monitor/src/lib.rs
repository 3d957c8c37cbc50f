//! Client for the network-monitoring platform's REST API.
//!
//! Wraps an authenticated HTTP session and hides the remote API's
//! instability (multiple candidate token endpoints, inconsistent
//! response envelopes and field names) behind a stable method surface.
//! Every public operation either returns a result object with an
//! explicit `success` flag or fails with one of exactly two error
//! kinds: [`MonitorError::Authentication`] or [`MonitorError::Api`].

pub mod client;
pub mod error;
pub mod types;

pub use client::{MonitorClient, MonitorConfig};
pub use error::MonitorError;
pub use types::{
    AddDeviceResult, AuthCandidate, AuthScheme, BulkAddResult, ConnectionTest, DeviceGroup,
    DeviceMetadata, MonitorDevice, ScanResult, ScanResults,
};
