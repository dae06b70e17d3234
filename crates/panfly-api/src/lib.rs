// panfly-api: async client for the firewall XML management API
//
// Transport, envelope decoding, device targeting and log-job polling.
// Everything above the envelope (schema fallbacks, domain records) lives in
// `panfly-core`.

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod jobs;
pub mod params;
pub mod transport;

pub use client::XmlApiClient;
pub use envelope::{Envelope, PAYLOAD_ROOT, Status, wrap_fragment};
pub use error::Error;
pub use jobs::{JobHandle, JobResult, JobState, JobStatusSource, PollConfig, poll_job};
pub use params::{ConfigAction, Params, Route};
pub use transport::{TlsMode, TransportConfig};
