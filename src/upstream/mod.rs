//! Upstream REST API: the identity and todo service this frontend proxies.
//!
//! DESIGN
//! ======
//! Every outbound call goes through the [`Upstream`] trait so the gateway,
//! todo proxy and route guard classify raw `(status, body)` replies without
//! knowing about reqwest. [`client::ApiClient`] is the production
//! implementation; tests substitute a recording mock.

pub mod client;
pub mod types;

pub use types::{Upstream, UpstreamError, UpstreamReply, UpstreamRequest};
