//! Helix API access
//!
//! The [`client::HelixClient`] facade sits on top of an authenticated
//! request executor and a cursor paginator; everything rides the
//! [`http::HttpTransport`] seam so tests can swap the network out.

pub mod client;
pub mod executor;
pub mod http;
pub mod paginator;
pub mod request;
pub mod types;

pub use client::{HelixClient, PagedItems};
pub use executor::RequestExecutor;
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use paginator::{Page, Paginator};
pub use request::RequestSpec;
pub use types::{Category, ChannelInfo, Clip, Stream, StreamFilter, User};
