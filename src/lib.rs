//! A relay that re-serves a single object-storage asset with CORS headers.
//!
//! `GET` and `HEAD` requests on any path are forwarded to the configured
//! upstream URL. Successful responses stream back unbuffered with
//! `Access-Control-Allow-*` headers added; upstream error responses are passed
//! through verbatim without them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod relay;
pub mod server;
pub mod telemetry;
pub mod upstream;
