//! Byte-source implementations: live HTTP and canned replay.

pub mod http;
pub mod replay;

pub use http::HttpSource;
pub use replay::ReplaySource;
