//! Utility modules
//!
//! Small helpers shared by the pipeline stages.

pub mod cancel;
pub mod http_interceptor;
pub mod mime;

pub use cancel::CancelHandle;
pub use http_interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor};
