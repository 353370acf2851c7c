//! HTTP access to the catalog gateway.

mod api_client;
mod transport;

pub use api_client::{ApiClient, Query, UnauthorizedHandler};
pub use transport::ReqwestTransport;
