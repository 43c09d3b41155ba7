//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_apify_gateway;

pub use http_apify_gateway::{HttpApifyGateway, HttpApifyGatewayConnector};
