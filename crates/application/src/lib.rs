//! Application services and ports.

#![forbid(unsafe_code)]

mod actor_service;
mod apify_ports;

pub use actor_service::{ActorSchema, ActorService};
pub use apify_ports::{
    ActorDetail, ActorListQuery, ApifyGateway, ApifyGatewayConnector, RunOptions,
};
