use std::sync::Arc;

use actordeck_core::ApiKey;
use actordeck_domain::{ActorCapabilityRules, ActorSummary, InputSchema};

use crate::apify_ports::{ApifyGateway, ApifyGatewayConnector, RunOptions};

mod catalog;
mod credentials;
mod execution;
mod schema;
mod status;

/// Actor summary together with its resolved input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSchema {
    /// Actor summary.
    pub actor: ActorSummary,
    /// Resolved input schema.
    pub input_schema: InputSchema,
}

/// Proxy operations against the Apify platform.
///
/// The service holds no per-caller state; every operation connects a fresh
/// gateway for the key it is given.
#[derive(Clone)]
pub struct ActorService {
    connector: Arc<dyn ApifyGatewayConnector>,
    capability_rules: ActorCapabilityRules,
    run_options: RunOptions,
}

impl ActorService {
    /// Creates an actor service with default capability rules and run options.
    #[must_use]
    pub fn new(connector: Arc<dyn ApifyGatewayConnector>) -> Self {
        Self {
            connector,
            capability_rules: ActorCapabilityRules::default(),
            run_options: RunOptions::default(),
        }
    }

    /// Replaces the rules deciding which actors need start URLs.
    #[must_use]
    pub fn with_capability_rules(mut self, capability_rules: ActorCapabilityRules) -> Self {
        self.capability_rules = capability_rules;
        self
    }

    /// Replaces the run submission hints.
    #[must_use]
    pub fn with_run_options(mut self, run_options: RunOptions) -> Self {
        self.run_options = run_options;
        self
    }

    /// Returns the rules deciding which actors need start URLs.
    #[must_use]
    pub fn capability_rules(&self) -> &ActorCapabilityRules {
        &self.capability_rules
    }

    fn gateway(&self, api_key: &ApiKey) -> Arc<dyn ApifyGateway> {
        self.connector.connect(api_key)
    }
}

#[cfg(test)]
mod tests;
