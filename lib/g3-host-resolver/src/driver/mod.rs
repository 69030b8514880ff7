/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use crate::AddressFamily;

pub mod static_hosts;
pub mod system;

/// The blocking "resolve one hostname" primitive.
///
/// Implementations are called without any resolver lock held, possibly from
/// the worker thread and any number of client threads at the same time.
/// An empty result means the resolution failed.
pub trait ResolveDriver: Send + Sync {
    fn resolve(&self, hostname: &str, family: AddressFamily) -> Vec<IpAddr>;
}

pub type ArcResolveDriver = Arc<dyn ResolveDriver>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyResolveDriverConfig {
    System(system::SystemDriverConfig),
    StaticHosts(static_hosts::StaticHostsDriverConfig),
}

impl Default for AnyResolveDriverConfig {
    fn default() -> Self {
        AnyResolveDriverConfig::System(system::SystemDriverConfig::default())
    }
}

impl AnyResolveDriverConfig {
    pub fn driver_type(&self) -> &'static str {
        match self {
            AnyResolveDriverConfig::System(_) => "system",
            AnyResolveDriverConfig::StaticHosts(_) => "static",
        }
    }

    pub(crate) fn spawn_resolve_driver(&self) -> ArcResolveDriver {
        match self {
            AnyResolveDriverConfig::System(c) => c.spawn_resolve_driver(),
            AnyResolveDriverConfig::StaticHosts(c) => c.spawn_resolve_driver(),
        }
    }
}
