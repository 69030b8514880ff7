/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::AnyResolveDriverConfig;
use crate::query::RESOLVER_MAX_QUERIES;

/// Upper bound of the query slot table size.
pub const RESOLVER_QUERY_SLOTS_LIMIT: usize = 65536;

#[cfg(feature = "yaml")]
mod yaml;

/// How waiting queries get resolved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResolveMode {
    /// A dedicated worker thread drains the waiting queries.
    #[default]
    Threaded,
    /// Every submitted query is resolved on the submitting thread.
    Inline,
}

impl ResolveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMode::Threaded => "threaded",
            ResolveMode::Inline => "inline",
        }
    }
}

impl fmt::Display for ResolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "threaded" | "thread" | "worker" => Ok(ResolveMode::Threaded),
            "inline" | "sync" | "synchronous" => Ok(ResolveMode::Inline),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostResolverRuntimeConfig {
    pub max_queries: usize,
    pub mode: ResolveMode,
}

impl Default for HostResolverRuntimeConfig {
    fn default() -> Self {
        HostResolverRuntimeConfig {
            max_queries: RESOLVER_MAX_QUERIES,
            mode: ResolveMode::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostResolverConfig {
    pub name: String,
    pub driver: AnyResolveDriverConfig,
    pub runtime: HostResolverRuntimeConfig,
}

impl HostResolverConfig {
    pub fn with_name(name: &str) -> Self {
        HostResolverConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn check(&self) -> anyhow::Result<()> {
        if self.runtime.max_queries == 0 {
            return Err(anyhow!("max queries should be greater than 0"));
        }
        if self.runtime.max_queries > RESOLVER_QUERY_SLOTS_LIMIT {
            return Err(anyhow!(
                "max queries {} is larger than {RESOLVER_QUERY_SLOTS_LIMIT}",
                self.runtime.max_queries
            ));
        }
        if matches!(&self.driver, AnyResolveDriverConfig::StaticHosts(c) if c.is_empty()) {
            return Err(anyhow!("no hosts set for static driver"));
        }
        Ok(())
    }
}
