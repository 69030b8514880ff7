/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod address;
pub use address::ResolvedAddrExt;

mod cache;

mod config;
pub use config::{
    HostResolverConfig, HostResolverRuntimeConfig, RESOLVER_QUERY_SLOTS_LIMIT, ResolveMode,
};

pub mod driver;
pub use driver::{AnyResolveDriverConfig, ArcResolveDriver, ResolveDriver};

mod error;
pub use error::ResolveQueryError;

mod family;
pub use family::AddressFamily;

mod handle;
pub use handle::ResolverHandle;

mod query;
pub use query::{QueryId, QueryStatus, RESOLVER_MAX_QUERIES};

mod resolver;
pub use resolver::{HostResolver, HostResolverBuilder};

mod runtime;
pub use runtime::WorkerState;

mod signal;

mod stats;
pub use stats::{ResolverMemorySnapshot, ResolverQuerySnapshot, ResolverSnapshot, ResolverStats};

#[cfg(feature = "yaml")]
mod yaml;
