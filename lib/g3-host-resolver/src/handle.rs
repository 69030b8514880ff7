/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use log::{error, trace, warn};

use crate::cache::{ArcAddrList, CacheKey};
use crate::runtime::{ResolverShared, WorkerState};
use crate::signal::WorkNotifier;
use crate::{AddressFamily, QueryId, QueryStatus, ResolveQueryError, ResolverStats};

/// The client side of a resolver, cheap to clone and safe to share.
///
/// The non `try_` methods never fail: errors are logged and reported
/// through sentinel values like [`QueryId::INVALID`] or [`QueryStatus::None`].
#[derive(Clone)]
pub struct ResolverHandle {
    shared: Arc<ResolverShared>,
    // None if waiting queries are resolved on the submitting thread
    notifier: Option<WorkNotifier>,
}

impl PartialEq for ResolverHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl ResolverHandle {
    pub(crate) fn new(shared: Arc<ResolverShared>, notifier: Option<WorkNotifier>) -> Self {
        ResolverHandle { shared, notifier }
    }

    pub(crate) fn shared(&self) -> &Arc<ResolverShared> {
        &self.shared
    }

    pub(crate) fn notifier(&self) -> Option<&WorkNotifier> {
        self.notifier.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn get_stats(&self) -> Arc<ResolverStats> {
        Arc::clone(&self.shared.stats)
    }

    /// The state of the worker thread, None in inline mode.
    pub fn worker_state(&self) -> Option<WorkerState> {
        self.notifier.as_ref().map(|_| self.shared.worker_state())
    }

    pub fn query_capacity(&self) -> usize {
        self.shared.lock().queries.capacity()
    }

    /// Resolve `hostname` on the calling thread and return the first address.
    pub fn resolve_hostname(&self, hostname: &str, family: AddressFamily) -> Option<IpAddr> {
        self.resolve_hostname_addresses(hostname, family)
            .first()
            .copied()
    }

    /// Resolve `hostname` on the calling thread.
    ///
    /// The cache is checked first. On cache miss the driver is called with
    /// the resolver lock released, so this blocks only the caller.
    pub fn resolve_hostname_addresses(
        &self,
        hostname: &str,
        family: AddressFamily,
    ) -> Vec<IpAddr> {
        let stats = &self.shared.stats;
        stats.query.add_query_total();

        let key = CacheKey::new(Arc::from(hostname), family);
        if let Some(addrs) = self.shared.lock().cache.lookup(&key) {
            stats.query.add_query_cached();
            return addrs.to_vec();
        }

        stats.query.add_query_driver();
        let addrs: ArcAddrList = self.shared.driver.resolve(hostname, family).into();
        if addrs.is_empty() {
            stats.query.add_query_failed();
            return Vec::new();
        }

        let mut state = self.shared.lock();
        state.cache.store(key, addrs.clone());
        self.shared.update_memory_stats(&state);
        drop(state);
        addrs.to_vec()
    }

    /// Submit an asynchronous query, [`QueryId::INVALID`] if out of query slots.
    pub fn submit_query(&self, hostname: &str, family: AddressFamily) -> QueryId {
        match self.try_submit_query(hostname, family) {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "resolver {}: unable to submit query for {hostname}: {e}",
                    self.shared.name
                );
                QueryId::INVALID
            }
        }
    }

    pub fn try_submit_query(
        &self,
        hostname: &str,
        family: AddressFamily,
    ) -> Result<QueryId, ResolveQueryError> {
        let stats = &self.shared.stats;
        stats.query.add_query_total();

        let mut state = self.shared.lock();
        let Some(query) = state.queries.allocate(Arc::from(hostname), family) else {
            stats.query.add_out_of_slots();
            return Err(ResolveQueryError::OutOfQuerySlots);
        };
        let id = QueryId::new(query.index);

        let key = CacheKey::new(query.hostname.clone(), family);
        if let Some(addrs) = state.cache.lookup(&key) {
            state.queries.complete(&query, addrs);
            stats.query.add_query_cached();
            return Ok(id);
        }
        self.shared.update_memory_stats(&state);

        let notifier = if state.aborted {
            None
        } else {
            self.notifier.as_ref()
        };
        drop(state);

        match notifier {
            Some(notifier) if notifier.post() => {
                trace!(
                    "resolver {}: query {id} for {hostname} sent to worker",
                    self.shared.name
                );
            }
            _ => self.shared.resolve_query(query),
        }
        Ok(id)
    }

    pub fn query_status(&self, id: QueryId) -> QueryStatus {
        match self.try_query_status(id) {
            Ok(status) => status,
            Err(e) => {
                error!("resolver {}: {e}", self.shared.name);
                QueryStatus::None
            }
        }
    }

    pub fn try_query_status(&self, id: QueryId) -> Result<QueryStatus, ResolveQueryError> {
        let state = self.shared.lock();
        let slot = state.queries.get(id.index())?;
        match slot.status() {
            QueryStatus::None => Err(ResolveQueryError::QueryNotSubmitted(id.index())),
            status => Ok(status),
        }
    }

    /// The first valid address of a finished query.
    pub fn query_address(&self, id: QueryId) -> Option<IpAddr> {
        self.with_done_response(id, crate::address::first_valid)
            .flatten()
    }

    /// All valid addresses of a finished query.
    pub fn query_addresses(&self, id: QueryId) -> Vec<IpAddr> {
        self.with_done_response(id, crate::address::all_valid)
            .unwrap_or_default()
    }

    pub fn try_query_addresses(&self, id: QueryId) -> Result<Vec<IpAddr>, ResolveQueryError> {
        self.try_with_done_response(id, crate::address::all_valid)
    }

    fn with_done_response<T, F>(&self, id: QueryId, f: F) -> Option<T>
    where
        F: FnOnce(&[IpAddr]) -> T,
    {
        match self.try_with_done_response(id, f) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("resolver {}: {e}", self.shared.name);
                None
            }
        }
    }

    fn try_with_done_response<T, F>(&self, id: QueryId, f: F) -> Result<T, ResolveQueryError>
    where
        F: FnOnce(&[IpAddr]) -> T,
    {
        let state = self.shared.lock();
        let slot = state.queries.get(id.index())?;
        match slot.status() {
            QueryStatus::Done => Ok(f(&slot.response()[..])),
            QueryStatus::None => Err(ResolveQueryError::QueryNotSubmitted(id.index())),
            QueryStatus::Waiting => Err(ResolveQueryError::QueryNotCompleted {
                id: id.index(),
                hostname: slot.hostname().clone(),
            }),
            QueryStatus::Error => Err(ResolveQueryError::QueryFailed {
                id: id.index(),
                hostname: slot.hostname().clone(),
            }),
        }
    }

    /// Free the query slot.
    ///
    /// If the query is still waiting, its result will be discarded when the
    /// resolution finishes.
    pub fn release_query(&self, id: QueryId) {
        if let Err(e) = self.try_release_query(id) {
            error!("resolver {}: {e}", self.shared.name);
        }
    }

    pub fn try_release_query(&self, id: QueryId) -> Result<(), ResolveQueryError> {
        let mut state = self.shared.lock();
        state.queries.release(id.index())?;
        self.shared.update_memory_stats(&state);
        Ok(())
    }

    /// Clear the cache of `hostname` for all address families,
    /// or the whole cache if `hostname` is None.
    pub fn clear_cache(&self, hostname: Option<&str>) {
        let mut state = self.shared.lock();
        state.cache.clear(hostname);
        self.shared.update_memory_stats(&state);
    }

    /// Peek the cache without resolving.
    pub fn cached_addresses(&self, hostname: &str, family: AddressFamily) -> Option<Vec<IpAddr>> {
        let key = CacheKey::new(Arc::from(hostname), family);
        self.shared.lock().cache.lookup(&key).map(|addrs| addrs.to_vec())
    }
}
