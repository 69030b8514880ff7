/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::cache::{ArcAddrList, CacheKey, ResolverCache};
use crate::driver::ArcResolveDriver;
use crate::query::{QueryTable, WaitingQuery};
use crate::signal::WorkWaiter;
use crate::stats::ResolverStats;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkerState {
    Running,
    Stopping,
    Stopped,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WorkerState::Running,
            1 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Running => 0,
            WorkerState::Stopping => 1,
            WorkerState::Stopped => 2,
        }
    }
}

pub(crate) struct ResolverState {
    pub(crate) cache: ResolverCache,
    pub(crate) queries: QueryTable,
    pub(crate) aborted: bool,
}

/// State shared by the resolver owner, all handles and the worker thread.
pub(crate) struct ResolverShared {
    pub(crate) name: String,
    state: Mutex<ResolverState>,
    pub(crate) driver: ArcResolveDriver,
    pub(crate) stats: Arc<ResolverStats>,
    worker_state: AtomicU8,
}

impl ResolverShared {
    pub(crate) fn new(
        name: String,
        max_queries: usize,
        driver: ArcResolveDriver,
        stats: Arc<ResolverStats>,
    ) -> Self {
        stats.memory.set_query_capacity(max_queries);
        ResolverShared {
            name,
            state: Mutex::new(ResolverState {
                cache: ResolverCache::default(),
                queries: QueryTable::new(max_queries),
                aborted: false,
            }),
            driver,
            stats,
            worker_state: AtomicU8::new(WorkerState::Stopped.as_u8()),
        }
    }

    /// Lock poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn worker_state(&self) -> WorkerState {
        WorkerState::from_u8(self.worker_state.load(Ordering::Acquire))
    }

    pub(crate) fn set_worker_state(&self, state: WorkerState) {
        self.worker_state.store(state.as_u8(), Ordering::Release);
    }

    pub(crate) fn update_memory_stats(&self, state: &ResolverState) {
        self.stats.memory.set_cache_length(state.cache.len());
        self.stats
            .memory
            .set_waiting_length(state.queries.waiting_count());
    }

    pub(crate) fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        self.set_worker_state(WorkerState::Stopping);
    }

    fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    /// Mark every query still waiting as failed, returns how many.
    pub(crate) fn fail_waiting(&self) -> usize {
        let mut state = self.lock();
        let count = state.queries.fail_waiting();
        if count > 0 {
            self.stats.query.add_query_failed_n(count);
            self.update_memory_stats(&state);
        }
        count
    }

    /// Resolve one waiting query and publish its result.
    ///
    /// Must be called without holding the state lock.
    pub(crate) fn resolve_query(&self, query: WaitingQuery) {
        self.stats.query.add_query_driver();
        let addrs: ArcAddrList = self.driver.resolve(&query.hostname, query.family).into();

        let mut state = self.lock();
        if !state.queries.complete(&query, addrs.clone()) {
            self.stats.query.add_query_discarded();
            debug!(
                "resolver {}: discard result of {} for released query {}",
                self.name, query.hostname, query.index
            );
            return;
        }
        if addrs.is_empty() {
            self.stats.query.add_query_failed();
        } else {
            // last writer wins for concurrent queries of the same key
            state
                .cache
                .store(CacheKey::new(query.hostname, query.family), addrs);
        }
        self.update_memory_stats(&state);
    }

    /// Scan the whole query table once and resolve all waiting queries.
    pub(crate) fn resolve_queues(&self) {
        let capacity = self.lock().queries.capacity();
        for index in 0..capacity {
            let query = {
                let state = self.lock();
                if state.aborted {
                    return;
                }
                match state.queries.waiting(index) {
                    Some(query) => query,
                    None => continue,
                }
            };
            trace!(
                "resolver {}: resolve {} for query {index}",
                self.name, query.hostname
            );
            self.resolve_query(query);
        }
    }
}

pub(crate) struct ResolverRuntime {
    shared: Arc<ResolverShared>,
    waiter: WorkWaiter,
}

impl ResolverRuntime {
    pub(crate) fn new(shared: Arc<ResolverShared>, waiter: WorkWaiter) -> Self {
        ResolverRuntime { shared, waiter }
    }

    pub(crate) fn into_running(self) {
        debug!("resolver {}: worker started", self.shared.name);
        loop {
            if self.shared.is_aborted() {
                break;
            }
            if !self.waiter.wait() {
                break;
            }
            if self.shared.is_aborted() {
                break;
            }
            self.shared.resolve_queues();
        }
        self.shared.set_worker_state(WorkerState::Stopped);
        debug!("resolver {}: worker stopped", self.shared.name);
    }
}
