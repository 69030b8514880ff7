/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Default)]
pub struct ResolverQueryStats {
    query_total: AtomicU64,
    query_cached: AtomicU64,
    query_driver: AtomicU64,
    query_failed: AtomicU64,
    query_discarded: AtomicU64,
    out_of_slots: AtomicU64,
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct ResolverQuerySnapshot {
    pub total: u64,
    pub cached: u64,
    pub driver: u64,
    pub failed: u64,
    pub discarded: u64,
    pub out_of_slots: u64,
}

impl ResolverQueryStats {
    fn snapshot(&self) -> ResolverQuerySnapshot {
        ResolverQuerySnapshot {
            total: self.query_total.load(Ordering::Relaxed),
            cached: self.query_cached.load(Ordering::Relaxed),
            driver: self.query_driver.load(Ordering::Relaxed),
            failed: self.query_failed.load(Ordering::Relaxed),
            discarded: self.query_discarded.load(Ordering::Relaxed),
            out_of_slots: self.out_of_slots.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_query_total(&self) {
        self.query_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_cached(&self) {
        self.query_cached.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_driver(&self) {
        self.query_driver.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_failed(&self) {
        self.query_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_failed_n(&self, n: usize) {
        if n > 0 {
            self.query_failed.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn add_query_discarded(&self) {
        self.query_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_out_of_slots(&self) {
        self.out_of_slots.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub(crate) struct ResolverMemoryStats {
    len_cache: AtomicUsize,
    cap_query: AtomicUsize,
    len_waiting: AtomicUsize,
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct ResolverMemorySnapshot {
    pub len_cache: usize,
    pub cap_query: usize,
    pub len_waiting: usize,
}

impl ResolverMemoryStats {
    fn snapshot(&self) -> ResolverMemorySnapshot {
        ResolverMemorySnapshot {
            len_cache: self.len_cache.load(Ordering::Relaxed),
            cap_query: self.cap_query.load(Ordering::Relaxed),
            len_waiting: self.len_waiting.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn set_cache_length(&self, value: usize) {
        self.len_cache.store(value, Ordering::Relaxed);
    }

    pub(crate) fn set_query_capacity(&self, value: usize) {
        self.cap_query.store(value, Ordering::Relaxed);
    }

    pub(crate) fn set_waiting_length(&self, value: usize) {
        self.len_waiting.store(value, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct ResolverStats {
    pub(crate) query: ResolverQueryStats,
    pub(crate) memory: ResolverMemoryStats,
}

impl ResolverStats {
    pub fn snapshot(&self) -> ResolverSnapshot {
        ResolverSnapshot {
            query: self.query.snapshot(),
            memory: self.memory.snapshot(),
        }
    }
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct ResolverSnapshot {
    pub query: ResolverQuerySnapshot,
    pub memory: ResolverMemorySnapshot,
}
