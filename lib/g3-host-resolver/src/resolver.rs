/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::warn;

use crate::config::{HostResolverConfig, ResolveMode};
use crate::driver::ArcResolveDriver;
use crate::handle::ResolverHandle;
use crate::runtime::{ResolverRuntime, ResolverShared, WorkerState};
use crate::stats::ResolverStats;

const DEFAULT_THREAD_NAME: &str = "host-resolver";

pub struct HostResolverBuilder {
    resolver_config: HostResolverConfig,
    thread_name: Option<String>,
    driver: Option<ArcResolveDriver>,
}

pub struct HostResolver {
    config: HostResolverConfig,
    handle: ResolverHandle,
    thread_handle: Option<JoinHandle<()>>,
}

impl HostResolverBuilder {
    pub fn new(config: HostResolverConfig) -> Self {
        HostResolverBuilder {
            resolver_config: config,
            thread_name: None,
            driver: None,
        }
    }

    pub fn thread_name(&mut self, name: String) {
        self.thread_name = Some(name);
    }

    /// Use `driver` instead of the one described by the driver config.
    pub fn driver(&mut self, driver: ArcResolveDriver) {
        self.driver = Some(driver);
    }

    pub fn build(mut self) -> io::Result<HostResolver> {
        self.resolver_config
            .check()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => self.resolver_config.driver.spawn_resolve_driver(),
        };
        let stats = Arc::new(ResolverStats::default());
        let shared = Arc::new(ResolverShared::new(
            self.resolver_config.name.clone(),
            self.resolver_config.runtime.max_queries,
            driver,
            stats,
        ));

        match self.resolver_config.runtime.mode {
            ResolveMode::Inline => Ok(HostResolver {
                config: self.resolver_config,
                handle: ResolverHandle::new(shared, None),
                thread_handle: None,
            }),
            ResolveMode::Threaded => {
                let (notifier, waiter) = crate::signal::work_signal();

                let thread_name = self
                    .thread_name
                    .take()
                    .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string());
                let runtime = ResolverRuntime::new(Arc::clone(&shared), waiter);
                shared.set_worker_state(WorkerState::Running);
                let thread_handle = match std::thread::Builder::new()
                    .name(thread_name)
                    .spawn(move || runtime.into_running())
                {
                    Ok(handle) => handle,
                    Err(e) => {
                        shared.set_worker_state(WorkerState::Stopped);
                        return Err(e);
                    }
                };

                Ok(HostResolver {
                    config: self.resolver_config,
                    handle: ResolverHandle::new(shared, Some(notifier)),
                    thread_handle: Some(thread_handle),
                })
            }
        }
    }
}

impl HostResolver {
    pub fn get_handle(&self) -> ResolverHandle {
        self.handle.clone()
    }

    pub fn get_config(&self) -> &HostResolverConfig {
        &self.config
    }

    pub fn get_stats(&self) -> Arc<ResolverStats> {
        self.handle.get_stats()
    }

    pub fn worker_state(&self) -> Option<WorkerState> {
        self.handle.worker_state()
    }

    /// Stop and join the worker thread.
    ///
    /// This waits for the driver call in progress, if any. Queries still
    /// waiting are marked as failed, and queries submitted later through
    /// existing handles are resolved on the submitting thread.
    pub fn shutdown(&mut self) {
        let Some(join) = self.thread_handle.take() else {
            return;
        };

        let shared = self.handle.shared();
        shared.abort();
        if let Some(notifier) = self.handle.notifier() {
            let _ = notifier.post();
        }

        let thread_id = join.thread().id();
        if let Err(e) = join.join() {
            warn!(
                "error while waiting thread {thread_id:?} for resolver {}: {e:?}",
                self.config.name
            );
        }
        shared.set_worker_state(WorkerState::Stopped);

        let failed = shared.fail_waiting();
        if failed > 0 {
            warn!(
                "resolver {}: {failed} waiting queries failed as the worker stopped",
                self.config.name
            );
        }
    }
}

impl Drop for HostResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
