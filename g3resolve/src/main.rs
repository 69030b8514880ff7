/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;
use log::{info, warn};
use yaml_rust::YamlLoader;

use g3_host_resolver::{
    AddressFamily, HostResolverBuilder, HostResolverConfig, QueryId, QueryStatus, ResolveMode,
    ResolveQueryError, ResolverHandle,
};

mod logger;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_HOSTNAME: &str = "hostname";
const GLOBAL_ARG_FAMILY: &str = "family";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_MODE: &str = "mode";
const GLOBAL_ARG_MAX_QUERIES: &str = "max-queries";
const GLOBAL_ARG_ASYNC: &str = "async";
const GLOBAL_ARG_TIMEOUT: &str = "timeout";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

const POLL_INTERVAL: Duration = Duration::from_millis(1);

fn build_cli_args() -> Command {
    Command::new("g3resolve")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_HOSTNAME)
                .help("Hostnames to resolve")
                .num_args(1..)
                .value_name("HOSTNAME")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_FAMILY)
                .help("Address family: any, ipv4, ipv6 or none")
                .num_args(1)
                .value_name("FAMILY")
                .long("family")
                .short('f')
                .default_value("any"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("Resolver config file in yaml format")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .long("config")
                .short('c'),
        )
        .arg(
            Arg::new(GLOBAL_ARG_MODE)
                .help("Resolve mode: threaded or inline")
                .num_args(1)
                .value_name("MODE")
                .long("mode"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_MAX_QUERIES)
                .help("Max number of queries in flight")
                .num_args(1)
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .long("max-queries"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_ASYNC)
                .help("Submit queries and poll for the results")
                .action(ArgAction::SetTrue)
                .long("async")
                .short('a'),
        )
        .arg(
            Arg::new(GLOBAL_ARG_TIMEOUT)
                .help("Max time to poll for async results")
                .num_args(1)
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .long("timeout")
                .default_value("30"),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v'),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<HostResolverConfig> {
    let mut config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("failed to read config file {}: {e}", path.display()))?;
            let docs = YamlLoader::load_from_str(&content)
                .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
            let doc = docs
                .first()
                .ok_or_else(|| anyhow!("no yaml document found in {}", path.display()))?;
            HostResolverConfig::parse_yaml(doc)
                .with_context(|| format!("invalid resolver config in {}", path.display()))?
        }
        None => HostResolverConfig::with_name("g3resolve"),
    };

    if let Some(mode) = args.get_one::<String>(GLOBAL_ARG_MODE) {
        config.runtime.mode =
            ResolveMode::from_str(mode).map_err(|_| anyhow!("invalid resolve mode {mode}"))?;
    }
    if let Some(max_queries) = args.get_one::<usize>(GLOBAL_ARG_MAX_QUERIES) {
        config.runtime.max_queries = *max_queries;
    }
    Ok(config)
}

fn print_result(hostname: &str, addrs: &[IpAddr]) {
    if addrs.is_empty() {
        println!("{hostname}: failed");
    } else {
        let list = addrs
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{hostname}: {list}");
    }
}

fn resolve_sync(handle: &ResolverHandle, hostnames: &[&str], family: AddressFamily) -> usize {
    let mut failed = 0;
    for hostname in hostnames {
        let addrs = handle.resolve_hostname_addresses(hostname, family);
        if addrs.is_empty() {
            failed += 1;
        }
        print_result(hostname, &addrs);
    }
    failed
}

fn wait_query(handle: &ResolverHandle, id: QueryId, deadline: Instant) -> QueryStatus {
    loop {
        let status = handle.query_status(id);
        if status.is_finished() || Instant::now() >= deadline {
            return status;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn resolve_async(
    handle: &ResolverHandle,
    hostnames: &[&str],
    family: AddressFamily,
    timeout: Duration,
) -> usize {
    let mut failed = 0;
    let mut pending = Vec::with_capacity(hostnames.len());
    for hostname in hostnames {
        match handle.try_submit_query(hostname, family) {
            Ok(id) => pending.push((*hostname, id)),
            Err(ResolveQueryError::OutOfQuerySlots) => {
                info!("out of query slots, resolve {hostname} synchronously");
                failed += resolve_sync(handle, &[*hostname], family);
            }
            Err(e) => {
                warn!("failed to submit query for {hostname}: {e}");
                failed += 1;
            }
        }
    }

    let deadline = Instant::now() + timeout;
    for (hostname, id) in pending {
        match wait_query(handle, id, deadline) {
            QueryStatus::Done => print_result(hostname, &handle.query_addresses(id)),
            status => {
                info!("query {id} for {hostname} finished with status {status}");
                print_result(hostname, &[]);
                failed += 1;
            }
        }
        handle.release_query(id);
    }
    failed
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    logger::SyncLogger::new(verbose_level)
        .into_global_logger()
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let family = match args.get_one::<String>(GLOBAL_ARG_FAMILY) {
        Some(s) => AddressFamily::from_str(s).map_err(|_| anyhow!("invalid address family {s}"))?,
        None => AddressFamily::default(),
    };
    let hostnames: Vec<&str> = args
        .get_many::<String>(GLOBAL_ARG_HOSTNAME)
        .map(|values| values.map(|s| s.as_str()).collect())
        .unwrap_or_default();
    let timeout = args
        .get_one::<u64>(GLOBAL_ARG_TIMEOUT)
        .map(|secs| Duration::from_secs(*secs))
        .unwrap_or(Duration::from_secs(30));

    let config = load_config(&args)?;
    info!(
        "resolver {}: {} driver, {} mode, {} query slots",
        config.name,
        config.driver.driver_type(),
        config.runtime.mode,
        config.runtime.max_queries
    );
    let mut builder = HostResolverBuilder::new(config);
    builder.thread_name("resolver".to_string());
    let resolver = builder.build().context("failed to build resolver")?;
    let handle = resolver.get_handle();

    let failed = if args.get_flag(GLOBAL_ARG_ASYNC) {
        resolve_async(&handle, &hostnames, family, timeout)
    } else {
        resolve_sync(&handle, &hostnames, family)
    };

    let snapshot = resolver.get_stats().snapshot();
    info!(
        "queries: {} total, {} cached, {} sent to driver, {} failed",
        snapshot.query.total, snapshot.query.cached, snapshot.query.driver, snapshot.query.failed
    );
    drop(resolver);

    if failed > 0 {
        Err(anyhow!("{failed} of {} hostnames not resolved", hostnames.len()))
    } else {
        Ok(())
    }
}
