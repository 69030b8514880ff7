/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, ToSocketAddrs};
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, trace};

use super::{ArcResolveDriver, ResolveDriver};
use crate::AddressFamily;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemDriverConfig {}

impl SystemDriverConfig {
    pub(crate) fn spawn_resolve_driver(&self) -> ArcResolveDriver {
        Arc::new(SystemResolver {})
    }
}

/// Resolve through the platform resolver (getaddrinfo on unix).
pub struct SystemResolver {}

impl ResolveDriver for SystemResolver {
    fn resolve(&self, hostname: &str, family: AddressFamily) -> Vec<IpAddr> {
        if hostname.is_empty() {
            return Vec::new();
        }
        if let Ok(ip) = IpAddr::from_str(hostname) {
            return if family.matches(&ip) {
                vec![ip]
            } else {
                Vec::new()
            };
        }

        trace!("system resolve {hostname} for family {family}");
        match (hostname, 0u16).to_socket_addrs() {
            Ok(iter) => {
                let mut addrs = Vec::<IpAddr>::new();
                for addr in iter {
                    let ip = addr.ip();
                    if family.matches(&ip) && !addrs.contains(&ip) {
                        addrs.push(ip);
                    }
                }
                debug!(
                    "system resolve {hostname} for family {family} got {} addresses",
                    addrs.len()
                );
                addrs
            }
            Err(e) => {
                debug!("system resolve {hostname} for family {family} failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_literal() {
        let driver = SystemDriverConfig::default().spawn_resolve_driver();

        let v4 = IpAddr::from_str("127.0.0.1").unwrap();
        assert_eq!(driver.resolve("127.0.0.1", AddressFamily::Any), vec![v4]);
        assert_eq!(driver.resolve("127.0.0.1", AddressFamily::Ipv4), vec![v4]);
        assert!(driver.resolve("127.0.0.1", AddressFamily::Ipv6).is_empty());

        let v6 = IpAddr::from_str("::1").unwrap();
        assert_eq!(driver.resolve("::1", AddressFamily::Ipv6), vec![v6]);
        assert!(driver.resolve("::1", AddressFamily::Ipv4).is_empty());
    }

    #[test]
    fn empty_hostname() {
        let driver = SystemDriverConfig::default().spawn_resolve_driver();
        assert!(driver.resolve("", AddressFamily::Any).is_empty());
    }
}
