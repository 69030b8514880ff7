/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use ahash::AHashMap;

use super::{ArcResolveDriver, ResolveDriver};
use crate::AddressFamily;

#[cfg(feature = "yaml")]
mod yaml;

/// A fixed hostname to address table, like a hosts file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticHostsDriverConfig {
    hosts: AHashMap<String, Vec<IpAddr>>,
}

impl StaticHostsDriverConfig {
    pub fn add_host(&mut self, hostname: &str, ips: &[IpAddr]) {
        let record = self.hosts.entry(hostname.to_string()).or_default();
        for ip in ips {
            if !record.contains(ip) {
                record.push(*ip);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub(crate) fn spawn_resolve_driver(&self) -> ArcResolveDriver {
        Arc::new(StaticHostsResolver {
            hosts: self.hosts.clone(),
        })
    }
}

pub struct StaticHostsResolver {
    hosts: AHashMap<String, Vec<IpAddr>>,
}

impl ResolveDriver for StaticHostsResolver {
    fn resolve(&self, hostname: &str, family: AddressFamily) -> Vec<IpAddr> {
        match self.hosts.get(hostname) {
            Some(ips) => ips.iter().filter(|ip| family.matches(ip)).copied().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn resolve() {
        let v4 = IpAddr::from_str("192.0.2.1").unwrap();
        let v6 = IpAddr::from_str("2001:db8::1").unwrap();

        let mut config = StaticHostsDriverConfig::default();
        assert!(config.is_empty());
        config.add_host("dual.test", &[v4, v6]);
        config.add_host("dual.test", &[v4]);
        config.add_host("v4.test", &[v4]);
        assert!(!config.is_empty());

        let driver = config.spawn_resolve_driver();
        assert_eq!(driver.resolve("dual.test", AddressFamily::Any), vec![v4, v6]);
        assert_eq!(
            driver.resolve("dual.test", AddressFamily::Unspecified),
            vec![v4, v6]
        );
        assert_eq!(driver.resolve("dual.test", AddressFamily::Ipv4), vec![v4]);
        assert_eq!(driver.resolve("dual.test", AddressFamily::Ipv6), vec![v6]);
        assert!(driver.resolve("v4.test", AddressFamily::Ipv6).is_empty());
        assert!(driver.resolve("missing.test", AddressFamily::Any).is_empty());
        assert!(driver.resolve("DUAL.test", AddressFamily::Any).is_empty());
    }
}
