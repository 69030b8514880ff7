/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::{HostResolverConfig, ResolveMode};
use crate::AnyResolveDriverConfig;
use crate::driver::static_hosts::StaticHostsDriverConfig;
use crate::driver::system::SystemDriverConfig;

const DRIVER_KEY_TYPE: &str = "type";

impl AnyResolveDriverConfig {
    fn new_by_type(driver_type: &str) -> anyhow::Result<Self> {
        match crate::yaml::normalize_key(driver_type).as_str() {
            "system" | "getaddrinfo" => Ok(AnyResolveDriverConfig::System(
                SystemDriverConfig::default(),
            )),
            "static" | "static_hosts" | "hosts" => Ok(AnyResolveDriverConfig::StaticHosts(
                StaticHostsDriverConfig::default(),
            )),
            _ => Err(anyhow!("unsupported driver type {driver_type}")),
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match self {
            AnyResolveDriverConfig::System(_) => Err(anyhow!("invalid key {k}")),
            AnyResolveDriverConfig::StaticHosts(c) => c.set_by_yaml_kv(k, v),
        }
    }

    fn parse_yaml_map(map: &yaml::Hash) -> anyhow::Result<Self> {
        let type_key = Yaml::String(DRIVER_KEY_TYPE.to_string());
        let driver_type = match map.get(&type_key) {
            Some(v) => crate::yaml::as_string(v).context("invalid driver type value")?,
            None => return Err(anyhow!("no driver type set")),
        };
        let mut config = AnyResolveDriverConfig::new_by_type(&driver_type)?;
        crate::yaml::foreach_kv(map, |k, v| {
            if crate::yaml::normalize_key(k) == DRIVER_KEY_TYPE {
                return Ok(());
            }
            config.set_by_yaml_kv(k, v)
        })?;
        Ok(config)
    }

    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::String(s) => AnyResolveDriverConfig::new_by_type(s),
            Yaml::Hash(map) => AnyResolveDriverConfig::parse_yaml_map(map),
            _ => Err(anyhow!("invalid yaml value type for driver, expect string / map")),
        }
    }
}

impl HostResolverConfig {
    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml, driver_set: &mut bool) -> anyhow::Result<()> {
        match crate::yaml::normalize_key(k).as_str() {
            "name" => {
                self.name = crate::yaml::as_string(v)?;
                Ok(())
            }
            "max_queries" | "query_slots" => {
                self.runtime.max_queries = crate::yaml::as_usize(v)?;
                Ok(())
            }
            "mode" => {
                let s = crate::yaml::as_string(v)?;
                self.runtime.mode =
                    ResolveMode::from_str(&s).map_err(|_| anyhow!("invalid resolve mode {s}"))?;
                Ok(())
            }
            "driver" => {
                if *driver_set {
                    return Err(anyhow!("driver has already been set by hosts"));
                }
                self.driver = AnyResolveDriverConfig::parse_yaml(v)?;
                *driver_set = true;
                Ok(())
            }
            "hosts" => {
                if !matches!(self.driver, AnyResolveDriverConfig::StaticHosts(_)) {
                    if *driver_set {
                        return Err(anyhow!(
                            "hosts is not allowed for {} driver",
                            self.driver.driver_type()
                        ));
                    }
                    self.driver =
                        AnyResolveDriverConfig::StaticHosts(StaticHostsDriverConfig::default());
                    *driver_set = true;
                }
                self.driver.set_by_yaml_kv(k, v)
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = HostResolverConfig::default();
            let mut driver_set = false;
            crate::yaml::foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v, &mut driver_set))?;
            config.check()?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml value type for resolver config, expect map"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn parse_default() {
        let yaml = crate::yaml::load_doc("name: default");
        let config = HostResolverConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config, HostResolverConfig::with_name("default"));
    }

    #[test]
    fn parse_full() {
        let yaml = crate::yaml::load_doc(
            r#"
                name: local
                max-queries: 8
                mode: inline
                driver:
                  type: static
                  hosts:
                    example.com: 93.184.216.34
            "#,
        );
        let config = HostResolverConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.name, "local");
        assert_eq!(config.runtime.max_queries, 8);
        assert_eq!(config.runtime.mode, ResolveMode::Inline);

        let mut hosts = StaticHostsDriverConfig::default();
        hosts.add_host("example.com", &[IpAddr::from_str("93.184.216.34").unwrap()]);
        assert_eq!(config.driver, AnyResolveDriverConfig::StaticHosts(hosts));
    }

    #[test]
    fn parse_hosts_shortcut() {
        let yaml = crate::yaml::load_doc(
            r#"
                hosts:
                  a.test: 10.0.0.1
            "#,
        );
        let config = HostResolverConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.driver.driver_type(), "static");

        let yaml = crate::yaml::load_doc("driver: system");
        let config = HostResolverConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.driver.driver_type(), "system");

        let yaml = crate::yaml::load_doc(
            r#"
                driver: static
                hosts:
                  a.test: 10.0.0.1
            "#,
        );
        let config = HostResolverConfig::parse_yaml(&yaml).unwrap();
        let mut hosts = StaticHostsDriverConfig::default();
        hosts.add_host("a.test", &[IpAddr::from_str("10.0.0.1").unwrap()]);
        assert_eq!(config.driver, AnyResolveDriverConfig::StaticHosts(hosts));
    }

    #[test]
    fn parse_err() {
        assert!(HostResolverConfig::parse_yaml(&Yaml::Integer(1)).is_err());

        let yaml = crate::yaml::load_doc("max_queries: 0");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("mode: async");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("driver: c-ares");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("max_queries: 65537");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("max_queries: 288230376151711744");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc(
            r#"
                driver: system
                hosts:
                  a.test: 10.0.0.1
            "#,
        );
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc(
            r#"
                hosts:
                  a.test: 10.0.0.1
                driver: system
            "#,
        );
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("driver: {hosts: {a.test: 10.0.0.1}}");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("driver: {type: system, server: 8.8.8.8}");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("driver: static");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());

        let yaml = crate::yaml::load_doc("unknown: 1");
        assert!(HostResolverConfig::parse_yaml(&yaml).is_err());
    }
}
