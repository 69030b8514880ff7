/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::StaticHostsDriverConfig;

impl StaticHostsDriverConfig {
    pub fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match crate::yaml::normalize_key(k).as_str() {
            "hosts" => {
                if let Yaml::Hash(map) = v {
                    crate::yaml::foreach_kv(map, |host, v| {
                        let ips = crate::yaml::as_ipaddr_list(v)
                            .context(format!("invalid addresses for host {host}"))?;
                        self.add_host(host, &ips);
                        Ok(())
                    })
                } else {
                    Err(anyhow!("invalid yaml value type, expect map"))
                }
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}
