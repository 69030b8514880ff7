/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

pub(crate) fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

pub(crate) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

pub(crate) fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!("yaml value type for 'string' should be 'string'")),
    }
}

pub(crate) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(crate) fn as_ipaddr(v: &Yaml) -> anyhow::Result<IpAddr> {
    if let Yaml::String(s) = v {
        let ip = IpAddr::from_str(s).map_err(|e| anyhow!("invalid ip address {s}: {e}"))?;
        Ok(ip)
    } else {
        Err(anyhow!("yaml value type for 'IpAddr' should be 'string'"))
    }
}

pub(crate) fn as_ipaddr_list(v: &Yaml) -> anyhow::Result<Vec<IpAddr>> {
    match v {
        Yaml::String(_) => Ok(vec![as_ipaddr(v)?]),
        Yaml::Array(seq) => {
            let mut ips = Vec::with_capacity(seq.len());
            for (i, v) in seq.iter().enumerate() {
                let ip = as_ipaddr(v).context(format!("invalid ip address value for #{i}"))?;
                ips.push(ip);
            }
            Ok(ips)
        }
        _ => Err(anyhow!(
            "yaml value type for ip address list should be 'string' or 'array'"
        )),
    }
}

#[cfg(test)]
pub(crate) fn load_doc(s: &str) -> Yaml {
    let mut docs = yaml_rust::YamlLoader::load_from_str(s).unwrap();
    docs.pop().unwrap()
}
