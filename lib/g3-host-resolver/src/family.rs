/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The address family filter of a resolve request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum AddressFamily {
    Unspecified,
    Ipv4,
    Ipv6,
    #[default]
    Any,
}

impl AddressFamily {
    pub const ALL: [AddressFamily; 4] = [
        AddressFamily::Unspecified,
        AddressFamily::Ipv4,
        AddressFamily::Ipv6,
        AddressFamily::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Unspecified => "unspecified",
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
            AddressFamily::Any => "any",
        }
    }

    /// Check whether `ip` is acceptable as an answer for this family.
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Unspecified | AddressFamily::Any => true,
            AddressFamily::Ipv4 => ip.is_ipv4(),
            AddressFamily::Ipv6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" | "unspecified" => Ok(AddressFamily::Unspecified),
            "ipv4" | "v4" | "ipv4_only" => Ok(AddressFamily::Ipv4),
            "ipv6" | "v6" | "ipv6_only" => Ok(AddressFamily::Ipv6),
            "any" => Ok(AddressFamily::Any),
            _ => Err(()),
        }
    }
}
