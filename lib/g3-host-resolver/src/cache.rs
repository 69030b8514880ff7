/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use ahash::AHashMap;

use crate::AddressFamily;

pub(crate) type ArcAddrList = Arc<[IpAddr]>;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct CacheKey {
    hostname: Arc<str>,
    family: AddressFamily,
}

impl CacheKey {
    pub(crate) fn new(hostname: Arc<str>, family: AddressFamily) -> Self {
        CacheKey { hostname, family }
    }
}

/// Last successful answer for each (hostname, family) pair.
///
/// Entries never expire, they are only replaced by a newer successful
/// resolution or removed by [`ResolverCache::clear`].
#[derive(Default)]
pub(crate) struct ResolverCache {
    records: AHashMap<CacheKey, ArcAddrList>,
}

impl ResolverCache {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn lookup(&self, key: &CacheKey) -> Option<ArcAddrList> {
        self.records.get(key).cloned()
    }

    /// Returns false and keeps the old record if `addrs` is empty.
    pub(crate) fn store(&mut self, key: CacheKey, addrs: ArcAddrList) -> bool {
        if addrs.is_empty() {
            return false;
        }
        self.records.insert(key, addrs);
        true
    }

    pub(crate) fn clear(&mut self, hostname: Option<&str>) {
        match hostname {
            Some(hostname) => {
                let hostname: Arc<str> = Arc::from(hostname);
                for family in AddressFamily::ALL {
                    self.records
                        .remove(&CacheKey::new(hostname.clone(), family));
                }
            }
            None => self.records.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn key(host: &str, family: AddressFamily) -> CacheKey {
        CacheKey::new(Arc::from(host), family)
    }

    fn addrs(list: &[&str]) -> ArcAddrList {
        list.iter().map(|s| IpAddr::from_str(s).unwrap()).collect()
    }

    #[test]
    fn store_lookup() {
        let mut cache = ResolverCache::default();
        assert!(cache.lookup(&key("a.test", AddressFamily::Any)).is_none());

        assert!(cache.store(key("a.test", AddressFamily::Any), addrs(&["10.0.0.1"])));
        assert_eq!(
            cache.lookup(&key("a.test", AddressFamily::Any)).unwrap(),
            addrs(&["10.0.0.1"])
        );
        // family is part of the key
        assert!(cache.lookup(&key("a.test", AddressFamily::Ipv4)).is_none());
        // no normalization of the hostname
        assert!(cache.lookup(&key("A.test", AddressFamily::Any)).is_none());

        // last writer wins
        assert!(cache.store(
            key("a.test", AddressFamily::Any),
            addrs(&["10.0.0.2", "::1"])
        ));
        assert_eq!(
            cache.lookup(&key("a.test", AddressFamily::Any)).unwrap(),
            addrs(&["10.0.0.2", "::1"])
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_not_stored() {
        let mut cache = ResolverCache::default();
        assert!(!cache.store(key("a.test", AddressFamily::Any), addrs(&[])));
        assert!(cache.lookup(&key("a.test", AddressFamily::Any)).is_none());

        assert!(cache.store(key("a.test", AddressFamily::Any), addrs(&["10.0.0.1"])));
        assert!(!cache.store(key("a.test", AddressFamily::Any), addrs(&[])));
        assert_eq!(
            cache.lookup(&key("a.test", AddressFamily::Any)).unwrap(),
            addrs(&["10.0.0.1"])
        );
    }

    #[test]
    fn clear_host() {
        let mut cache = ResolverCache::default();
        for family in AddressFamily::ALL {
            cache.store(key("a.test", family), addrs(&["10.0.0.1"]));
            cache.store(key("b.test", family), addrs(&["10.0.0.2"]));
        }
        assert_eq!(cache.len(), 8);

        cache.clear(Some("a.test"));
        assert_eq!(cache.len(), 4);
        for family in AddressFamily::ALL {
            assert!(cache.lookup(&key("a.test", family)).is_none());
            assert!(cache.lookup(&key("b.test", family)).is_some());
        }

        // no entry for this host
        cache.clear(Some("c.test"));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn clear_all_twice() {
        let mut cache = ResolverCache::default();
        cache.store(key("a.test", AddressFamily::Ipv4), addrs(&["10.0.0.1"]));
        cache.clear(None);
        assert_eq!(cache.len(), 0);
        cache.clear(None);
        assert_eq!(cache.len(), 0);
    }
}
