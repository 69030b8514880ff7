/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use crate::cache::ArcAddrList;
use crate::{AddressFamily, ResolveQueryError};

pub const RESOLVER_MAX_QUERIES: usize = 32;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QueryStatus {
    #[default]
    None,
    Waiting,
    Done,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::None => "none",
            QueryStatus::Waiting => "waiting",
            QueryStatus::Done => "done",
            QueryStatus::Error => "error",
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, QueryStatus::Done | QueryStatus::Error)
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a query slot.
///
/// Ids are reused once the slot is released, so an id must not be used
/// after it has been passed to release.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct QueryId(usize);

impl QueryId {
    pub const INVALID: QueryId = QueryId(usize::MAX);

    pub const fn new(index: usize) -> Self {
        QueryId(index)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0 != usize::MAX
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("invalid")
        }
    }
}

pub(crate) struct QuerySlot {
    status: QueryStatus,
    hostname: Arc<str>,
    family: AddressFamily,
    response: ArcAddrList,
    ticket: u64,
}

impl Default for QuerySlot {
    fn default() -> Self {
        QuerySlot {
            status: QueryStatus::None,
            hostname: Arc::from(""),
            family: AddressFamily::Unspecified,
            response: Arc::new([]),
            ticket: 0,
        }
    }
}

impl QuerySlot {
    #[inline]
    pub(crate) fn status(&self) -> QueryStatus {
        self.status
    }

    #[inline]
    pub(crate) fn hostname(&self) -> &Arc<str> {
        &self.hostname
    }

    #[inline]
    pub(crate) fn response(&self) -> &ArcAddrList {
        &self.response
    }
}

/// A snapshot of a waiting slot, taken before the lock is released.
pub(crate) struct WaitingQuery {
    pub(crate) index: usize,
    pub(crate) hostname: Arc<str>,
    pub(crate) family: AddressFamily,
    ticket: u64,
}

pub(crate) struct QueryTable {
    slots: Box<[QuerySlot]>,
    next_ticket: u64,
}

impl QueryTable {
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| QuerySlot::default()).collect();
        QueryTable {
            slots,
            next_ticket: 1,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn waiting_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.status == QueryStatus::Waiting)
            .count()
    }

    /// Take the first free slot and mark it waiting for `hostname`.
    pub(crate) fn allocate(
        &mut self,
        hostname: Arc<str>,
        family: AddressFamily,
    ) -> Option<WaitingQuery> {
        let index = self
            .slots
            .iter()
            .position(|s| s.status == QueryStatus::None)?;

        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let slot = &mut self.slots[index];
        slot.hostname = hostname.clone();
        slot.family = family;
        slot.response = Arc::new([]);
        slot.ticket = ticket;
        slot.status = QueryStatus::Waiting;
        Some(WaitingQuery {
            index,
            hostname,
            family,
            ticket,
        })
    }

    pub(crate) fn get(&self, index: usize) -> Result<&QuerySlot, ResolveQueryError> {
        self.slots
            .get(index)
            .ok_or(ResolveQueryError::InvalidQueryId(index))
    }

    pub(crate) fn release(&mut self, index: usize) -> Result<(), ResolveQueryError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ResolveQueryError::InvalidQueryId(index))?;
        slot.status = QueryStatus::None;
        slot.response = Arc::new([]);
        Ok(())
    }

    pub(crate) fn waiting(&self, index: usize) -> Option<WaitingQuery> {
        let slot = self.slots.get(index)?;
        if slot.status != QueryStatus::Waiting {
            return None;
        }
        Some(WaitingQuery {
            index,
            hostname: slot.hostname.clone(),
            family: slot.family,
            ticket: slot.ticket,
        })
    }

    /// Publish the result of `query`.
    ///
    /// Returns false if the slot has been released, or released and taken
    /// by another request, since the snapshot was taken.
    pub(crate) fn complete(&mut self, query: &WaitingQuery, addrs: ArcAddrList) -> bool {
        let Some(slot) = self.slots.get_mut(query.index) else {
            return false;
        };
        if slot.status != QueryStatus::Waiting || slot.ticket != query.ticket {
            return false;
        }
        slot.status = if addrs.is_empty() {
            QueryStatus::Error
        } else {
            QueryStatus::Done
        };
        slot.response = addrs;
        true
    }

    pub(crate) fn fail_waiting(&mut self) -> usize {
        let mut count = 0;
        for slot in self.slots.iter_mut() {
            if slot.status == QueryStatus::Waiting {
                slot.status = QueryStatus::Error;
                slot.response = Arc::new([]);
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn host(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    fn one_addr() -> ArcAddrList {
        Arc::new([IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))])
    }

    fn allocate_index(table: &mut QueryTable, s: &str) -> Option<usize> {
        table.allocate(host(s), AddressFamily::Any).map(|q| q.index)
    }

    #[test]
    fn query_id() {
        assert!(!QueryId::INVALID.is_valid());
        assert!(QueryId::new(0).is_valid());
        assert_eq!(QueryId::new(7).index(), 7);
        assert_eq!(QueryId::new(7).to_string(), "7");
        assert_eq!(QueryId::INVALID.to_string(), "invalid");
        for i in 0..RESOLVER_MAX_QUERIES {
            assert_ne!(QueryId::new(i), QueryId::INVALID);
        }
    }

    #[test]
    fn allocate_lowest_first() {
        let mut table = QueryTable::new(4);
        assert_eq!(table.capacity(), 4);
        assert_eq!(allocate_index(&mut table, "a"), Some(0));
        assert_eq!(allocate_index(&mut table, "b"), Some(1));
        assert_eq!(allocate_index(&mut table, "c"), Some(2));
        assert_eq!(table.get(2).unwrap().status(), QueryStatus::Waiting);

        table.release(1).unwrap();
        assert_eq!(table.get(1).unwrap().status(), QueryStatus::None);

        let query = table.allocate(host("d"), AddressFamily::Ipv4).unwrap();
        assert_eq!(query.index, 1);
        assert_eq!(query.family, AddressFamily::Ipv4);
        assert_eq!(table.get(1).unwrap().hostname().as_ref(), "d");
        assert_eq!(table.waiting_count(), 3);
    }

    #[test]
    fn full_table() {
        let mut table = QueryTable::new(2);
        assert!(allocate_index(&mut table, "a").is_some());
        assert!(allocate_index(&mut table, "b").is_some());
        assert!(allocate_index(&mut table, "c").is_none());
        assert_eq!(table.get(0).unwrap().hostname().as_ref(), "a");
        assert_eq!(table.get(1).unwrap().hostname().as_ref(), "b");
    }

    #[test]
    fn out_of_range() {
        let mut table = QueryTable::new(2);
        assert_eq!(
            table.get(2).err(),
            Some(ResolveQueryError::InvalidQueryId(2))
        );
        assert_eq!(
            table.release(usize::MAX),
            Err(ResolveQueryError::InvalidQueryId(usize::MAX))
        );
        assert!(table.waiting(5).is_none());
    }

    #[test]
    fn complete() {
        let mut table = QueryTable::new(2);
        let query = table.allocate(host("a"), AddressFamily::Any).unwrap();
        let index = query.index;

        assert!(table.complete(&query, one_addr()));
        let slot = table.get(index).unwrap();
        assert_eq!(slot.status(), QueryStatus::Done);
        assert_eq!(slot.response(), &one_addr());

        // not waiting any more
        assert!(table.waiting(index).is_none());
        assert!(!table.complete(&query, Arc::new([])));
        assert_eq!(table.get(index).unwrap().status(), QueryStatus::Done);

        let query = table.allocate(host("b"), AddressFamily::Any).unwrap();
        assert_eq!(table.waiting(query.index).unwrap().hostname.as_ref(), "b");
        assert!(table.complete(&query, Arc::new([])));
        let slot = table.get(query.index).unwrap();
        assert_eq!(slot.status(), QueryStatus::Error);
        assert!(slot.response().is_empty());
    }

    #[test]
    fn complete_after_reuse() {
        let mut table = QueryTable::new(1);
        let stale = table.allocate(host("old"), AddressFamily::Any).unwrap();
        let index = stale.index;

        table.release(index).unwrap();
        assert!(!table.complete(&stale, one_addr()));
        assert_eq!(table.get(index).unwrap().status(), QueryStatus::None);

        let reused = table.allocate(host("new"), AddressFamily::Any).unwrap();
        assert_eq!(reused.index, index);
        assert!(!table.complete(&stale, one_addr()));
        assert_eq!(table.get(index).unwrap().status(), QueryStatus::Waiting);

        let fresh = table.waiting(index).unwrap();
        assert!(table.complete(&fresh, one_addr()));
        assert_eq!(table.get(index).unwrap().status(), QueryStatus::Done);
    }

    #[test]
    fn fail_waiting() {
        let mut table = QueryTable::new(3);
        allocate_index(&mut table, "a").unwrap();
        let query = table.allocate(host("b"), AddressFamily::Any).unwrap();
        table.complete(&query, one_addr());

        assert_eq!(table.fail_waiting(), 1);
        assert_eq!(table.get(0).unwrap().status(), QueryStatus::Error);
        assert_eq!(table.get(1).unwrap().status(), QueryStatus::Done);
        assert_eq!(table.get(2).unwrap().status(), QueryStatus::None);
        assert_eq!(table.waiting_count(), 0);
    }
}
