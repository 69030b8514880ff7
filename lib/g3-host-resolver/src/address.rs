/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

pub trait ResolvedAddrExt {
    /// An address is usable as a resolve answer unless it is the
    /// unspecified address of its family.
    fn is_valid_answer(&self) -> bool;
}

impl ResolvedAddrExt for IpAddr {
    #[inline]
    fn is_valid_answer(&self) -> bool {
        !self.is_unspecified()
    }
}

pub(crate) fn first_valid(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs.iter().find(|ip| ip.is_valid_answer()).copied()
}

pub(crate) fn all_valid(addrs: &[IpAddr]) -> Vec<IpAddr> {
    addrs
        .iter()
        .filter(|ip| ip.is_valid_answer())
        .copied()
        .collect()
}
