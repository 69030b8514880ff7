/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveQueryError {
    #[error("out of resolver query slots")]
    OutOfQuerySlots,
    #[error("invalid query id {0}")]
    InvalidQueryId(usize),
    #[error("query {0} is not submitted")]
    QueryNotSubmitted(usize),
    #[error("resolve of '{hostname}' (query {id}) didn't complete yet")]
    QueryNotCompleted { id: usize, hostname: Arc<str> },
    #[error("resolve of '{hostname}' (query {id}) failed")]
    QueryFailed { id: usize, hostname: Arc<str> },
}

impl ResolveQueryError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolveQueryError::OutOfQuerySlots => "OutOfQuerySlots",
            ResolveQueryError::InvalidQueryId(_) => "InvalidQueryId",
            ResolveQueryError::QueryNotSubmitted(_) => "QueryNotSubmitted",
            ResolveQueryError::QueryNotCompleted { .. } => "QueryNotCompleted",
            ResolveQueryError::QueryFailed { .. } => "QueryFailed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = ResolveQueryError::QueryNotCompleted {
            id: 3,
            hostname: Arc::from("example.com"),
        };
        assert_eq!(
            e.to_string(),
            "resolve of 'example.com' (query 3) didn't complete yet"
        );
        assert_eq!(e.get_type(), "QueryNotCompleted");
        assert_eq!(
            ResolveQueryError::InvalidQueryId(40).to_string(),
            "invalid query id 40"
        );
    }
}
