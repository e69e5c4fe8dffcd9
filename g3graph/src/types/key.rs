/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Counter,
    Gauge,
    Timing,
}

impl MetricKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter:",
            MetricKind::Gauge => "gauge:",
            MetricKind::Timing => "timing:",
        }
    }

    #[inline]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, MetricKind::Timing)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricKeyParseError {
    #[error("unknown metric kind prefix in {0}")]
    UnknownKind(String),
    #[error("empty metric name")]
    EmptyName,
}

/// A metric name tagged with its kind, displayed as `<kind>:<name>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    kind: MetricKind,
    name: Arc<str>,
}

impl MetricKey {
    pub fn new(kind: MetricKind, name: &str) -> Self {
        MetricKey {
            kind,
            name: Arc::from(name),
        }
    }

    pub fn counter(name: &str) -> Self {
        MetricKey::new(MetricKind::Counter, name)
    }

    pub fn gauge(name: &str) -> Self {
        MetricKey::new(MetricKind::Gauge, name)
    }

    pub fn timing(name: &str) -> Self {
        MetricKey::new(MetricKind::Timing, name)
    }

    #[inline]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for MetricKey {
    type Err = MetricKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = [MetricKind::Counter, MetricKind::Gauge, MetricKind::Timing]
            .into_iter()
            .find_map(|kind| s.strip_prefix(kind.prefix()).map(|name| (kind, name)))
            .ok_or_else(|| MetricKeyParseError::UnknownKind(s.to_string()))?;
        if name.is_empty() {
            return Err(MetricKeyParseError::EmptyName);
        }
        Ok(MetricKey::new(kind, name))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.prefix())?;
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(MetricKey::counter("dogs").to_string(), "counter:dogs");
        assert_eq!(MetricKey::gauge("load").to_string(), "gauge:load");
        assert_eq!(MetricKey::timing("run").to_string(), "timing:run");
    }

    #[test]
    fn parse() {
        let key = MetricKey::from_str("timing:db:select").unwrap();
        assert_eq!(key.kind(), MetricKind::Timing);
        assert_eq!(key.name(), "db:select");

        assert_eq!(
            MetricKey::from_str("metric:x"),
            Err(MetricKeyParseError::UnknownKind("metric:x".to_string()))
        );
        assert_eq!(
            MetricKey::from_str("counter:"),
            Err(MetricKeyParseError::EmptyName)
        );
    }
}
