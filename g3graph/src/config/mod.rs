/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader, yaml};

use g3_histogram::Quantile;

use crate::query::default_percentiles;

mod value;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_CAPACITY: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    pub interval: Duration,
    pub capacity: usize,
    pub percentiles: Vec<Quantile>,
    pub backfill: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            interval: DEFAULT_INTERVAL,
            capacity: DEFAULT_CAPACITY,
            percentiles: default_percentiles(),
            backfill: true,
        }
    }
}

impl GraphConfig {
    /// Load the config from a yaml file.
    ///
    /// Multiple docs are treated as one, later values win.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("failed to read config file {}", path.display()))?;
        let docs = YamlLoader::load_from_str(&content)
            .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;

        let mut config = GraphConfig::default();
        for (i, doc) in docs.iter().enumerate() {
            match doc {
                Yaml::Hash(map) => value::foreach_kv(map, |k, v| config.set(k, v))
                    .context(format!("invalid config in doc #{i} of {}", path.display()))?,
                Yaml::Null => {}
                _ => return Err(anyhow!("yaml doc root should be hash")),
            }
        }
        config.check()?;
        Ok(config)
    }

    pub fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = GraphConfig::default();
        value::foreach_kv(map, |k, v| config.set(k, v))?;
        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match value::normalize_key(k).as_str() {
            "interval" | "sample_interval" => {
                self.interval = value::as_interval(v)
                    .context(format!("invalid interval value for key {k}"))?;
                Ok(())
            }
            "capacity" | "retain" => {
                self.capacity =
                    value::as_usize(v).context(format!("invalid usize value for key {k}"))?;
                Ok(())
            }
            "percentiles" | "quantile" => {
                self.percentiles = value::as_quantile_list(v)
                    .context(format!("invalid quantile list value for key {k}"))?;
                Ok(())
            }
            "backfill" => {
                self.backfill =
                    value::as_bool(v).context(format!("invalid bool value for key {k}"))?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.interval.as_secs() == 0 {
            return Err(anyhow!("interval should be at least 1s"));
        }
        if self.capacity == 0 {
            return Err(anyhow!("capacity should not be 0"));
        }
        if self.percentiles.is_empty() {
            return Err(anyhow!("percentile list should not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse_str(s: &str) -> anyhow::Result<GraphConfig> {
        let docs = YamlLoader::load_from_str(s).unwrap();
        let Yaml::Hash(map) = &docs[0] else {
            panic!("not a hash");
        };
        GraphConfig::parse(map)
    }

    #[test]
    fn defaults() {
        let config = parse_str("{}").unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.capacity, 60);
        assert_eq!(config.percentiles.len(), 8);
        assert!(config.backfill);
    }

    #[test]
    fn full() {
        let config = parse_str(
            r#"
            Sample-Interval: 10s
            capacity: 30
            percentiles: [0.5, 0.99]
            backfill: false
            "#,
        )
        .unwrap();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.capacity, 30);
        assert_eq!(config.percentiles, vec![Quantile::PCT50, Quantile::PCT99]);
        assert!(!config.backfill);

        let config = parse_str(r#"percentiles: "0.99, 0.5""#).unwrap();
        assert_eq!(config.percentiles, vec![Quantile::PCT99, Quantile::PCT50]);
    }

    #[test]
    fn invalid() {
        assert!(parse_str("unknown: 1").is_err());
        assert!(parse_str("capacity: 0").is_err());
        assert!(parse_str("interval: 0").is_err());
        assert!(parse_str("interval: 1500ms").is_err());
        assert!(parse_str("percentiles: 1.5").is_err());
        assert!(parse_str("percentiles: []").is_err());
    }

    #[test]
    fn load_file() {
        let path = std::env::temp_dir().join(format!("g3graph-config-{}.yaml", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"interval: 1m\n---\ncapacity: 5\n").unwrap();
        drop(f);

        let config = GraphConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.capacity, 5);

        assert!(GraphConfig::load(&path).is_err());
    }
}
