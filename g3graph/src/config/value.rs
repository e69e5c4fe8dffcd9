/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use g3_histogram::Quantile;

pub(super) fn normalize_key(s: &str) -> String {
    s.to_lowercase().replace('-', "_")
}

pub(super) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        let Yaml::String(key) = k else {
            return Err(anyhow!("key in hash should be string"));
        };
        f(key, v).context(format!("failed to parse value of key {key}"))?;
    }
    Ok(())
}

/// A sampling interval: a humanized duration string, or a plain count of
/// seconds. Timestamps are whole seconds, so sub-second parts are rejected.
pub(super) fn as_interval(v: &Yaml) -> anyhow::Result<Duration> {
    let interval = match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(d) => d,
            Err(ParseError::MissingUnit) => u64::from_str(value)
                .map(Duration::from_secs)
                .map_err(|_| anyhow!("invalid interval string {value}"))?,
            Err(e) => return Err(anyhow!("invalid humanize interval string: {e}")),
        },
        Yaml::Integer(value) => u64::try_from(*value)
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("negative interval value"))?,
        _ => {
            return Err(anyhow!(
                "yaml value type for interval should be 'string' or 'integer'"
            ));
        }
    };
    if interval.subsec_nanos() != 0 {
        return Err(anyhow!("interval {interval:?} is not whole seconds"));
    }
    Ok(interval)
}

pub(super) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(super) fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

fn as_quantile(v: &Yaml) -> anyhow::Result<Quantile> {
    match v {
        Yaml::String(s) | Yaml::Real(s) => {
            Quantile::from_str(s).map_err(|e| anyhow!("invalid quantile value: {e}"))
        }
        Yaml::Integer(i) => {
            Quantile::from_str(&i.to_string()).map_err(|e| anyhow!("invalid quantile value: {e}"))
        }
        _ => Err(anyhow!(
            "yaml value type for 'quantile' should be 'str' or 'float'"
        )),
    }
}

/// Parse an ordered quantile list, given as a sequence or a comma separated
/// string. Order and duplicates are kept, the list is a response layout.
pub(super) fn as_quantile_list(v: &Yaml) -> anyhow::Result<Vec<Quantile>> {
    match v {
        Yaml::String(s) => s
            .split(',')
            .map(|p| {
                Quantile::from_str(p.trim()).map_err(|e| anyhow!("invalid quantile string {p}: {e}"))
            })
            .collect(),
        Yaml::Array(seq) => seq
            .iter()
            .enumerate()
            .map(|(i, v)| as_quantile(v).context(format!("invalid quantile value for element #{i}")))
            .collect(),
        _ => Err(anyhow!(
            "the yaml value type for 'quantile list' should be 'seq' or 'str'"
        )),
    }
}
