/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use http::Request;
use log::info;

use g3graph::config::GraphConfig;
use g3graph::query::{QueryAdapter, route};
use g3graph::registry::StatsRegistry;
use g3graph::sample::{ManualClock, PeriodicSampler};
use g3graph::store::TimeSeriesStore;

mod logger;

const ARG_CONFIG: &str = "config";
const ARG_ROUNDS: &str = "rounds";
const ARG_LIVE: &str = "live";
const ARG_SELECTOR: &str = "percentile";
const ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("graph-data")
        .about("Sample a synthetic workload and print the graph data responses")
        .arg(
            Arg::new(ARG_CONFIG)
                .help("yaml config file")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .short('c')
                .long("config"),
        )
        .arg(
            Arg::new(ARG_ROUNDS)
                .help("number of sampling rounds")
                .num_args(1)
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("3")
                .short('n')
                .long("rounds"),
        )
        .arg(
            Arg::new(ARG_LIVE)
                .help("wait for the real sampling interval between rounds")
                .action(ArgAction::SetTrue)
                .long("live"),
        )
        .arg(
            Arg::new(ARG_SELECTOR)
                .help("percentile indexes for timing metrics, like 0,2")
                .num_args(1)
                .value_name("INDEXES")
                .short('p')
                .long("percentile"),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v'),
        )
}

/// Load generated for one round.
fn run_workload(registry: &StatsRegistry, round: usize) {
    let round = round as i64;
    registry.incr("requests", 10 * (round + 1));
    registry.set_gauge("connections", 5 + round % 3);
    for i in 0..20_i64 {
        registry.add_timing("latency", (round * 7 + i * 13) % 500);
    }
    registry.time("workload", || std::hint::black_box((0..1000).sum::<u64>()));
}

fn print_responses(adapter: &QueryAdapter, selector: Option<&String>) -> anyhow::Result<()> {
    let req = Request::get("/graph_data").body(())?;
    println!("{}", route(adapter, &req).body());

    for key in adapter.list_keys() {
        let uri = match selector {
            Some(p) => format!("/graph_data/{key}?p={p}"),
            None => format!("/graph_data/{key}"),
        };
        let req = Request::get(uri).body(())?;
        println!("{}", route(adapter, &req).body());
    }
    Ok(())
}

async fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let config = match args.get_one::<PathBuf>(ARG_CONFIG) {
        Some(path) => GraphConfig::load(path)?,
        None => GraphConfig::default(),
    };
    let rounds = args.get_one::<usize>(ARG_ROUNDS).copied().unwrap_or(3);
    info!("using config {config:?}");

    let registry = Arc::new(StatsRegistry::new());
    let store = Arc::new(TimeSeriesStore::new(config.capacity, config.interval));
    let adapter = QueryAdapter::with_config(store.clone(), &config);
    let sampler = PeriodicSampler::new(registry.clone(), store);

    if args.get_flag(ARG_LIVE) {
        let handle = sampler.spawn(None);
        for round in 0..rounds {
            run_workload(&registry, round);
            tokio::time::sleep(config.interval).await;
        }
        handle.stop().await;
    } else {
        let clock = Arc::new(ManualClock::new(Utc::now().timestamp()));
        let sampler = sampler.with_clock(clock.clone());
        let step = i64::try_from(config.interval.as_secs()).unwrap_or(i64::MAX);
        for round in 0..rounds {
            run_workload(&registry, round);
            let summary = sampler.sample_once();
            info!(
                "round {} at {}: {} recorded, {} failed",
                summary.tick, summary.timestamp, summary.recorded, summary.failed
            );
            clock.advance(step);
        }
    }

    print_responses(&adapter, args.get_one::<String>(ARG_SELECTOR))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    let verbose = args.get_one::<u8>(ARG_VERBOSE).copied().unwrap_or_default();
    let _logger_guard = logger::setup(verbose)?;

    run(&args).await
}
