/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::Arguments;
use std::io::{self, Write};

use chrono::Local;
use slog::{Drain, KV, Key, Level, OwnedKVList, Record, Serializer, slog_o};
use slog_scope::GlobalLoggerGuard;

/// Writes each record straight to stderr from the logging thread.
///
/// Unlike the async journal drains there is no channel or io thread; the
/// demo logs a handful of lines per round.
struct StderrDrain;

struct CollectKv(Vec<(String, String)>);

impl Serializer for CollectKv {
    fn emit_arguments(&mut self, key: Key, val: &Arguments) -> slog::Result {
        self.0.push((key.to_string(), val.to_string()));
        Ok(())
    }
}

fn write_plain<IO: Write>(io: &mut IO, record: &Record, values: &OwnedKVList) -> io::Result<()> {
    let mut kv = CollectKv(Vec::new());
    values.serialize(record, &mut kv).map_err(io::Error::other)?;
    record.kv().serialize(record, &mut kv).map_err(io::Error::other)?;

    write!(io, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"))?;
    write!(io, " {}", record.level())?;
    for (k, v) in &kv.0 {
        write!(io, " {k}: {v},")?;
    }
    write!(io, " {}", record.msg())?;
    match record.file().rsplit_once('/') {
        Some((_, file)) => write!(io, " <{}({file}:{})>", record.module(), record.line())?,
        None => write!(io, " <{}>", record.module())?,
    }
    writeln!(io)
}

impl Drain for StderrDrain {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        write_plain(&mut buf, record, values)?;
        let mut stderr = io::stderr().lock();
        stderr.write_all(&buf)?;
        stderr.flush()
    }
}

fn verbose_level(verbose: u8) -> (Level, log::Level) {
    match verbose {
        0 => (Level::Warning, log::Level::Warn),
        1 => (Level::Info, log::Level::Info),
        2 => (Level::Debug, log::Level::Debug),
        _ => (Level::Trace, log::Level::Trace),
    }
}

pub(crate) fn setup(verbose: u8) -> anyhow::Result<GlobalLoggerGuard> {
    let (level, std_level) = verbose_level(verbose);
    let drain = StderrDrain.filter_level(level).ignore_res();
    let logger = slog::Logger::root(drain, slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);
    slog_stdlog::init_with_level(std_level)?;
    Ok(scope_guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use slog::{Never, slog_info};

    struct BufDrain(Arc<Mutex<Vec<u8>>>);

    impl Drain for BufDrain {
        type Ok = ();
        type Err = Never;

        fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
            let mut buf = self.0.lock().unwrap();
            write_plain(&mut *buf, record, values).unwrap();
            Ok(())
        }
    }

    #[test]
    fn plain_line() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let logger = slog::Logger::root(BufDrain(buf.clone()), slog_o!("round" => 1));
        slog_info!(logger, "sampled"; "keys" => 3);

        let line = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let (_time, rest) = line.split_once(" INFO ").unwrap();
        assert!(rest.starts_with("round: 1, keys: 3, sampled <graph_data::logger::tests(logger.rs:"));
        assert!(rest.ends_with(")>\n"));
    }

    #[test]
    fn verbose_levels() {
        assert_eq!(verbose_level(0), (Level::Warning, log::Level::Warn));
        assert_eq!(verbose_level(2), (Level::Debug, log::Level::Debug));
        assert_eq!(verbose_level(9), (Level::Trace, log::Level::Trace));
    }
}
