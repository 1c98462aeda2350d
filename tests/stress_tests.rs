//! Stress tests for concurrent record emission
//!
//! These tests verify:
//! - Every record from every thread reaches the sink exactly once
//! - Concurrent records never interleave within a line
//! - Buffer recycling stays consistent under contention
//! - Runtime reconfiguration is safe while other threads log

use rust_structured_logger::prelude::*;
use rust_structured_logger::{FileSink, Tier};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

fn shared_logger(layout: &str) -> (Arc<Logger>, MemorySink) {
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .min_level(LogLevel::Debug)
        .layout(layout)
        .timestamp_format(TimestampFormat::UnixMicros)
        .sink(sink.clone())
        .build();
    (Arc::new(logger), sink)
}

/// N threads x M records produce exactly N*M intact lines
#[test]
fn test_concurrent_text_records_are_intact() {
    let (logger, sink) = shared_logger("%L %l");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.infof("thread=%d seq=%d payload=%s", &args![t, i, "x".repeat(i % 64)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let contents = sink.contents();
    assert!(contents.ends_with('\n'));
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert_eq!(sink.write_count(), THREADS * PER_THREAD);

    let mut seen = HashSet::new();
    for line in &lines {
        let rest = line.strip_prefix("[INFO] thread=").expect("line starts cleanly");
        let mut parts = rest.split(' ');
        let t: usize = parts.next().unwrap().parse().unwrap();
        let i: usize = parts
            .next()
            .and_then(|p| p.strip_prefix("seq="))
            .unwrap()
            .parse()
            .unwrap();
        let payload = parts.next().and_then(|p| p.strip_prefix("payload=")).unwrap();
        assert_eq!(payload.len(), i % 64, "corrupted line: {line}");
        assert!(parts.next().is_none(), "interleaved line: {line}");
        assert!(seen.insert((t, i)), "duplicate record {t}/{i}");
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert_eq!(logger.metrics().records_written(), (THREADS * PER_THREAD) as u64);
}

/// Structured records from many threads each parse as one JSON object
#[test]
fn test_concurrent_structured_records_parse() {
    let (logger, sink) = shared_logger("%l");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.warn_s(&[
                        Field::int("thread", t as i64),
                        Field::int("seq", i as i64),
                        Field::bool("even", i % 2 == 0),
                    ]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    for line in &lines {
        let value: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
        assert_eq!(value["level"], "WARN");
        assert!(value["timestamp"].is_i64());
        let seq = value["seq"].as_i64().unwrap();
        assert_eq!(value["even"], seq % 2 == 0);
    }
}

/// Filtered calls from many threads never touch the buffer pool
#[test]
fn test_concurrent_filtered_records_lease_nothing() {
    let (logger, sink) = shared_logger("%l");
    logger.set_min_level(LogLevel::Error);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.debugf("hidden %d", &args![i]);
                    logger.info_s(&[Field::int("hidden", i as i64)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    assert!(sink.is_empty());
    assert_eq!(logger.recycler().metrics().leases(), 0);
    assert_eq!(
        logger.metrics().records_filtered(),
        (THREADS * PER_THREAD * 2) as u64
    );
}

/// Records of mixed sizes keep recycled buffers clean
#[test]
fn test_mixed_sizes_never_leak_between_records() {
    let (logger, sink) = shared_logger("%l");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..100 {
                    let size = [10, 700, 5_000, 40_000, 70_000][(t + i) % 5];
                    let body = "y".repeat(size);
                    logger.info(&body);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    for line in sink.lines() {
        assert!(line.bytes().all(|b| b == b'y'), "stale bytes in record");
        assert!([10, 700, 5_000, 40_000, 70_000].contains(&line.len()));
    }

    let recycler = logger.recycler();
    for tier in Tier::ALL {
        assert!(recycler.idle(tier) <= rust_structured_logger::core::buffer_pool::DEFAULT_TIER_DEPTH);
    }
    assert!(recycler.metrics().discarded() > 0, "oversized buffers are dropped");
}

/// Swapping sinks and levels while other threads log loses nothing
#[test]
fn test_reconfiguration_under_load() {
    let first = MemorySink::new();
    let second = MemorySink::new();
    let logger = Arc::new(
        Logger::builder()
            .layout("%l")
            .sink(first.clone())
            .build(),
    );

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..1_000 {
                    logger.errorf("t%d-%d", &args![t, i]);
                }
            })
        })
        .collect();

    let swapper = {
        let logger = Arc::clone(&logger);
        let second = second.clone();
        thread::spawn(move || {
            for round in 0..50 {
                logger.set_layout(if round % 2 == 0 { "%l" } else { "%l%" });
                logger.set_min_level(if round % 2 == 0 { LogLevel::Debug } else { LogLevel::Info });
                logger.set_include_caller(round % 2 == 0);
            }
            logger.set_sink(second);
        })
    };

    for handle in writers {
        handle.join().expect("writer panicked");
    }
    swapper.join().expect("swapper panicked");

    let total = first.lines().len() + second.lines().len();
    assert_eq!(total, 4 * 1_000);
    for line in first.lines().iter().chain(second.lines().iter()) {
        assert!(line.starts_with('t') && line.contains('-'), "bad line {line}");
    }
}

/// A file sink shared by many threads holds every record
#[test]
fn test_concurrent_file_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("stress.log");

    let logger = Arc::new(
        Logger::builder()
            .layout("%L %l")
            .sink(FileSink::new(&log_file).expect("Failed to create sink"))
            .build(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..200 {
                    logger.log(LogLevel::Warn, &format!("file t{t} i{i}")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logging thread panicked");
    }
    logger.flush().unwrap();

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), THREADS * 200);
    assert!(content.lines().all(|l| l.starts_with("[WARN] file t")));
}
