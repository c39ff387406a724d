//! Rate-limit-aware batch scheduler.
//!
//! Free-tier providers allow a handful of calls per minute. The scheduler
//! splits a symbol list into fixed-size groups, runs each group's requests
//! one after another, and waits a fixed pause between groups. Results come
//! back in input order; any failure aborts the whole run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{ClientConfig, DEFAULT_BATCH_PAUSE, DEFAULT_BATCH_SIZE};
use crate::errors::Result;

/// Ordered list of provider symbols.
///
/// A single symbol converts into a one-element list, so scalar and list
/// inputs go through exactly the same batching path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbols(Vec<String>);

impl Symbols {
    pub fn new(symbols: Vec<String>) -> Self {
        Self(symbols)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Symbols {
    fn from(symbol: &str) -> Self {
        Self(vec![symbol.to_string()])
    }
}

impl From<String> for Symbols {
    fn from(symbol: String) -> Self {
        Self(vec![symbol])
    }
}

impl From<Vec<String>> for Symbols {
    fn from(symbols: Vec<String>) -> Self {
        Self(symbols)
    }
}

impl From<Vec<&str>> for Symbols {
    fn from(symbols: Vec<&str>) -> Self {
        Self(symbols.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Symbols {
    fn from(symbols: &[&str]) -> Self {
        Self(symbols.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for Symbols {
    fn from(symbols: &[String]) -> Self {
        Self(symbols.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Symbols {
    fn from(symbols: [&str; N]) -> Self {
        Self(symbols.iter().map(|s| s.to_string()).collect())
    }
}

/// Runs per-symbol requests in fixed-size groups with a pause in between.
#[derive(Clone)]
pub struct BatchScheduler {
    batch_size: usize,
    pause: Duration,
    clock: Arc<dyn Clock>,
}

impl BatchScheduler {
    /// Scheduler with the default group size (5) and pause (60s).
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pause: DEFAULT_BATCH_PAUSE,
            clock,
        }
    }

    pub fn from_config(config: &ClientConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock)
            .with_batch_size(config.batch_size)
            .with_pause(config.batch_pause)
    }

    /// Group size; zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Number of groups needed for `len` items.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Number of pauses a run over `len` items performs.
    pub fn pause_count(&self, len: usize) -> usize {
        self.batch_count(len).saturating_sub(1)
    }

    /// Split `items` into ordered, non-overlapping groups; only the last may be shorter.
    pub fn partition<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        items.chunks(self.batch_size).collect()
    }

    /// Run `request` once per symbol and return the results in input order.
    ///
    /// Requests inside a group run sequentially. The pause happens between
    /// groups only, never after the last one. The first error stops the run
    /// and no partial results are returned.
    pub async fn run<T, F, Fut>(&self, symbols: &Symbols, mut request: F) -> Result<Vec<T>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let groups = self.partition(symbols.as_slice());
        info!("Bundling API calls into {} batches.", groups.len());

        let mut results = Vec::with_capacity(symbols.len());
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                info!("Sleeping for {:?} before next batch.", self.pause);
                self.clock.sleep(self.pause).await?;
            }
            for symbol in group.iter() {
                results.push(request(symbol.clone()).await?);
            }
        }

        Ok(results)
    }
}
