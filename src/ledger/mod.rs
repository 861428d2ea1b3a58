//! Process tracking ledger.
//!
//! Every external playback launch that yields a known pid is recorded
//! here. The ledger exists solely to drive best-effort termination: when
//! ringing stops, it is walked newest-first and every entry is discarded
//! whether or not the kill succeeded (a walked record is stale either
//! way). It is bounded to the most recent entries, oldest evicted first.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::launch::StrategyKind;

/// Default bound on retained records.
pub const DEFAULT_LEDGER_CAPACITY: usize = 5;

/// Metadata for one externally-launched playback process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    /// OS process id.
    pub pid: u32,
    /// When the launch happened.
    pub launched_at: DateTime<Local>,
    /// The media file the process was asked to play.
    pub file: PathBuf,
    /// Which launch strategy produced the process.
    pub strategy: StrategyKind,
}

/// Bounded FIFO of external playback launches.
#[derive(Debug)]
pub struct ProcessLedger {
    records: VecDeque<ProcessRecord>,
    capacity: usize,
}

impl Default for ProcessLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

impl ProcessLedger {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Records a launch, evicting the oldest entry past the bound.
    pub fn push(&mut self, record: ProcessRecord) {
        while self.records.len() >= self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                debug!(pid = evicted.pid, "ledger evicted oldest record");
            }
        }
        debug!(
            pid = record.pid,
            strategy = record.strategy.as_str(),
            file = %record.file.display(),
            "ledger recorded external launch"
        );
        self.records.push_back(record);
    }

    /// Removes and returns every record, newest first, for a termination
    /// walk.
    pub fn drain_newest_first(&mut self) -> Vec<ProcessRecord> {
        let mut drained: Vec<ProcessRecord> = self.records.drain(..).collect();
        drained.reverse();
        drained
    }

    /// Records currently retained, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ============================================================================
// Tests
// ============================================================================
