//! # redb-backed knowledge store
//!
//! Durable state that outlives a session:
//! - latest analysis per source (keyed by the sha256 of the source path)
//! - append-only health history per source
//! - append-only risk snapshots per source
//! - a free-text interaction log for keyword recall
//!
//! Values are postcard-encoded. Every write is its own transaction, so an
//! interrupted pass leaves only fully committed rows behind.

mod records;

pub use records::{now_ms, HistorySnapshot, Interaction, PersistedAnalysis};

use crate::errors::Result;
use crate::risk::RiskNode;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// sha256(source) hex -> PersistedAnalysis
const ANALYSES: TableDefinition<&str, &[u8]> = TableDefinition::new("analyses");

/// (source, timestamp_ms) -> HistorySnapshot
const HISTORY: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("history");

/// (source, timestamp_ms) -> RiskNode
const RISK_SNAPSHOTS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("risk_snapshots");

/// sequence -> Interaction
const INTERACTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("interactions");

/// Deterministic key for a source path
pub fn source_key(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(postcard::from_bytes(bytes)?)
}

pub struct KnowledgeStore {
    db: Database,
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore").finish_non_exhaustive()
    }
}

impl KnowledgeStore {
    /// Open or create the store, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ANALYSES)?;
            let _ = write_txn.open_table(HISTORY)?;
            let _ = write_txn.open_table(RISK_SNAPSHOTS)?;
            let _ = write_txn.open_table(INTERACTIONS)?;
        }
        write_txn.commit()?;

        log::debug!("Opened knowledge store at {}", path.display());
        Ok(Self { db })
    }

    pub fn save_analysis(&self, analysis: &PersistedAnalysis) -> Result<()> {
        let key = source_key(&analysis.source);
        let bytes = encode(analysis)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ANALYSES)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_analysis(&self, source: &str) -> Result<Option<PersistedAnalysis>> {
        let key = source_key(source);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ANALYSES)?;
        match table.get(key.as_str())? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn all_analyses(&self) -> Result<Vec<PersistedAnalysis>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ANALYSES)?;
        let mut analyses = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            analyses.push(decode::<PersistedAnalysis>(value.value())?);
        }
        analyses.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(analyses)
    }

    /// Append a snapshot. A timestamp already taken for this source is bumped
    /// forward by 1 ms until free; the stored timestamp is returned.
    pub fn append_history(&self, source: &str, snapshot: &HistorySnapshot) -> Result<u64> {
        let write_txn = self.db.begin_write()?;
        let timestamp = {
            let mut table = write_txn.open_table(HISTORY)?;
            let mut timestamp = snapshot.timestamp_ms;
            while table.get((source, timestamp))?.is_some() {
                timestamp += 1;
            }
            let stored = HistorySnapshot {
                timestamp_ms: timestamp,
                ..snapshot.clone()
            };
            let bytes = encode(&stored)?;
            table.insert((source, timestamp), bytes.as_slice())?;
            timestamp
        };
        write_txn.commit()?;
        Ok(timestamp)
    }

    /// Up to `limit` most recent snapshots, newest first
    pub fn history(&self, source: &str, limit: usize) -> Result<Vec<HistorySnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;
        let mut snapshots = Vec::new();
        for entry in table.range((source, 0u64)..=(source, u64::MAX))?.rev().take(limit) {
            let (_, value) = entry?;
            snapshots.push(decode::<HistorySnapshot>(value.value())?);
        }
        Ok(snapshots)
    }

    pub fn append_risk_snapshot(&self, node: &RiskNode, timestamp_ms: u64) -> Result<u64> {
        let source = node.source.as_str();
        let bytes = encode(node)?;

        let write_txn = self.db.begin_write()?;
        let timestamp = {
            let mut table = write_txn.open_table(RISK_SNAPSHOTS)?;
            let mut timestamp = timestamp_ms;
            while table.get((source, timestamp))?.is_some() {
                timestamp += 1;
            }
            table.insert((source, timestamp), bytes.as_slice())?;
            timestamp
        };
        write_txn.commit()?;
        Ok(timestamp)
    }

    /// Risk snapshots for a source with their timestamps, oldest first
    pub fn risk_history(&self, source: &str) -> Result<Vec<(u64, RiskNode)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RISK_SNAPSHOTS)?;
        let mut snapshots = Vec::new();
        for entry in table.range((source, 0u64)..=(source, u64::MAX))? {
            let (key, value) = entry?;
            let (_, timestamp) = key.value();
            snapshots.push((timestamp, decode::<RiskNode>(value.value())?));
        }
        Ok(snapshots)
    }

    pub fn log_interaction(&self, interaction: &Interaction) -> Result<u64> {
        let bytes = encode(interaction)?;

        let write_txn = self.db.begin_write()?;
        let seq = {
            let mut table = write_txn.open_table(INTERACTIONS)?;
            let seq = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            table.insert(seq, bytes.as_slice())?;
            seq
        };
        write_txn.commit()?;
        Ok(seq)
    }

    /// Interactions whose operation, target or summary contains `keyword`
    /// (case-insensitive), oldest first
    pub fn recall(&self, keyword: &str) -> Result<Vec<Interaction>> {
        let needle = keyword.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTERACTIONS)?;
        let mut matches = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let interaction: Interaction = decode(value.value())?;
            if interaction.matches(&needle) {
                matches.push(interaction);
            }
        }
        Ok(matches)
    }
}
