//! Interaction history.
//!
//! Every completed review or generation is recorded newest-first in a
//! bounded log persisted under [`HISTORY_KEY`]. The JSON layout matches the
//! one the browser client writes to `localStorage`, so a copied
//! `acr_history` value loads unchanged.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StorageError};
use crate::replay::{self, ReplayCommand};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized history.
pub const HISTORY_KEY: &str = "acr_history";

/// Maximum number of entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 80;

/// Kind of a recorded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Review,
    Generate,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Review => f.write_str("Review"),
            Self::Generate => f.write_str("Generate"),
        }
    }
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryEntry {
    Review {
        #[serde(default)]
        code: String,
        /// Review text shown to the user.
        #[serde(default)]
        result: String,
        #[serde(default, alias = "lang")]
        language: String,
        /// Epoch milliseconds.
        #[serde(rename = "t", default)]
        timestamp: i64,
    },
    Generate {
        #[serde(default)]
        description: String,
        /// Generated code shown to the user.
        #[serde(default)]
        code: String,
        #[serde(default, alias = "lang")]
        language: String,
        /// Epoch milliseconds.
        #[serde(rename = "t", default)]
        timestamp: i64,
    },
}

impl HistoryEntry {
    /// Record a review made now.
    pub fn review(
        code: impl Into<String>,
        result: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self::Review {
            code: code.into(),
            result: result.into(),
            language: language.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Record a generation made now.
    pub fn generate(
        description: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self::Generate {
            description: description.into(),
            code: code.into(),
            language: language.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Review { .. } => EntryKind::Review,
            Self::Generate { .. } => EntryKind::Generate,
        }
    }

    pub fn language(&self) -> &str {
        match self {
            Self::Review { language, .. } | Self::Generate { language, .. } => language,
        }
    }

    /// Epoch milliseconds at which the interaction completed.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Review { timestamp, .. } | Self::Generate { timestamp, .. } => *timestamp,
        }
    }

    /// What the user submitted: code for reviews, description for generations.
    pub fn input(&self) -> &str {
        match self {
            Self::Review { code, .. } => code,
            Self::Generate { description, .. } => description,
        }
    }

    /// What came back: review text or generated code.
    pub fn output(&self) -> &str {
        match self {
            Self::Review { result, .. } => result,
            Self::Generate { code, .. } => code,
        }
    }

    /// Local time of the interaction, if the timestamp is representable.
    pub fn local_time(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp_millis(self.timestamp()).map(|dt| dt.with_timezone(&Local))
    }
}

/// Per-kind counts derived from a history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub reviews: usize,
    pub generations: usize,
}

impl Stats {
    /// Count entries by kind.
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            match entry.kind() {
                EntryKind::Review => stats.reviews += 1,
                EntryKind::Generate => stats.generations += 1,
            }
            stats
        })
    }

    pub fn total(&self) -> usize {
        self.reviews + self.generations
    }
}

/// Bounded, persisted interaction log.
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
    /// Set when the last load could not read the store.
    read_error: Option<String>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Create a store with an empty in-memory log; call [`load`](Self::load)
    /// to read what was persisted.
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            read_error: None,
        }
    }

    /// Create a store and load the persisted log.
    pub fn open(store: S) -> Self {
        let mut history = Self::new(store);
        history.load();
        history
    }

    /// Reload the persisted log.
    ///
    /// Malformed data is logged and treated as an empty log. A store that
    /// cannot be read at all also yields an empty log, but later appends
    /// are kept in memory only so the stored data is not overwritten.
    pub fn load(&mut self) -> &[HistoryEntry] {
        self.read_error = None;
        self.entries = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read history");
                self.read_error = Some(e.to_string());
                Vec::new()
            }
        };

        debug!(entries = self.entries.len(), "History loaded");
        &self.entries
    }

    /// Record `entry` as the newest interaction and persist the log.
    ///
    /// The in-memory log is updated even when persisting fails.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<&[HistoryEntry]> {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);

        if let Some(reason) = &self.read_error {
            return Err(StorageError::Unreadable(reason.clone()));
        }

        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &raw)?;
        Ok(&self.entries)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts for the current log.
    pub fn stats(&self) -> Stats {
        Stats::from_entries(&self.entries)
    }

    /// Replay command for the entry at `index`.
    pub fn select(&self, index: usize) -> Option<ReplayCommand> {
        self.get(index).map(replay::select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn review_at(t: i64) -> HistoryEntry {
        HistoryEntry::Review {
            code: format!("code {t}"),
            result: "ok".to_string(),
            language: "rust".to_string(),
            timestamp: t,
        }
    }

    /// Store that accepts reads but fails every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_entry_json_matches_browser_layout() {
        let entry = HistoryEntry::Generate {
            description: "fib".to_string(),
            code: "fn fib() {}".to_string(),
            language: "rust".to_string(),
            timestamp: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "type": "generate",
                "description": "fib",
                "code": "fn fib() {}",
                "language": "rust",
                "t": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn test_entry_accepts_legacy_lang() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"type":"review","code":"x","result":"y","lang":"go","t":5}"#)
                .unwrap();
        assert_eq!(entry.language(), "go");
        assert_eq!(entry.input(), "x");
        assert_eq!(entry.output(), "y");
        assert_eq!(entry.timestamp(), 5);
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::new(&store);

        history.append(review_at(1)).unwrap();
        history.append(HistoryEntry::generate("d", "c", "js")).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].kind(), EntryKind::Generate);
        assert_eq!(history.entries()[1], review_at(1));

        let reopened = HistoryStore::open(&store);
        assert_eq!(reopened.entries(), history.entries());
    }

    #[test]
    fn test_append_caps_at_eighty() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::new(&store);

        for t in 0..100 {
            let entries = history.append(review_at(t)).unwrap();
            assert!(entries.len() <= MAX_HISTORY_ENTRIES);
            assert_eq!(entries[0].timestamp(), t);
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries().last().unwrap().timestamp(), 20);

        let persisted: Vec<HistoryEntry> =
            serde_json::from_str(&store.get(HISTORY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(persisted[0].timestamp(), 99);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let history = HistoryStore::open(MemoryStore::new());
        assert!(history.is_empty());
        assert_eq!(history.stats(), Stats::default());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(HistoryStore::open(&store).is_empty());

        store
            .set(HISTORY_KEY, r#"[{"type":"unknown","t":1}]"#)
            .unwrap();
        assert!(HistoryStore::open(&store).is_empty());
    }

    #[test]
    fn test_load_truncates_oversized_log() {
        let store = MemoryStore::new();
        let entries: Vec<HistoryEntry> = (0..90).map(review_at).collect();
        store
            .set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();

        let history = HistoryStore::open(&store);
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries()[0].timestamp(), 0);
    }

    #[test]
    fn test_append_keeps_memory_when_persist_fails() {
        let mut history = HistoryStore::new(ReadOnlyStore);
        assert!(history.append(review_at(1)).is_err());
        assert_eq!(history.len(), 1);
    }

    /// Store whose reads fail until `heal` is called; records every write.
    #[derive(Default)]
    struct FlakyStore {
        healed: Mutex<bool>,
        writes: Mutex<Vec<String>>,
    }

    impl FlakyStore {
        fn heal(&self) {
            *self.healed.lock().unwrap() = true;
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            if *self.healed.lock().unwrap() {
                Ok(self.writes.lock().unwrap().last().cloned())
            } else {
                Err(StorageError::Io(std::io::Error::other("lock held")))
            }
        }

        fn set(&self, _key: &str, value: &str) -> Result<()> {
            self.writes.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_failed_read_never_overwrites_store() {
        let store = FlakyStore::default();
        let mut history = HistoryStore::open(&store);
        assert!(history.is_empty());

        let err = history.append(review_at(1)).unwrap_err();
        assert!(matches!(err, StorageError::Unreadable(_)));
        assert_eq!(history.len(), 1);
        assert!(store.writes.lock().unwrap().is_empty());

        store.heal();
        history.load();
        history.append(review_at(2)).unwrap();
        assert_eq!(store.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_history_is_replaced_on_append() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();

        let mut history = HistoryStore::open(&store);
        history.append(review_at(1)).unwrap();
        assert_eq!(HistoryStore::open(&store).len(), 1);
    }

    #[test]
    fn test_stats_sum_to_total() {
        let entries = vec![
            review_at(1),
            HistoryEntry::generate("a", "b", "js"),
            review_at(2),
            HistoryEntry::generate("c", "d", "py"),
            review_at(3),
        ];
        let stats = Stats::from_entries(&entries);
        assert_eq!(stats, Stats { reviews: 3, generations: 2 });
        assert_eq!(stats.total(), entries.len());
    }
}
