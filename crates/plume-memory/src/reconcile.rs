//! Batch reconciliation of candidate memories against a user's stored set.
//!
//! Every candidate goes through a similarity gate that decides UPDATE or
//! INSERT before touching the store: the oldest entry whose ratio strictly
//! exceeds the threshold is refreshed with the candidate's content, otherwise
//! the candidate becomes a new entry. Store failures are accumulated per
//! candidate, never fatal to the batch.

use plume_host::{emit, reply, MemoryEntry, MemoryStore, MemoryStoreError, StatusSink, UserRecord};
use serde::Deserialize;
use thiserror::Error;

use crate::similarity::sequence_ratio;

/// Default similarity threshold for update-vs-insert decisions.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Settings recognized by the memory tool, read per call from the user's
/// settings record.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Similarity threshold for update operations, in (0, 1]. A match at
    /// exactly the threshold does not count.
    pub threshold: f64,

    /// Return a JSON `{"message": ...}` object instead of plain text.
    pub structured_output: bool,

    /// Ask the host to attach a citation to the response.
    pub citation: bool,

    /// Extra tracing detail.
    pub debug: bool,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            structured_output: false,
            citation: true,
            debug: false,
        }
    }
}

impl MemorySettings {
    /// Threshold clamped back to the default when configured out of range.
    fn effective_threshold(&self) -> f64 {
        if self.threshold > 0.0 && self.threshold <= 1.0 {
            self.threshold
        } else {
            tracing::warn!(threshold = self.threshold, "threshold out of range, using default");
            DEFAULT_THRESHOLD
        }
    }
}

#[derive(Debug, Error)]
pub enum MemoryToolError {
    #[error("User ID not provided.")]
    MissingUser,
}

/// Accumulated outcome of one reconciliation batch.
///
/// `updated` records the 1-based position of the refreshed entry in the
/// oldest-first ordering, together with the new content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<(usize, String)>,
    pub failed: Vec<String>,
}

impl ReconcileReport {
    /// Summary counting adds, updates and failures.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("{} memory(ies) added.", self.added.len()));
        }
        if !self.updated.is_empty() {
            parts.push(format!("{} memory(ies) updated.", self.updated.len()));
        }
        if !self.failed.is_empty() {
            parts.push(format!(
                "{} memory(ies) could not be added or updated.",
                self.failed.len()
            ));
        }
        if parts.is_empty() {
            parts.push("No memories added or updated.".to_string());
        }
        parts.join(" ")
    }

    /// Summary plus the literal added/updated contents.
    pub fn detailed(&self) -> String {
        let mut message = self.summary();
        if !self.added.is_empty() {
            message.push_str("\nNew memories:\n- ");
            message.push_str(&self.added.join("\n- "));
        }
        if !self.updated.is_empty() {
            let lines: Vec<String> = self
                .updated
                .iter()
                .map(|(position, content)| format!("{}. {}", position, content))
                .collect();
            message.push_str("\nUpdated:\n- ");
            message.push_str(&lines.join("\n- "));
        }
        message
    }
}

/// Oldest entry whose similarity with the candidate strictly exceeds the
/// threshold, as (1-based position, entry id). First match wins.
fn find_match<'a>(
    entries: &'a [MemoryEntry],
    candidate: &str,
    threshold: f64,
) -> Option<(usize, &'a str)> {
    entries.iter().enumerate().find_map(|(idx, entry)| {
        let ratio = sequence_ratio(candidate, &entry.content);
        (ratio > threshold).then(|| (idx + 1, entry.id.as_str()))
    })
}

/// Decide and apply update-vs-insert for each candidate, in input order.
///
/// The user's entries are fetched once and sorted oldest first; the snapshot
/// is not refreshed between candidates, so earlier outcomes do not change
/// what later candidates are compared against.
pub fn reconcile(
    store: &dyn MemoryStore,
    user_id: &str,
    candidates: &[String],
    threshold: f64,
) -> Result<ReconcileReport, MemoryStoreError> {
    let mut entries = store.entries_for_user(user_id)?;
    entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut report = ReconcileReport::default();
    for candidate in candidates {
        match find_match(&entries, candidate, threshold) {
            Some((position, entry_id)) => match store.update(entry_id, candidate) {
                Ok(()) => report.updated.push((position, candidate.clone())),
                Err(e) => {
                    tracing::warn!("Memory update failed: {}", e);
                    report.failed.push(candidate.clone());
                }
            },
            None => match store.insert(user_id, candidate) {
                Ok(_) => report.added.push(candidate.clone()),
                Err(e) => {
                    tracing::warn!("Memory insert failed: {}", e);
                    report.failed.push(candidate.clone());
                }
            },
        }
    }
    Ok(report)
}

/// Tool entry point: store a batch of candidate memories for a user.
///
/// Never surfaces an error to the host. Every failure becomes a user-visible
/// message and the final status event carries `done: true`.
pub fn add_memories(
    store: &dyn MemoryStore,
    user: Option<&UserRecord>,
    candidates: &[String],
    sink: Option<&dyn StatusSink>,
) -> String {
    let settings: MemorySettings =
        user.map(UserRecord::settings_or_default).unwrap_or_default();

    let user_id = match user.map(|u| u.id.trim()).filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            let message = MemoryToolError::MissingUser.to_string();
            emit(sink, message.clone(), true);
            return reply(message, settings.structured_output);
        }
    };

    if candidates.is_empty() {
        emit(sink, "Nothing to process.", true);
        return reply("No memories added or updated.", settings.structured_output);
    }

    emit(sink, "Processing memory entries.", false);
    if settings.debug {
        tracing::debug!(
            user = user_id,
            count = candidates.len(),
            threshold = settings.effective_threshold(),
            "reconciling memory batch"
        );
    }

    match reconcile(store, user_id, candidates, settings.effective_threshold()) {
        Ok(report) => {
            emit(sink, "Processing complete.", true);
            let message = if settings.structured_output {
                report.summary()
            } else {
                report.detailed()
            };
            reply(message, settings.structured_output)
        }
        Err(e) => {
            let message = format!("An error occurred: {}", e);
            emit(sink, message.clone(), true);
            reply(message, settings.structured_output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    /// In-memory stand-in for the host store, counting every call.
    #[derive(Default)]
    struct FakeStore {
        entries: Mutex<Vec<MemoryEntry>>,
        fail_writes: bool,
        calls: Mutex<usize>,
    }

    impl FakeStore {
        fn seeded(contents: &[(&str, i64)]) -> Self {
            let entries = contents
                .iter()
                .enumerate()
                .map(|(idx, (content, ts))| MemoryEntry {
                    id: format!("m{}", idx + 1),
                    user_id: "u1".to_string(),
                    content: (*content).to_string(),
                    created_at: Utc.timestamp_opt(*ts, 0).unwrap(),
                })
                .collect();
            Self { entries: Mutex::new(entries), ..Default::default() }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn content_of(&self, id: &str) -> Option<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.content.clone())
        }
    }

    impl MemoryStore for FakeStore {
        fn entries_for_user(&self, user_id: &str) -> Result<Vec<MemoryEntry>, MemoryStoreError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect())
        }

        fn insert(&self, user_id: &str, content: &str) -> Result<MemoryEntry, MemoryStoreError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail_writes {
                return Err(MemoryStoreError::Rejected("write disabled".into()));
            }
            let mut entries = self.entries.lock().unwrap();
            let entry = MemoryEntry {
                id: format!("m{}", entries.len() + 1),
                user_id: user_id.to_string(),
                content: content.to_string(),
                created_at: Utc.timestamp_opt(1_000_000 + entries.len() as i64, 0).unwrap(),
            };
            entries.push(entry.clone());
            Ok(entry)
        }

        fn update(&self, entry_id: &str, content: &str) -> Result<(), MemoryStoreError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail_writes {
                return Err(MemoryStoreError::Rejected("write disabled".into()));
            }
            let mut entries = self.entries.lock().unwrap();
            match entries.iter_mut().find(|e| e.id == entry_id) {
                Some(entry) => {
                    entry.content = content.to_string();
                    Ok(())
                }
                None => Err(MemoryStoreError::EntryNotFound(entry_id.to_string())),
            }
        }
    }

    fn user_with(settings: serde_json::Value) -> UserRecord {
        let mut user = UserRecord::new("u1");
        user.settings = settings;
        user
    }

    #[test]
    fn test_oldest_match_wins() {
        // Both entries clear the threshold; the older one must be updated.
        let store = FakeStore::seeded(&[
            ("L'utilisateur adore le bleu.", 200),
            ("L'utilisateur aime le bleu.", 100),
        ]);
        let candidates = vec!["L'utilisateur aime le bleu clair.".to_string()];

        let report = reconcile(&store, "u1", &candidates, 0.8).unwrap();

        assert_eq!(report.updated, vec![(1, candidates[0].clone())]);
        assert!(report.added.is_empty());
        // m2 holds the older timestamp and is position 1 after sorting
        assert_eq!(store.content_of("m2").as_deref(), Some(candidates[0].as_str()));
        assert_eq!(store.content_of("m1").as_deref(), Some("L'utilisateur adore le bleu."));
    }

    #[test]
    fn test_no_match_inserts() {
        let store = FakeStore::seeded(&[("L'utilisateur aime le bleu.", 100)]);
        let candidates = vec!["Pierre a un chat nommé Évoli.".to_string()];

        let report = reconcile(&store, "u1", &candidates, 0.8).unwrap();

        assert_eq!(report.added, candidates);
        assert!(report.updated.is_empty());
    }

    #[test]
    fn test_exact_threshold_does_not_match() {
        // ratio("abcd", "bcde") is exactly 0.75
        let store = FakeStore::seeded(&[("bcde", 100)]);
        let report = reconcile(&store, "u1", &["abcd".to_string()], 0.75).unwrap();
        assert_eq!(report.added.len(), 1);
        assert!(report.updated.is_empty());

        let store = FakeStore::seeded(&[("bcde", 100)]);
        let report = reconcile(&store, "u1", &["abcd".to_string()], 0.74).unwrap();
        assert_eq!(report.updated.len(), 1);
    }

    #[test]
    fn test_write_failures_accumulate_without_aborting() {
        let store = FakeStore {
            fail_writes: true,
            ..FakeStore::seeded(&[("L'utilisateur aime le bleu.", 100)])
        };
        let candidates = vec![
            "L'utilisateur aime le bleu clair.".to_string(),
            "Pierre a un chat nommé Évoli.".to_string(),
        ];

        let report = reconcile(&store, "u1", &candidates, 0.8).unwrap();

        assert_eq!(report.failed.len(), 2);
        assert!(report.added.is_empty());
        assert!(report.updated.is_empty());
        assert!(report.summary().contains("2 memory(ies) could not"));
    }

    #[test]
    fn test_snapshot_not_refreshed_between_candidates() {
        // The second, identical candidate is compared against the original
        // snapshot, so it matches the same entry again instead of itself.
        let store = FakeStore::seeded(&[("L'utilisateur aime le bleu.", 100)]);
        let candidate = "L'utilisateur aime le bleu clair.".to_string();

        let report =
            reconcile(&store, "u1", &[candidate.clone(), candidate.clone()], 0.8).unwrap();

        assert_eq!(report.updated.len(), 2);
        assert!(report.added.is_empty());
    }

    #[test]
    fn test_missing_user_performs_zero_store_calls() {
        let store = FakeStore::default();

        let out = add_memories(&store, None, &["anything".to_string()], None);
        assert_eq!(out, "User ID not provided.");
        assert_eq!(store.call_count(), 0);

        let blank = UserRecord::new("  ");
        let out = add_memories(&store, Some(&blank), &["anything".to_string()], None);
        assert_eq!(out, "User ID not provided.");
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_empty_batch_is_a_no_op() {
        let store = FakeStore::seeded(&[("existing", 100)]);
        let user = UserRecord::new("u1");

        let out = add_memories(&store, Some(&user), &[], None);

        assert_eq!(out, "No memories added or updated.");
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_plain_reply_lists_contents() {
        let store = FakeStore::seeded(&[("L'utilisateur aime le bleu.", 100)]);
        let user = UserRecord::new("u1");
        let candidates = vec![
            "L'utilisateur aime le bleu clair.".to_string(),
            "Pierre a un chat nommé Évoli.".to_string(),
        ];

        let out = add_memories(&store, Some(&user), &candidates, None);

        assert!(out.contains("1 memory(ies) added."));
        assert!(out.contains("1 memory(ies) updated."));
        assert!(out.contains("New memories:\n- Pierre a un chat nommé Évoli."));
        assert!(out.contains("Updated:\n- 1. L'utilisateur aime le bleu clair."));
    }

    #[test]
    fn test_structured_reply_wraps_summary_only() {
        let store = FakeStore::seeded(&[]);
        let user = user_with(serde_json::json!({"structured_output": true}));

        let out = add_memories(&store, Some(&user), &["Fact.".to_string()], None);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"message": "1 memory(ies) added."}));
    }

    #[test]
    fn test_custom_threshold_from_settings() {
        // With a permissive threshold even a loose match updates.
        let store = FakeStore::seeded(&[("abcd memory entry", 100)]);
        let user = user_with(serde_json::json!({"threshold": 0.2}));

        let out = add_memories(&store, Some(&user), &["abcd memory".to_string()], None);
        assert!(out.contains("1 memory(ies) updated."));
    }

    #[test]
    fn test_out_of_range_threshold_falls_back_to_default() {
        let settings = MemorySettings { threshold: 1.5, ..Default::default() };
        assert!((settings.effective_threshold() - DEFAULT_THRESHOLD).abs() < f64::EPSILON);
    }
}
