//! Applicant → interview channel registry and the channel-name counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

/// In-memory map from applicant id to the interview channel created for
/// them, plus the counter used to name new channels.
///
/// Nothing here is persisted. After a restart the counter is rebuilt from
/// existing channel names with [`seed_from_names`](Self::seed_from_names)
/// and the map starts empty.
pub struct ChannelRegistry {
    prefix: String,
    channels: RwLock<HashMap<String, String>>,
    counter: AtomicU64,
}

impl ChannelRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            channels: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// The numeric suffix of `name` if it is `<prefix><digits>`.
    pub fn parse_suffix(&self, name: &str) -> Option<u64> {
        let digits = name.strip_prefix(self.prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Raise the counter to the largest suffix among `names`.
    ///
    /// Names that do not match the prefix pattern are skipped. The counter
    /// never decreases. Returns the resulting counter value.
    pub fn seed_from_names<'a, I>(&self, names: I) -> u64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = names
            .into_iter()
            .filter_map(|name| self.parse_suffix(name))
            .max()
            .unwrap_or(0);
        self.counter.fetch_max(max, Ordering::SeqCst).max(max)
    }

    /// Current counter value (the suffix of the last name handed out).
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Increment the counter and return the next channel name.
    pub fn next_channel_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{n}", self.prefix)
    }

    pub async fn get(&self, applicant_id: &str) -> Option<String> {
        self.channels.read().await.get(applicant_id).cloned()
    }

    /// Record a channel for an applicant, returning the one it replaced.
    pub async fn insert(
        &self,
        applicant_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Option<String> {
        self.channels
            .write()
            .await
            .insert(applicant_id.into(), channel_id.into())
    }

    pub async fn remove(&self, applicant_id: &str) -> Option<String> {
        self.channels.write().await.remove(applicant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_takes_maximum_suffix() {
        let reg = ChannelRegistry::new("int-");
        assert_eq!(reg.seed_from_names(["int-3", "int-7", "int-2"]), 7);
        assert_eq!(reg.counter(), 7);
        assert_eq!(reg.next_channel_name(), "int-8");
        assert_eq!(reg.next_channel_name(), "int-9");
    }

    #[test]
    fn seed_with_no_matches_is_zero() {
        let reg = ChannelRegistry::new("int-");
        assert_eq!(reg.seed_from_names(["general", "int-", "int-abc", "xint-4"]), 0);
        assert_eq!(reg.next_channel_name(), "int-1");
    }

    #[test]
    fn seed_never_lowers_counter() {
        let reg = ChannelRegistry::new("int-");
        reg.seed_from_names(["int-12"]);
        assert_eq!(reg.seed_from_names(["int-4"]), 12);
        assert_eq!(reg.counter(), 12);
    }

    #[test]
    fn parse_suffix_rejects_signs_and_spaces() {
        let reg = ChannelRegistry::new("int-");
        assert_eq!(reg.parse_suffix("int-007"), Some(7));
        assert_eq!(reg.parse_suffix("int--1"), None);
        assert_eq!(reg.parse_suffix("int-+1"), None);
        assert_eq!(reg.parse_suffix("int- 1"), None);
        assert_eq!(reg.parse_suffix("INT-1"), None);
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let reg = ChannelRegistry::new("int-");
        assert!(reg.get("123").await.is_none());
        assert_eq!(reg.insert("123", "ch-1").await, None);
        assert_eq!(reg.get("123").await.as_deref(), Some("ch-1"));
        assert_eq!(reg.insert("123", "ch-2").await.as_deref(), Some("ch-1"));
        assert_eq!(reg.remove("123").await.as_deref(), Some("ch-2"));
        assert!(reg.get("123").await.is_none());
    }
}
