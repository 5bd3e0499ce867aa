//! Command handling core.
//!
//! [`BotContext`] owns every piece of process-wide state (datasets, admins,
//! the user roster) behind one lock and turns inbound [`Update`]s into text
//! replies. The gateway in [`crate::server`] shares a single context across
//! connections.

pub mod command;
mod handlers;
pub mod host;

pub use command::{parse_command, Command, Invocation};

use crate::access::{AccessError, AdminSet, UserId, UserRoster};
use crate::config::Config;
use crate::store::{DatabaseStore, Dataset, StoreSummary};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// Number of distinct queries kept in the result cache
const CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(128).unwrap();

/// The user an update came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: String,
}

impl Sender {
    /// Username when set, otherwise the full name
    pub fn display_name(&self) -> &str {
        match &self.username {
            Some(username) if !username.is_empty() => username,
            _ => &self.full_name,
        }
    }
}

/// A file attached to an update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One inbound message from the messaging gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// Shared mutable state, always accessed through the context's lock
#[derive(Debug)]
pub struct BotState {
    pub store: DatabaseStore,
    pub admins: AdminSet,
    pub roster: UserRoster,
}

struct RuntimeStats {
    start_time: Instant,
    commands_handled: AtomicU64,
    searches_served: AtomicU64,
    cache_hits: AtomicU64,
}

impl RuntimeStats {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            commands_handled: AtomicU64::new(0),
            searches_served: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let total = self.searches_served.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f32 / total as f32
        }
    }
}

/// Point-in-time counters, reported by `/adm` and the daemon status request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub uptime_secs: u64,
    pub users: usize,
    pub admins: usize,
    pub datasets: StoreSummary,
    pub commands_handled: u64,
    pub searches_served: u64,
    /// Search cache hit rate (0.0 - 1.0)
    pub cache_hit_rate: f32,
}

pub struct BotContext {
    config: Config,
    state: RwLock<BotState>,
    /// Results keyed by case-folded query; cleared whenever a dataset is added
    search_cache: Mutex<LruCache<String, Vec<String>>>,
    stats: RuntimeStats,
}

impl BotContext {
    pub fn new(config: Config) -> Self {
        let state = BotState {
            store: DatabaseStore::new(),
            admins: AdminSet::new(config.bootstrap_admin),
            roster: UserRoster::new(),
        };

        Self {
            config,
            state: RwLock::new(state),
            search_cache: Mutex::new(LruCache::new(CACHE_SIZE)),
            stats: RuntimeStats::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one update and produce the reply text
    pub fn handle(&self, update: &Update) -> String {
        self.stats.commands_handled.fetch_add(1, Ordering::Relaxed);
        self.state
            .write()
            .roster
            .record(update.sender.id, update.sender.display_name());

        let invocation = parse_command(&update.text);
        debug!(
            user = %update.sender.id,
            command = ?invocation.command,
            args = invocation.args.len(),
            "dispatching"
        );

        handlers::dispatch(self, update, &invocation)
    }

    pub fn is_admin(&self, id: UserId) -> bool {
        self.state.read().admins.is_admin(id)
    }

    pub fn grant_admin(&self, acting: UserId, target: UserId) -> Result<(), AccessError> {
        self.state.write().admins.grant(acting, target)
    }

    /// Append a dataset and invalidate cached search results
    pub fn add_dataset(&self, dataset: Dataset) {
        let mut state = self.state.write();
        state.store.append(dataset);
        self.search_cache.lock().clear();
    }

    /// Search every dataset, serving repeated queries from the cache
    pub fn search(&self, query: &str) -> Vec<String> {
        let key = query.to_lowercase();
        self.stats.searches_served.fetch_add(1, Ordering::Relaxed);

        // Held until the result is cached so an append cannot slip in between
        let state = self.state.read();

        if let Some(cached) = self.search_cache.lock().get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        let results = state.store.search(&key);
        self.search_cache.lock().put(key, results.clone());
        results
    }

    /// Run `f` against a consistent read view of the state
    pub fn with_state<R>(&self, f: impl FnOnce(&BotState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn status(&self) -> StatusSnapshot {
        let state = self.state.read();
        StatusSnapshot {
            uptime_secs: self.stats.start_time.elapsed().as_secs(),
            users: state.roster.len(),
            admins: state.admins.len(),
            datasets: state.store.summary(),
            commands_handled: self.stats.commands_handled.load(Ordering::Relaxed),
            searches_served: self.stats.searches_served.load(Ordering::Relaxed),
            cache_hit_rate: self.stats.cache_hit_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BotContext {
        BotContext::new(Config::default())
    }

    #[test]
    fn test_display_name_fallback() {
        let mut sender = Sender {
            id: UserId(1),
            username: Some("ivan".into()),
            full_name: "Ivan Petrov".into(),
        };
        assert_eq!(sender.display_name(), "ivan");

        sender.username = None;
        assert_eq!(sender.display_name(), "Ivan Petrov");
    }

    #[test]
    fn test_cache_invalidated_on_append() {
        let ctx = context();
        ctx.add_dataset(Dataset::new("a.txt", vec!["needle one".into()], 10));
        assert_eq!(ctx.search("needle").len(), 1);
        assert_eq!(ctx.search("NEEDLE").len(), 1);

        ctx.add_dataset(Dataset::new("b.txt", vec!["needle two".into()], 10));
        assert_eq!(ctx.search("needle").len(), 2);

        let status = ctx.status();
        assert_eq!(status.searches_served, 3);
        assert!(status.cache_hit_rate > 0.0);
    }

    #[test]
    fn test_status_counts() {
        let ctx = context();
        ctx.add_dataset(Dataset::new("a.txt", vec!["x".into(), "y".into()], 4));

        let status = ctx.status();
        assert_eq!(status.admins, 1);
        assert_eq!(status.datasets.count, 1);
        assert_eq!(status.datasets.total_lines, 2);
    }
}
