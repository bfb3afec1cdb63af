use crate::modules::tracking::invites::VANITY_KEY;
use crate::services::store::JsonStore;
use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::error;

const INVITES_FILE: &str = "invites.json";
const MESSAGES_FILE: &str = "messages.json";

const LEADERBOARD_SIZE: usize = 10;

/// `{ guildId: { subjectId: count } }`, the on-disk document shape.
type CounterDoc = HashMap<String, HashMap<String, u64>>;

/// Per-guild counters for consumed invites and authored messages, plus the
/// ephemeral invite-use cache the join attribution diffs against.
pub struct TrackingService {
    store: Arc<JsonStore>,
    invites: Mutex<CounterDoc>,
    messages: Mutex<CounterDoc>,
    invite_cache: DashMap<serenity::GuildId, HashMap<String, u64>>,
}

impl TrackingService {
    pub fn load(store: Arc<JsonStore>) -> Self {
        let invites = store.load(INVITES_FILE);
        let messages = store.load(MESSAGES_FILE);
        Self {
            store,
            invites: Mutex::new(invites),
            messages: Mutex::new(messages),
            invite_cache: DashMap::new(),
        }
    }

    pub fn record_message(&self, guild_id: serenity::GuildId, author_id: serenity::UserId) {
        let mut messages = self.messages.lock().unwrap();
        *messages
            .entry(guild_id.to_string())
            .or_default()
            .entry(author_id.to_string())
            .or_insert(0) += 1;
        self.persist(MESSAGES_FILE, &messages);
    }

    /// Credits one consumed invite to a subject key (a user id, or the
    /// reserved vanity key).
    pub fn credit_invite(&self, guild_id: serenity::GuildId, subject: &str) {
        let mut invites = self.invites.lock().unwrap();
        *invites
            .entry(guild_id.to_string())
            .or_default()
            .entry(subject.to_string())
            .or_insert(0) += 1;
        self.persist(INVITES_FILE, &invites);
    }

    pub fn top_inviters(&self, guild_id: serenity::GuildId) -> Vec<(String, u64)> {
        top_of(&self.invites.lock().unwrap(), guild_id)
    }

    pub fn top_chatters(&self, guild_id: serenity::GuildId) -> Vec<(String, u64)> {
        top_of(&self.messages.lock().unwrap(), guild_id)
    }

    pub fn cached_invites(&self, guild_id: serenity::GuildId) -> HashMap<String, u64> {
        self.invite_cache
            .get(&guild_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Replaces a guild's cached invite uses with a fresh snapshot.
    pub fn snapshot_invites(&self, guild_id: serenity::GuildId, uses: HashMap<String, u64>) {
        self.invite_cache.insert(guild_id, uses);
    }

    pub fn forget_invite(&self, guild_id: serenity::GuildId, code: &str) {
        if let Some(mut entry) = self.invite_cache.get_mut(&guild_id) {
            entry.remove(code);
        }
    }

    fn persist(&self, name: &str, doc: &CounterDoc) {
        if let Err(e) = self.store.save(name, doc) {
            error!("Failed to save {}: {:#}", name, e);
        }
    }
}

/// Top counters for one guild, highest first, vanity joins excluded. Ties
/// break on the subject key so the ordering is deterministic.
fn top_of(doc: &CounterDoc, guild_id: serenity::GuildId) -> Vec<(String, u64)> {
    let Some(counters) = doc.get(&guild_id.to_string()) else {
        return Vec::new();
    };

    let mut entries: Vec<(String, u64)> = counters
        .iter()
        .filter(|(subject, _)| subject.as_str() != VANITY_KEY)
        .map(|(subject, count)| (subject.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::{GuildId, UserId};

    fn service() -> (tempfile::TempDir, TrackingService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());
        (dir, TrackingService::load(store))
    }

    #[test]
    fn message_counts_accumulate() {
        let (_dir, service) = service();
        let guild = GuildId::new(1);

        service.record_message(guild, UserId::new(10));
        service.record_message(guild, UserId::new(10));
        service.record_message(guild, UserId::new(11));

        let top = service.top_chatters(guild);
        assert_eq!(top, vec![("10".to_string(), 2), ("11".to_string(), 1)]);
    }

    #[test]
    fn leaderboard_excludes_vanity_and_caps_at_ten() {
        let (_dir, service) = service();
        let guild = GuildId::new(1);

        service.credit_invite(guild, VANITY_KEY);
        for user in 0..12u64 {
            for _ in 0..=user {
                service.credit_invite(guild, &user.to_string());
            }
        }

        let top = service.top_inviters(guild);
        assert_eq!(top.len(), 10);
        assert!(top.iter().all(|(subject, _)| subject != VANITY_KEY));
        assert_eq!(top[0], ("11".to_string(), 12));
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn vanity_only_guild_ranks_nobody() {
        let (_dir, service) = service();
        let guild = GuildId::new(2);

        service.credit_invite(guild, VANITY_KEY);
        assert!(service.top_inviters(guild).is_empty());
    }

    #[test]
    fn empty_guild_has_no_entries() {
        let (_dir, service) = service();
        assert!(service.top_inviters(GuildId::new(3)).is_empty());
        assert!(service.top_chatters(GuildId::new(3)).is_empty());
    }

    #[test]
    fn counters_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());

        let service = TrackingService::load(store.clone());
        service.credit_invite(GuildId::new(4), "77");

        let reloaded = TrackingService::load(store);
        assert_eq!(
            reloaded.top_inviters(GuildId::new(4)),
            vec![("77".to_string(), 1)]
        );
    }

    #[test]
    fn invite_cache_replace_and_forget() {
        let (_dir, service) = service();
        let guild = GuildId::new(5);

        service.snapshot_invites(guild, HashMap::from([("abc".to_string(), 2)]));
        assert_eq!(service.cached_invites(guild).get("abc"), Some(&2));

        service.forget_invite(guild, "abc");
        assert!(service.cached_invites(guild).is_empty());
    }
}
