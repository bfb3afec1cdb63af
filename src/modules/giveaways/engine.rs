use crate::Error;
use crate::modules::giveaways::winners::draw_winners;
use crate::services::embeds;
use crate::services::store::JsonStore;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{error, info, warn};

const GIVEAWAYS_FILE: &str = "giveaways.json";
pub const ENTRY_EMOJI: &str = "🎉";
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(15);

/// How long the sweep keeps retrying a giveaway whose channel or message
/// can no longer be resolved before dropping the record.
const REAP_GRACE_MS: i64 = 24 * 60 * 60 * 1_000;

/// One timed prize drawing, keyed in the store by guild id and the id of
/// the announcement message. The flat camelCase shape matches the on-disk
/// document format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveawayRecord {
    pub channel_id: String,
    pub prize: String,
    pub winners: u32,
    pub end_at: i64,
}

type GiveawayDoc = HashMap<String, HashMap<String, GiveawayRecord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Winners were drawn and the results announcement was sent.
    Announced { winners: usize },
    /// No record under that id; duplicate finalizes land here and no-op.
    NotFound,
    /// The hosting channel or message could not be resolved; the record
    /// was left untouched.
    Unresolved,
}

pub struct GiveawayService {
    store: Arc<JsonStore>,
    records: Mutex<GiveawayDoc>,
}

impl GiveawayService {
    pub fn load(store: Arc<JsonStore>) -> Self {
        let records = store.load(GIVEAWAYS_FILE);
        Self {
            store,
            records: Mutex::new(records),
        }
    }

    /// Registers a freshly announced giveaway and persists the document.
    pub fn start(
        &self,
        guild_id: serenity::GuildId,
        message_id: serenity::MessageId,
        channel_id: serenity::ChannelId,
        prize: String,
        winners: u32,
        end_at: i64,
    ) {
        let mut records = self.records.lock().unwrap();
        records.entry(guild_id.to_string()).or_default().insert(
            message_id.to_string(),
            GiveawayRecord {
                channel_id: channel_id.to_string(),
                prize,
                winners,
                end_at,
            },
        );
        self.persist(&records);
    }

    /// Spawns the recurring sweep that finalizes overdue giveaways.
    pub fn start_sweep_runner(self: Arc<Self>, http: Arc<serenity::Http>) {
        let service = self;
        tokio::spawn(async move {
            info!("Giveaway sweep runner started.");
            loop {
                sleep(SWEEP_INTERVAL).await;
                service.run_sweep(&http).await;
            }
        });
    }

    pub async fn run_sweep(&self, http: &Arc<serenity::Http>) {
        let now = Utc::now().timestamp_millis();
        for (guild_key, message_key, record) in self.due(now) {
            match self.finalize(http, &guild_key, &message_key, false).await {
                FinalizeOutcome::Announced { winners } => {
                    info!(
                        "Finalized giveaway {} in guild {} with {} winner(s)",
                        message_key, guild_key, winners
                    );
                }
                // Already removed by a manual end between scan and action.
                FinalizeOutcome::NotFound => {}
                FinalizeOutcome::Unresolved => {
                    // Transient failures retry next tick; records that stay
                    // unresolvable past the grace window are dropped.
                    if now - record.end_at > REAP_GRACE_MS {
                        warn!(
                            "Dropping unresolvable giveaway {} in guild {}",
                            message_key, guild_key
                        );
                        self.conclude(&guild_key, &message_key, false);
                    }
                }
            }
        }
    }

    /// Draws winners, announces results and, unless rerolling, retires the
    /// record. Resolution failures leave the record as-is so the sweep can
    /// retry; an absent record is a silent no-op.
    pub async fn finalize(
        &self,
        http: &Arc<serenity::Http>,
        guild_key: &str,
        message_key: &str,
        reroll: bool,
    ) -> FinalizeOutcome {
        let Some(record) = self.get(guild_key, message_key) else {
            return FinalizeOutcome::NotFound;
        };

        let channel_id = match record.channel_id.parse::<u64>() {
            Ok(id) => serenity::ChannelId::new(id),
            Err(_) => {
                warn!(
                    "Giveaway {} in guild {} has a malformed channel id {:?}",
                    message_key, guild_key, record.channel_id
                );
                return FinalizeOutcome::Unresolved;
            }
        };
        let message_id = match message_key.parse::<u64>() {
            Ok(id) => serenity::MessageId::new(id),
            Err(_) => {
                warn!("Giveaway in guild {} has a malformed message id {:?}", guild_key, message_key);
                return FinalizeOutcome::Unresolved;
            }
        };

        let message = match http.get_message(channel_id, message_id).await {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    "Could not resolve giveaway message {} in guild {}: {:?}",
                    message_key, guild_key, e
                );
                return FinalizeOutcome::Unresolved;
            }
        };

        let entrants = match collect_entrants(http, &message).await {
            Ok(entrants) => entrants,
            Err(e) => {
                warn!(
                    "Could not read entrants for giveaway {} in guild {}: {:?}",
                    message_key, guild_key, e
                );
                return FinalizeOutcome::Unresolved;
            }
        };

        let winners = draw_winners(&entrants, record.winners as usize);
        let announcement = serenity::CreateMessage::new()
            .embed(embeds::themed("Giveaway Results").description(results_message(
                &record.prize,
                &winners,
                reroll,
            )));

        if let Err(e) = channel_id.send_message(http, announcement).await {
            warn!(
                "Could not announce results for giveaway {} in guild {}: {:?}",
                message_key, guild_key, e
            );
            return FinalizeOutcome::Unresolved;
        }

        self.conclude(guild_key, message_key, reroll);
        FinalizeOutcome::Announced {
            winners: winners.len(),
        }
    }

    fn get(&self, guild_key: &str, message_key: &str) -> Option<GiveawayRecord> {
        self.records
            .lock()
            .unwrap()
            .get(guild_key)
            .and_then(|entries| entries.get(message_key))
            .cloned()
    }

    /// All records whose deadline has passed, across every guild.
    fn due(&self, now_ms: i64) -> Vec<(String, String, GiveawayRecord)> {
        let records = self.records.lock().unwrap();
        records
            .iter()
            .flat_map(|(guild_key, entries)| {
                entries
                    .iter()
                    .filter(|(_, record)| record.end_at <= now_ms)
                    .map(|(message_key, record)| {
                        (guild_key.clone(), message_key.clone(), record.clone())
                    })
            })
            .collect()
    }

    /// Retires a finalized record. Rerolls keep the record; a record that
    /// is already gone is left alone and nothing is rewritten.
    fn conclude(&self, guild_key: &str, message_key: &str, reroll: bool) {
        if reroll {
            return;
        }
        let mut records = self.records.lock().unwrap();
        let removed = records
            .get_mut(guild_key)
            .and_then(|entries| entries.remove(message_key));
        if removed.is_some() {
            self.persist(&records);
        }
    }

    fn persist(&self, records: &GiveawayDoc) {
        if let Err(e) = self.store.save(GIVEAWAYS_FILE, records) {
            error!("Failed to save giveaways: {:#}", e);
        }
    }
}

/// Composes the results announcement, stating "no valid entries" when the
/// entrant pool was empty.
pub fn results_message(prize: &str, winners: &[serenity::UserId], reroll: bool) -> String {
    if winners.is_empty() {
        return format!("No valid entries for **{}**.", prize);
    }

    let mentions = winners
        .iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join(", ");
    let headline = if reroll { "🔁 Rerolled!" } else { "🎉 Giveaway Ended!" };
    format!("{} **{}**\nWinners: {}", headline, prize, mentions)
}

/// Fetches every 🎉 reactor on the giveaway message, excluding bots.
async fn collect_entrants(
    http: &Arc<serenity::Http>,
    message: &serenity::Message,
) -> Result<Vec<serenity::UserId>, Error> {
    let reaction = serenity::ReactionType::Unicode(ENTRY_EMOJI.to_string());
    let mut entrants = Vec::new();
    let mut after: Option<serenity::UserId> = None;

    loop {
        let batch = message
            .reaction_users(http, reaction.clone(), Some(100), after)
            .await?;
        let batch_len = batch.len();
        after = batch.last().map(|user| user.id);
        entrants.extend(batch.into_iter().filter(|user| !user.bot).map(|user| user.id));
        if batch_len < 100 {
            break;
        }
    }

    Ok(entrants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::{ChannelId, GuildId, MessageId, UserId};

    fn service() -> (tempfile::TempDir, GiveawayService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());
        (dir, GiveawayService::load(store))
    }

    fn start_sample(service: &GiveawayService, end_at: i64) {
        service.start(
            GuildId::new(1),
            MessageId::new(100),
            ChannelId::new(50),
            "Game Key".to_string(),
            1,
            end_at,
        );
    }

    #[test]
    fn started_record_is_stored_with_deadline() {
        let (_dir, service) = service();
        let now = Utc::now().timestamp_millis();
        start_sample(&service, now + 600_000);

        let record = service.get("1", "100").unwrap();
        assert_eq!(record.prize, "Game Key");
        assert_eq!(record.winners, 1);
        assert_eq!(record.channel_id, "50");
        assert_eq!(record.end_at, now + 600_000);
    }

    #[test]
    fn due_only_returns_expired_records() {
        let (_dir, service) = service();
        let now = Utc::now().timestamp_millis();
        start_sample(&service, now + 600_000);

        assert!(service.due(now).is_empty());

        let due = service.due(now + 600_001);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].0, "1");
        assert_eq!(due[0].1, "100");
    }

    #[test]
    fn conclude_removes_once_and_noops_after() {
        let (dir, service) = service();
        start_sample(&service, 0);

        service.conclude("1", "100", false);
        assert!(service.get("1", "100").is_none());

        let on_disk = std::fs::read_to_string(dir.path().join(GIVEAWAYS_FILE)).unwrap();

        // Second attempt: record already gone, store untouched, no fault.
        service.conclude("1", "100", false);
        let after = std::fs::read_to_string(dir.path().join(GIVEAWAYS_FILE)).unwrap();
        assert_eq!(on_disk, after);
    }

    #[test]
    fn reroll_preserves_the_record() {
        let (_dir, service) = service();
        start_sample(&service, 0);

        service.conclude("1", "100", true);
        let record = service.get("1", "100").unwrap();
        assert_eq!(record.prize, "Game Key");

        service.conclude("1", "100", false);
        assert!(service.get("1", "100").is_none());
    }

    #[test]
    fn records_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());

        let service = GiveawayService::load(store.clone());
        service.start(
            GuildId::new(2),
            MessageId::new(7),
            ChannelId::new(3),
            "Nitro".to_string(),
            3,
            1_234,
        );

        let reloaded = GiveawayService::load(store);
        let record = reloaded.get("2", "7").unwrap();
        assert_eq!(record.winners, 3);
        assert_eq!(record.end_at, 1_234);
    }

    #[test]
    fn results_message_lists_winners() {
        let winners = vec![UserId::new(5), UserId::new(6)];
        let text = results_message("Game Key", &winners, false);
        assert!(text.starts_with("🎉 Giveaway Ended!"));
        assert!(text.contains("<@5>"));
        assert!(text.contains("<@6>"));

        let rerolled = results_message("Game Key", &winners, true);
        assert!(rerolled.starts_with("🔁 Rerolled!"));
    }

    #[test]
    fn results_message_states_no_entries() {
        let text = results_message("Game Key", &[], true);
        assert_eq!(text, "No valid entries for **Game Key**.");
    }
}
