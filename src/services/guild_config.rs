use crate::services::store::JsonStore;
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::error;

const CONFIG_FILE: &str = "config.json";

/// Per-guild settings, runtime-editable through the setup commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuildConfig {
    pub staff_role_id: Option<u64>,
    pub welcome_channel_id: Option<u64>,
    pub boost_channel_id: Option<u64>,
    pub log_channel_id: Option<u64>,
    pub ticket_categories: TicketCategories,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketCategories {
    pub general: Option<u64>,
    pub partner: Option<u64>,
    pub management: Option<u64>,
}

type ConfigDoc = HashMap<String, GuildConfig>;

pub struct GuildConfigService {
    store: Arc<JsonStore>,
    configs: Mutex<ConfigDoc>,
}

impl GuildConfigService {
    pub fn load(store: Arc<JsonStore>) -> Self {
        let configs = store.load(CONFIG_FILE);
        Self {
            store,
            configs: Mutex::new(configs),
        }
    }

    pub fn get(&self, guild_id: serenity::GuildId) -> GuildConfig {
        self.configs
            .lock()
            .unwrap()
            .get(&guild_id.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Applies an edit to a guild's config and persists the document.
    pub fn update(&self, guild_id: serenity::GuildId, edit: impl FnOnce(&mut GuildConfig)) {
        let mut configs = self.configs.lock().unwrap();
        edit(configs.entry(guild_id.to_string()).or_default());
        if let Err(e) = self.store.save(CONFIG_FILE, &*configs) {
            error!("Failed to save guild config: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::GuildId;

    #[test]
    fn unknown_guild_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());
        let service = GuildConfigService::load(store);

        let config = service.get(GuildId::new(1));
        assert!(config.staff_role_id.is_none());
        assert!(config.ticket_categories.general.is_none());
    }

    #[test]
    fn updates_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path()).unwrap());

        let service = GuildConfigService::load(store.clone());
        service.update(GuildId::new(9), |c| {
            c.staff_role_id = Some(77);
            c.ticket_categories.partner = Some(88);
        });

        let reloaded = GuildConfigService::load(store);
        let config = reloaded.get(GuildId::new(9));
        assert_eq!(config.staff_role_id, Some(77));
        assert_eq!(config.ticket_categories.partner, Some(88));
    }
}
