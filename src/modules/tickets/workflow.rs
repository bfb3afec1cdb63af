use crate::modules::tickets::transcript;
use crate::services::embeds;
use crate::services::guild_config::GuildConfig;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, warn};

const TOPIC_UID_TAG: &str = "UID:";
const TOPIC_CLAIMED_TAG: &str = "ClaimedBy:";
const DELETE_DELAY: std::time::Duration = std::time::Duration::from_secs(10);

pub const PANEL_BUTTON_PREFIX: &str = "ticket_open_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum TicketType {
    #[name = "general"]
    General,
    #[name = "partner"]
    Partner,
    #[name = "management"]
    Management,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::General => "general",
            TicketType::Partner => "partner",
            TicketType::Management => "management",
        }
    }

    pub fn button_id(&self) -> String {
        format!("{}{}", PANEL_BUTTON_PREFIX, self.as_str())
    }

    pub fn from_button_id(custom_id: &str) -> Option<Self> {
        match custom_id.strip_prefix(PANEL_BUTTON_PREFIX)? {
            "general" => Some(TicketType::General),
            "partner" => Some(TicketType::Partner),
            "management" => Some(TicketType::Management),
            _ => None,
        }
    }

    fn category(&self, config: &GuildConfig) -> Option<u64> {
        match self {
            TicketType::General => config.ticket_categories.general,
            TicketType::Partner => config.ticket_categories.partner,
            TicketType::Management => config.ticket_categories.management,
        }
    }
}

#[derive(Debug)]
pub enum OpenOutcome {
    Created(serenity::ChannelId),
    AlreadyOpen(serenity::ChannelId),
    NotConfigured,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TicketOutcome {
    NotTicket,
    Done,
}

/// Creates the private ticket channel for a user, unless the system is
/// unconfigured or the user already has an open ticket of that type.
pub async fn open_ticket(
    http: &Arc<serenity::Http>,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    kind: TicketType,
    config: &GuildConfig,
) -> Result<OpenOutcome, Error> {
    let (Some(staff_role), Some(category)) = (config.staff_role_id, kind.category(config)) else {
        return Ok(OpenOutcome::NotConfigured);
    };
    let category = serenity::ChannelId::new(category);

    let channels = guild_id.channels(http).await?;
    let duplicate = channels.iter().find(|(_, channel)| {
        channel.kind == serenity::ChannelType::Text
            && channel.parent_id == Some(category)
            && channel
                .topic
                .as_deref()
                .is_some_and(|topic| topic.contains(&format!("{}{}", TOPIC_UID_TAG, user.id)))
    });
    if let Some((channel_id, _)) = duplicate {
        return Ok(OpenOutcome::AlreadyOpen(*channel_id));
    }

    let staff_role = serenity::RoleId::new(staff_role);
    let everyone = serenity::RoleId::new(guild_id.get());
    let overwrites = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
            kind: serenity::PermissionOverwriteType::Role(everyone),
        },
        serenity::PermissionOverwrite {
            allow: participant_permissions(),
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Role(staff_role),
        },
        serenity::PermissionOverwrite {
            allow: participant_permissions(),
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(user.id),
        },
    ];

    let name = sanitize_channel_name(&format!("{}-ticket-{}", kind.as_str(), user.name));
    let channel = guild_id
        .create_channel(
            http,
            serenity::CreateChannel::new(name)
                .kind(serenity::ChannelType::Text)
                .category(category)
                .topic(ticket_topic(kind, user.id))
                .permissions(overwrites),
        )
        .await?;

    let intro = embeds::themed("Ticket Created").description(format!(
        "Type: **{}**\nUser: <@{}>\n\nA staff member will claim your ticket shortly.",
        kind.as_str(),
        user.id
    ));
    let ping = format!("<@&{}> <@{}>", staff_role, user.id);
    if let Err(e) = channel
        .id
        .send_message(
            http,
            serenity::CreateMessage::new().content(ping).embed(intro),
        )
        .await
    {
        warn!("Failed to post ticket intro in {}: {:?}", channel.id, e);
    }

    Ok(OpenOutcome::Created(channel.id))
}

/// Grants the claimer access and tags the topic with the claim.
pub async fn claim_ticket(
    http: &Arc<serenity::Http>,
    channel: &serenity::GuildChannel,
    claimer: &serenity::User,
) -> Result<TicketOutcome, Error> {
    if !is_ticket_channel(channel) {
        return Ok(TicketOutcome::NotTicket);
    }

    channel
        .id
        .create_permission(
            http,
            serenity::PermissionOverwrite {
                allow: participant_permissions(),
                deny: serenity::Permissions::empty(),
                kind: serenity::PermissionOverwriteType::Member(claimer.id),
            },
        )
        .await?;

    let topic = format!(
        "{} | {}{}",
        channel.topic.clone().unwrap_or_default(),
        TOPIC_CLAIMED_TAG,
        claimer.id
    );
    channel
        .id
        .edit(http, serenity::EditChannel::new().topic(topic))
        .await?;

    let announcement = embeds::themed("Ticket Claimed")
        .description(format!("<@{}> has claimed this ticket.", claimer.id));
    channel
        .id
        .send_message(http, serenity::CreateMessage::new().embed(announcement))
        .await?;

    Ok(TicketOutcome::Done)
}

/// Locks the channel, ships the transcript to the log channel and deletes
/// the ticket after a short delay.
pub async fn close_ticket(
    http: &Arc<serenity::Http>,
    channel: &serenity::GuildChannel,
    closer: &serenity::User,
    config: &GuildConfig,
) -> Result<TicketOutcome, Error> {
    if !is_ticket_channel(channel) {
        return Ok(TicketOutcome::NotTicket);
    }

    let everyone = serenity::RoleId::new(channel.guild_id.get());
    channel
        .id
        .create_permission(
            http,
            serenity::PermissionOverwrite {
                allow: serenity::Permissions::empty(),
                deny: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
                kind: serenity::PermissionOverwriteType::Role(everyone),
            },
        )
        .await?;

    let log = transcript::build_transcript(http, channel.id, &channel.name).await?;

    if let Some(log_channel) = config.log_channel_id {
        let attachment = serenity::CreateAttachment::bytes(
            log.into_bytes(),
            format!("{}-transcript.txt", channel.name),
        );
        let notice = embeds::themed("Ticket Closed").description(format!(
            "Channel: <#{}> was closed by <@{}>",
            channel.id, closer.id
        ));
        if let Err(e) = serenity::ChannelId::new(log_channel)
            .send_message(
                http,
                serenity::CreateMessage::new().embed(notice).add_file(attachment),
            )
            .await
        {
            warn!("Failed to post transcript to log channel: {:?}", e);
        }
    }

    let closing = embeds::themed("Closing Ticket")
        .description("This ticket will be deleted in 10 seconds...");
    if let Err(e) = channel
        .id
        .send_message(http, serenity::CreateMessage::new().embed(closing))
        .await
    {
        warn!("Failed to post closing notice in {}: {:?}", channel.id, e);
    }

    let http = Arc::clone(http);
    let channel_id = channel.id;
    tokio::spawn(async move {
        sleep(DELETE_DELAY).await;
        if let Err(e) = channel_id.delete(&http).await {
            warn!("Failed to delete ticket channel {}: {:?}", channel_id, e);
        }
    });

    Ok(TicketOutcome::Done)
}

/// Panel button adapter; the slash command and the buttons share the open
/// workflow.
pub async fn handle_panel_button(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(kind) = TicketType::from_button_id(&interaction.data.custom_id) else {
        return Ok(());
    };
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    interaction.defer_ephemeral(&ctx.http).await?;

    let config = data.config.get(guild_id);
    let reply = match open_ticket(&ctx.http, guild_id, &interaction.user, kind, &config).await {
        Ok(outcome) => open_reply(kind, &outcome),
        Err(e) => {
            error!("Failed to open {} ticket: {:#}", kind.as_str(), e);
            "❌ Something went wrong.".to_string()
        }
    };

    interaction
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new().content(reply),
        )
        .await?;

    Ok(())
}

pub fn open_reply(kind: TicketType, outcome: &OpenOutcome) -> String {
    match outcome {
        OpenOutcome::Created(channel_id) => {
            format!("✅ Your {} ticket was created: <#{}>", kind.as_str(), channel_id)
        }
        OpenOutcome::AlreadyOpen(channel_id) => {
            format!("You already have a {} ticket: <#{}>", kind.as_str(), channel_id)
        }
        OpenOutcome::NotConfigured => {
            "❌ Ticket system not fully configured. Use /ticket-setup to set categories and staff role."
                .to_string()
        }
    }
}

pub fn is_ticket_channel(channel: &serenity::GuildChannel) -> bool {
    channel.kind == serenity::ChannelType::Text
        && channel
            .topic
            .as_deref()
            .is_some_and(|topic| topic.contains(TOPIC_UID_TAG))
}

fn ticket_topic(kind: TicketType, user_id: serenity::UserId) -> String {
    format!("Ticket type: {} | {}{}", kind.as_str(), TOPIC_UID_TAG, user_id)
}

fn participant_permissions() -> serenity::Permissions {
    serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY
        | serenity::Permissions::ATTACH_FILES
        | serenity::Permissions::EMBED_LINKS
}

/// Channel names must be lowercase `[a-z0-9-]`; every run of anything else
/// collapses to a single dash, capped at Discord's length limit.
pub fn sanitize_channel_name(raw: &str) -> String {
    let mut name = String::new();
    let mut in_invalid_run = false;
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            name.push(c);
            in_invalid_run = false;
        } else if !in_invalid_run {
            name.push('-');
            in_invalid_run = true;
        }
    }
    name.truncate(90);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::UserId;

    #[test]
    fn channel_names_are_sanitized() {
        assert_eq!(
            sanitize_channel_name("general-ticket-Some User!!"),
            "general-ticket-some-user-"
        );
        assert_eq!(sanitize_channel_name("Ünïcode Näme"), "-n-code-n-me");
        assert_eq!(sanitize_channel_name("already-fine-123"), "already-fine-123");

        let long = "x".repeat(200);
        assert_eq!(sanitize_channel_name(&long).len(), 90);
    }

    #[test]
    fn button_ids_round_trip() {
        for kind in [TicketType::General, TicketType::Partner, TicketType::Management] {
            assert_eq!(TicketType::from_button_id(&kind.button_id()), Some(kind));
        }
        assert_eq!(TicketType::from_button_id("ticket_open_unknown"), None);
        assert_eq!(TicketType::from_button_id("config_whatever"), None);
    }

    #[test]
    fn topic_carries_type_and_owner() {
        let topic = ticket_topic(TicketType::Partner, UserId::new(42));
        assert_eq!(topic, "Ticket type: partner | UID:42");
    }

    #[test]
    fn open_reply_covers_each_outcome() {
        let created = open_reply(
            TicketType::General,
            &OpenOutcome::Created(serenity::ChannelId::new(5)),
        );
        assert!(created.contains("<#5>"));

        let duplicate = open_reply(
            TicketType::Partner,
            &OpenOutcome::AlreadyOpen(serenity::ChannelId::new(6)),
        );
        assert!(duplicate.contains("already have a partner ticket"));

        let unconfigured = open_reply(TicketType::Management, &OpenOutcome::NotConfigured);
        assert!(unconfigured.contains("/ticket-setup"));
    }
}
