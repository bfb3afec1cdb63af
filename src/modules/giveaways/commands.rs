use crate::modules::giveaways::duration::parse_duration;
use crate::modules::giveaways::engine::{ENTRY_EMOJI, FinalizeOutcome};
use crate::services::embeds;
use crate::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

/// Start a giveaway (🎉 reactions)
#[poise::command(
    slash_command,
    guild_only,
    rename = "giveaway-start",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn giveaway_start(
    ctx: Context<'_>,
    #[description = "Prize name"] prize: String,
    #[description = "Number of winners"]
    #[min = 1]
    #[max = 20]
    winners: u32,
    #[description = "Duration like 10m, 2h, 3d"] duration: String,
    #[description = "Channel for the giveaway"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    ctx.defer_ephemeral().await?;

    let prize = prize.trim().to_string();
    if prize.is_empty() {
        ctx.say("❌ The prize cannot be empty.").await?;
        return Ok(());
    }

    let Some(length) = parse_duration(&duration) else {
        ctx.say("❌ Invalid duration. Use formats like 10m, 2h, 3d.")
            .await?;
        return Ok(());
    };

    let end_at = Utc::now().timestamp_millis() + length.num_milliseconds();
    let target = channel.map(|c| c.id).unwrap_or_else(|| ctx.channel_id());

    let ends_at_iso = chrono::DateTime::from_timestamp_millis(end_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    let embed = embeds::themed("🎉 Giveaway")
        .description(format!(
            "**Prize:** {}\n**Winners:** {}\n**Ends:** <t:{}:R>\n\nReact with {} to enter!",
            prize,
            winners,
            end_at / 1_000,
            ENTRY_EMOJI,
        ))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} • Ends at {}",
            embeds::FOOTER,
            ends_at_iso
        )));

    let http = &ctx.serenity_context().http;
    let message = target
        .send_message(http, serenity::CreateMessage::new().embed(embed))
        .await?;
    message
        .react(http, serenity::ReactionType::Unicode(ENTRY_EMOJI.to_string()))
        .await?;

    ctx.data()
        .giveaways
        .start(guild_id, message.id, target, prize, winners, end_at);

    ctx.say(format!("✅ Giveaway started in <#{}>.", target))
        .await?;

    Ok(())
}

/// End a giveaway early
#[poise::command(
    slash_command,
    guild_only,
    rename = "giveaway-end",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn giveaway_end(
    ctx: Context<'_>,
    #[description = "Giveaway message ID"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    ctx.defer_ephemeral().await?;

    let outcome = ctx
        .data()
        .giveaways
        .finalize(
            &ctx.serenity_context().http,
            &guild_id.to_string(),
            message_id.trim(),
            false,
        )
        .await;

    ctx.say(match outcome {
        FinalizeOutcome::Announced { .. } => "⏹️ Giveaway ended.",
        FinalizeOutcome::NotFound => "❌ Giveaway not found.",
        FinalizeOutcome::Unresolved => "❌ Could not resolve the giveaway message.",
    })
    .await?;

    Ok(())
}

/// Reroll winners for a giveaway
#[poise::command(
    slash_command,
    guild_only,
    rename = "giveaway-reroll",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn giveaway_reroll(
    ctx: Context<'_>,
    #[description = "Giveaway message ID"] message_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    ctx.defer_ephemeral().await?;

    let outcome = ctx
        .data()
        .giveaways
        .finalize(
            &ctx.serenity_context().http,
            &guild_id.to_string(),
            message_id.trim(),
            true,
        )
        .await;

    ctx.say(match outcome {
        FinalizeOutcome::Announced { .. } => "🔁 Rerolled winners.",
        FinalizeOutcome::NotFound => "❌ Giveaway not found.",
        FinalizeOutcome::Unresolved => "❌ Could not resolve the giveaway message.",
    })
    .await?;

    Ok(())
}

pub fn commands() -> Vec<poise::Command<crate::Data, Error>> {
    vec![giveaway_start(), giveaway_end(), giveaway_reroll()]
}
