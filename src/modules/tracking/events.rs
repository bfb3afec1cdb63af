use crate::modules::tracking::invites::{self, VANITY_KEY};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

pub fn handler<'a>(
    ctx: &'a serenity::Context,
    event: &'a serenity::FullEvent,
    data: &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>> {
    Box::pin(handle_event(ctx, event, data))
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message, .. } => {
            if let Some(guild_id) = new_message.guild_id {
                if !new_message.author.bot {
                    data.tracking.record_message(guild_id, new_message.author.id);
                }
            }
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            // Covers both startup availability and newly joined guilds.
            resync_guild_invites(ctx, guild.id, data).await;
        }
        serenity::FullEvent::InviteCreate { data: invite_event, .. } => {
            if let Some(guild_id) = invite_event.guild_id {
                resync_guild_invites(ctx, guild_id, data).await;
            }
        }
        serenity::FullEvent::InviteDelete { data: invite_event, .. } => {
            if let Some(guild_id) = invite_event.guild_id {
                data.tracking.forget_invite(guild_id, &invite_event.code);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member, .. } => {
            handle_member_join(ctx, new_member, data).await?;
        }
        _ => {}
    }

    Ok(())
}

async fn resync_guild_invites(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    data: &Data,
) {
    match guild_id.invites(&ctx.http).await {
        Ok(fetched) => {
            let seen = invites::snapshot(&fetched);
            data.tracking
                .snapshot_invites(guild_id, invites::uses_by_code(&seen));
            info!("Synced invites for guild {}", guild_id);
        }
        Err(e) => {
            warn!("Failed to fetch invites for guild {}: {:?}", guild_id, e);
        }
    }
}

/// Attributes a join to the invite whose use count grew since the last
/// snapshot, falling back to the vanity key when the guild has a custom
/// link and no tracked code matched.
async fn handle_member_join(
    ctx: &serenity::Context,
    member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    let guild_id = member.guild_id;

    let fetched = match guild_id.invites(&ctx.http).await {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!("Invite tracking skipped for guild {}: {:?}", guild_id, e);
            return Ok(());
        }
    };
    let seen = invites::snapshot(&fetched);

    let cached = data.tracking.cached_invites(guild_id);
    let inviter_key = match invites::find_used_invite(&cached, &seen).and_then(|used| used.inviter)
    {
        Some(inviter) => Some(inviter.to_string()),
        None => vanity_key(ctx, guild_id).await,
    };

    data.tracking
        .snapshot_invites(guild_id, invites::uses_by_code(&seen));

    if let Some(subject) = inviter_key {
        data.tracking.credit_invite(guild_id, &subject);
    }

    Ok(())
}

async fn vanity_key(ctx: &serenity::Context, guild_id: serenity::GuildId) -> Option<String> {
    guild_id
        .to_partial_guild(&ctx.http)
        .await
        .ok()
        .and_then(|guild| guild.vanity_url_code)
        .map(|_| VANITY_KEY.to_string())
}
