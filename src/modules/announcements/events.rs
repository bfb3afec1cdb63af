use crate::services::embeds;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::warn;

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
        serenity::FullEvent::GuildMemberAddition { new_member, .. } => {
            welcome_member(ctx, new_member, data).await;
        }
        serenity::FullEvent::GuildMemberUpdate {
            old_if_available,
            event: update,
            ..
        } => {
            let started_boosting = update.premium_since.is_some()
                && old_if_available
                    .as_ref()
                    .is_some_and(|old| old.premium_since.is_none());
            if started_boosting {
                announce_boost(ctx, update, data).await;
            }
        }
        _ => {}
    }

    Ok(())
}

async fn welcome_member(ctx: &serenity::Context, member: &serenity::Member, data: &Data) {
    let config = data.config.get(member.guild_id);
    let Some(channel_id) = config.welcome_channel_id else {
        return;
    };

    let embed = embeds::themed("Welcome aboard!")
        .description(format!(
            "Hey <@{}>, glad to have you here! Check out the rules and say hi ✨",
            member.user.id
        ))
        .thumbnail(member.user.face());

    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        warn!(
            "Failed to send welcome message in guild {}: {:?}",
            member.guild_id, e
        );
    }
}

async fn announce_boost(
    ctx: &serenity::Context,
    update: &serenity::GuildMemberUpdateEvent,
    data: &Data,
) {
    let config = data.config.get(update.guild_id);
    let Some(channel_id) = config.boost_channel_id else {
        return;
    };

    let embed = embeds::themed("Server Boosted!")
        .description(format!(
            "<@{}> just boosted the server! Thanks for the sparkles ✨",
            update.user.id
        ))
        .thumbnail(update.user.face());

    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        warn!(
            "Failed to send boost message in guild {}: {:?}",
            update.guild_id, e
        );
    }
}
