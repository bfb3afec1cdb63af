use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Configure the welcome and boost announcement channels
#[poise::command(
    slash_command,
    guild_only,
    rename = "announcements-setup",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn announcements_setup(
    ctx: Context<'_>,
    #[description = "Channel for welcome messages"]
    #[channel_types("Text")]
    welcome_channel: Option<serenity::GuildChannel>,
    #[description = "Channel for boost messages"]
    #[channel_types("Text")]
    boost_channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    if welcome_channel.is_none() && boost_channel.is_none() {
        ctx.send(
            poise::CreateReply::default()
                .content("Nothing to change. Pass a welcome and/or boost channel.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    ctx.data().config.update(guild_id, |config| {
        if let Some(channel) = &welcome_channel {
            config.welcome_channel_id = Some(channel.id.get());
        }
        if let Some(channel) = &boost_channel {
            config.boost_channel_id = Some(channel.id.get());
        }
    });

    ctx.send(
        poise::CreateReply::default()
            .content("✅ Announcement channels updated.")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

pub fn commands() -> Vec<poise::Command<crate::Data, Error>> {
    vec![announcements_setup()]
}
