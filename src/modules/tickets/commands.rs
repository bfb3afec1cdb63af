use crate::modules::tickets::workflow::{self, TicketOutcome, TicketType};
use crate::modules::tickets::transcript;
use crate::services::embeds;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Post a ticket panel with General / Partner / Management buttons
#[poise::command(
    slash_command,
    guild_only,
    rename = "ticket-setup",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn ticket_setup(
    ctx: Context<'_>,
    #[description = "Channel to post the panel"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
    #[description = "Staff role with access to tickets"] staff_role: Option<serenity::Role>,
    #[description = "Category for general tickets"]
    #[channel_types("Category")]
    general_category: Option<serenity::GuildChannel>,
    #[description = "Category for partner tickets"]
    #[channel_types("Category")]
    partner_category: Option<serenity::GuildChannel>,
    #[description = "Category for management tickets"]
    #[channel_types("Category")]
    management_category: Option<serenity::GuildChannel>,
    #[description = "Channel for transcripts and bot logs"]
    #[channel_types("Text")]
    log_channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    ctx.data().config.update(guild_id, |config| {
        if let Some(role) = &staff_role {
            config.staff_role_id = Some(role.id.get());
        }
        if let Some(category) = &general_category {
            config.ticket_categories.general = Some(category.id.get());
        }
        if let Some(category) = &partner_category {
            config.ticket_categories.partner = Some(category.id.get());
        }
        if let Some(category) = &management_category {
            config.ticket_categories.management = Some(category.id.get());
        }
        if let Some(log) = &log_channel {
            config.log_channel_id = Some(log.id.get());
        }
    });

    let panel = embeds::themed("Open a Ticket").description(
        "Choose a ticket type below and a private channel will be created for you. \
         Staff will be with you shortly 💬",
    );
    let buttons = vec![
        serenity::CreateButton::new(TicketType::General.button_id())
            .label("General Ticket")
            .emoji('🎫')
            .style(serenity::ButtonStyle::Success),
        serenity::CreateButton::new(TicketType::Partner.button_id())
            .label("Partner Ticket")
            .emoji('🤝')
            .style(serenity::ButtonStyle::Primary),
        serenity::CreateButton::new(TicketType::Management.button_id())
            .label("Management Ticket")
            .emoji('🛡')
            .style(serenity::ButtonStyle::Secondary),
    ];

    channel
        .id
        .send_message(
            &ctx.serenity_context().http,
            serenity::CreateMessage::new()
                .embed(panel)
                .components(vec![serenity::CreateActionRow::Buttons(buttons)]),
        )
        .await?;

    ctx.send(
        poise::CreateReply::default()
            .content("✅ Ticket panel posted.")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Open a ticket without using the panel
#[poise::command(slash_command, guild_only, rename = "ticket-open")]
pub async fn ticket_open(
    ctx: Context<'_>,
    #[description = "Ticket type"] kind: TicketType,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    ctx.defer_ephemeral().await?;

    let config = ctx.data().config.get(guild_id);
    let outcome = workflow::open_ticket(
        &ctx.serenity_context().http,
        guild_id,
        ctx.author(),
        kind,
        &config,
    )
    .await?;

    ctx.say(workflow::open_reply(kind, &outcome)).await?;
    Ok(())
}

/// Claim the current ticket channel
#[poise::command(
    slash_command,
    guild_only,
    rename = "ticket-claim",
    required_permissions = "MANAGE_CHANNELS"
)]
pub async fn ticket_claim(ctx: Context<'_>) -> Result<(), Error> {
    let Some(channel) = current_channel(&ctx).await? else {
        return not_a_ticket(&ctx).await;
    };

    match workflow::claim_ticket(&ctx.serenity_context().http, &channel, ctx.author()).await? {
        TicketOutcome::NotTicket => not_a_ticket(&ctx).await,
        TicketOutcome::Done => {
            ctx.send(
                poise::CreateReply::default()
                    .content("✅ Claimed.")
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
    }
}

/// Close this ticket (locks, creates transcript)
#[poise::command(
    slash_command,
    guild_only,
    rename = "ticket-close",
    required_permissions = "MANAGE_CHANNELS"
)]
pub async fn ticket_close(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();
    ctx.defer_ephemeral().await?;

    let Some(channel) = current_channel(&ctx).await? else {
        return not_a_ticket(&ctx).await;
    };

    let config = ctx.data().config.get(guild_id);
    match workflow::close_ticket(&ctx.serenity_context().http, &channel, ctx.author(), &config)
        .await?
    {
        TicketOutcome::NotTicket => not_a_ticket(&ctx).await,
        TicketOutcome::Done => {
            ctx.say("🗑️ Ticket closing scheduled.").await?;
            Ok(())
        }
    }
}

/// Generate a transcript for this ticket
#[poise::command(
    slash_command,
    guild_only,
    rename = "ticket-transcript",
    required_permissions = "MANAGE_CHANNELS"
)]
pub async fn ticket_transcript(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(channel) = current_channel(&ctx).await? else {
        return not_a_ticket(&ctx).await;
    };
    if !workflow::is_ticket_channel(&channel) {
        return not_a_ticket(&ctx).await;
    }

    let log =
        transcript::build_transcript(&ctx.serenity_context().http, channel.id, &channel.name)
            .await?;
    let attachment = serenity::CreateAttachment::bytes(
        log.into_bytes(),
        format!("{}-transcript.txt", channel.name),
    );

    ctx.send(
        poise::CreateReply::default()
            .content("📄 Transcript generated.")
            .attachment(attachment)
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

async fn current_channel(ctx: &Context<'_>) -> Result<Option<serenity::GuildChannel>, Error> {
    Ok(ctx
        .channel_id()
        .to_channel(ctx.serenity_context())
        .await?
        .guild())
}

async fn not_a_ticket(ctx: &Context<'_>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content("❌ This is not a ticket channel.")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub fn commands() -> Vec<poise::Command<crate::Data, Error>> {
    vec![
        ticket_setup(),
        ticket_open(),
        ticket_claim(),
        ticket_close(),
        ticket_transcript(),
    ]
}
