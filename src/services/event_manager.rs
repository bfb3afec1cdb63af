use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Central dispatcher for non-command gateway events: a little core
/// handling, component interaction routing, then fan-out to every module
/// handler.
pub async fn dispatch(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::GuildCreate { guild, is_new, .. } => {
            if is_new.unwrap_or(false) {
                info!("Joined new guild: {} ({})", guild.name, guild.id);
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            info!("Left guild: {}", incomplete.id);
        }
        serenity::FullEvent::InteractionCreate { interaction, .. } => {
            handle_interactions(ctx, interaction, data).await;
        }
        _ => {}
    }

    for (module_id, handler) in &data.event_handlers {
        if let Err(e) = handler(ctx, event, data).await {
            error!("Error in event handler for module {}: {:?}", module_id, e);
        }
    }

    Ok(())
}

async fn handle_interactions(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    data: &Data,
) {
    if let serenity::Interaction::Component(component) = interaction {
        let custom_id = &component.data.custom_id;

        if custom_id.starts_with(crate::modules::tickets::workflow::PANEL_BUTTON_PREFIX) {
            if let Err(e) =
                crate::modules::tickets::workflow::handle_panel_button(ctx, component, data).await
            {
                error!("Error handling ticket panel interaction: {:?}", e);
            }
        }
    }
}
