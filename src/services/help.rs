use crate::{Context, Error};

/// Show help for the bot's commands
#[poise::command(slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"] command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: crate::services::embeds::FOOTER,
            ..Default::default()
        },
    )
    .await?;

    Ok(())
}
