use poise::serenity_prelude as serenity;

/// Green accent shared by every outbound embed.
pub const ACCENT: u32 = 0x00ff88;
pub const FOOTER: &str = "⚡ Black & Green Utilities";

/// Base embed with the bot theme applied.
pub fn themed(title: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .colour(ACCENT)
        .title(title.into())
        .timestamp(serenity::Timestamp::now())
        .footer(serenity::CreateEmbedFooter::new(FOOTER))
}
