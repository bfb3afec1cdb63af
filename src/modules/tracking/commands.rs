use crate::services::embeds;
use crate::{Context, Error};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LeaderboardKind {
    #[name = "invites"]
    Invites,
    #[name = "messages"]
    Messages,
}

/// Show top inviters or message senders
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[rename = "type"]
    #[description = "invites or messages"]
    kind: LeaderboardKind,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().unwrap();

    let (entries, title, noun) = match kind {
        LeaderboardKind::Invites => (
            ctx.data().tracking.top_inviters(guild_id),
            "Top Inviters",
            "invites",
        ),
        LeaderboardKind::Messages => (
            ctx.data().tracking.top_chatters(guild_id),
            "Top Chatters",
            "messages",
        ),
    };

    let embed = embeds::themed(title).description(render_leaderboard(&entries, noun));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Renders ranked counter lines, or the placeholder when nothing has been
/// tracked yet.
fn render_leaderboard(entries: &[(String, u64)], noun: &str) -> String {
    if entries.is_empty() {
        return "No data yet.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(rank, (subject, count))| {
            format!("**{}.** <@{}> — {} {}", rank + 1, subject, count, noun)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn commands() -> Vec<poise::Command<crate::Data, Error>> {
    vec![leaderboard()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leaderboard_renders_placeholder() {
        assert_eq!(render_leaderboard(&[], "invites"), "No data yet.");
    }

    #[test]
    fn entries_are_ranked_and_mentioned() {
        let entries = vec![("10".to_string(), 5), ("11".to_string(), 2)];
        let text = render_leaderboard(&entries, "messages");
        assert_eq!(
            text,
            "**1.** <@10> — 5 messages\n**2.** <@11> — 2 messages"
        );
    }
}
