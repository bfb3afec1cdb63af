use crate::Error;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Renders the full history of a ticket channel as plain text, oldest
/// message first.
pub async fn build_transcript(
    http: &Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    channel_name: &str,
) -> Result<String, Error> {
    let mut lines = vec![
        format!("# Transcript for {}", channel_name),
        format!("Generated: {}", Utc::now().to_rfc3339()),
        String::new(),
    ];

    // Walk the history backwards in pages; Discord returns newest first.
    let mut collected: Vec<serenity::Message> = Vec::new();
    let mut before: Option<serenity::MessageId> = None;
    loop {
        let mut request = serenity::GetMessages::new().limit(100);
        if let Some(cursor) = before {
            request = request.before(cursor);
        }
        let batch = channel_id.messages(http, request).await?;
        if batch.is_empty() {
            break;
        }
        before = batch.last().map(|message| message.id);
        collected.extend(batch);
    }

    for message in collected.iter().rev() {
        let timestamp = chrono::DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        lines.push(format_message_line(
            &timestamp,
            &message.author.tag(),
            message.author.id.get(),
            &message.content,
        ));
        for attachment in &message.attachments {
            lines.push(format!("  [attachment] {} {}", attachment.filename, attachment.url));
        }
        if !message.embeds.is_empty() {
            lines.push(format!("  [embeds] {}", message.embeds.len()));
        }
    }

    Ok(lines.join("\n"))
}

fn format_message_line(timestamp: &str, author_tag: &str, author_id: u64, content: &str) -> String {
    format!("[{}] {} ({}): {}", timestamp, author_tag, author_id, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_lines_carry_author_and_content() {
        let line = format_message_line("2024-06-01T10:00:00+00:00", "someone#0", 42, "hello");
        assert_eq!(line, "[2024-06-01T10:00:00+00:00] someone#0 (42): hello");
    }

    #[test]
    fn empty_content_still_renders_the_frame() {
        let line = format_message_line("t", "a#0", 1, "");
        assert_eq!(line, "[t] a#0 (1): ");
    }
}
