use poise::serenity_prelude as serenity;
use std::collections::HashMap;

/// Reserved pseudo-inviter credited when a join came through the guild's
/// vanity link. Excluded from leaderboard ranking.
pub const VANITY_KEY: &str = "VANITY_URL";

/// The slice of a guild invite the tracker cares about.
#[derive(Debug, Clone)]
pub struct InviteSeen {
    pub code: String,
    pub uses: u64,
    pub inviter: Option<serenity::UserId>,
}

pub fn snapshot(invites: &[serenity::RichInvite]) -> Vec<InviteSeen> {
    invites
        .iter()
        .map(|invite| InviteSeen {
            code: invite.code.clone(),
            uses: invite.uses,
            inviter: invite.inviter.as_ref().map(|user| user.id),
        })
        .collect()
}

pub fn uses_by_code(seen: &[InviteSeen]) -> HashMap<String, u64> {
    seen.iter()
        .map(|invite| (invite.code.clone(), invite.uses))
        .collect()
}

/// Finds the invite whose use count grew since the last snapshot. Codes
/// the cache has never seen count from zero, so a first use is detected.
pub fn find_used_invite<'a>(
    cached: &HashMap<String, u64>,
    current: &'a [InviteSeen],
) -> Option<&'a InviteSeen> {
    current
        .iter()
        .find(|invite| cached.get(&invite.code).copied().unwrap_or(0) < invite.uses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::UserId;

    fn seen(code: &str, uses: u64, inviter: Option<u64>) -> InviteSeen {
        InviteSeen {
            code: code.to_string(),
            uses,
            inviter: inviter.map(UserId::new),
        }
    }

    #[test]
    fn detects_the_invite_whose_uses_grew() {
        let cached = HashMap::from([("aaa".to_string(), 3), ("bbb".to_string(), 1)]);
        let current = vec![seen("aaa", 3, Some(1)), seen("bbb", 2, Some(2))];

        let used = find_used_invite(&cached, &current).unwrap();
        assert_eq!(used.code, "bbb");
        assert_eq!(used.inviter, Some(UserId::new(2)));
    }

    #[test]
    fn uncached_code_with_uses_counts_as_used() {
        let cached = HashMap::new();
        let current = vec![seen("new", 1, Some(9))];

        assert_eq!(find_used_invite(&cached, &current).unwrap().code, "new");
    }

    #[test]
    fn no_growth_means_no_attribution() {
        let cached = HashMap::from([("aaa".to_string(), 3)]);
        let current = vec![seen("aaa", 3, Some(1)), seen("idle", 0, Some(2))];

        assert!(find_used_invite(&cached, &current).is_none());
    }
}
