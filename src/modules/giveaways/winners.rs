use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;

/// Draws up to `count` distinct winners uniformly at random, without
/// replacement, from the entrant pool. Duplicate entrants count once.
/// A pool no larger than `count` is returned whole; an empty pool is a
/// valid "no winners" outcome.
pub fn draw_winners(entrants: &[serenity::UserId], count: usize) -> Vec<serenity::UserId> {
    let mut pool = entrants.to_vec();
    pool.sort_unstable();
    pool.dedup();

    if pool.len() <= count {
        return pool;
    }

    pool.choose_multiple(&mut rand::thread_rng(), count)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::UserId;
    use std::collections::HashSet;

    fn pool(ids: &[u64]) -> Vec<UserId> {
        ids.iter().copied().map(UserId::new).collect()
    }

    #[test]
    fn empty_pool_yields_no_winners() {
        assert!(draw_winners(&[], 3).is_empty());
    }

    #[test]
    fn small_pool_is_returned_whole() {
        let entrants = pool(&[1]);
        let winners = draw_winners(&entrants, 3);
        assert_eq!(winners, entrants);
    }

    #[test]
    fn draw_is_bounded_unique_and_a_subset() {
        let entrants = pool(&[1, 2, 3, 4, 5, 6, 7, 8]);
        for requested in 1..=10 {
            let winners = draw_winners(&entrants, requested);
            assert_eq!(winners.len(), requested.min(entrants.len()));

            let unique: HashSet<_> = winners.iter().collect();
            assert_eq!(unique.len(), winners.len());
            assert!(winners.iter().all(|w| entrants.contains(w)));
        }
    }

    #[test]
    fn duplicate_entrants_count_once() {
        let entrants = pool(&[5, 5, 5, 9]);
        let winners = draw_winners(&entrants, 4);
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn input_is_not_mutated() {
        let entrants = pool(&[3, 1, 2]);
        let before = entrants.clone();
        let _ = draw_winners(&entrants, 2);
        assert_eq!(entrants, before);
    }
}
