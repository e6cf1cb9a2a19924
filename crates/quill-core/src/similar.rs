//! Similar-post ranking by shared tags.

use std::cmp::Reverse;
use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::Post;

/// Similar posts shown on a detail page.
pub const SIMILAR_POSTS_LIMIT: u64 = 4;

/// Rank `candidates` against the tags of `target`.
///
/// Candidates sharing no tag, and the target itself, are dropped. The rest
/// are ordered by overlap, then publish date, both descending, and cut to
/// `limit`. Visibility filtering is the caller's job.
pub fn rank_similar<I>(target: &Post, target_tags: &[Uuid], candidates: I, limit: u64) -> Vec<Post>
where
    I: IntoIterator<Item = (Post, Vec<Uuid>)>,
{
    let wanted: HashSet<&Uuid> = target_tags.iter().collect();

    let mut scored: Vec<(usize, Post)> = candidates
        .into_iter()
        .filter(|(post, _)| post.id != target.id)
        .filter_map(|(post, tags)| {
            let overlap = tags.iter().filter(|tag| wanted.contains(tag)).count();
            (overlap > 0).then_some((overlap, post))
        })
        .collect();

    scored.sort_by_key(|(overlap, post)| (Reverse(*overlap), Reverse(post.publish)));
    scored
        .into_iter()
        .take(limit as usize)
        .map(|(_, post)| post)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn post(title: &str, days_ago: i64) -> Post {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Post::new(title, "ada", "body").published_at(base - Duration::days(days_ago))
    }

    #[test]
    fn test_orders_by_overlap_then_recency() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let target = post("target", 0);
        let one_tag_new = post("one-new", 1);
        let one_tag_old = post("one-old", 5);
        let two_tags = post("two", 9);

        let ranked = rank_similar(
            &target,
            &[a, b],
            vec![
                (one_tag_old.clone(), vec![a]),
                (two_tags.clone(), vec![a, b, c]),
                (one_tag_new.clone(), vec![b]),
            ],
            SIMILAR_POSTS_LIMIT,
        );

        let titles: Vec<&str> = ranked.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["two", "one-new", "one-old"]);
    }

    #[test]
    fn test_excludes_target_and_unrelated_posts() {
        let a = Uuid::new_v4();
        let target = post("target", 0);
        let unrelated = post("unrelated", 1);

        let ranked = rank_similar(
            &target,
            &[a],
            vec![(target.clone(), vec![a]), (unrelated, vec![Uuid::new_v4()])],
            SIMILAR_POSTS_LIMIT,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_limit_is_applied() {
        let a = Uuid::new_v4();
        let target = post("target", 0);
        let candidates = (1..=6).map(|i| (post(&format!("p{i}"), i), vec![a]));

        let ranked = rank_similar(&target, &[a], candidates, SIMILAR_POSTS_LIMIT);
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].title, "p1");
    }

    #[test]
    fn test_untagged_target_has_no_similar_posts() {
        let target = post("target", 0);
        let ranked = rank_similar(&target, &[], vec![(post("x", 1), vec![Uuid::new_v4()])], 4);
        assert!(ranked.is_empty());
    }
}
