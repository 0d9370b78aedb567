//! Common utilities for benchmarks.
//!
//! Provides test data generators with fixed seeds for reproducibility.

#![allow(dead_code)]

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use commentree::api::{CommentId, CommentNode};

/// Fixed seed for reproducible benchmark data
const SEED: u64 = 42;

/// Create a seeded RNG for reproducible test data
pub fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

const AUTHORS: [&str; 6] = ["Ada", "Grace", "Linus", "Ken", "Barbara", "Dennis"];

const BODIES: [&str; 5] = [
    "Great post, thanks for sharing!",
    "I disagree with the second point <b>strongly</b>.",
    "Has anyone tried this with a larger dataset?",
    "+1",
    "Reply chains like this are exactly why threading matters & why it is hard.",
];

/// Generate a forest with `top_level` roots and randomly nested replies.
///
/// Each node gets 0-3 replies, nesting stops at `max_depth`. Roughly one node
/// in ten is tombstoned.
pub fn generate_forest(top_level: usize, max_depth: usize) -> Vec<CommentNode> {
    let mut rng = seeded_rng();
    let mut next_id = 0u64;
    (0..top_level)
        .map(|_| generate_node(&mut rng, &mut next_id, 0, max_depth))
        .collect()
}

fn generate_node(
    rng: &mut ChaCha8Rng,
    next_id: &mut u64,
    depth: usize,
    max_depth: usize,
) -> CommentNode {
    *next_id += 1;
    let id = CommentId::from(*next_id);
    let reply_count = if depth >= max_depth {
        0
    } else {
        rng.random_range(0..=3)
    };
    let replies = (0..reply_count)
        .map(|_| generate_node(rng, next_id, depth + 1, max_depth))
        .collect();

    let deleted = rng.random_range(0..10) == 0;
    let (name, comment) = if deleted {
        ("[Deleted]".to_string(), "This comment has been deleted".to_string())
    } else {
        (
            AUTHORS[rng.random_range(0..AUTHORS.len())].to_string(),
            BODIES[rng.random_range(0..BODIES.len())].to_string(),
        )
    };

    CommentNode {
        id,
        name,
        comment,
        date: "2024-05-01".to_string(),
        time: format!("{:02}:{:02}", rng.random_range(0..24), rng.random_range(0..60)),
        deleted,
        replies,
    }
}
