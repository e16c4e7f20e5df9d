//! Placeholder posts shown while the repository is unreachable

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repository::Post;

const DEMO_POSTS: [(&str, &str, &str); 6] = [
    (
        "Demo User",
        "Futuristic cityscape at night",
        "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=600&fit=crop",
    ),
    (
        "AI Artist",
        "Mountain landscape with aurora",
        "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=500&fit=crop",
    ),
    (
        "Creative Mind",
        "Space nebula with stars",
        "https://images.unsplash.com/photo-1419242902214-272b3f66ee7a?w=400&h=700&fit=crop",
    ),
    (
        "Digital Creator",
        "Abstract digital art",
        "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=400&h=450&fit=crop",
    ),
    (
        "Cyber Artist",
        "Cyberpunk street scene",
        "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=550&fit=crop",
    ),
    (
        "Fantasy Creator",
        "Fantasy forest landscape",
        "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=650&fit=crop",
    ),
];

/// The fixed demo gallery. Ids are stable and never collide with v4 ids.
pub fn demo_gallery() -> Vec<Post> {
    DEMO_POSTS
        .iter()
        .enumerate()
        .map(|(i, (author, prompt, photo))| {
            Post::new(
                Uuid::from_u128(i as u128 + 1),
                author.to_string(),
                prompt.to_string(),
                photo.to_string(),
                DateTime::<Utc>::default(),
            )
        })
        .collect()
}
