use chrono::{TimeZone, Utc};

use agora_core::types::ContentRecord;

/// (collection id, slug, thread id, title, author, day of June 2024, body)
const POSTS: &[(i64, &str, i64, &str, &str, u32, &str)] = &[
    (1, "dreams", 10, "Keeping a dream journal", "night_owl", 2,
     "I started keeping a dream journal on my nightstand. Writing the moment I wake up doubled what I remember."),
    (1, "dreams", 10, "Keeping a dream journal", "quietfox", 3,
     "Voice memos work better for me than a paper journal. I transcribe them at lunch."),
    (1, "dreams", 11, "Lucid dreaming after night shifts", "driftwood", 5,
     "Since switching to night shifts my dreams are vivid and sometimes lucid. Anyone else notice this?"),
    (1, "dreams", 11, "Lucid dreaming after night shifts", "sundial", 6,
     "Fragmented sleep tends to end in REM, so you wake up inside dreams more often."),
    (2, "sourdough", 20, "Reviving a neglected starter", "tea_and_toast", 4,
     "My sourdough starter sat in the fridge for two months. Three feedings of rye flour brought it back."),
    (2, "sourdough", 20, "Reviving a neglected starter", "copperkettle", 7,
     "Discard the hooch before feeding, and keep it somewhere warm for the first day."),
    (2, "sourdough", 21, "Open crumb without a steam oven", "mossy_stone", 8,
     "A preheated dutch oven gives me the open crumb I wanted. Lid on for twenty minutes, then off."),
    (3, "hiking", 30, "Boots for wet trails", "northbound", 9,
     "Waterproof boots still soak through on long wet trails. Gaiters and wool socks matter more."),
    (3, "hiking", 30, "Boots for wet trails", "backroad_bee", 10,
     "Trail runners that drain fast beat heavy boots once you accept wet feet."),
    (3, "hiking", 31, "First overnight trip checklist", "wanderling", 12,
     "Packing list for a first overnight hike: headlamp, water filter, warm layer and a paper map."),
    (3, "hiking", 31, "First overnight trip checklist", "lanternfish", 13,
     "Write down where you are going and when you will be back. Dreams of solitude are fine, but tell someone."),
];

/// Small bundled corpus for `agora search`.
pub fn sample_records() -> Vec<ContentRecord> {
    POSTS
        .iter()
        .enumerate()
        .filter_map(|(i, (collection_id, slug, thread_id, title, author, day, body))| {
            let created_at = Utc.with_ymd_and_hms(2024, 6, *day, 9, 0, 0).single()?;
            Some(ContentRecord {
                id: i as i64 + 1,
                thread_id: *thread_id,
                collection_id: *collection_id,
                collection_slug: (*slug).to_string(),
                thread_title: (*title).to_string(),
                body: (*body).to_string(),
                author: (*author).to_string(),
                created_at,
            })
        })
        .collect()
}
