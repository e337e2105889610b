//! Topic vocabulary and the sentence templates posts are rendered from.

pub const TOPICS: [&str; 8] = [
    "sports", "movies", "politics", "food", "travel", "tech", "health", "music",
];

pub const CHECKIN_CATEGORIES: [&str; 4] = ["food", "gym", "travel", "shop"];

/// Sentence templates per topic, indexed like [`TOPICS`].
pub const TEMPLATES: [[&str; 3]; 8] = [
    ["What a match!", "Incredible goal today", "training session was tough"],
    [
        "Loved the cinematography",
        "That plot twist was insane",
        "actor performance was superb",
    ],
    [
        "policy debate heats up",
        "election rallies are crowded",
        "discussing reform",
    ],
    [
        "best pizza in town",
        "trying a new recipe",
        "restaurant had long queues",
    ],
    ["airport delays", "beach sunsets", "booking my next trip"],
    [
        "new gadget launch",
        "AI models are advancing",
        "bug fixed in release",
    ],
    ["morning run", "doctor appointment", "mental health matters"],
    ["concert vibes", "album release", "playlist on repeat"],
];
