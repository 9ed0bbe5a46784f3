//! Keyword severity estimator
//!
//! Suggests a priority from the free-text description. Tiers are tested from
//! most to least severe and the first tier with any matching keyword wins.
//! Keywords match as substrings, so "killing" also matches the "kill" tier.

use crate::db::Priority;

const URGENT_KEYWORDS: &[&str] = &[
    "murder",
    "life threat",
    "terror",
    "kidnap",
    "hostage",
    "emergency",
    "urgent",
    "rape",
    "kill",
    "killing",
];

const HIGH_KEYWORDS: &[&str] = &[
    "attack",
    "assault",
    "violence",
    "harassment",
    "theft",
    "robbery",
    "beating",
    "national-security",
];

const MEDIUM_KEYWORDS: &[&str] = &["fraud", "cheating", "scam", "cyber", "stalking", "extortion"];

const TIERS: &[(Priority, &[&str])] = &[
    (Priority::Urgent, URGENT_KEYWORDS),
    (Priority::High, HIGH_KEYWORDS),
    (Priority::Medium, MEDIUM_KEYWORDS),
];

/// Suggest a priority for a complaint description
pub fn estimate_severity(text: &str) -> Priority {
    let text = text.to_lowercase();

    TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(priority, _)| *priority)
        .unwrap_or(Priority::Low)
}
