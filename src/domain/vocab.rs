//! Curated vocabulary shared by the rule-based classifiers.
//!
//! The grounding, relevance, and depth classifiers all need to recognize
//! brand and product-line names. The list is deliberately curated rather
//! than learned: additions are reviewed, and matching stays explainable.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Recognized brand and product-line tokens, lower-cased.
pub static BRAND_TOKENS: &[&str] = &[
    "apple", "iphone", "ipad", "macbook", "airpods", "imac",
    "samsung", "galaxy",
    "google", "pixel",
    "sony", "playstation",
    "microsoft", "xbox", "surface",
    "lenovo", "thinkpad",
    "huawei", "xiaomi", "oneplus", "oppo", "motorola", "nokia",
    "dell", "hp", "asus", "acer", "msi",
    "lg", "philips", "panasonic", "bosch", "dyson",
    "bose", "jbl", "sennheiser", "beats", "sonos",
    "canon", "nikon", "gopro", "fujifilm",
    "nintendo", "garmin", "fitbit", "logitech", "razer",
    "nike", "adidas", "puma", "levis",
];

static BRAND_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BRAND_TOKENS.iter().copied().collect());

/// Splits text into lower-cased alphanumeric tokens.
///
/// "Apple iPhone 15 128GB" becomes ["apple", "iphone", "15", "128gb"].
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the first recognized brand token appearing as a word in the text.
pub fn find_brand(text: &str) -> Option<&'static str> {
    tokens(text)
        .iter()
        .find_map(|t| BRAND_SET.get(t.as_str()).copied())
}
