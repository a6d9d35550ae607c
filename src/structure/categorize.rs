// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Keyword categorization of recognized lines

use serde::{Deserialize, Serialize};

/// Substrings marking a price. Plain substring matches, so `"rs"` also hits
/// words like `"users"`.
const PRICE_MARKERS: &[&str] = &["$", "rs", "price", ".00"];

/// Currency glyphs that also mark a price
const CURRENCY_GLYPHS: &[char] = &['₹', '€', '£', '¥', '₩', '₽', '₺', '₦', '₱', '¢'];

const BUTTON_KEYWORDS: &[&str] = &["login", "signup", "ok", "submit", "continue"];

/// Lines with at most this many words are labels
const MAX_LABEL_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Label,
    Price,
    Button,
    Text,
}

/// Categorize one line of text, case-insensitively
///
/// First match wins: price markers, then button keywords, then short
/// labels. Everything else is `Text`.
pub fn categorize(text: &str) -> Category {
    let lower = text.to_lowercase();

    if PRICE_MARKERS.iter().any(|m| lower.contains(m)) || lower.contains(CURRENCY_GLYPHS) {
        Category::Price
    } else if BUTTON_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::Button
    } else if lower.split_whitespace().count() <= MAX_LABEL_WORDS {
        Category::Label
    } else {
        Category::Text
    }
}
