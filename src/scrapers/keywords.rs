/// Phrases that signal a listing accepts second-chance leasing or a guarantee
/// program. Order is significant: matches are reported in this order.
pub const GUARANTEE_KEYWORDS: &[&str] = &[
    "liberty rent",
    "liberty rental",
    "liberty lease",
    "rhino",
    "rhino insurance",
    "rhino deposit",
    "insurent",
    "the guarantors",
    "theguarantors",
    "second chance",
    "bad credit ok",
    "eviction ok",
    "credit flexible",
    "flexible credit",
    "poor credit ok",
    "lease guarantee",
    "rent guarantee",
    "guarantor accepted",
    "deposit alternative",
    "security deposit insurance",
    "broken lease ok",
    "past eviction ok",
];

/// Returns the guarantee phrases found in `text`, case-insensitively, in
/// canonical order. An empty result means the text is not relevant.
pub fn match_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    GUARANTEE_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}
