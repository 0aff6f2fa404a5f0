pub mod blocks;
pub mod cards;
pub mod extract;

use crate::model::RawCard;

/// Two-pass pipeline: markdown → blocks → one `RawCard` per person, in page order.
pub fn parse_page(markdown: &str) -> Vec<RawCard> {
    let blocks = blocks::classify_lines(markdown);
    cards::cluster_cards(&blocks)
        .iter()
        .map(|chunk| cards::to_raw_card(chunk))
        .collect()
}

/// A single card's markdown, without splitting.
pub fn parse_card(markdown: &str) -> RawCard {
    cards::to_raw_card(&blocks::classify_lines(markdown))
}

// ── Tests ──
