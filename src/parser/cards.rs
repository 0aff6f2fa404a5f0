use crate::model::{Fragment, FragmentKind, RawCard};

use super::blocks::Block;

/// Split a flat block list into per-person chunks.
///
/// A new card starts at a rule, or at a profile link when the current chunk already has one.
/// Repeated links to the same profile (avatar link + name link) stay in one card.
pub fn cluster_cards(blocks: &[Block]) -> Vec<Vec<Block>> {
    let mut cards: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut current_url: Option<&str> = None;

    for block in blocks {
        let starts_new = match block {
            Block::Rule => true,
            Block::ProfileLink { url, .. } => {
                current_url.is_some_and(|seen| profile_key(seen) != profile_key(url))
            }
            _ => false,
        };

        if starts_new {
            if has_content(&current) {
                cards.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current_url = None;
        }

        match block {
            Block::Rule => continue,
            Block::ProfileLink { url, .. } if current_url.is_none() => current_url = Some(url.as_str()),
            _ => {}
        }
        current.push(block.clone());
    }

    if has_content(&current) {
        cards.push(current);
    }
    cards
}

/// Convert one chunk of blocks into the card shape the extractor consumes.
pub fn to_raw_card(blocks: &[Block]) -> RawCard {
    let mut fragments = Vec::new();
    let mut locator = String::new();

    for block in blocks {
        let fragment = match block {
            Block::ProfileLink { text, url } => {
                if locator.is_empty() {
                    locator = url.clone();
                }
                if text.is_empty() {
                    continue;
                }
                Fragment::link(text.clone(), url.clone())
            }
            Block::Strong(t) => Fragment::new(FragmentKind::Emphasized, t.clone()),
            Block::Muted(t) => Fragment::new(FragmentKind::DeEmphasized, t.clone()),
            Block::Link { text, .. } | Block::Text(text) if !text.is_empty() => {
                Fragment::new(FragmentKind::Plain, text.clone())
            }
            _ => continue,
        };
        fragments.push(fragment);
    }

    let text = blocks
        .iter()
        .filter_map(Block::text)
        .collect::<Vec<_>>()
        .join("\n");

    RawCard {
        locator,
        text,
        fragments,
    }
}

fn has_content(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| b.text().is_some())
}

/// Profile URLs compared without query string or trailing slash.
fn profile_key(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].trim_end_matches('/')
}
