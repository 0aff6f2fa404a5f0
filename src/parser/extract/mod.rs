pub mod company;
pub mod headline;
pub mod name;

use crate::error::ExtractError;
use crate::model::{CandidateDraft, FragmentKind, RawCard, NOT_AVAILABLE};

/// Turns one raw card into a draft. Swap implementations when the upstream markup changes.
pub trait FieldExtractor: Send + Sync {
    /// `position` is the card's 1-based index in the batch.
    fn extract(&self, card: &RawCard, position: usize) -> Result<CandidateDraft, ExtractError>;
}

/// Default strategy: reads the styling tags the card source attached to each fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentExtractor;

impl FieldExtractor for FragmentExtractor {
    fn extract(&self, card: &RawCard, position: usize) -> Result<CandidateDraft, ExtractError> {
        if card.is_blank() {
            return Err(ExtractError::EmptyCard);
        }
        check_fragments(card)?;

        let display_name = name::extract(card).unwrap_or_else(|| format!("Candidate {}", position));
        let headline = headline::extract(card);
        let location_raw = headline::location(card, &headline)
            .unwrap_or_else(|| NOT_AVAILABLE.to_lowercase());
        let company_raw = company::from_headline(&headline)
            .unwrap_or_else(|| NOT_AVAILABLE.to_lowercase());
        let full_text = format!("{} {}", headline, card.text).to_lowercase();

        let profile_locator = if card.locator.trim().is_empty() {
            card.fragments
                .iter()
                .find(|f| f.kind == FragmentKind::ProfileLink)
                .and_then(|f| f.href.clone())
                .unwrap_or_default()
        } else {
            card.locator.trim().to_string()
        };

        Ok(CandidateDraft {
            display_name,
            profile_locator,
            headline,
            location_raw,
            company_raw,
            full_text,
        })
    }
}

fn check_fragments(card: &RawCard) -> Result<(), ExtractError> {
    for (index, fragment) in card.fragments.iter().enumerate() {
        if fragment.kind == FragmentKind::ProfileLink
            && fragment.href.as_deref().map_or(true, |h| h.trim().is_empty())
        {
            return Err(ExtractError::MalformedFragment {
                index,
                reason: "profile link without a target".to_string(),
            });
        }
        if fragment.kind != FragmentKind::ProfileLink && fragment.text.trim().is_empty() {
            return Err(ExtractError::MalformedFragment {
                index,
                reason: "styled fragment without text".to_string(),
            });
        }
    }
    Ok(())
}

// ── Tests ──
