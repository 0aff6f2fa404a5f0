use std::time::Instant;

use tracing::{info, warn};

use crate::config::EngineSettings;
use crate::error::{CardFailure, EngineError};
use crate::experience::estimate_experience;
use crate::geocode::{self, GeocodeCache, Geocoder};
use crate::location::LocationResolver;
use crate::model::{title_case, RawCard, ScoredCandidate, SearchProfile};
use crate::parser::extract::{FieldExtractor, FragmentExtractor};
use crate::ranking::{candidate_id, rank};
use crate::scoring::Scorer;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Receives every candidate right after it is scored.
pub trait ScoreObserver: Send + Sync {
    fn on_scored(&self, candidate: &ScoredCandidate);
}

impl<F> ScoreObserver for F
where
    F: Fn(&ScoredCandidate) + Send + Sync,
{
    fn on_scored(&self, candidate: &ScoredCandidate) {
        self(candidate)
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Ranked, highest score first.
    pub candidates: Vec<ScoredCandidate>,
    pub failures: Vec<CardFailure>,
    /// Cards never started because the deadline passed.
    pub skipped: usize,
}

pub struct Engine {
    settings: EngineSettings,
    extractor: Box<dyn FieldExtractor>,
    geocoder: Box<dyn Geocoder>,
    observer: Option<Box<dyn ScoreObserver>>,
}

enum CardOutcome {
    Scored(ScoredCandidate),
    Failed(CardFailure),
    Skipped,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        let geocoder = geocode::from_settings(&settings);
        Engine {
            settings,
            extractor: Box::new(FragmentExtractor),
            geocoder,
            observer: None,
        }
    }

    pub fn with_extractor(mut self, extractor: impl FieldExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Box::new(geocoder);
        self
    }

    pub fn with_observer(mut self, observer: impl ScoreObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Score up to `max_cards` cards against `profile` and rank them.
    pub fn run(&self, cards: &[RawCard], profile: &SearchProfile) -> Result<RunReport, EngineError> {
        profile.validate()?;

        let limit = self.settings.max_cards.unwrap_or(cards.len()).min(cards.len());
        let batch = &cards[..limit];
        let started = Instant::now();
        let cache = GeocodeCache::new(self.geocoder.as_ref());
        let scorer = Scorer::new(LocationResolver::new(&cache, self.settings.fuzzy_threshold));

        info!(
            cards = cards.len(),
            processing = batch.len(),
            keywords = %profile.keyword_phrase(),
            location = %profile.location,
            company = %profile.company,
            min_experience = profile.min_experience,
            "ranking cards"
        );

        let process = |(idx, card): (usize, &RawCard)| -> CardOutcome {
            if self.deadline_passed(started) {
                return CardOutcome::Skipped;
            }
            self.process_card(&scorer, idx + 1, card, profile)
        };

        let outcomes: Vec<CardOutcome> = if self.settings.parallel {
            self.map_parallel(batch, process)
        } else {
            batch.iter().enumerate().map(process).collect()
        };

        let mut report = RunReport::default();
        for outcome in outcomes {
            match outcome {
                CardOutcome::Scored(c) => report.candidates.push(c),
                CardOutcome::Failed(f) => report.failures.push(f),
                CardOutcome::Skipped => report.skipped += 1,
            }
        }
        rank(&mut report.candidates);

        info!(
            scored = report.candidates.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            geocoded_places = cache.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking done"
        );
        Ok(report)
    }

    #[cfg(feature = "rayon")]
    fn map_parallel<F>(&self, batch: &[RawCard], process: F) -> Vec<CardOutcome>
    where
        F: Fn((usize, &RawCard)) -> CardOutcome + Send + Sync,
    {
        // indexed collect keeps input order
        batch.par_iter().enumerate().map(process).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn map_parallel<F>(&self, batch: &[RawCard], process: F) -> Vec<CardOutcome>
    where
        F: Fn((usize, &RawCard)) -> CardOutcome + Send + Sync,
    {
        warn!("built without the rayon feature, scoring sequentially");
        batch.iter().enumerate().map(process).collect()
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.settings
            .deadline()
            .is_some_and(|limit| started.elapsed() >= limit)
    }

    fn process_card(
        &self,
        scorer: &Scorer<'_>,
        position: usize,
        card: &RawCard,
        profile: &SearchProfile,
    ) -> CardOutcome {
        let draft = match self.extractor.extract(card, position) {
            Ok(d) => d,
            Err(reason) => {
                warn!(position, locator = %card.locator, %reason, "card skipped");
                return CardOutcome::Failed(CardFailure {
                    position,
                    locator: card.locator.clone(),
                    reason,
                });
            }
        };

        let estimated = estimate_experience(&draft.headline, &draft.full_text, profile.min_experience);
        let scored = scorer.score(&draft, estimated, profile);

        let candidate = ScoredCandidate {
            id: candidate_id(&draft.profile_locator, position),
            name: draft.display_name,
            skills: vec![profile.keyword_phrase()],
            experience_years: scored.experience_years,
            location_display: title_case(&draft.location_raw),
            company: draft.company_raw,
            profile_locator: draft.profile_locator,
            relevance_score: scored.breakdown.total,
            score_breakdown: scored.breakdown,
        };

        info!(
            id = %candidate.id,
            keywords = candidate.score_breakdown.keywords,
            location = candidate.score_breakdown.location,
            location_tier = %scored.location.tier,
            company = candidate.score_breakdown.company,
            experience = candidate.score_breakdown.experience,
            total = candidate.relevance_score,
            "candidate scored"
        );
        if let Some(observer) = &self.observer {
            observer.on_scored(&candidate);
        }
        CardOutcome::Scored(candidate)
    }
}

/// Rank `cards` against `profile` with default settings.
pub fn score_candidates(
    cards: &[RawCard],
    profile: &SearchProfile,
) -> Result<Vec<ScoredCandidate>, EngineError> {
    Engine::new(EngineSettings::default())
        .run(cards, profile)
        .map(|report| report.candidates)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::error::ExtractError;
    use crate::geocode::StaticGeocoder;
    use crate::model::{Fragment, FragmentKind};
    use crate::parser::{parse_card, parse_page};

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.md", name)).unwrap()
    }

    fn offline(max_cards: Option<usize>) -> Engine {
        let settings = EngineSettings {
            max_cards,
            geocode_enabled: false,
            ..EngineSettings::default()
        };
        Engine::new(settings).with_geocoder(StaticGeocoder::new([
            ("venezuela", "Venezuela"),
            ("maracaibo, zulia", "Venezuela"),
            ("caracas, venezuela", "Venezuela"),
            ("san francisco bay area", "United States"),
        ]))
    }

    fn card(headline: &str, location: &str, locator: &str) -> RawCard {
        let mut fragments = vec![Fragment::new(FragmentKind::Emphasized, headline)];
        if !location.is_empty() {
            fragments.push(Fragment::new(FragmentKind::DeEmphasized, location));
        }
        RawCard {
            locator: locator.to_string(),
            text: format!("{}\n{}", headline, location),
            fragments,
        }
    }

    #[test]
    fn empty_keywords_fail_fast() {
        let err = offline(None).run(&[], &SearchProfile::new(vec![])).unwrap_err();
        assert!(matches!(err, EngineError::NoKeywords));
    }

    #[test]
    fn free_function_rejects_blank_profile() {
        let err = score_candidates(&[], &SearchProfile::new(vec![" ".into()])).unwrap_err();
        assert!(matches!(err, EngineError::NoKeywords));
    }

    #[test]
    fn scenario_no_filters() {
        let cards = vec![card("AI Engineer at Acme", "", "https://www.linkedin.com/in/a")];
        let profile = SearchProfile::new(vec!["AI Engineer".into()]);
        let report = offline(None).run(&cards, &profile).unwrap();
        let c = &report.candidates[0];
        assert_eq!(c.relevance_score, 95.0);
        assert_eq!(c.score_breakdown.keywords, 50);
        assert_eq!(c.score_breakdown.location, 20);
        assert_eq!(c.score_breakdown.company, 20);
        assert_eq!(c.score_breakdown.experience, 5);
        assert_eq!(c.id, "a");
        assert_eq!(c.company, "acme");
        assert_eq!(c.skills, vec!["AI Engineer".to_string()]);
    }

    #[test]
    fn search_page_ranked() {
        let cards = parse_page(&fixture("search_page"));
        let profile = SearchProfile::new(vec!["AI".into(), "Engineer".into()])
            .with_location("Venezuela")
            .with_company("Nvidia Corp")
            .with_min_experience(5);
        let report = offline(None).run(&cards, &profile).unwrap();

        assert_eq!(report.candidates.len(), 4);
        assert!(report.failures.is_empty());

        let top = &report.candidates[0];
        assert_eq!(top.id, "maria-gonzalez");
        assert_eq!(top.name, "Maria Gonzalez");
        assert_eq!(top.location_display, "Caracas, Venezuela");
        assert_eq!(top.experience_years, 8);
        assert_eq!(top.relevance_score, 100.0);

        let john = report.candidates.iter().find(|c| c.id == "john-smith-42").unwrap();
        // "nvidiacorp" only matches with spaces removed
        assert_eq!(john.score_breakdown.company, 10);
        assert_eq!(john.score_breakdown.keywords, 25);

        let ana = report.candidates.iter().find(|c| c.id == "ana-perez").unwrap();
        assert_eq!(ana.score_breakdown.location, 15);

        let private = report.candidates.iter().find(|c| c.id == "candidate_4").unwrap();
        assert_eq!(private.name, "Candidate 4");
        assert_eq!(private.location_display, "N/A");
    }

    #[test]
    fn bare_card_still_scored() {
        let cards = vec![parse_card(&fixture("bare_card"))];
        let profile = SearchProfile::new(vec!["AI Engineer".into()])
            .with_location("Venezuela")
            .with_company("Acme")
            .with_min_experience(5);
        let report = offline(None).run(&cards, &profile).unwrap();
        let c = &report.candidates[0];
        assert_eq!(c.company, "n/a");
        assert_eq!(c.location_display, "N/A");
        assert!(c.relevance_score < 50.0);
        let b = &c.score_breakdown;
        assert_eq!(c.relevance_score, (b.keywords + b.location + b.company + b.experience) as f64);
    }

    #[test]
    fn failures_do_not_abort_batch() {
        let cards = vec![
            card("AI Engineer", "Lima, Peru", "https://www.linkedin.com/in/x"),
            RawCard::default(),
            card("ML Engineer", "Quito", ""),
        ];
        let profile = SearchProfile::new(vec!["AI Engineer".into()]);
        let report = offline(None).run(&cards, &profile).unwrap();
        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].position, 2);
        assert_eq!(report.failures[0].reason, ExtractError::EmptyCard);
        assert!(report.candidates.iter().any(|c| c.id == "candidate_3"));
    }

    #[test]
    fn card_cap_applies() {
        let cards: Vec<_> = (0..5)
            .map(|i| card("AI Engineer", "", &format!("https://www.linkedin.com/in/p{}", i)))
            .collect();
        let profile = SearchProfile::new(vec!["AI Engineer".into()]);
        assert_eq!(offline(Some(3)).run(&cards, &profile).unwrap().candidates.len(), 3);
        assert_eq!(offline(None).run(&cards, &profile).unwrap().candidates.len(), 5);
    }

    #[test]
    fn ties_keep_extraction_order() {
        let cards: Vec<_> = ["c", "a", "b"]
            .iter()
            .map(|id| card("AI Engineer", "", &format!("https://www.linkedin.com/in/{}", id)))
            .collect();
        let profile = SearchProfile::new(vec!["AI Engineer".into()]);
        let report = offline(None).run(&cards, &profile).unwrap();
        let ids: Vec<_> = report.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let cards = parse_page(&fixture("search_page"));
        let profile = SearchProfile::new(vec!["AI Engineer".into()]).with_location("Venezuela");
        let sequential = offline(None).run(&cards, &profile).unwrap();
        let mut engine = offline(None);
        engine.settings.parallel = true;
        let parallel = engine.run(&cards, &profile).unwrap();
        assert_eq!(sequential.candidates, parallel.candidates);
    }

    #[test]
    fn zero_deadline_skips_everything() {
        let mut engine = offline(None);
        engine.settings.deadline_secs = Some(0);
        let cards = vec![card("AI Engineer", "", "")];
        let report = engine.run(&cards, &SearchProfile::new(vec!["AI".into()])).unwrap();
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn observer_sees_every_candidate() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let engine = offline(None).with_observer(move |c: &ScoredCandidate| {
            assert!(c.relevance_score <= 100.0);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let cards = parse_page(&fixture("search_page"));
        engine.run(&cards, &SearchProfile::new(vec!["engineer".into()])).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn custom_extractor_plugs_in() {
        struct Fixed;
        impl FieldExtractor for Fixed {
            fn extract(
                &self,
                _card: &RawCard,
                position: usize,
            ) -> Result<crate::model::CandidateDraft, ExtractError> {
                Ok(crate::model::CandidateDraft {
                    display_name: format!("Fixed {}", position),
                    profile_locator: "https://www.linkedin.com/in/fixed".into(),
                    headline: "rust developer".into(),
                    location_raw: "n/a".into(),
                    company_raw: "n/a".into(),
                    full_text: "rust developer".into(),
                })
            }
        }
        let engine = offline(None).with_extractor(Fixed);
        let report = engine
            .run(&[RawCard::default()], &SearchProfile::new(vec!["rust".into()]))
            .unwrap();
        assert_eq!(report.candidates[0].name, "Fixed 1");
        assert_eq!(report.candidates[0].score_breakdown.keywords, 50);
    }
}
