//! Candidate card extraction and relevance ranking.
//!
//! Raw search-result cards go in, ranked [`ScoredCandidate`]s come out. Each card is
//! extracted into a draft, scored on keywords, location, company and experience, and the
//! batch is sorted by total score.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod experience;
pub mod geocode;
pub mod location;
pub mod model;
pub mod parser;
pub mod ranking;
pub mod scoring;

pub use config::EngineSettings;
pub use engine::{score_candidates, Engine, RunReport, ScoreObserver};
pub use error::{CardFailure, EngineError, ExtractError};
pub use geocode::{Geocoder, NominatimGeocoder};
pub use model::{
    CandidateDraft, Fragment, FragmentKind, RawCard, ScoreBreakdown, ScoredCandidate,
    SearchProfile,
};
pub use parser::extract::{FieldExtractor, FragmentExtractor};
