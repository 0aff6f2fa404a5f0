use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use card_ranker::model::ScoredCandidate;
use card_ranker::{db, parser, Engine, EngineSettings, RawCard, SearchProfile};

#[derive(Parser)]
#[command(name = "card_ranker", about = "Rank candidate cards against a search profile")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, score and rank a batch of cards
    Rank {
        /// Cards as JSON (array of raw cards) or a markdown search page
        #[arg(long)]
        cards: PathBuf,
        /// Search keywords (repeatable)
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,
        /// Desired location ("any" or empty disables the filter)
        #[arg(short, long, default_value = "")]
        location: String,
        /// Desired company
        #[arg(short, long, default_value = "")]
        company: String,
        /// Minimum years of experience
        #[arg(long = "min-exp", default_value = "0")]
        min_experience: u32,
        /// Max cards to score (0 = all)
        #[arg(short = 'n', long)]
        max_cards: Option<usize>,
        /// Skip the geocoding tier
        #[arg(long)]
        no_geocode: bool,
        /// Persist results to the candidates database
        #[arg(long)]
        save: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Settings file (default: ./ranker.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show stored candidates
    Saved {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Settings file (default: ./ranker.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            cards,
            keywords,
            location,
            company,
            min_experience,
            max_cards,
            no_geocode,
            save,
            json,
            config,
        } => {
            let mut settings = EngineSettings::load(config.as_deref())?;
            if let Some(n) = max_cards {
                settings.max_cards = (n > 0).then_some(n);
            }
            if no_geocode {
                settings.geocode_enabled = false;
            }

            let raw = load_cards(&cards)?;
            if raw.is_empty() {
                println!("No cards found in {}.", cards.display());
                return Ok(());
            }
            let profile = SearchProfile::new(keywords)
                .with_location(location)
                .with_company(company)
                .with_min_experience(min_experience);

            let total = settings.max_cards.unwrap_or(raw.len()).min(raw.len());
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
                    .progress_chars("#>-"),
            );
            let tick = pb.clone();

            let db_path = settings.db_path.clone();
            let engine = Engine::new(settings)
                .with_observer(move |_: &ScoredCandidate| tick.inc(1));
            let report = engine.run(&raw, &profile)?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&report.candidates)?);
            } else {
                print_table(&report.candidates);
                for f in &report.failures {
                    println!("  card {} skipped: {}", f.position, f.reason);
                }
                if report.skipped > 0 {
                    println!("  {} cards not processed (deadline reached)", report.skipped);
                }
            }

            if save {
                let conn = db::connect(&db_path)?;
                db::init_schema(&conn)?;
                let inserted = db::save_candidates(&conn, &report.candidates)?;
                println!(
                    "Saved {} new candidates ({} already stored).",
                    inserted,
                    report.candidates.len() - inserted
                );
            }
        }
        Commands::Saved { limit, config } => {
            let settings = EngineSettings::load(config.as_deref())?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_candidates(&conn, Some(limit))?;
            if rows.is_empty() {
                println!("No candidates stored. Run 'rank --save' first.");
                return Ok(());
            }
            let candidates: Vec<_> = rows.into_iter().map(|r| r.candidate).collect();
            print_table(&candidates);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn load_cards(path: &Path) -> anyhow::Result<Vec<RawCard>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    } else {
        Ok(parser::parse_page(&content))
    }
}

fn print_table(candidates: &[ScoredCandidate]) {
    println!(
        "{:>3} | {:<24} | {:>5} | {:>3} {:>3} {:>3} {:>3} | {:>3} | {:<22} | {:<18}",
        "#", "Name", "Score", "Kw", "Loc", "Co", "Exp", "Yrs", "Location", "Company"
    );
    println!("{}", "-".repeat(104));
    for (i, c) in candidates.iter().enumerate() {
        let b = &c.score_breakdown;
        println!(
            "{:>3} | {:<24} | {:>5.1} | {:>3} {:>3} {:>3} {:>3} | {:>3} | {:<22} | {:<18}",
            i + 1,
            truncate(&c.name, 24),
            c.relevance_score,
            b.keywords,
            b.location,
            b.company,
            b.experience,
            c.experience_years,
            truncate(&c.location_display, 22),
            truncate(&c.company, 18),
        );
    }
    println!("\n{} candidates", candidates.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
