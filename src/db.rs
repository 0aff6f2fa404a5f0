use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::model::{ScoreBreakdown, ScoredCandidate};

pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS candidates (
            id               INTEGER PRIMARY KEY,
            candidate_id     TEXT UNIQUE NOT NULL,
            profile_url      TEXT,
            name             TEXT NOT NULL,
            skills           TEXT,
            experience_years INTEGER,
            location         TEXT,
            company          TEXT,
            relevance_score  REAL NOT NULL,
            score_breakdown  TEXT,
            search_date      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_candidates_score ON candidates(relevance_score);
        ",
    )?;
    Ok(())
}

/// Inserts new candidates; an id already on disk keeps its first stored row.
/// Returns how many rows were actually written.
pub fn save_candidates(conn: &Connection, candidates: &[ScoredCandidate]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO candidates
             (candidate_id, profile_url, name, skills, experience_years, location, company,
              relevance_score, score_breakdown)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for c in candidates {
            let breakdown = serde_json::to_string(&c.score_breakdown)?;
            count += stmt.execute(rusqlite::params![
                c.id,
                c.profile_locator,
                c.name,
                c.skills.join(", "),
                c.experience_years,
                c.location_display,
                c.company,
                c.relevance_score,
                breakdown,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct SavedCandidate {
    pub candidate: ScoredCandidate,
    pub search_date: String,
}

/// Stored candidates, best score first.
pub fn fetch_candidates(conn: &Connection, limit: Option<usize>) -> Result<Vec<SavedCandidate>> {
    let sql = format!(
        "SELECT candidate_id, profile_url, name, skills, experience_years, location, company,
                relevance_score, score_breakdown, search_date
         FROM candidates
         ORDER BY relevance_score DESC, id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            let skills: Option<String> = row.get(3)?;
            let breakdown: Option<String> = row.get(8)?;
            Ok((
                ScoredCandidate {
                    id: row.get(0)?,
                    profile_locator: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    name: row.get(2)?,
                    skills: split_skills(skills.as_deref()),
                    experience_years: row.get::<_, Option<u32>>(4)?.unwrap_or_default(),
                    location_display: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    company: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    relevance_score: row.get(7)?,
                    score_breakdown: ScoreBreakdown::default(),
                },
                breakdown,
                row.get::<_, String>(9)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(mut candidate, breakdown, search_date)| -> Result<SavedCandidate> {
            if let Some(json) = breakdown {
                candidate.score_breakdown = serde_json::from_str(&json)?;
            }
            Ok(SavedCandidate {
                candidate,
                search_date,
            })
        })
        .collect()
}

fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ──
