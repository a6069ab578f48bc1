use crate::index::{RoundFact, SharedIndex};
use api_client::RecordSource;
use core_types::{Firm, FirmRecord};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::error::EngineError;

/// Knobs for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Number of long-lived fetch workers.
    pub workers: usize,
    /// Years before this are excluded from year-keyed aggregates.
    pub min_year: i32,
    /// Usually the current year; per-year value sets stop short of it
    /// because the year in progress is incomplete.
    pub max_year: i32,
}

/// Derives a firm's local statistics from its decoded record: everything
/// computable without seeing any other firm, plus the round-participation
/// facts to register with the shared index.
///
/// Returns `None` for records with no usable participation; such firms
/// never enter the index.
pub fn build_firm(
    record: FirmRecord,
    min_year: i32,
    max_year: i32,
) -> Option<(Firm, Vec<RoundFact>)> {
    if record.investments.is_empty() {
        return None;
    }

    let mut firm = Firm::new(record.permalink, record.name, record.url, record.overview);
    firm.total_rounds = record.investments.len();

    let mut facts = Vec::with_capacity(record.investments.len());
    let mut companies_by_year: HashMap<i32, HashSet<String>> = HashMap::new();

    for investment in record.investments {
        let Some(mut round) = investment.round else {
            continue;
        };

        // The identity key keeps the code exactly as the wire had it; the
        // statistics below see the normalized form.
        let key = round.key();
        if round.code == "debt_round" {
            round.code = "debt".to_string();
        }

        *firm.rounds_by_code.entry(round.code.clone()).or_insert(0) += 1;

        if let Some(year) = round.year {
            if year >= min_year {
                *firm.rounds_by_year.entry(year).or_insert(0) += 1;
                companies_by_year
                    .entry(year)
                    .or_default()
                    .insert(round.company.permalink.clone());
            }
        }

        *firm
            .rounds_by_company
            .entry(round.company.clone())
            .or_insert(0) += 1;

        if let Some(amount) = round.amount {
            if amount >= 1.0 {
                firm.round_sizes.push(amount as i64);
            }
        }

        facts.push(RoundFact { key, round });
    }

    if facts.is_empty() {
        return None;
    }

    firm.round_sizes.sort_unstable();

    for (year, companies) in companies_by_year {
        firm.companies_by_year.insert(year, companies.len() as i64);
    }
    firm.total_companies = firm.rounds_by_company.len();

    firm.year_round_set = firm
        .rounds_by_year
        .iter()
        .filter(|&(&year, _)| year < max_year)
        .map(|(_, &count)| count)
        .collect();
    firm.year_round_set.sort_unstable();

    firm.year_company_set = firm
        .companies_by_year
        .iter()
        .filter(|&(&year, _)| year < max_year)
        .map(|(_, &count)| count)
        .collect();
    firm.year_company_set.sort_unstable();

    Some((firm, facts))
}

/// Runs the concurrent ingestion phase: exactly `opts.workers` long-lived
/// tasks pull permalinks from one shared queue, fetch and decode each
/// record, and register the result with the shared index. A fetch or
/// decode failure skips that firm and the run continues.
///
/// Returns only once every worker has drained the queue and exited -- the
/// hard barrier the aggregation phase relies on.
pub async fn ingest(
    source: Arc<dyn RecordSource>,
    index: Arc<SharedIndex>,
    permalinks: Vec<String>,
    opts: &IngestOptions,
) -> Result<(), EngineError> {
    let workers = opts.workers.max(1);

    let (tx, rx) = mpsc::channel::<String>(workers);
    let rx = Arc::new(Mutex::new(rx));

    let progress = ProgressBar::new(permalinks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map_err(|e| EngineError::ProgressTemplate(e.to_string()))?
            .progress_chars("#>-"),
    );

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = Arc::clone(&rx);
        let source = Arc::clone(&source);
        let index = Arc::clone(&index);
        let progress = progress.clone();
        let (min_year, max_year) = (opts.min_year, opts.max_year);

        handles.push(tokio::spawn(async move {
            loop {
                // Hold the queue only long enough to take one item; the
                // fetch itself runs unlocked.
                let next = { queue.lock().await.recv().await };
                let Some(permalink) = next else {
                    break;
                };

                match source.firm_record(&permalink).await {
                    Ok(record) => {
                        if let Some((firm, facts)) = build_firm(record, min_year, max_year) {
                            index.register(firm, facts);
                        }
                    }
                    Err(e) => warn!(%permalink, error = %e, "skipping firm: fetch failed"),
                }
                progress.inc(1);
            }
        }));
    }

    for permalink in permalinks {
        if tx.send(permalink).await.is_err() {
            break; // every worker is gone; nothing left to feed
        }
    }
    drop(tx);

    // The barrier: all workers have signalled completion by returning.
    for result in join_all(handles).await {
        if let Err(e) = result {
            warn!(error = %e, "ingestion worker panicked");
        }
    }
    progress.finish_and_clear();

    Ok(())
}
