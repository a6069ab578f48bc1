//! # Fundscope Aggregation Engine
//!
//! One batch pass over every firm's investment record: concurrent
//! ingestion into a shared cross-reference index, a hard barrier, then the
//! sequential pass that derives the co-investment network and finalizes
//! each firm's distributions.
//!
//! ## Architectural Principles
//!
//! - **One lock, entity-scoped writes:** the `SharedIndex` is the only
//!   cross-task mutable state. Workers take its write lock once per firm,
//!   so a firm's registration is atomic and a half-registered firm is
//!   never observable.
//! - **Barrier before derivation:** partner relationships only emerge once
//!   every record has been seen, so `run` joins the whole worker pool
//!   before the aggregation pass reads the index -- by then it owns the
//!   state outright and no lock is involved.

use api_client::RecordSource;
use std::sync::Arc;

// Declare the modules that constitute this crate.
pub mod buckets;
pub mod error;
pub mod index;
pub mod ingest;
pub mod partners;

// Re-export the key components to create a clean, public-facing API.
pub use buckets::{CanonicalBuckets, ROUND_CODE_BUCKETS};
pub use error::EngineError;
pub use index::{IndexInner, RoundFact, SharedIndex};
pub use ingest::{IngestOptions, build_firm, ingest};
pub use partners::{ResultSet, aggregate};

/// Runs the whole engine: ingest every permalink through the worker pool,
/// wait out the barrier, then derive the partner network and final
/// distributions. The returned result set is immutable.
pub async fn run(
    source: Arc<dyn RecordSource>,
    permalinks: Vec<String>,
    opts: IngestOptions,
) -> Result<ResultSet, EngineError> {
    let index = Arc::new(SharedIndex::new());
    ingest::ingest(source, Arc::clone(&index), permalinks, &opts).await?;

    // Every worker has exited, so this is the last reference.
    let index = Arc::into_inner(index).ok_or(EngineError::IndexStillShared)?;
    partners::aggregate(index.into_inner(), opts.min_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::SourceError;
    use async_trait::async_trait;
    use core_types::{Company, DirectoryEntry, Firm, FirmRecord, Investment, Round};
    use std::collections::HashMap;

    struct MockSource {
        records: HashMap<String, FirmRecord>,
    }

    #[async_trait]
    impl RecordSource for MockSource {
        async fn firm_record(&self, permalink: &str) -> Result<FirmRecord, SourceError> {
            self.records
                .get(permalink)
                .cloned()
                .ok_or_else(|| SourceError::Status(permalink.to_string(), 404))
        }

        async fn directory_page(&self, _page: u32) -> Result<Vec<DirectoryEntry>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn round(company: &str, year: Option<i32>, code: &str, amount: Option<f64>) -> Round {
        Round {
            code: code.to_string(),
            amount,
            year,
            company: Company {
                name: company.to_uppercase(),
                permalink: company.to_string(),
            },
        }
    }

    fn record(permalink: &str, rounds: Vec<Round>) -> FirmRecord {
        FirmRecord {
            name: permalink.to_uppercase(),
            permalink: permalink.to_string(),
            url: None,
            overview: None,
            investments: rounds
                .into_iter()
                .map(|r| Investment { round: Some(r) })
                .collect(),
        }
    }

    /// A small fixed corpus with co-investments, a failing fetch, and a
    /// firm with no participations.
    fn corpus() -> MockSource {
        let mut records = HashMap::new();
        for rec in [
            record(
                "acme-ventures",
                vec![
                    round("initech", Some(2010), "a", Some(4_000_000.0)),
                    round("globex", Some(2010), "seed", Some(900_000.0)),
                    round("hooli", Some(2011), "b", Some(12_000_000.0)),
                    round("vandelay", Some(2011), "a", None),
                    round("initech", Some(2012), "b", Some(9_000_000.0)),
                ],
            ),
            record(
                "beta-capital",
                vec![
                    round("initech", Some(2010), "a", Some(4_000_000.0)),
                    round("hooli", Some(2011), "b", Some(12_000_000.0)),
                    round("initech", Some(2012), "b", Some(9_000_000.0)),
                    round("duff", Some(2013), "debt_round", Some(2_000_000.0)),
                ],
            ),
            record(
                "gamma-partners",
                vec![
                    round("hooli", Some(2011), "b", Some(12_000_000.0)),
                    round("duff", Some(2013), "debt_round", Some(2_000_000.0)),
                ],
            ),
            record("empty-fund", vec![]),
        ] {
            records.insert(rec.permalink.clone(), rec);
        }
        MockSource { records }
    }

    fn opts(workers: usize) -> IngestOptions {
        IngestOptions {
            workers,
            min_year: 2005,
            max_year: 2026,
        }
    }

    fn permalinks() -> Vec<String> {
        [
            "acme-ventures",
            "beta-capital",
            "gamma-partners",
            "empty-fund",
            "no-such-firm",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Asserts the order-independent parts of two firms match: the
    /// statistics the concurrency property is stated over.
    fn assert_same_statistics(a: &Firm, b: &Firm, workers: usize) {
        let context = format!("firm {} at {} workers", a.permalink, workers);
        assert_eq!(a.rounds_by_code, b.rounds_by_code, "{}", context);
        assert_eq!(a.rounds_by_year, b.rounds_by_year, "{}", context);
        assert_eq!(a.round_sizes, b.round_sizes, "{}", context);
        assert_eq!(a.round_shares, b.round_shares, "{}", context);
        assert_eq!(a.partners, b.partners, "{}", context);
        assert_eq!(a.partner_list, b.partner_list, "{}", context);
        assert_eq!(a.series_dist, b.series_dist, "{}", context);
        assert_eq!(a.round_count_dist, b.round_count_dist, "{}", context);
        assert_eq!(a.raise_dist, b.raise_dist, "{}", context);
        assert_eq!(a.share_dist, b.share_dist, "{}", context);
        assert_eq!(a.investor_round_dist, b.investor_round_dist, "{}", context);
    }

    #[tokio::test]
    async fn test_failed_and_empty_firms_are_absent() {
        let result = run(Arc::new(corpus()), permalinks(), opts(4))
            .await
            .unwrap();

        assert_eq!(result.firms.len(), 3);
        assert!(!result.firms.contains_key("empty-fund"));
        assert!(!result.firms.contains_key("no-such-firm"));
    }

    #[tokio::test]
    async fn test_partner_network_over_corpus() {
        let result = run(Arc::new(corpus()), permalinks(), opts(4))
            .await
            .unwrap();

        let acme = &result.firms["acme-ventures"];
        let beta = &result.firms["beta-capital"];

        // acme and beta share three distinct round keys.
        assert_eq!(acme.partners["beta-capital"].rounds, 3);
        assert_eq!(beta.partners["acme-ventures"].rounds, 3);
        // acme and gamma share only the hooli round: in the ledger, never
        // surfaced.
        assert_eq!(acme.partners["gamma-partners"].rounds, 1);
        assert!(
            acme.partner_list
                .iter()
                .all(|p| p.permalink != "gamma-partners")
        );

        // Surfaced list is sorted by shared rounds, descending; the
        // percentage is the shared count over acme's own 2010-2012 rounds.
        assert_eq!(acme.partner_list[0].permalink, "beta-capital");
        assert_eq!(acme.partner_list[0].first_year, 2010);
        assert_eq!(acme.partner_list[0].last_year, 2012);
        assert_eq!(acme.partner_list[0].percentage, 60);

        // The hooli round had three participants: each gets a 4M equal
        // split.
        assert!(acme.round_shares.contains(&4_000_000));
        let gamma = &result.firms["gamma-partners"];
        assert_eq!(gamma.partner_count_set.iter().max(), Some(&3));
    }

    #[tokio::test]
    async fn test_worker_counts_do_not_change_results() {
        let baseline = run(Arc::new(corpus()), permalinks(), opts(1))
            .await
            .unwrap();

        for workers in [4, 50] {
            let result = run(Arc::new(corpus()), permalinks(), opts(workers))
                .await
                .unwrap();

            assert_eq!(result.firms.len(), baseline.firms.len());
            for (permalink, firm) in &baseline.firms {
                assert_same_statistics(firm, &result.firms[permalink], workers);
            }

            // The prefix index keys the same alphabet regardless of
            // registration order.
            let mut baseline_keys: Vec<_> = baseline.name_prefixes.keys().collect();
            let mut keys: Vec<_> = result.name_prefixes.keys().collect();
            baseline_keys.sort();
            keys.sort();
            assert_eq!(baseline_keys, keys);
        }
    }
}
