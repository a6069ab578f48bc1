use crate::buckets::{CanonicalBuckets, ROUND_CODE_BUCKETS};
use crate::error::EngineError;
use crate::index::IndexInner;
use analytics::{mean, round_int};
use core_types::{BucketCount, Distribution, Firm, PartnerEntry};
use std::collections::HashMap;
use tracing::info;

/// The finalized output of one run, read-only from here on: the computed
/// firms plus the typeahead payload for the rendering stage.
#[derive(Debug)]
pub struct ResultSet {
    pub firms: HashMap<String, Firm>,
    /// (permalink, name) pairs in registration order.
    pub name_list: Vec<(String, String)>,
    /// Lowercase word prefix -> positions in `name_list`, each posting
    /// list sorted by total participation count descending.
    pub name_prefixes: HashMap<String, Vec<usize>>,
}

/// Derives the partner network and finalizes every firm's distributions.
/// Runs strictly after the ingestion barrier, so it owns the index state
/// outright and needs no lock.
pub fn aggregate(mut inner: IndexInner, min_year: i32) -> Result<ResultSet, EngineError> {
    let buckets = CanonicalBuckets::new()?;

    // First pass: walk every round's participant list and update each
    // participant's ledger with its co-participants.
    for (key, participants) in &inner.round_firms {
        let Some(round) = inner.rounds.get(key) else {
            continue;
        };
        let participant_count = participants.len();

        for permalink in participants {
            let Some(firm) = inner.firms.get_mut(permalink) else {
                continue;
            };

            for other in participants {
                if other == permalink {
                    continue;
                }
                let entry = firm.partners.entry(other.clone()).or_default();
                entry.rounds += 1;
                if let Some(year) = round.year {
                    if year >= min_year {
                        if entry.first_year == 0 || entry.first_year > year {
                            entry.first_year = year;
                        }
                        if entry.last_year == 0 || entry.last_year < year {
                            entry.last_year = year;
                        }
                    }
                }
            }

            if let Some(amount) = round.amount {
                if amount >= 1.0 {
                    // Each participant's equal split of the round, a
                    // simplifying approximation rather than an allocation.
                    firm.round_shares
                        .push(round_int(amount / participant_count as f64));
                }
            }

            firm.partner_count_set.push(participant_count as i64);
            firm.partners_by_round
                .entry(round.code.clone())
                .or_default()
                .push(participant_count as i64 - 1);
        }
    }

    // Second pass, once per firm: finalize distributions and surface the
    // partner list.
    let names: HashMap<String, String> = inner
        .firms
        .iter()
        .map(|(permalink, firm)| (permalink.clone(), firm.name.clone()))
        .collect();

    for firm in inner.firms.values_mut() {
        firm.round_shares.sort_unstable();
        firm.share_dist = buckets.shares.aggregate(&firm.round_shares);
        firm.raise_dist = buckets.sizes.aggregate(&firm.round_sizes);

        let company_round_counts: Vec<i64> = firm.rounds_by_company.values().copied().collect();
        firm.round_count_dist = buckets.counts.aggregate(&company_round_counts);

        firm.series_dist = stage_distribution(&firm.rounds_by_code);
        firm.investor_round_dist = co_investor_distribution(&firm.partners_by_round);

        let mut partner_list = Vec::with_capacity(firm.partners.len());
        for (permalink, partner) in &mut firm.partners {
            // Single shared rounds stay in the ledger but are never
            // surfaced.
            if partner.rounds < 2 {
                continue;
            }

            let own_rounds: i64 = (partner.first_year..=partner.last_year)
                .map(|year| firm.rounds_by_year.get(&year).copied().unwrap_or(0))
                .sum();
            partner.percentage = if own_rounds > 0 {
                ((partner.rounds as f64 / own_rounds as f64) * 100.0).floor() as i64
            } else {
                // A ledger interval with no countable rounds would divide
                // by zero; sparse data earns a 0 instead.
                0
            };

            partner_list.push(PartnerEntry {
                permalink: permalink.clone(),
                name: names.get(permalink).cloned().unwrap_or_default(),
                rounds: partner.rounds,
                percentage: partner.percentage,
                first_year: partner.first_year,
                last_year: partner.last_year,
            });
        }
        partner_list.sort_by(|a, b| b.rounds.cmp(&a.rounds));
        firm.partner_list = partner_list;
    }

    // Typeahead posting lists rank firms by how much they invest.
    {
        let weights: HashMap<&str, usize> = inner
            .firms
            .iter()
            .map(|(permalink, firm)| (permalink.as_str(), firm.total_rounds))
            .collect();
        let name_list = &inner.name_list;
        let weight = |i: usize| {
            name_list
                .get(i)
                .and_then(|(permalink, _)| weights.get(permalink.as_str()))
                .copied()
                .unwrap_or(0)
        };
        for positions in inner.name_prefixes.values_mut() {
            positions.sort_by(|&a, &b| weight(b).cmp(&weight(a)));
        }
    }

    info!(firms = inner.firms.len(), "partner aggregation complete");

    Ok(ResultSet {
        firms: inner.firms,
        name_list: inner.name_list,
        name_prefixes: inner.name_prefixes,
    })
}

/// Stage mix: direct per-code counts presented in canonical stage order.
fn stage_distribution(rounds_by_code: &HashMap<String, i64>) -> Distribution {
    let mut dist = Distribution::default();
    for label in ROUND_CODE_BUCKETS {
        if let Some(&count) = rounds_by_code.get(&label.to_lowercase()) {
            if count > dist.max {
                dist.max = count;
            }
            dist.buckets.push(BucketCount {
                name: label.to_string(),
                count,
            });
        }
    }
    dist
}

/// Partner-round-count mix: the rounded mean co-investor count per stage,
/// in canonical stage order.
fn co_investor_distribution(partners_by_round: &HashMap<String, Vec<i64>>) -> Distribution {
    let mut dist = Distribution::default();
    for label in ROUND_CODE_BUCKETS {
        if let Some(counts) = partners_by_round.get(&label.to_lowercase()) {
            let count = round_int(mean(counts));
            if count > dist.max {
                dist.max = count;
            }
            dist.buckets.push(BucketCount {
                name: label.to_string(),
                count,
            });
        }
    }
    dist
}
