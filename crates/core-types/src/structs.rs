use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One entry of the paginated firm directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    pub permalink: String,
}

/// A firm's record as decoded from the data source, before any statistics
/// have been derived from it.
#[derive(Debug, Clone, Deserialize)]
pub struct FirmRecord {
    pub name: String,
    pub permalink: String,
    #[serde(rename = "homepage_url")]
    pub url: Option<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub investments: Vec<Investment>,
}

/// A single funding-round participation inside a firm record.
#[derive(Debug, Clone, Deserialize)]
pub struct Investment {
    #[serde(rename = "funding_round")]
    pub round: Option<Round>,
}

/// A funding event. Two firms' records describing the same event carry
/// equal data here; the event's identity is the (company, year, code)
/// composite key, not a source-provided round id.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Round {
    #[serde(rename = "round_code")]
    pub code: String,
    #[serde(rename = "raised_amount")]
    pub amount: Option<f64>,
    #[serde(rename = "funded_year")]
    pub year: Option<i32>,
    pub company: Company,
}

impl Round {
    /// The composite identity under which co-participation is recognized.
    /// Built from the code as it appears on the wire, before normalization.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.company.permalink,
            self.year.unwrap_or(0),
            self.code
        )
    }
}

/// The company a round was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Company {
    pub name: String,
    pub permalink: String,
}

/// A ledger entry for one co-investor, keyed by that co-investor's
/// permalink on the owning firm. `first_year`/`last_year` stay 0 until a
/// shared round with a usable year is seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partner {
    pub rounds: i64,
    pub percentage: i64,
    pub first_year: i32,
    pub last_year: i32,
}

/// A surfaced partner relationship, carried in each firm's sorted partner
/// list. Ledger entries with fewer than two shared rounds never become one
/// of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerEntry {
    pub permalink: String,
    pub name: String,
    pub rounds: i64,
    pub percentage: i64,
    pub first_year: i32,
    pub last_year: i32,
}

/// A labeled histogram: per-bucket counts plus the maximum count, which the
/// rendering stage uses to scale bars. Buckets with zero observations are
/// not present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub max: i64,
    pub buckets: Vec<BucketCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub name: String,
    pub count: i64,
}

/// An investing firm together with everything derived from its record.
///
/// The maps marked `serde(skip)` are working state for the aggregation
/// passes; only the finalized statistics are part of the exported result
/// set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firm {
    pub permalink: String,
    pub name: String,
    pub url: Option<String>,
    pub overview: Option<String>,

    pub rounds_by_code: HashMap<String, i64>,
    pub rounds_by_year: BTreeMap<i32, i64>,
    #[serde(skip)]
    pub rounds_by_company: HashMap<Company, i64>,
    pub companies_by_year: BTreeMap<i32, i64>,

    /// Participation amounts (>= 1), ascending.
    pub round_sizes: Vec<i64>,
    /// Equal splits of each round this firm appeared in, ascending once
    /// finalized.
    pub round_shares: Vec<i64>,
    /// Per-year round counts as a sorted value set, current year excluded.
    pub year_round_set: Vec<i64>,
    /// Per-year distinct-company counts as a sorted value set, current year
    /// excluded.
    pub year_company_set: Vec<i64>,

    /// Participant count of every round this firm appeared in.
    pub partner_count_set: Vec<i64>,
    #[serde(skip)]
    pub partners_by_round: HashMap<String, Vec<i64>>,
    #[serde(skip)]
    pub partners: HashMap<String, Partner>,

    pub series_dist: Distribution,
    pub round_count_dist: Distribution,
    pub raise_dist: Distribution,
    pub share_dist: Distribution,
    pub investor_round_dist: Distribution,

    pub partner_list: Vec<PartnerEntry>,

    pub total_companies: usize,
    pub total_rounds: usize,
}

impl Firm {
    /// Creates a firm with its identity fields set and every statistic
    /// empty, ready for the ingestion pass to fill in.
    pub fn new(
        permalink: String,
        name: String,
        url: Option<String>,
        overview: Option<String>,
    ) -> Self {
        Self {
            permalink,
            name,
            url,
            overview,
            rounds_by_code: HashMap::new(),
            rounds_by_year: BTreeMap::new(),
            rounds_by_company: HashMap::new(),
            companies_by_year: BTreeMap::new(),
            round_sizes: Vec::new(),
            round_shares: Vec::new(),
            year_round_set: Vec::new(),
            year_company_set: Vec::new(),
            partner_count_set: Vec::new(),
            partners_by_round: HashMap::new(),
            partners: HashMap::new(),
            series_dist: Distribution::default(),
            round_count_dist: Distribution::default(),
            raise_dist: Distribution::default(),
            share_dist: Distribution::default(),
            investor_round_dist: Distribution::default(),
            partner_list: Vec::new(),
            total_companies: 0,
            total_rounds: 0,
        }
    }
}
