use crate::error::EngineError;
use analytics::ValueBuckets;

/// Stage codes in the order the site presents them. Codes arrive lowercase
/// from the source; these labels are matched case-insensitively.
pub const ROUND_CODE_BUCKETS: [&str; 11] = [
    "Angel",
    "Seed",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "Debt",
    "Unattributed",
];

/// The three numeric bucket sets every firm's distributions are built
/// against, parsed once per aggregation run.
pub struct CanonicalBuckets {
    /// Raised-amount buckets for the raise-size mix.
    pub sizes: ValueBuckets,
    /// Equal-split buckets for the per-round-share mix.
    pub shares: ValueBuckets,
    /// Rounds-per-company buckets for the round-count mix.
    pub counts: ValueBuckets,
}

impl CanonicalBuckets {
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            sizes: ValueBuckets::parse(&[
                "<100k", "100 - 500k", "500k - 1m", "1 - 3m", "3 - 5m", "5 - 10m", "10 - 30m",
                ">30m",
            ])?,
            shares: ValueBuckets::parse(&[
                "<100k", "100 - 250k", "250k - 1m", "1 - 3m", "3 - 5m", "5 - 10m", "10 - 30m",
                ">30m",
            ])?,
            counts: ValueBuckets::parse(&["1", "2", "3", "4", "5", "6"])?,
        })
    }
}
