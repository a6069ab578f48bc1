//! Bucket-boundary parsing and histogram aggregation.
//!
//! Bucket sets are written the way they appear on the site ("<100k",
//! "100 - 500k", ">30m"). Each label contributes one ascending minimum
//! threshold; a value belongs to the last bucket whose threshold it meets,
//! so a value exactly on a boundary lands in the upper bucket.

use crate::error::AnalyticsError;
use core_types::{BucketCount, Distribution};
use std::collections::HashMap;

/// One bucket: its display label and the minimum value it admits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBucket {
    pub name: String,
    pub min: i64,
}

/// An ordered set of buckets, ascending by minimum threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBuckets(Vec<ValueBucket>);

impl ValueBuckets {
    /// Parses a list of human-readable labels into bucket thresholds.
    ///
    /// A leading `<` means minimum 0. A leading `>` or a bare number is the
    /// threshold itself, scaled by 1 000 for a `k` suffix or 1 000 000 for
    /// an `m` suffix. The suffix is recognized either as the label's
    /// trailing letter or immediately before the ` - ` range separator, so
    /// `"100 - 500k"` and `"100k - 500k"` both parse to 100 000.
    pub fn parse(labels: &[&str]) -> Result<Self, AnalyticsError> {
        let mut buckets = Vec::with_capacity(labels.len());

        for &label in labels {
            let mut text = label;
            let mut scale = 1.0f64;
            let mut cut = text.find(" - ");

            let before_sep = cut
                .filter(|&i| i > 0)
                .and_then(|i| text.as_bytes().get(i - 1).copied());
            if before_sep == Some(b'k') {
                cut = cut.map(|i| i - 1);
                scale = 1_000.0;
            } else if before_sep == Some(b'm') {
                cut = cut.map(|i| i - 1);
                scale = 1_000_000.0;
            } else if let Some(stripped) = text.strip_suffix('k') {
                text = stripped;
                scale = 1_000.0;
            } else if let Some(stripped) = text.strip_suffix('m') {
                text = stripped;
                scale = 1_000_000.0;
            }

            if let Some(i) = cut {
                text = &text[..i];
            }

            let min = if text.starts_with('<') {
                0
            } else {
                let number = text.strip_prefix('>').unwrap_or(text);
                let parsed: f64 = number
                    .trim()
                    .parse()
                    .map_err(|_| AnalyticsError::InvalidBucketLabel(label.to_string()))?;
                (parsed * scale) as i64
            };

            buckets.push(ValueBucket {
                name: label.to_string(),
                min,
            });
        }

        // Label lists are written ascending already; the stable sort keeps
        // the invariant explicit without reordering well-formed input.
        buckets.sort_by_key(|b| b.min);
        Ok(Self(buckets))
    }

    /// Counts each value into the last bucket whose minimum it meets.
    /// Values below the lowest minimum are dropped, and buckets that end
    /// up empty are omitted from the result.
    pub fn aggregate(&self, values: &[i64]) -> Distribution {
        let mut counts: HashMap<&str, i64> = HashMap::new();

        for &x in values {
            let mut chosen = None;
            for bucket in &self.0 {
                if x >= bucket.min {
                    chosen = Some(bucket.name.as_str());
                }
            }
            if let Some(name) = chosen {
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        let mut dist = Distribution::default();
        for bucket in &self.0 {
            if let Some(&count) = counts.get(bucket.name.as_str()) {
                if count > dist.max {
                    dist.max = count;
                }
                dist.buckets.push(BucketCount {
                    name: bucket.name.clone(),
                    count,
                });
            }
        }
        dist
    }

    /// The parsed (label, minimum) pairs, ascending.
    pub fn thresholds(&self) -> &[ValueBucket] {
        &self.0
    }
}
