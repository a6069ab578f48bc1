use core_types::{Firm, Round};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// One (round identity -> participating firm) fact, registered alongside
/// the round's canonical data.
#[derive(Debug, Clone)]
pub struct RoundFact {
    pub key: String,
    pub round: Round,
}

/// Everything the run accumulates before the partner pass. Only this
/// module and the aggregation pass can touch the maps directly; worker
/// tasks go through `SharedIndex::register`.
#[derive(Debug, Default)]
pub struct IndexInner {
    /// Firm by permalink.
    pub(crate) firms: HashMap<String, Firm>,
    /// Round identity -> participating firm permalinks, in ingestion order.
    pub(crate) round_firms: HashMap<String, Vec<String>>,
    /// Round identity -> canonical round data. First writer wins; every
    /// writer for a key carries equal data.
    pub(crate) rounds: HashMap<String, Round>,
    /// (permalink, name) pairs in insertion order, positions referenced by
    /// the prefix index.
    pub(crate) name_list: Vec<(String, String)>,
    /// Lowercase word-boundary prefix -> positions in `name_list`.
    pub(crate) name_prefixes: HashMap<String, Vec<usize>>,
}

/// The process-wide aggregation index, shared by every ingestion worker
/// for the duration of one run. A single write lock covers a firm's whole
/// registration, so readers never observe a partially registered firm.
#[derive(Debug, Default)]
pub struct SharedIndex {
    inner: RwLock<IndexInner>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one firm and all of its round-participation facts
    /// atomically. Each permalink is expected to be registered at most
    /// once per run.
    pub fn register(&self, firm: Firm, facts: Vec<RoundFact>) {
        let mut inner = self.inner.write().expect("index lock poisoned");

        for fact in facts {
            inner
                .round_firms
                .entry(fact.key.clone())
                .or_default()
                .push(firm.permalink.clone());
            inner.rounds.entry(fact.key).or_insert(fact.round);
        }

        let position = inner.name_list.len();
        inner
            .name_list
            .push((firm.permalink.clone(), firm.name.clone()));
        for prefix in word_prefixes(&firm.name) {
            inner
                .name_prefixes
                .entry(prefix.to_string())
                .or_default()
                .push(position);
        }

        inner.firms.insert(firm.permalink.clone(), firm);
    }

    /// Number of firms registered so far.
    pub fn len(&self) -> usize {
        self.inner.read().expect("index lock poisoned").firms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the accumulated state out of the lock. Only called after the
    /// ingestion barrier, when no worker holds a reference anymore.
    pub fn into_inner(self) -> IndexInner {
        self.inner.into_inner().expect("index lock poisoned")
    }
}

/// The first alphanumeric of every word in `name`, lowercased: the prefix
/// alphabet the typeahead index is keyed by. Underscores join words, as in
/// the usual \b word-boundary rule.
fn word_prefixes(name: &str) -> BTreeSet<char> {
    let mut prefixes = BTreeSet::new();
    let mut boundary = true;
    for c in name.to_lowercase().chars() {
        if boundary && c.is_ascii_alphanumeric() {
            prefixes.insert(c);
        }
        boundary = !(c.is_ascii_alphanumeric() || c == '_');
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Company;

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

    fn firm(permalink: &str, name: &str) -> Firm {
        Firm::new(permalink.to_string(), name.to_string(), None, None)
    }

    #[test]
    fn test_word_prefixes() {
        let prefixes: Vec<char> = word_prefixes("Acme Venture Partners").into_iter().collect();
        assert_eq!(prefixes, vec!['a', 'p', 'v']);

        let prefixes: Vec<char> = word_prefixes("21st Century (Capital)").into_iter().collect();
        assert_eq!(prefixes, vec!['2', 'c']);
    }

    #[test]
    fn test_register_collects_round_participants() {
        let index = SharedIndex::new();
        let r = round("initech", Some(2012), "a", Some(6_000_000.0));

        index.register(
            firm("acme-ventures", "Acme Ventures"),
            vec![RoundFact {
                key: r.key(),
                round: r.clone(),
            }],
        );
        index.register(
            firm("beta-capital", "Beta Capital"),
            vec![RoundFact {
                key: r.key(),
                round: r.clone(),
            }],
        );

        let inner = index.into_inner();
        assert_eq!(inner.firms.len(), 2);
        assert_eq!(
            inner.round_firms.get(&r.key()).map(Vec::len),
            Some(2),
            "both registrations share one round key"
        );
        assert_eq!(inner.rounds.len(), 1);
        assert_eq!(inner.name_list.len(), 2);
        // "acme-ventures" is position 0; both names start with distinct
        // letters plus the shared 'v'/'c' prefixes.
        assert_eq!(inner.name_prefixes.get("a"), Some(&vec![0]));
        assert_eq!(inner.name_prefixes.get("b"), Some(&vec![1]));
        assert_eq!(inner.name_prefixes.get("v"), Some(&vec![0]));
        assert_eq!(inner.name_prefixes.get("c"), Some(&vec![1]));
    }

    #[test]
    fn test_register_first_round_data_wins() {
        let index = SharedIndex::new();
        let first = round("initech", Some(2012), "a", Some(6_000_000.0));
        let mut second = first.clone();
        second.amount = Some(7_000_000.0); // not expected in practice

        let key = first.key();
        index.register(
            firm("acme-ventures", "Acme Ventures"),
            vec![RoundFact {
                key: key.clone(),
                round: first,
            }],
        );
        index.register(
            firm("beta-capital", "Beta Capital"),
            vec![RoundFact {
                key: key.clone(),
                round: second,
            }],
        );

        let inner = index.into_inner();
        assert_eq!(inner.rounds.get(&key).unwrap().amount, Some(6_000_000.0));
    }
}
