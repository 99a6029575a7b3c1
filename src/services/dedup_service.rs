use crate::models::candidate::Candidate;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Generic venue suffixes that do not distinguish one place from another.
const GENERIC_SUFFIXES: &[&str] = &[
    "visitor center",
    "visitors center",
    "service park",
    "service area",
    "遊客中心",
    "服務園區",
    "服務區",
];

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)|（[^）]*）|\[[^\]]*\]").expect("valid regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Name key used to detect two spellings of one place. Falls back to the
/// trimmed original when stripping leaves nothing.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = parenthetical().replace_all(name, " ").to_lowercase();
    for suffix in GENERIC_SUFFIXES {
        normalized = normalized.replace(suffix, " ");
    }
    let normalized = whitespace()
        .replace_all(normalized.trim(), " ")
        .into_owned();

    if normalized.is_empty() {
        name.trim().to_string()
    } else {
        normalized
    }
}

/// Seen-set over place ids and normalized names. First occurrence wins.
#[derive(Debug, Default, Clone)]
pub struct DedupIndex {
    place_ids: HashSet<String>,
    names: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        let id_seen = candidate
            .place_id
            .as_ref()
            .is_some_and(|id| self.place_ids.contains(id));
        id_seen || self.names.contains(&normalize_name(&candidate.name))
    }

    /// Records the candidate; returns false if it duplicates an earlier one.
    pub fn insert(&mut self, candidate: &Candidate) -> bool {
        if self.contains(candidate) {
            return false;
        }
        if let Some(id) = &candidate.place_id {
            self.place_ids.insert(id.clone());
        }
        self.names.insert(normalize_name(&candidate.name));
        true
    }
}

/// Drops later duplicates, keeping input order.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index = DedupIndex::new();
    candidates
        .into_iter()
        .filter(|candidate| index.insert(candidate))
        .collect()
}
