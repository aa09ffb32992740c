//! String similarity scorers on a 0-100 scale.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Scorer used to compare a ranked title with a feed entry title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMetric {
    /// Levenshtein ratio where a substitution costs a deletion plus an
    /// insertion, so truncated titles keep a high score
    #[default]
    Levenshtein,
    /// Jaro-Winkler similarity, more forgiving of shared prefixes
    JaroWinkler,
    /// Sørensen-Dice coefficient over character bigrams
    SorensenDice,
}

impl SimilarityMetric {
    pub fn score(&self, a: &str, b: &str) -> u8 {
        match self {
            SimilarityMetric::Levenshtein => levenshtein_ratio(a, b),
            SimilarityMetric::JaroWinkler => to_ratio(strsim::jaro_winkler(a, b)),
            SimilarityMetric::SorensenDice => to_ratio(strsim::sorensen_dice(a, b)),
        }
    }

    /// Parse a metric name as used on the command line, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

/// `100 * (len_a + len_b - indel_distance) / (len_a + len_b)`, rounded, with
/// lengths in characters. Two empty strings are identical.
pub fn levenshtein_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }

    // indel distance is total - 2 * LCS
    let matched = 2 * longest_common_subsequence(&a, &b);
    to_ratio(matched as f64 / total as f64)
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn to_ratio(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
