//! Top-N selection with cash padding.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::trend_filter::Eligibility;
use crate::domain::{Holding, Selection};
use crate::indicators::MomentumScores;

/// How the trend filter and the momentum rank combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Keep eligible instruments, rank them, take the top N.
    #[default]
    FilterThenRank,
    /// Rank everything, take the top N, turn non-eligible picks into cash.
    RankThenFilter,
}

/// Scored instruments by descending score, ties broken by ascending symbol.
pub fn rank(scores: &MomentumScores) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = scores.iter().map(|(s, v)| (s.as_str(), *v)).collect();
    ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    ranked
}

/// Build a selection of exactly `n` slots.
///
/// An instrument missing from `eligibility` is treated as ineligible.
pub fn select(
    scores: &MomentumScores,
    eligibility: &Eligibility,
    n: usize,
    mode: SelectionMode,
) -> Selection {
    let is_eligible = |symbol: &str| eligibility.get(symbol).is_some_and(|r| r.eligible);
    let ranked = rank(scores);

    let mut holdings: Vec<Holding> = match mode {
        SelectionMode::FilterThenRank => ranked
            .into_iter()
            .filter(|(symbol, _)| is_eligible(symbol))
            .take(n)
            .map(|(symbol, _)| Holding::Instrument(symbol.to_string()))
            .collect(),
        SelectionMode::RankThenFilter => ranked
            .into_iter()
            .take(n)
            .map(|(symbol, _)| {
                if is_eligible(symbol) {
                    Holding::Instrument(symbol.to_string())
                } else {
                    Holding::Cash
                }
            })
            .collect(),
    };

    // Cash slots always sit after the instruments
    holdings.sort_by_key(Holding::is_cash);
    holdings.resize(n, Holding::Cash);
    Selection::new(holdings)
}
