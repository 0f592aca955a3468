//! Chart and table projection of aggregated groups

use serde::Serialize;

use crate::aggregate::{self, ClassSummary, GroupTotal};
use crate::constants;

/// A labelled value ready for a chart or headline card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
    /// Whole-percent share of the full total (shares may not sum to 100)
    pub percent: u32,
}

/// Palette colour for a position, wrapping past the end
pub fn palette_color(index: usize) -> &'static str {
    constants::PALETTE[index % constants::PALETTE.len()]
}

/// Whole-percent share of `total`, 0 when the total is 0
pub fn percent_share(value: f64, total: f64) -> u32 {
    if total == 0.0 || !total.is_finite() || !value.is_finite() {
        return 0;
    }
    (value / total * 100.0).round().max(0.0) as u32
}

/// First `n` items of an already-sorted slice
pub fn top_n<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}

/// Sort by total, keep the top `n`, and assign colours and shares of the full total
pub fn chart_slices(groups: &[GroupTotal], n: usize) -> Vec<ChartSlice> {
    let total = aggregate::grand_total(groups);
    let mut sorted = groups.to_vec();
    aggregate::sort_by_total(&mut sorted);

    top_n(&sorted, n)
        .into_iter()
        .enumerate()
        .map(|(i, g)| ChartSlice {
            percent: percent_share(g.total, total),
            label: g.key,
            value: g.total,
            color: palette_color(i),
        })
        .collect()
}

/// Headline cards (top 3)
pub fn headline(groups: &[GroupTotal]) -> Vec<ChartSlice> {
    chart_slices(groups, constants::HEADLINE_TOP_N)
}

/// Mini chart (top 4)
pub fn mini_chart(groups: &[GroupTotal]) -> Vec<ChartSlice> {
    chart_slices(groups, constants::MINI_CHART_TOP_N)
}

/// Workshop popularity: each class type's share of all guests (top 6)
pub fn popularity(classes: &[ClassSummary]) -> Vec<ChartSlice> {
    let guests: Vec<GroupTotal> = classes
        .iter()
        .map(|c| GroupTotal {
            key: c.class_type.clone(),
            total: c.guests as f64,
            count: c.workshops,
        })
        .collect();
    chart_slices(&guests, constants::POPULARITY_TOP_N)
}
