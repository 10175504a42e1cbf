//! Greedy lane assignment for horizontal event bars.

use crate::layout::{MonthBar, PendingBar};

/// Assign each `[col_start, col_end)` span to the lowest lane whose previous
/// bar has already ended.
///
/// Spans must already be sorted by `col_start`; ties keep their input order.
/// The number of lanes used equals the maximum number of spans that overlap
/// at any one column.
pub fn assign_lanes<I>(spans: I) -> Vec<u32>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut lane_ends: Vec<u32> = Vec::new();

    spans
        .into_iter()
        .map(|(col_start, col_end)| {
            let lane = lane_ends
                .iter()
                .position(|lane_end| *lane_end <= col_start)
                .unwrap_or_else(|| {
                    lane_ends.push(col_end);
                    lane_ends.len() - 1
                });
            lane_ends[lane] = col_end;
            lane as u32
        })
        .collect()
}

/// Annotate bars with their lane. The input order is preserved.
pub fn lane_pack(bars: Vec<PendingBar<'_>>) -> Vec<MonthBar<'_>> {
    let lanes = assign_lanes(bars.iter().map(|b| (b.col_start, b.col_end)));
    bars.into_iter()
        .zip(lanes)
        .map(|(bar, lane)| bar.into_bar(lane))
        .collect()
}

/// Number of lanes a packed layout occupies.
pub fn lane_count(bars: &[MonthBar<'_>]) -> u32 {
    bars.iter().map(|b| b.lane + 1).max().unwrap_or(0)
}
