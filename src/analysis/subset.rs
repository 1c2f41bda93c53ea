use super::aggregate::round_to;
use crate::data::normalize::{NormalizedTable, Participant};
use std::collections::HashSet;

pub const GOLD_SPIKE_BINS: usize = 20;
pub const CORE_TIMING_BINS: usize = 24;

/// Match identity for distinct counting. Rows without an id stand alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MatchKey<'a> {
    Id(&'a str),
    Row(usize),
}

fn match_key(p: &Participant) -> MatchKey<'_> {
    match p.match_id.as_deref() {
        Some(id) => MatchKey::Id(id),
        None => MatchKey::Row(p.row),
    }
}

pub fn distinct_matches<'a, I>(rows: I) -> usize
where
    I: IntoIterator<Item = &'a Participant>,
{
    rows.into_iter().map(match_key).collect::<HashSet<_>>().len()
}

/// Pick rate in percent; 0 when the dataset has no matches.
pub fn pick_rate(subset_matches: usize, total_matches: usize) -> f64 {
    if total_matches == 0 {
        0.0
    } else {
        round_to(subset_matches as f64 / total_matches as f64 * 100.0, 2)
    }
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Rows for one champion plus the match denominators.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    pub champion: String,
    pub rows: Vec<&'a Participant>,
    pub total_matches: usize,
    pub subset_matches: usize,
}

impl<'a> Subset<'a> {
    pub fn select(table: &'a NormalizedTable, champion: &str) -> Self {
        let rows: Vec<&Participant> = table
            .rows
            .iter()
            .filter(|p| p.champion == champion)
            .collect();
        let subset_matches = distinct_matches(rows.iter().copied());
        Subset {
            champion: champion.to_string(),
            rows,
            total_matches: distinct_matches(&table.rows),
            subset_matches,
        }
    }

    pub fn games(&self) -> usize {
        self.rows.len()
    }

    pub fn summary(&self) -> SummaryMetrics {
        let games = self.games();
        let wins = self.rows.iter().map(|p| u32::from(p.win)).sum::<u32>();
        let avg = |f: fn(&Participant) -> f64, decimals| {
            mean(self.rows.iter().map(|p| f(p)))
                .map(|v| round_to(v, decimals))
                .unwrap_or(0.0)
        };

        SummaryMetrics {
            games,
            wins,
            win_rate: if games == 0 {
                0.0
            } else {
                round_to(f64::from(wins) / games as f64 * 100.0, 2)
            },
            pick_rate: pick_rate(self.subset_matches, self.total_matches),
            avg_kills: avg(|p| f64::from(p.kills), 2),
            avg_deaths: avg(|p| f64::from(p.deaths), 2),
            avg_assists: avg(|p| f64::from(p.assists), 2),
            avg_kda: avg(|p| p.kda, 2),
            avg_duration_min: avg(|p| p.duration_min, 2),
            avg_dpm: mean(self.rows.iter().filter_map(|p| p.dpm)).map(|v| round_to(v, 1)),
        }
    }

    fn timeline_values(&self, f: impl Fn(&Participant) -> Option<f64>) -> Vec<f64> {
        self.rows.iter().filter_map(|p| f(p)).filter(|v| v.is_finite()).collect()
    }

    pub fn timeline(&self) -> TimelineSummary {
        let avg = |f: fn(&Participant) -> Option<f64>| mean(self.timeline_values(f)).map(|v| round_to(v, 2));
        TimelineSummary {
            first_blood_min: avg(|p| p.timeline.first_blood_min),
            blue_first_tower_min: avg(|p| p.timeline.blue_first_tower_min),
            red_first_tower_min: avg(|p| p.timeline.red_first_tower_min),
            game_end_min: avg(|p| p.timeline.game_end_min),
            gold_spike: histogram(&self.timeline_values(|p| p.timeline.gold_spike_min), GOLD_SPIKE_BINS),
        }
    }

    pub fn core_timing(&self) -> CoreTiming {
        let first = self.timeline_values(|p| p.timeline.first_core_item_min);
        let second = self.timeline_values(|p| p.timeline.second_core_item_min);
        CoreTiming {
            first_core_avg: mean(first.iter().copied()).map(|v| round_to(v, 2)),
            second_core_avg: mean(second.iter().copied()).map(|v| round_to(v, 2)),
            first_core_hist: histogram(&first, CORE_TIMING_BINS),
            second_core_hist: histogram(&second, CORE_TIMING_BINS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub games: usize,
    pub wins: u32,
    pub win_rate: f64,
    pub pick_rate: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_kda: f64,
    pub avg_duration_min: f64,
    pub avg_dpm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSummary {
    pub first_blood_min: Option<f64>,
    pub blue_first_tower_min: Option<f64>,
    pub red_first_tower_min: Option<f64>,
    pub game_end_min: Option<f64>,
    pub gold_spike: Option<Histogram>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreTiming {
    pub first_core_avg: Option<f64>,
    pub second_core_avg: Option<f64>,
    pub first_core_hist: Option<Histogram>,
    pub second_core_hist: Option<Histogram>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Equal-width bins over `[min, max]`; the last bin is closed. `None` for
/// no values.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() || bins == 0 {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Some(Histogram {
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }],
        });
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + width * i as f64,
                upper: min + width * (i + 1) as f64,
                count,
            })
            .collect(),
    })
}
