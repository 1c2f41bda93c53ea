use super::aggregate::percentage;
use super::subset::{distinct_matches, pick_rate};
use crate::data::normalize::{NormalizedTable, Participant};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ChampionStats {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    matches: HashSet<String>,
    unkeyed_games: usize,
}

impl ChampionStats {
    pub fn new(name: String) -> Self {
        ChampionStats {
            name,
            games: 0,
            wins: 0,
            matches: HashSet::new(),
            unkeyed_games: 0,
        }
    }

    pub fn win_rate(&self) -> f64 {
        percentage(self.wins, self.games)
    }

    pub fn matches_played(&self) -> usize {
        self.matches.len() + self.unkeyed_games
    }

    pub fn pick_rate(&self, total_matches: usize) -> f64 {
        pick_rate(self.matches_played(), total_matches)
    }
}

/// Per-champion tallies for the overview table.
pub struct ChampionStatsTracker {
    stats: HashMap<String, ChampionStats>,
}

impl ChampionStatsTracker {
    pub fn new() -> Self {
        ChampionStatsTracker {
            stats: HashMap::new(),
        }
    }

    pub fn from_table(table: &NormalizedTable) -> Self {
        let mut tracker = Self::new();
        for p in &table.rows {
            tracker.add_participant(p);
        }
        tracker
    }

    pub fn add_participant(&mut self, p: &Participant) {
        let entry = self
            .stats
            .entry(p.champion.clone())
            .or_insert_with(|| ChampionStats::new(p.champion.clone()));

        entry.games += 1;
        entry.wins += u32::from(p.win);
        match &p.match_id {
            Some(id) => {
                entry.matches.insert(id.clone());
            }
            None => entry.unkeyed_games += 1,
        }
    }

    /// Most played first, win rate breaking ties.
    pub fn get_stats(&self) -> Vec<ChampionStats> {
        let mut stats: Vec<ChampionStats> = self.stats.values().cloned().collect();
        stats.sort_by(|a, b| {
            b.games
                .cmp(&a.games)
                .then_with(|| b.win_rate().partial_cmp(&a.win_rate()).unwrap_or(Ordering::Equal))
                .then_with(|| a.name.cmp(&b.name))
        });
        stats
    }
}

impl Default for ChampionStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Overview rows plus the total distinct match count used for pick rates.
pub fn overview(table: &NormalizedTable) -> (Vec<ChampionStats>, usize) {
    let tracker = ChampionStatsTracker::from_table(table);
    (tracker.get_stats(), distinct_matches(&table.rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::RawTable;
    use crate::data::normalize::normalize;

    #[test]
    fn overview_orders_by_games_then_win_rate() {
        let raw = RawTable::from_bytes(
            "test",
            b"matchId,champion,win\nM1,Ahri,1\nM1,Lux,0\nM2,Lux,1\nM2,Jinx,1\nM3,Ahri,0\n",
        )
        .unwrap();
        let table = normalize(raw).unwrap();
        let (stats, total) = overview(&table);
        assert_eq!(total, 3);
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ahri", "Lux", "Jinx"]);
        assert_eq!(stats[2].win_rate(), 100.0);
        assert_eq!(stats[0].pick_rate(total), 66.67);
        assert_eq!(stats[1].matches_played(), 2);
    }
}
