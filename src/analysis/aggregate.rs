use super::canonical::{canonicalize_pair, normalize_key, AliasTable, AssetKind};
use crate::data::normalize::{is_empty_token, Participant};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Number of leading core items that make up a build.
pub const BUILD_LENGTH: usize = 3;

/// One group of a group-by. `key` has one member for single values and
/// several for combos and builds.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    pub key: Vec<String>,
    pub picks: u32,
    pub wins: u32,
    pub win_rate: f64,
}

impl AggregationRow {
    pub fn label(&self) -> String {
        self.key.join(" + ")
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Percentage rounded to 2 decimals; 0 when there is nothing to divide by.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(f64::from(part) / f64::from(whole) * 100.0, 2)
    }
}

/// Placeholder and configured junk tokens dropped before grouping.
#[derive(Debug, Clone, Default)]
pub struct JunkFilter {
    tokens: HashSet<String>,
}

impl JunkFilter {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        JunkFilter {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn is_junk(&self, value: &str) -> bool {
        is_empty_token(value) || self.tokens.contains(&value.trim().to_lowercase())
    }
}

/// Decides which items count toward a build. Supplied by the caller: either
/// the static lists below or a Data Dragon catalog.
pub trait ItemClassifier {
    fn is_boots(&self, item: &str) -> bool;
    fn is_core(&self, item: &str) -> bool;
}

const BOOTS: &[&str] = &[
    "Boots",
    "1001",
    "Berserker's Greaves",
    "3006",
    "Boots of Swiftness",
    "3009",
    "Symbiotic Soles",
    "3010",
    "Synchronized Souls",
    "3013",
    "Sorcerer's Shoes",
    "3020",
    "Plated Steelcaps",
    "3047",
    "Mercury's Treads",
    "3111",
    "Mobility Boots",
    "3117",
    "Ionian Boots of Lucidity",
    "3158",
];

const NON_CORE: &[&str] = &[
    "Health Potion",
    "2003",
    "Refillable Potion",
    "2031",
    "Corrupting Potion",
    "2033",
    "Control Ward",
    "2055",
    "Doran's Blade",
    "1055",
    "Doran's Ring",
    "1056",
    "Doran's Shield",
    "1054",
    "Tear of the Goddess",
    "3070",
    "Dark Seal",
    "1082",
    "Cull",
    "1083",
    "Guardian's Horn",
    "2051",
    "Guardian's Orb",
    "3112",
    "Guardian's Blade",
    "3177",
    "Guardian's Hammer",
    "3184",
    "Long Sword",
    "1036",
    "Amplifying Tome",
    "1052",
    "Ruby Crystal",
    "1028",
    "Sapphire Crystal",
    "1027",
    "Cloth Armor",
    "1029",
    "Null-Magic Mantle",
    "1033",
    "Dagger",
    "1042",
];

/// Offline classifier built from fixed boots and starter/component lists.
#[derive(Debug, Clone)]
pub struct StaticItemClassifier {
    boots: HashSet<String>,
    non_core: HashSet<String>,
}

impl Default for StaticItemClassifier {
    fn default() -> Self {
        let fold = |list: &[&str]| list.iter().map(|s| s.to_lowercase()).collect();
        StaticItemClassifier {
            boots: fold(BOOTS),
            non_core: fold(NON_CORE),
        }
    }
}

impl ItemClassifier for StaticItemClassifier {
    fn is_boots(&self, item: &str) -> bool {
        self.boots.contains(&item.trim().to_lowercase())
    }

    fn is_core(&self, item: &str) -> bool {
        let key = item.trim().to_lowercase();
        !self.boots.contains(&key) && !self.non_core.contains(&key)
    }
}

#[derive(Default)]
struct Groups {
    counts: HashMap<Vec<String>, (u32, u32)>,
}

impl Groups {
    fn add(&mut self, key: Vec<String>, win: u8) {
        let entry = self.counts.entry(key).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u32::from(win);
    }

    fn finish(self, top_n: usize) -> Vec<AggregationRow> {
        let mut rows: Vec<AggregationRow> = self
            .counts
            .into_iter()
            .map(|(key, (picks, wins))| AggregationRow {
                key,
                picks,
                wins,
                win_rate: percentage(wins, picks),
            })
            .collect();
        rows.sort_by(compare_rows);
        rows.truncate(top_n);
        rows
    }
}

/// Volume first, then win rate, then key for a stable order.
fn compare_rows(a: &AggregationRow, b: &AggregationRow) -> Ordering {
    b.picks
        .cmp(&a.picks)
        .then_with(|| b.win_rate.partial_cmp(&a.win_rate).unwrap_or(Ordering::Equal))
        .then_with(|| a.key.cmp(&b.key))
}

/// Bag aggregation over `(value, win)` occurrences. Slot position is ignored.
pub fn aggregate_values<'a, I>(occurrences: I, junk: &JunkFilter, top_n: usize) -> Vec<AggregationRow>
where
    I: IntoIterator<Item = (&'a str, u8)>,
{
    let mut groups = Groups::default();
    for (value, win) in occurrences {
        if junk.is_junk(value) {
            continue;
        }
        groups.add(vec![value.trim().to_string()], win);
    }
    groups.finish(top_n)
}

pub fn item_stats(rows: &[&Participant], junk: &JunkFilter, top_n: usize) -> Vec<AggregationRow> {
    let occurrences = rows
        .iter()
        .flat_map(|p| p.items.iter().map(move |item| (item.as_str(), p.win)));
    aggregate_values(occurrences, junk, top_n)
}

/// Union of first and second core item names.
pub fn core_item_stats(rows: &[&Participant], junk: &JunkFilter, top_n: usize) -> Vec<AggregationRow> {
    let occurrences = rows.iter().flat_map(|p| {
        [
            p.timeline.first_core_item_name.as_deref(),
            p.timeline.second_core_item_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(move |name| (name, p.win))
    });
    aggregate_values(occurrences, junk, top_n)
}

/// Champions that appeared on the same team, excluding the player's own pick.
pub fn teammate_stats(rows: &[&Participant], top_n: usize) -> Vec<AggregationRow> {
    let junk = JunkFilter::default();
    let occurrences = rows.iter().flat_map(|p| {
        p.team_champs
            .iter()
            .filter(move |c| c.trim() != p.champion)
            .map(move |c| (c.as_str(), p.win))
    });
    aggregate_values(occurrences, &junk, top_n)
}

pub fn opponent_stats(rows: &[&Participant], top_n: usize) -> Vec<AggregationRow> {
    let junk = JunkFilter::default();
    let occurrences = rows
        .iter()
        .flat_map(|p| p.enemy_champs.iter().map(move |c| (c.as_str(), p.win)));
    aggregate_values(occurrences, &junk, top_n)
}

/// Keeps the first label seen for each normalized form, so case variants of
/// a label outside the alias table land in one group.
#[derive(Default)]
struct DisplayLabels {
    first_seen: HashMap<String, String>,
}

impl DisplayLabels {
    fn fold(&mut self, label: String) -> String {
        self.first_seen
            .entry(normalize_key(&label))
            .or_insert(label)
            .clone()
    }
}

/// Unordered pair aggregation. Rows with a missing member are skipped.
pub fn spell_pair_stats(rows: &[&Participant], aliases: &AliasTable, top_n: usize) -> Vec<AggregationRow> {
    let mut groups = Groups::default();
    let mut labels = DisplayLabels::default();
    let mut skipped = 0usize;
    for p in rows {
        match (p.spell1.as_deref(), p.spell2.as_deref()) {
            (Some(a), Some(b)) => {
                let (first, second) = canonicalize_pair(aliases, AssetKind::Spell, a, b);
                groups.add(vec![labels.fold(first), labels.fold(second)], p.win);
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("Spell combos: skipped {} rows with a missing spell", skipped);
    }
    groups.finish(top_n)
}

/// Ordered pair aggregation: primary tree first, secondary second. Members go
/// through the alias table individually so tree ids and names merge.
pub fn rune_pair_stats(rows: &[&Participant], aliases: &AliasTable, top_n: usize) -> Vec<AggregationRow> {
    let mut groups = Groups::default();
    let mut labels = DisplayLabels::default();
    for p in rows {
        if let (Some(core), Some(sub)) = (p.rune_core.as_deref(), p.rune_sub.as_deref()) {
            let core = labels.fold(aliases.canonical(AssetKind::Rune, core));
            let sub = labels.fold(aliases.canonical(AssetKind::Rune, sub));
            groups.add(vec![core, sub], p.win);
        }
    }
    groups.finish(top_n)
}

/// First [`BUILD_LENGTH`] core items in slot order, or `None` when the row
/// has fewer qualifying items.
pub fn core_build(items: &[String], classifier: &dyn ItemClassifier, junk: &JunkFilter) -> Option<Vec<String>> {
    let build: Vec<String> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !junk.is_junk(item))
        .filter(|item| !classifier.is_boots(item) && classifier.is_core(item))
        .take(BUILD_LENGTH)
        .map(|item| item.to_string())
        .collect();
    (build.len() == BUILD_LENGTH).then_some(build)
}

pub fn core_build_stats(
    rows: &[&Participant],
    classifier: &dyn ItemClassifier,
    junk: &JunkFilter,
    top_n: usize,
) -> Vec<AggregationRow> {
    let mut groups = Groups::default();
    for p in rows {
        if let Some(build) = core_build(&p.items, classifier, junk) {
            groups.add(build, p.win);
        }
    }
    groups.finish(top_n)
}
