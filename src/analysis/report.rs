use super::aggregate::{
    core_build_stats, core_item_stats, item_stats, opponent_stats, rune_pair_stats, spell_pair_stats,
    teammate_stats, AggregationRow, ItemClassifier, JunkFilter,
};
use super::canonical::AliasTable;
use super::subset::{CoreTiming, Subset, SummaryMetrics, TimelineSummary};
use crate::error::AppError;
use crate::data::normalize::NormalizedTable;

/// A derived table, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    InsufficientData(&'static str),
}

impl<T> Section<T> {
    #[allow(dead_code)]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::InsufficientData(_) => None,
        }
    }
}

impl Section<Vec<AggregationRow>> {
    fn from_rows(rows: Vec<AggregationRow>, empty_reason: &'static str) -> Self {
        if rows.is_empty() {
            Section::InsufficientData(empty_reason)
        } else {
            Section::Ready(rows)
        }
    }
}

/// Row limits per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopN {
    pub items: usize,
    pub core_items: usize,
    pub combos: usize,
    pub builds: usize,
    pub champions: usize,
}

impl Default for TopN {
    fn default() -> Self {
        TopN {
            items: 25,
            core_items: 20,
            combos: 10,
            builds: 10,
            champions: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportRequest {
    pub champion: String,
    pub top: TopN,
}

/// Collaborators the aggregations need but do not own.
pub struct ReportContext<'a> {
    pub aliases: &'a AliasTable,
    pub classifier: &'a dyn ItemClassifier,
    pub junk: &'a JunkFilter,
}

#[derive(Debug, Clone)]
pub struct ChampionReport {
    pub champion: String,
    pub summary: SummaryMetrics,
    pub timeline: Option<TimelineSummary>,
    pub core_timing: Option<CoreTiming>,
    pub core_items: Section<Vec<AggregationRow>>,
    pub items: Section<Vec<AggregationRow>>,
    pub spells: Section<Vec<AggregationRow>>,
    pub runes: Section<Vec<AggregationRow>>,
    pub builds: Section<Vec<AggregationRow>>,
    pub teammates: Section<Vec<AggregationRow>>,
    pub opponents: Section<Vec<AggregationRow>>,
    /// Raw table positions of the selected rows.
    pub raw_rows: Vec<usize>,
}

pub fn build_report(
    table: &NormalizedTable,
    request: &ReportRequest,
    ctx: &ReportContext<'_>,
) -> Result<ChampionReport, AppError> {
    let subset = Subset::select(table, &request.champion);
    if subset.games() == 0 {
        return Err(AppError::ChampionNotFound(request.champion.clone()));
    }

    let columns = &table.columns;
    let rows = &subset.rows;
    let top = request.top;

    let items = if columns.items.is_empty() {
        Section::InsufficientData("no item columns")
    } else {
        Section::from_rows(item_stats(rows, ctx.junk, top.items), "no items recorded")
    };

    let builds = if columns.items.is_empty() {
        Section::InsufficientData("no item columns")
    } else {
        Section::from_rows(
            core_build_stats(rows, ctx.classifier, ctx.junk, top.builds),
            "no game with three core items",
        )
    };

    let spells = if columns.spell1.is_none() || columns.spell2.is_none() {
        Section::InsufficientData("no spell columns")
    } else {
        Section::from_rows(spell_pair_stats(rows, ctx.aliases, top.combos), "no spells recorded")
    };

    let runes = if columns.rune_core.is_none() || columns.rune_sub.is_none() {
        Section::InsufficientData("no rune columns")
    } else {
        Section::from_rows(rune_pair_stats(rows, ctx.aliases, top.combos), "no runes recorded")
    };

    let core_items = if columns.first_core_name.is_none() && columns.second_core_name.is_none() {
        Section::InsufficientData("no core item columns")
    } else {
        Section::from_rows(core_item_stats(rows, ctx.junk, top.core_items), "no core items recorded")
    };

    let teammates = if columns.team_champs.is_none() {
        Section::InsufficientData("no team column")
    } else {
        Section::from_rows(teammate_stats(rows, top.champions), "no teammates recorded")
    };

    let opponents = if columns.enemy_champs.is_none() {
        Section::InsufficientData("no enemy column")
    } else {
        Section::from_rows(opponent_stats(rows, top.champions), "no opponents recorded")
    };

    log::debug!(
        "Report for {}: {} games over {} of {} matches",
        subset.champion,
        subset.games(),
        subset.subset_matches,
        subset.total_matches
    );

    Ok(ChampionReport {
        champion: request.champion.clone(),
        summary: subset.summary(),
        timeline: columns.has_timeline().then(|| subset.timeline()),
        core_timing: columns.has_core_timing().then(|| subset.core_timing()),
        core_items,
        items,
        spells,
        runes,
        builds,
        teammates,
        opponents,
        raw_rows: rows.iter().map(|p| p.row).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate::StaticItemClassifier;
    use crate::data::loader::RawTable;
    use crate::data::normalize::normalize;

    fn report(text: &str, champion: &str) -> Result<ChampionReport, AppError> {
        let table = normalize(RawTable::from_bytes("test", text.as_bytes()).unwrap()).unwrap();
        let aliases = AliasTable::builtin();
        let classifier = StaticItemClassifier::default();
        let junk = JunkFilter::new(["Poro-Snax"]);
        let ctx = ReportContext {
            aliases: &aliases,
            classifier: &classifier,
            junk: &junk,
        };
        build_report(
            &table,
            &ReportRequest {
                champion: champion.to_string(),
                top: TopN::default(),
            },
            &ctx,
        )
    }

    #[test]
    fn missing_optional_columns_become_placeholders() {
        let r = report("matchId,champion,win\nM1,Ahri,1\nM2,Ahri,0\n", "Ahri").unwrap();
        assert_eq!(r.summary.games, 2);
        assert_eq!(r.items, Section::InsufficientData("no item columns"));
        assert_eq!(r.spells, Section::InsufficientData("no spell columns"));
        assert_eq!(r.runes, Section::InsufficientData("no rune columns"));
        assert!(r.timeline.is_none());
        assert!(r.core_timing.is_none());
        assert_eq!(r.raw_rows, vec![0, 1]);
    }

    #[test]
    fn full_report_sections() {
        let r = report(
            "matchId,champion,win,item0,item1,item2,spell1,spell2,rune_core,rune_sub,game_end_min\n\
             M1,Ahri,1,Luden's Companion,Rabadon's Deathcap,Void Staff,Flash,Mark,Sorcery,Inspiration,15\n\
             M1,Lux,0,Boots,,,Heal,Flash,Sorcery,Resolve,15\n\
             M2,Ahri,0,Boots,Luden's Companion,,Mark,Flash,Sorcery,Inspiration,22\n",
            "Ahri",
        )
        .unwrap();
        assert_eq!(r.summary.pick_rate, 100.0);
        let spells = r.spells.ready().unwrap();
        assert_eq!(spells.len(), 1);
        assert_eq!(spells[0].picks, 2);
        let builds = r.builds.ready().unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].win_rate, 100.0);
        assert_eq!(r.runes.ready().unwrap()[0].picks, 2);
        assert_eq!(r.timeline.as_ref().unwrap().game_end_min, Some(18.5));
        assert_eq!(r.raw_rows, vec![0, 2]);
    }

    #[test]
    fn unknown_champion_is_an_error() {
        let err = report("champion,win\nAhri,1\n", "Zed").unwrap_err();
        assert!(matches!(err, AppError::ChampionNotFound(name) if name == "Zed"));
    }
}
