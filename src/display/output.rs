use crate::analysis::aggregate::AggregationRow;
use crate::analysis::canonical::AssetKind;
use crate::analysis::champion_stats::ChampionStats;
use crate::analysis::report::{ChampionReport, Section};
use crate::analysis::subset::{CoreTiming, Histogram, TimelineSummary};
use crate::data::normalize::NormalizedTable;
use crate::icons::resolver::IconResolver;
use colored::*;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 40;
const LIST_COLUMNS: &[&str] = &["team_champs", "enemy_champs"];

#[derive(Tabled)]
struct OverviewRow {
    rank: String,
    champion: String,
    games: String,
    win_rate: String,
    pick_rate: String,
}

#[derive(Tabled)]
struct SummaryRow {
    games: String,
    wins: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
    #[tabled(rename = "pick rate")]
    pick_rate: String,
    #[tabled(rename = "avg K/D/A")]
    kda_line: String,
    #[tabled(rename = "avg KDA")]
    kda: String,
    #[tabled(rename = "avg DPM")]
    dpm: String,
    #[tabled(rename = "avg length (min)")]
    duration: String,
}

#[derive(Tabled)]
struct MetricRow {
    metric: String,
    value: String,
}

fn header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "=".repeat(60).cyan());
}

fn fmt_minutes(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}

pub fn display_overview(stats: &[ChampionStats], total_matches: usize, limit: usize) {
    header(&format!("🏆 CHAMPIONS ({} matches)", total_matches));

    if stats.is_empty() {
        println!("{}", "No champions in dataset".yellow());
        return;
    }

    let rows: Vec<OverviewRow> = stats
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, s)| OverviewRow {
            rank: format!("#{}", idx + 1),
            champion: s.name.clone(),
            games: s.games.to_string(),
            win_rate: format!("{:.2}%", s.win_rate()),
            pick_rate: format!("{:.2}%", s.pick_rate(total_matches)),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if stats.len() > limit {
        println!("… and {} more. Pick one with --champion <NAME>.", stats.len() - limit);
    }
    println!();
}

pub fn display_report(report: &ChampionReport, table: &NormalizedTable, icons: &IconResolver<'_>, show_raw: bool) {
    println!(
        "\n{}",
        format!("🎮 ARAM Dashboard: {}", report.champion).bold().cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    let s = &report.summary;
    let mut summary = Table::new(vec![SummaryRow {
        games: s.games.to_string(),
        wins: s.wins.to_string(),
        win_rate: format!("{:.2}%", s.win_rate),
        pick_rate: format!("{:.2}%", s.pick_rate),
        kda_line: format!("{}/{}/{}", s.avg_kills, s.avg_deaths, s.avg_assists),
        kda: format!("{:.2}", s.avg_kda),
        dpm: s.avg_dpm.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string()),
        duration: format!("{:.2}", s.avg_duration_min),
    }]);
    summary.with(Style::rounded());
    println!("{}", summary);

    if let Some(timeline) = &report.timeline {
        display_timeline(timeline);
    }
    if let Some(core) = &report.core_timing {
        display_core_timing(core);
    }

    display_section("🧱 Core items", &report.core_items, "games", AssetKind::Item, icons);
    display_section("🛡️ Items (all slots)", &report.items, "picks", AssetKind::Item, icons);
    display_section("🔨 Core builds (first 3)", &report.builds, "games", AssetKind::Item, icons);
    display_section("✨ Spell combos", &report.spells, "games", AssetKind::Spell, icons);
    display_section("🔮 Rune combos (primary/secondary)", &report.runes, "games", AssetKind::Rune, icons);
    display_section("👥 Teammates", &report.teammates, "games", AssetKind::Champion, icons);
    display_section("⚔️ Opponents", &report.opponents, "games", AssetKind::Champion, icons);

    if show_raw {
        display_raw_rows(table, &report.raw_rows);
    }
    println!();
}

fn display_timeline(timeline: &TimelineSummary) {
    header("⏱️ Timeline");
    let rows = vec![
        MetricRow {
            metric: "first blood (min)".to_string(),
            value: fmt_minutes(timeline.first_blood_min),
        },
        MetricRow {
            metric: "first tower blue / red (min)".to_string(),
            value: format!(
                "{} / {}",
                fmt_minutes(timeline.blue_first_tower_min),
                fmt_minutes(timeline.red_first_tower_min)
            ),
        },
        MetricRow {
            metric: "game length (min)".to_string(),
            value: fmt_minutes(timeline.game_end_min),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if let Some(hist) = &timeline.gold_spike {
        display_histogram("Gold spike (min)", hist);
    }
}

fn display_core_timing(core: &CoreTiming) {
    header("🕒 Core item timing");
    let rows = vec![
        MetricRow {
            metric: "1st core item (min)".to_string(),
            value: fmt_minutes(core.first_core_avg),
        },
        MetricRow {
            metric: "2nd core item (min)".to_string(),
            value: fmt_minutes(core.second_core_avg),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if let Some(hist) = &core.first_core_hist {
        display_histogram("1st core item (min)", hist);
    }
    if let Some(hist) = &core.second_core_hist {
        display_histogram("2nd core item (min)", hist);
    }
}

pub fn display_histogram(title: &str, hist: &Histogram) {
    println!("\n{} (n={})", title.bold(), hist.total());
    let max = hist.max_count().max(1);
    for bin in &hist.bins {
        let width = bin.count * BAR_WIDTH / max;
        println!(
            "{:>6.1}-{:<6.1} {} {}",
            bin.lower,
            bin.upper,
            "█".repeat(width).green(),
            bin.count
        );
    }
}

fn display_section(
    title: &str,
    section: &Section<Vec<AggregationRow>>,
    volume_label: &str,
    kind: AssetKind,
    icons: &IconResolver<'_>,
) {
    header(title);
    match section {
        Section::InsufficientData(reason) => {
            println!("{}", format!("Insufficient data ({})", reason).yellow());
        }
        Section::Ready(rows) => {
            println!("{}", aggregation_table(rows, volume_label, kind, icons));
        }
    }
}

fn aggregation_table(rows: &[AggregationRow], volume_label: &str, kind: AssetKind, icons: &IconResolver<'_>) -> Table {
    let mut builder = Builder::default();
    let mut head = vec!["#".to_string(), "key".to_string(), volume_label.to_string(), "wins".to_string(), "win rate".to_string()];
    if icons.is_enabled() {
        head.push("icons".to_string());
    }
    builder.push_record(head);

    let annotations = if icons.is_enabled() {
        icons.annotate(kind, rows)
    } else {
        Vec::new()
    };

    for (idx, row) in rows.iter().enumerate() {
        let mut record = vec![
            format!("{}", idx + 1),
            row.label(),
            row.picks.to_string(),
            row.wins.to_string(),
            format!("{:.2}%", row.win_rate),
        ];
        if let Some(refs) = annotations.get(idx) {
            record.push(
                refs.iter()
                    .map(|r| r.clone().unwrap_or_else(|| "-".to_string()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table
}

fn display_raw_rows(table: &NormalizedTable, rows: &[usize]) {
    header(&format!("📄 Raw rows ({})", rows.len()));

    let shown: Vec<usize> = table
        .schema
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, name)| !LIST_COLUMNS.contains(&name.as_str()))
        .map(|(pos, _)| pos)
        .collect();

    let mut builder = Builder::default();
    builder.push_record(shown.iter().map(|&pos| table.schema.headers()[pos].clone()));
    for &row in rows {
        builder.push_record(shown.iter().map(|&pos| table.raw.cell(row, pos).to_string()));
    }

    let mut out = builder.build();
    out.with(Style::rounded());
    println!("{}", out);
}
