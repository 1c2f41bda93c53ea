use super::columns::{ResolvedColumns, Schema, CHAMPION};
use super::loader::{Fingerprint, RawTable};
use crate::error::AppError;

pub const DEFAULT_DURATION_MIN: f64 = 18.0;
pub const MIN_DURATION_MIN: f64 = 6.0;
pub const MAX_DURATION_MIN: f64 = 40.0;

const WIN_TOKENS: &[&str] = &["1", "true", "t", "yes", "y"];

/// Tokens that stand for "no value" in exported cells.
const EMPTY_TOKENS: &[&str] = &["", "0", "nan", "none"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub first_blood_min: Option<f64>,
    pub blue_first_tower_min: Option<f64>,
    pub red_first_tower_min: Option<f64>,
    pub game_end_min: Option<f64>,
    pub gold_spike_min: Option<f64>,
    pub first_core_item_min: Option<f64>,
    pub second_core_item_min: Option<f64>,
    pub first_core_item_name: Option<String>,
    pub second_core_item_name: Option<String>,
}

/// One player in one match, after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Position in the raw table, used for the raw view.
    pub row: usize,
    pub match_id: Option<String>,
    pub champion: String,
    pub win: u8,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Item slots in slot order; empty slots are kept as "".
    pub items: Vec<String>,
    pub spell1: Option<String>,
    pub spell2: Option<String>,
    pub rune_core: Option<String>,
    pub rune_sub: Option<String>,
    pub team_champs: Vec<String>,
    pub enemy_champs: Vec<String>,
    pub duration_min: f64,
    pub dpm: Option<f64>,
    pub kda: f64,
    pub timeline: Timeline,
}

/// The canonical in-memory table. Immutable once built.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub raw: RawTable,
    pub schema: Schema,
    pub columns: ResolvedColumns,
    pub rows: Vec<Participant>,
}

impl NormalizedTable {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.raw.fingerprint
    }

    /// Distinct champion labels, sorted.
    pub fn champions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|p| p.champion.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Input to [`parse_list_field`]: either an already structured sequence or raw text.
#[derive(Debug, Clone, Copy)]
pub enum RawList<'a> {
    #[allow(dead_code)]
    Sequence(&'a [String]),
    Text(&'a str),
    Missing,
}

pub fn coerce_win_flag(value: Option<&str>) -> u8 {
    match value {
        Some(v) => {
            let v = v.trim().to_lowercase();
            u8::from(WIN_TOKENS.contains(&v.as_str()))
        }
        None => 0,
    }
}

pub fn is_empty_token(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    EMPTY_TOKENS.contains(&v.as_str())
}

/// Tokenizes a list-valued cell. The fallback order is fixed: literal list,
/// then `|`, then `,`, then the whole string as one element.
pub fn parse_list_field(raw: RawList<'_>) -> Vec<String> {
    let text = match raw {
        RawList::Sequence(items) => return items.to_vec(),
        RawList::Text(text) => text.trim(),
        RawList::Missing => return Vec::new(),
    };

    if text.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_list_literal(text) {
        return items;
    }

    for sep in ['|', ','] {
        if text.contains(sep) {
            return text
                .split(sep)
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
                .collect();
        }
    }

    vec![text.to_string()]
}

/// Parses `['A', "B", 3]` style list literals. Bare elements must be numbers
/// or `True`/`False`/`None`; `None` elements are dropped. Anything else is
/// not a literal and yields `None`.
fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut out = Vec::new();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == '\'' || first == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => value.push(chars.next()?),
                    c if c == first => {
                        closed = true;
                        break;
                    }
                    c => value.push(c),
                }
            }
            if !closed {
                return None;
            }
            out.push(value);
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                token.push(c);
                chars.next();
            }
            let token = token.trim();
            match token {
                "None" => {}
                "True" | "False" => out.push(token.to_string()),
                t if t.parse::<f64>().is_ok() => out.push(t.to_string()),
                _ => return None,
            }
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(out)
}

pub fn clamp_duration(minutes: Option<f64>) -> f64 {
    match minutes {
        Some(m) if m.is_finite() => m.clamp(MIN_DURATION_MIN, MAX_DURATION_MIN),
        _ => DEFAULT_DURATION_MIN,
    }
}

/// Returns `(dpm, kda)`. Zero deaths collapses KDA to kills + assists.
pub fn derive_ratios(
    kills: u32,
    deaths: u32,
    assists: u32,
    damage_total: Option<f64>,
    duration_min: f64,
) -> (Option<f64>, f64) {
    let dpm = damage_total
        .filter(|_| duration_min > 0.0)
        .map(|damage| damage / duration_min);
    let takedowns = f64::from(kills) + f64::from(assists);
    let kda = if deaths > 0 {
        takedowns / f64::from(deaths)
    } else {
        takedowns
    };
    (dpm, kda)
}

pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Non-negative integer count; malformed or negative values read as 0.
pub fn parse_count(cell: &str) -> u32 {
    match parse_number(cell) {
        Some(v) if v >= 0.0 => v.floor().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if is_empty_token(cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

pub fn normalize(raw: RawTable) -> Result<NormalizedTable, AppError> {
    let schema = Schema::new(&raw.headers);
    let columns = ResolvedColumns::resolve(&schema)
        .map_err(|tried| AppError::MissingMandatoryColumn(CHAMPION[0].to_string(), tried))?;

    if columns.win.is_none() {
        log::warn!("No win column in {}; every row counts as a loss", raw.source);
    }
    if columns.match_id.is_none() {
        log::warn!("No match id column in {}; each row counts as its own match", raw.source);
    }

    let mut rows = Vec::with_capacity(raw.records.len());
    let mut malformed = 0usize;

    for row in 0..raw.records.len() {
        let cell = |col: Option<usize>| col.map(|c| raw.cell(row, c));
        let text = |col: Option<usize>| cell(col).and_then(non_empty);
        let number = |col: Option<usize>| {
            let value = cell(col)?;
            let parsed = parse_number(value);
            if parsed.is_none() && !value.trim().is_empty() {
                log::debug!("Row {}: non-numeric value '{}' ignored", row + 2, value);
            }
            parsed
        };

        let champion = raw.cell(row, columns.champion).trim();
        if champion.is_empty() {
            malformed += 1;
            continue;
        }

        let kills = cell(columns.kills).map(parse_count).unwrap_or(0);
        let deaths = cell(columns.deaths).map(parse_count).unwrap_or(0);
        let assists = cell(columns.assists).map(parse_count).unwrap_or(0);

        let game_end_min = number(columns.duration);
        let duration_min = clamp_duration(game_end_min);
        let damage_total = number(columns.damage);
        let (dpm, kda) = derive_ratios(kills, deaths, assists, damage_total, duration_min);

        let items = columns
            .items
            .iter()
            .map(|&c| raw.cell(row, c).trim().to_string())
            .collect();

        let list = |col: Option<usize>| match cell(col) {
            Some(text) => parse_list_field(RawList::Text(text)),
            None => parse_list_field(RawList::Missing),
        };

        rows.push(Participant {
            row,
            match_id: text(columns.match_id),
            champion: champion.to_string(),
            win: coerce_win_flag(cell(columns.win)),
            kills,
            deaths,
            assists,
            items,
            spell1: text(columns.spell1),
            spell2: text(columns.spell2),
            rune_core: text(columns.rune_core),
            rune_sub: text(columns.rune_sub),
            team_champs: list(columns.team_champs),
            enemy_champs: list(columns.enemy_champs),
            duration_min,
            dpm,
            kda,
            timeline: Timeline {
                first_blood_min: number(columns.first_blood),
                blue_first_tower_min: number(columns.blue_first_tower),
                red_first_tower_min: number(columns.red_first_tower),
                game_end_min,
                gold_spike_min: number(columns.gold_spike),
                first_core_item_min: number(columns.first_core_min),
                second_core_item_min: number(columns.second_core_min),
                first_core_item_name: text(columns.first_core_name),
                second_core_item_name: text(columns.second_core_name),
            },
        });
    }

    if malformed > 0 {
        log::warn!("Skipped {} rows with an empty champion", malformed);
    }

    Ok(NormalizedTable {
        raw,
        schema,
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> NormalizedTable {
        normalize(RawTable::from_bytes("test", text.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn win_flag_accepts_known_truthy_tokens() {
        for v in ["1", "True", " TRUE ", "t", "yes", "Y"] {
            assert_eq!(coerce_win_flag(Some(v)), 1, "{v}");
        }
        for v in ["0", "false", "no", "", "2", "win", "1.0"] {
            assert_eq!(coerce_win_flag(Some(v)), 0, "{v}");
        }
        assert_eq!(coerce_win_flag(None), 0);
    }

    #[test]
    fn list_field_prefers_literal_then_pipe_then_comma() {
        assert_eq!(
            parse_list_field(RawList::Text("['Ahri', \"Lux\", 'Kai\\'Sa']")),
            vec!["Ahri", "Lux", "Kai'Sa"]
        );
        assert_eq!(parse_list_field(RawList::Text("[1, 2, None]")), vec!["1", "2"]);
        assert!(parse_list_field(RawList::Text("[]")).is_empty());
        assert_eq!(
            parse_list_field(RawList::Text("Ahri | Lux, Jinx")),
            vec!["Ahri", "Lux, Jinx"]
        );
        assert_eq!(parse_list_field(RawList::Text("Ahri, Lux,")), vec!["Ahri", "Lux"]);
        assert_eq!(parse_list_field(RawList::Text(" Ahri ")), vec!["Ahri"]);
        assert_eq!(parse_list_field(RawList::Text("[Ahri]")), vec!["[Ahri]"]);
    }

    #[test]
    fn list_field_blank_and_structured_inputs() {
        assert!(parse_list_field(RawList::Text("   ")).is_empty());
        assert!(parse_list_field(RawList::Missing).is_empty());
        let seq = vec!["a|b".to_string(), "c".to_string()];
        assert_eq!(parse_list_field(RawList::Sequence(&seq)), seq);
    }

    #[test]
    fn unterminated_literal_falls_back_to_comma_split() {
        assert_eq!(parse_list_field(RawList::Text("['Ahri, Lux]")), vec!["['Ahri", "Lux]"]);
    }

    #[test]
    fn duration_is_clamped_with_default() {
        assert_eq!(clamp_duration(None), 18.0);
        assert_eq!(clamp_duration(Some(f64::NAN)), 18.0);
        assert_eq!(clamp_duration(Some(0.0)), 6.0);
        assert_eq!(clamp_duration(Some(-3.0)), 6.0);
        assert_eq!(clamp_duration(Some(55.5)), 40.0);
        assert_eq!(clamp_duration(Some(21.25)), 21.25);
    }

    #[test]
    fn ratios_handle_zero_deaths_and_missing_damage() {
        let (dpm, kda) = derive_ratios(4, 2, 6, Some(20000.0), 20.0);
        assert_eq!(dpm, Some(1000.0));
        assert_eq!(kda, 5.0);

        let (dpm, kda) = derive_ratios(3, 0, 4, None, 18.0);
        assert_eq!(dpm, None);
        assert_eq!(kda, 7.0);
    }

    #[test]
    fn counts_default_to_zero() {
        assert_eq!(parse_count("7"), 7);
        assert_eq!(parse_count("7.0"), 7);
        assert_eq!(parse_count("-1"), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn normalize_fills_defaults_for_missing_optional_columns() {
        let t = table("champion\nAhri\nLux\n");
        assert_eq!(t.rows.len(), 2);
        for p in &t.rows {
            assert_eq!(p.win, 0);
            assert_eq!((p.kills, p.deaths, p.assists), (0, 0, 0));
            assert_eq!(p.duration_min, DEFAULT_DURATION_MIN);
            assert_eq!(p.dpm, None);
            assert_eq!(p.kda, 0.0);
            assert!(p.items.is_empty());
            assert!(p.spell1.is_none());
        }
    }

    #[test]
    fn normalize_reads_full_row() {
        let t = table(
            "matchId,champion,win,kills,deaths,assists,item0,item1,spell1_name,spell2_name,game_end_min,damage_total,team_champs\n\
             M1,Ahri,True,5,2,9,Boots, 0 ,Flash,Mark,70,30000,\"['Ahri','Lux']\"\n\
             M1,Lux,no,x,1,2,,,Flash,Heal,3,,\n",
        );
        let a = &t.rows[0];
        assert_eq!(a.match_id.as_deref(), Some("M1"));
        assert_eq!(a.win, 1);
        assert_eq!(a.items, vec!["Boots", "0"]);
        assert_eq!(a.spell2.as_deref(), Some("Mark"));
        assert_eq!(a.duration_min, 40.0);
        assert_eq!(a.timeline.game_end_min, Some(70.0));
        assert_eq!(a.dpm, Some(750.0));
        assert_eq!(a.kda, 7.0);
        assert_eq!(a.team_champs, vec!["Ahri", "Lux"]);

        let b = &t.rows[1];
        assert_eq!(b.win, 0);
        assert_eq!(b.kills, 0);
        assert_eq!(b.duration_min, 6.0);
        assert_eq!(b.dpm, None);
        assert!(b.team_champs.is_empty());
    }

    #[test]
    fn invariants_hold_for_every_row() {
        let t = table(
            "champion,win,game_end_min\nA,TRUE,1\nB,maybe,100\nC,,\nD,1,abc\nE,false,12\n",
        );
        for p in &t.rows {
            assert!(p.win <= 1);
            assert!((MIN_DURATION_MIN..=MAX_DURATION_MIN).contains(&p.duration_min));
        }
    }

    #[test]
    fn missing_champion_column_is_fatal() {
        let raw = RawTable::from_bytes("test", b"matchId,win\nM1,1\n").unwrap();
        let err = normalize(raw).unwrap_err();
        assert!(matches!(err, AppError::MissingMandatoryColumn(_, _)));
    }

    #[test]
    fn rows_with_blank_champion_are_skipped() {
        let t = table("champion,win\nAhri,1\n,1\nLux,0\n");
        assert_eq!(t.champions(), vec!["Ahri", "Lux"]);
    }
}
