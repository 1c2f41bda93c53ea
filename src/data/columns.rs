use std::collections::HashMap;

// Candidate names per field, newest dataset revision first.
pub const CHAMPION: &[&str] = &["champion", "championName", "champion_name"];
pub const MATCH_ID: &[&str] = &["matchId", "match_id", "gameId"];
pub const WIN: &[&str] = &["win", "won"];
pub const KILLS: &[&str] = &["kills"];
pub const DEATHS: &[&str] = &["deaths"];
pub const ASSISTS: &[&str] = &["assists"];
pub const SPELL1: &[&str] = &["spell1_name", "spell1", "summoner1"];
pub const SPELL2: &[&str] = &["spell2_name", "spell2", "summoner2"];
pub const RUNE_CORE: &[&str] = &["rune_core", "rune_primary"];
pub const RUNE_SUB: &[&str] = &["rune_sub", "rune_secondary"];
pub const TEAM_CHAMPS: &[&str] = &["team_champs"];
pub const ENEMY_CHAMPS: &[&str] = &["enemy_champs"];
pub const DURATION: &[&str] = &["game_end_min", "duration_min"];
pub const DAMAGE: &[&str] = &["damage_total", "totalDamageDealtToChampions"];
pub const FIRST_BLOOD: &[&str] = &["first_blood_min"];
pub const BLUE_FIRST_TOWER: &[&str] = &["blue_first_tower_min"];
pub const RED_FIRST_TOWER: &[&str] = &["red_first_tower_min"];
pub const GOLD_SPIKE: &[&str] = &["gold_spike_min"];
pub const FIRST_CORE_MIN: &[&str] = &["first_core_item_min"];
pub const FIRST_CORE_NAME: &[&str] = &["first_core_item_name"];
pub const SECOND_CORE_MIN: &[&str] = &["second_core_item_min"];
pub const SECOND_CORE_NAME: &[&str] = &["second_core_item_name"];

/// Header names of a loaded table with a name -> position index.
#[derive(Debug, Clone)]
pub struct Schema {
    headers: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(headers: &[String]) -> Self {
        let mut index = HashMap::new();
        for (pos, name) in headers.iter().enumerate() {
            // Duplicate headers resolve to the first occurrence.
            index.entry(name.clone()).or_insert(pos);
        }
        Schema {
            headers: headers.to_vec(),
            index,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Item slot columns (`item0`, `item_3`, ...) ordered by slot number.
    pub fn item_columns(&self) -> Vec<usize> {
        let mut slots: Vec<(u32, usize)> = self
            .headers
            .iter()
            .enumerate()
            .filter_map(|(pos, name)| item_slot(name).map(|slot| (slot, pos)))
            .collect();
        slots.sort();
        slots.into_iter().map(|(_, pos)| pos).collect()
    }
}

fn item_slot(header: &str) -> Option<u32> {
    let rest = header.strip_prefix("item")?;
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// First candidate present in the schema, if any.
pub fn resolve_column<'a>(candidates: &[&'a str], schema: &Schema) -> Option<&'a str> {
    candidates.iter().copied().find(|name| schema.contains(name))
}

/// Column positions for every field the normalizer reads. Only `champion`
/// is guaranteed; everything else degrades to `None`.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub champion: usize,
    pub match_id: Option<usize>,
    pub win: Option<usize>,
    pub kills: Option<usize>,
    pub deaths: Option<usize>,
    pub assists: Option<usize>,
    pub items: Vec<usize>,
    pub spell1: Option<usize>,
    pub spell2: Option<usize>,
    pub rune_core: Option<usize>,
    pub rune_sub: Option<usize>,
    pub team_champs: Option<usize>,
    pub enemy_champs: Option<usize>,
    pub duration: Option<usize>,
    pub damage: Option<usize>,
    pub first_blood: Option<usize>,
    pub blue_first_tower: Option<usize>,
    pub red_first_tower: Option<usize>,
    pub gold_spike: Option<usize>,
    pub first_core_min: Option<usize>,
    pub first_core_name: Option<usize>,
    pub second_core_min: Option<usize>,
    pub second_core_name: Option<usize>,
}

impl ResolvedColumns {
    /// Returns `Err` with the tried candidates when the champion column is absent.
    pub fn resolve(schema: &Schema) -> Result<Self, String> {
        let pos = |candidates: &[&str]| {
            let found = resolve_column(candidates, schema).and_then(|name| schema.position(name));
            if found.is_none() {
                log::debug!("No column for {:?}", candidates);
            }
            found
        };

        let champion = pos(CHAMPION).ok_or_else(|| CHAMPION.join(", "))?;

        Ok(ResolvedColumns {
            champion,
            match_id: pos(MATCH_ID),
            win: pos(WIN),
            kills: pos(KILLS),
            deaths: pos(DEATHS),
            assists: pos(ASSISTS),
            items: schema.item_columns(),
            spell1: pos(SPELL1),
            spell2: pos(SPELL2),
            rune_core: pos(RUNE_CORE),
            rune_sub: pos(RUNE_SUB),
            team_champs: pos(TEAM_CHAMPS),
            enemy_champs: pos(ENEMY_CHAMPS),
            duration: pos(DURATION),
            damage: pos(DAMAGE),
            first_blood: pos(FIRST_BLOOD),
            blue_first_tower: pos(BLUE_FIRST_TOWER),
            red_first_tower: pos(RED_FIRST_TOWER),
            gold_spike: pos(GOLD_SPIKE),
            first_core_min: pos(FIRST_CORE_MIN),
            first_core_name: pos(FIRST_CORE_NAME),
            second_core_min: pos(SECOND_CORE_MIN),
            second_core_name: pos(SECOND_CORE_NAME),
        })
    }

    pub fn has_timeline(&self) -> bool {
        self.first_blood.is_some()
            || self.blue_first_tower.is_some()
            || self.red_first_tower.is_some()
            || self.duration.is_some()
            || self.gold_spike.is_some()
    }

    pub fn has_core_timing(&self) -> bool {
        self.first_core_min.is_some()
            || self.first_core_name.is_some()
            || self.second_core_min.is_some()
            || self.second_core_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> Schema {
        Schema::new(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn spell_name_column_preferred_over_code_column() {
        let s = schema(&["spell1", "spell1_name", "champion"]);
        assert_eq!(resolve_column(SPELL1, &s), Some("spell1_name"));
    }

    #[test]
    fn older_schema_falls_back_to_plain_spell_column() {
        let s = schema(&["champion", "spell1", "spell2"]);
        assert_eq!(resolve_column(SPELL1, &s), Some("spell1"));
        assert_eq!(resolve_column(SPELL2, &s), Some("spell2"));
    }

    #[test]
    fn unresolved_column_is_none() {
        let s = schema(&["champion"]);
        assert_eq!(resolve_column(RUNE_CORE, &s), None);
        assert_eq!(resolve_column(&[], &s), None);
    }

    #[test]
    fn match_id_variants() {
        assert_eq!(resolve_column(MATCH_ID, &schema(&["match_id"])), Some("match_id"));
        assert_eq!(resolve_column(MATCH_ID, &schema(&["gameId", "matchId"])), Some("matchId"));
    }

    #[test]
    fn summoner_code_columns() {
        let s = schema(&["champion", "summoner1", "summoner2"]);
        assert_eq!(resolve_column(SPELL1, &s), Some("summoner1"));
        assert_eq!(resolve_column(SPELL2, &s), Some("summoner2"));
        let s = schema(&["summoner2", "spell2", "champion"]);
        assert_eq!(resolve_column(SPELL2, &s), Some("spell2"));
    }

    #[test]
    fn champion_name_variants() {
        assert_eq!(resolve_column(CHAMPION, &schema(&["champion_name"])), Some("champion_name"));
        assert_eq!(
            resolve_column(CHAMPION, &schema(&["champion_name", "championName"])),
            Some("championName")
        );
    }

    #[test]
    fn duration_variants() {
        assert_eq!(resolve_column(DURATION, &schema(&["duration_min"])), Some("duration_min"));
        assert_eq!(
            resolve_column(DURATION, &schema(&["duration_min", "game_end_min"])),
            Some("game_end_min")
        );
    }

    #[test]
    fn damage_variants() {
        assert_eq!(
            resolve_column(DAMAGE, &schema(&["totalDamageDealtToChampions"])),
            Some("totalDamageDealtToChampions")
        );
        assert_eq!(
            resolve_column(DAMAGE, &schema(&["totalDamageDealtToChampions", "damage_total"])),
            Some("damage_total")
        );
    }

    #[test]
    fn rune_variants() {
        let s = schema(&["champion", "rune_primary", "rune_secondary"]);
        assert_eq!(resolve_column(RUNE_CORE, &s), Some("rune_primary"));
        assert_eq!(resolve_column(RUNE_SUB, &s), Some("rune_secondary"));
        let s = schema(&["rune_secondary", "rune_sub", "rune_primary", "rune_core"]);
        assert_eq!(resolve_column(RUNE_CORE, &s), Some("rune_core"));
        assert_eq!(resolve_column(RUNE_SUB, &s), Some("rune_sub"));
    }

    #[test]
    fn item_columns_sorted_by_slot() {
        let s = schema(&["item2", "champion", "item0", "item_1", "items", "item_count", "item10"]);
        assert_eq!(s.item_columns(), vec![2, 3, 0, 6]);
    }

    #[test]
    fn champion_column_is_mandatory() {
        let err = ResolvedColumns::resolve(&schema(&["matchId", "win"])).unwrap_err();
        assert!(err.contains("champion"));

        let ok = ResolvedColumns::resolve(&schema(&["championName", "win"])).unwrap();
        assert_eq!(ok.champion, 0);
        assert_eq!(ok.win, Some(1));
        assert!(ok.match_id.is_none());
        assert!(!ok.has_timeline());
    }
}
