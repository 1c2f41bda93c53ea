// Data Dragon URL builders

use crate::analysis::canonical::AssetKind;

pub const DATA_DRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";

pub fn versions_url(base: &str) -> String {
    format!("{}/api/versions.json", base)
}

pub fn champions_url(base: &str, version: &str) -> String {
    format!("{}/cdn/{}/data/en_US/champion.json", base, version)
}

pub fn items_url(base: &str, version: &str) -> String {
    format!("{}/cdn/{}/data/en_US/item.json", base, version)
}

pub fn summoner_spells_url(base: &str, version: &str) -> String {
    format!("{}/cdn/{}/data/en_US/summoner.json", base, version)
}

pub fn runes_url(base: &str, version: &str) -> String {
    format!("{}/cdn/{}/data/en_US/runesReforged.json", base, version)
}

/// Icon URL for a catalog id. Rune ids are icon paths and are not versioned.
pub fn icon_url(base: &str, version: &str, kind: AssetKind, id: &str) -> String {
    match kind {
        AssetKind::Champion => format!("{}/cdn/{}/img/champion/{}.png", base, version, id),
        AssetKind::Item => format!("{}/cdn/{}/img/item/{}.png", base, version, id),
        AssetKind::Spell => format!("{}/cdn/{}/img/spell/{}.png", base, version, id),
        AssetKind::Rune => format!("{}/cdn/img/{}", base, id.trim_start_matches('/')),
    }
}
