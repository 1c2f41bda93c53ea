use super::resolver::CanonicalIdSource;
use crate::analysis::aggregate::{ItemClassifier, StaticItemClassifier};
use crate::analysis::canonical::{normalize_key, AssetKind};
use crate::api::client::DataDragonClient;
use crate::api::models::{ChampionListDto, ItemListDto, RuneTreeDto, SummonerSpellListDto};
use crate::config::validate_version;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Identifier used in asset URLs (rune entries hold the icon path).
    pub id: String,
    /// Numeric key as published by Data Dragon.
    pub key: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub from: Vec<String>,
    pub into: Vec<String>,
}

/// One Data Dragon version, flattened. A version never changes once
/// published, so a snapshot on disk is valid forever.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogSnapshot {
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    pub champions: Vec<CatalogEntry>,
    pub items: Vec<CatalogItem>,
    pub spells: Vec<CatalogEntry>,
    pub runes: Vec<CatalogEntry>,
}

impl CatalogSnapshot {
    pub fn from_dtos(
        version: &str,
        champions: ChampionListDto,
        items: ItemListDto,
        spells: SummonerSpellListDto,
        runes: Vec<RuneTreeDto>,
    ) -> Self {
        let mut rune_entries = Vec::new();
        for tree in runes {
            rune_entries.push(CatalogEntry {
                id: tree.icon.clone(),
                key: tree.id.to_string(),
                name: tree.name.clone(),
            });
            for rune in tree.slots.into_iter().flat_map(|s| s.runes) {
                rune_entries.push(CatalogEntry {
                    id: rune.icon,
                    key: rune.id.to_string(),
                    name: rune.name,
                });
            }
        }

        let mut champions: Vec<CatalogEntry> = champions
            .data
            .into_values()
            .map(|c| CatalogEntry {
                id: c.id,
                key: c.key,
                name: c.name,
            })
            .collect();
        let mut items: Vec<CatalogItem> = items
            .data
            .into_iter()
            .map(|(id, item)| CatalogItem {
                id,
                name: item.name,
                tags: item.tags,
                from: item.from,
                into: item.into,
            })
            .collect();
        let mut spells: Vec<CatalogEntry> = spells
            .data
            .into_values()
            .map(|s| CatalogEntry {
                id: s.id,
                key: s.key,
                name: s.name,
            })
            .collect();

        // Data Dragon repeats display names; the lowest numeric key wins lookups.
        champions.sort_by(|a, b| key_order(&a.key, &a.id).cmp(&key_order(&b.key, &b.id)));
        spells.sort_by(|a, b| key_order(&a.key, &a.id).cmp(&key_order(&b.key, &b.id)));
        rune_entries.sort_by(|a, b| key_order(&a.key, &a.id).cmp(&key_order(&b.key, &b.id)));
        items.sort_by(|a, b| key_order(&a.id, &a.name).cmp(&key_order(&b.id, &b.name)));

        CatalogSnapshot {
            version: version.to_string(),
            fetched_at: Utc::now(),
            champions,
            items,
            spells,
            runes: rune_entries,
        }
    }

    pub fn get_cache_path(cache_dir: &Path, version: &str) -> PathBuf {
        cache_dir.join(format!("ddragon_{}.json", version))
    }

    /// Snapshot previously saved for `version`, if readable.
    pub fn load(cache_dir: &Path, version: &str) -> Option<Self> {
        let path = Self::get_cache_path(cache_dir, version);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Ignoring unreadable catalog cache {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, cache_dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(cache_dir)?;
        let path = Self::get_cache_path(cache_dir, &self.version);
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::JsonError(format!("Failed to serialize catalog: {}", e)))?;

        fs::write(&path, json)?;
        Ok(())
    }

    pub fn fetch(client: &DataDragonClient, version: &str) -> Result<Self, AppError> {
        let pb = ProgressBar::new(4);
        pb.set_message(format!("Fetching Data Dragon {}", version));

        let champions = client.get_champions(version)?;
        pb.inc(1);
        let items = client.get_items(version)?;
        pb.inc(1);
        let spells = client.get_summoner_spells(version)?;
        pb.inc(1);
        let runes = client.get_runes(version)?;
        pb.inc(1);

        pb.finish_with_message("✓ Catalog fetched");
        Ok(Self::from_dtos(version, champions, items, spells, runes))
    }

    /// Disk snapshot when present (unless `refresh`), otherwise a fresh fetch
    /// that is then saved. Without an explicit version the latest is used.
    pub fn load_or_fetch(
        client: &DataDragonClient,
        cache_dir: &Path,
        version: Option<&str>,
        refresh: bool,
    ) -> Result<Self, AppError> {
        let version = match version {
            Some(v) => v.to_string(),
            None => client.get_latest_version()?,
        };
        validate_version(&version)?;

        if !refresh {
            if let Some(snapshot) = Self::load(cache_dir, &version) {
                log::debug!("Using cached catalog {} from {}", version, snapshot.fetched_at);
                return Ok(snapshot);
            }
        }

        let snapshot = Self::fetch(client, &version)?;
        if let Err(e) = snapshot.save(cache_dir) {
            log::warn!("Could not save catalog cache: {}", e);
        }
        Ok(snapshot)
    }
}

fn key_order<'a>(key: &'a str, tie: &'a str) -> (u64, &'a str, &'a str) {
    (key.parse().unwrap_or(u64::MAX), key, tie)
}

/// Indexed view over a snapshot: name/key/id lookups per asset kind.
pub struct Catalog {
    snapshot: CatalogSnapshot,
    ids: HashMap<(AssetKind, String), String>,
    items: HashMap<String, usize>,
    fallback: StaticItemClassifier,
}

impl Catalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let mut ids = HashMap::new();
        let mut index = |kind: AssetKind, entry: &CatalogEntry| {
            for label in [&entry.name, &entry.key, &entry.id] {
                ids.entry((kind, normalize_key(label)))
                    .or_insert_with(|| entry.id.clone());
            }
        };
        for entry in &snapshot.champions {
            index(AssetKind::Champion, entry);
        }
        for entry in &snapshot.spells {
            index(AssetKind::Spell, entry);
        }
        for entry in &snapshot.runes {
            index(AssetKind::Rune, entry);
        }

        let mut items = HashMap::new();
        for (pos, item) in snapshot.items.iter().enumerate() {
            ids.entry((AssetKind::Item, normalize_key(&item.name)))
                .or_insert_with(|| item.id.clone());
            ids.entry((AssetKind::Item, normalize_key(&item.id)))
                .or_insert_with(|| item.id.clone());
            items.entry(normalize_key(&item.name)).or_insert(pos);
            items.entry(normalize_key(&item.id)).or_insert(pos);
        }

        Catalog {
            snapshot,
            ids,
            items,
            fallback: StaticItemClassifier::default(),
        }
    }

    fn item(&self, name: &str) -> Option<&CatalogItem> {
        self.items
            .get(&normalize_key(name))
            .map(|&pos| &self.snapshot.items[pos])
    }
}

impl CanonicalIdSource for Catalog {
    fn version(&self) -> &str {
        &self.snapshot.version
    }

    fn canonical_id(&self, kind: AssetKind, name: &str) -> Option<String> {
        self.ids.get(&(kind, normalize_key(name))).cloned()
    }
}

impl ItemClassifier for Catalog {
    fn is_boots(&self, item: &str) -> bool {
        match self.item(item) {
            Some(entry) => entry.tags.iter().any(|t| t == "Boots"),
            None => self.fallback.is_boots(item),
        }
    }

    /// Completed items built from components. Consumables and trinkets never qualify.
    fn is_core(&self, item: &str) -> bool {
        match self.item(item) {
            Some(entry) => {
                let excluded = entry
                    .tags
                    .iter()
                    .any(|t| t == "Boots" || t == "Consumable" || t == "Trinket");
                !excluded && entry.into.is_empty() && !entry.from.is_empty()
            }
            None => self.fallback.is_core(item),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_snapshot() -> CatalogSnapshot {
        let champions: ChampionListDto = serde_json::from_str(
            r#"{"data": {
                "MonkeyKing": {"id": "MonkeyKing", "key": "62", "name": "Wukong"},
                "Kaisa": {"id": "Kaisa", "key": "145", "name": "Kai'Sa"}
            }}"#,
        )
        .unwrap();
        let items: ItemListDto = serde_json::from_str(
            r#"{"data": {
                "1001": {"name": "Boots", "tags": ["Boots"], "into": ["3006"]},
                "3006": {"name": "Berserker's Greaves", "tags": ["Boots"], "from": ["1001"]},
                "6655": {"name": "Luden's Companion", "tags": ["SpellDamage"], "from": ["3802", "1052"]},
                "1052": {"name": "Amplifying Tome", "tags": ["SpellDamage"], "into": ["6655"]},
                "2003": {"name": "Health Potion", "tags": ["Consumable"]}
            }}"#,
        )
        .unwrap();
        let spells: SummonerSpellListDto = serde_json::from_str(
            r#"{"data": {
                "SummonerFlash": {"id": "SummonerFlash", "key": "4", "name": "Flash"},
                "SummonerSnowball": {"id": "SummonerSnowball", "key": "32", "name": "Mark"}
            }}"#,
        )
        .unwrap();
        let runes: Vec<RuneTreeDto> = serde_json::from_str(
            r#"[{"id": 8200, "key": "Sorcery", "icon": "perk-images/Styles/7202_Sorcery.png", "name": "Sorcery",
                 "slots": [{"runes": [{"id": 8214, "key": "SummonAery", "icon": "perk-images/Styles/Sorcery/SummonAery/SummonAery.png", "name": "Summon Aery"}]}]}]"#,
        )
        .unwrap();
        CatalogSnapshot::from_dtos("14.1.1", champions, items, spells, runes)
    }

    #[test]
    fn ids_resolve_by_name_key_and_id() {
        let catalog = Catalog::new(sample_snapshot());
        assert_eq!(catalog.version(), "14.1.1");
        assert_eq!(catalog.canonical_id(AssetKind::Champion, "Wukong").as_deref(), Some("MonkeyKing"));
        assert_eq!(catalog.canonical_id(AssetKind::Champion, "kai'sa").as_deref(), Some("Kaisa"));
        assert_eq!(catalog.canonical_id(AssetKind::Spell, "4").as_deref(), Some("SummonerFlash"));
        assert_eq!(catalog.canonical_id(AssetKind::Item, "Luden's Companion").as_deref(), Some("6655"));
        assert_eq!(
            catalog.canonical_id(AssetKind::Rune, "Summon Aery").as_deref(),
            Some("perk-images/Styles/Sorcery/SummonAery/SummonAery.png")
        );
        assert_eq!(catalog.canonical_id(AssetKind::Item, "Flash"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_key() {
        for _ in 0..20 {
            let champions: ChampionListDto = serde_json::from_str(r#"{"data": {}}"#).unwrap();
            let items: ItemListDto = serde_json::from_str(
                r#"{"data": {
                    "223031": {"name": "Infinity Edge", "tags": ["Damage"], "from": ["1038"]},
                    "3031": {"name": "Infinity Edge", "tags": ["Damage"], "from": ["1038"]}
                }}"#,
            )
            .unwrap();
            let spells: SummonerSpellListDto = serde_json::from_str(
                r#"{"data": {
                    "SummonerSnowURFSnowball_Mark": {"id": "SummonerSnowURFSnowball_Mark", "key": "39", "name": "Mark"},
                    "SummonerSnowball": {"id": "SummonerSnowball", "key": "32", "name": "Mark"}
                }}"#,
            )
            .unwrap();
            let catalog = Catalog::new(CatalogSnapshot::from_dtos("14.1.1", champions, items, spells, Vec::new()));
            assert_eq!(catalog.canonical_id(AssetKind::Spell, "Mark").as_deref(), Some("SummonerSnowball"));
            assert_eq!(catalog.canonical_id(AssetKind::Item, "Infinity Edge").as_deref(), Some("3031"));
        }
    }

    #[test]
    fn classifies_items_from_tags_and_recipes() {
        let catalog = Catalog::new(sample_snapshot());
        assert!(catalog.is_boots("Berserker's Greaves"));
        assert!(catalog.is_boots("1001"));
        assert!(catalog.is_core("Luden's Companion"));
        assert!(!catalog.is_core("Amplifying Tome"));
        assert!(!catalog.is_core("Health Potion"));
        assert!(!catalog.is_core("3006"));
        // unknown to the catalog: static lists decide
        assert!(catalog.is_core("Some New Mythic"));
        assert!(catalog.is_boots("Mercury's Treads"));
    }

    #[test]
    fn malformed_version_never_reaches_the_cache_path() {
        let client = DataDragonClient::new(crate::api::endpoints::DATA_DRAGON_BASE);
        let dir = std::env::temp_dir().join(format!("aram_dashboard_bad_version_{}", std::process::id()));
        let err = CatalogSnapshot::load_or_fetch(&client, &dir, Some("../../escape"), false).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("aram_dashboard_test_{}", std::process::id()));
        let snapshot = sample_snapshot();
        snapshot.save(&dir).unwrap();
        let loaded = CatalogSnapshot::load(&dir, "14.1.1").unwrap();
        assert_eq!(loaded.items.len(), snapshot.items.len());
        assert_eq!(loaded.runes, snapshot.runes);
        assert!(CatalogSnapshot::load(&dir, "0.0.0").is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
