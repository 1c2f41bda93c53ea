use std::collections::HashMap;
use std::fmt;

/// Kind of game asset a label refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Champion,
    Item,
    Spell,
    Rune,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Champion => "champion",
            AssetKind::Item => "item",
            AssetKind::Spell => "spell",
            AssetKind::Rune => "rune",
        };
        f.write_str(name)
    }
}

// (canonical label, aliases). Canonical labels are Data Dragon display names.
const SPELL_ALIASES: &[(&str, &[&str])] = &[
    ("Flash", &["SummonerFlash", "4", "점멸"]),
    ("Heal", &["SummonerHeal", "7", "회복"]),
    ("Ghost", &["SummonerHaste", "6", "유체화"]),
    ("Barrier", &["SummonerBarrier", "21", "방어막"]),
    ("Exhaust", &["SummonerExhaust", "3", "탈진"]),
    ("Ignite", &["SummonerDot", "14", "점화"]),
    ("Cleanse", &["SummonerBoost", "1", "정화"]),
    ("Clarity", &["SummonerMana", "13", "총명"]),
    ("Smite", &["SummonerSmite", "11", "강타"]),
    ("Teleport", &["SummonerTeleport", "12", "순간이동"]),
    (
        "Mark",
        &["SummonerSnowball", "32", "Snowball", "Dash", "SummonerSnowURFSnowball_Mark", "39", "표식"],
    ),
];

const CHAMPION_ALIASES: &[(&str, &[&str])] = &[
    ("Wukong", &["MonkeyKing"]),
    ("Nunu & Willump", &["Nunu", "Nunu&Willump"]),
    ("Renata Glasc", &["Renata"]),
];

const RUNE_ALIASES: &[(&str, &[&str])] = &[
    ("Precision", &["8000"]),
    ("Domination", &["8100"]),
    ("Sorcery", &["8200"]),
    ("Inspiration", &["8300"]),
    ("Resolve", &["8400"]),
];

/// Case- and whitespace-insensitive lookup key.
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The one authoritative synonym table. Every canonical label is also an
/// entry for itself, so canonicalizing a canonical label is a no-op.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<(AssetKind, String), String>,
}

impl AliasTable {
    pub fn new() -> Self {
        AliasTable {
            entries: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = AliasTable::new();
        for (kind, groups) in [
            (AssetKind::Spell, SPELL_ALIASES),
            (AssetKind::Champion, CHAMPION_ALIASES),
            (AssetKind::Rune, RUNE_ALIASES),
        ] {
            for (canonical, aliases) in groups {
                for alias in aliases.iter() {
                    table.insert(kind, alias, canonical);
                }
            }
        }
        table
    }

    pub fn insert(&mut self, kind: AssetKind, alias: &str, canonical: &str) {
        let canonical = collapse_whitespace(canonical);
        self.entries
            .insert((kind, normalize_key(&canonical)), canonical.clone());
        self.entries.insert((kind, normalize_key(alias)), canonical);
    }

    /// Canonical label for a known alias.
    pub fn lookup(&self, kind: AssetKind, value: &str) -> Option<&str> {
        self.entries
            .get(&(kind, normalize_key(value)))
            .map(|s| s.as_str())
    }

    /// Canonical label, or the whitespace-collapsed input when unknown.
    pub fn canonical(&self, kind: AssetKind, value: &str) -> String {
        match self.lookup(kind, value) {
            Some(label) => label.to_string(),
            None => collapse_whitespace(value),
        }
    }
}

/// Maps both members to canonical labels and orders them by normalized form,
/// so `(A, B)` and `(B, A)` produce the same key.
pub fn canonicalize_pair(aliases: &AliasTable, kind: AssetKind, a: &str, b: &str) -> (String, String) {
    let a = aliases.canonical(kind, a);
    let b = aliases.canonical(kind, b);
    let order = |s: &String| (normalize_key(s), s.clone());
    if order(&a) <= order(&b) {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "Flash",
        "flash",
        " SummonerFlash ",
        "4",
        "Heal",
        "SummonerHeal",
        "Mark",
        "SummonerSnowball",
        "Unknown  Spell",
        "unknownspell",
        "",
        "Zzz",
    ];

    #[test]
    fn synonyms_fold_to_one_label() {
        let t = AliasTable::builtin();
        assert_eq!(t.canonical(AssetKind::Spell, "SummonerFlash"), "Flash");
        assert_eq!(t.canonical(AssetKind::Spell, "  flash "), "Flash");
        assert_eq!(t.canonical(AssetKind::Spell, "4"), "Flash");
        assert_eq!(t.canonical(AssetKind::Spell, "Summoner Snowball"), "Mark");
        assert_eq!(t.canonical(AssetKind::Spell, "점멸"), "Flash");
        assert_eq!(t.canonical(AssetKind::Champion, "MonkeyKing"), "Wukong");
        assert_eq!(t.canonical(AssetKind::Spell, "  Frost   Nova "), "Frost Nova");
    }

    #[test]
    fn kinds_do_not_share_aliases() {
        let t = AliasTable::builtin();
        assert_eq!(t.lookup(AssetKind::Item, "4"), None);
        assert_eq!(t.lookup(AssetKind::Spell, "MonkeyKing"), None);
    }

    #[test]
    fn pair_canonicalization_is_commutative() {
        let t = AliasTable::builtin();
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(
                    canonicalize_pair(&t, AssetKind::Spell, a, b),
                    canonicalize_pair(&t, AssetKind::Spell, b, a),
                    "({a:?}, {b:?})"
                );
            }
        }
    }

    #[test]
    fn pair_canonicalization_is_idempotent() {
        let t = AliasTable::builtin();
        for a in SAMPLES {
            for b in SAMPLES {
                let once = canonicalize_pair(&t, AssetKind::Spell, a, b);
                let twice = canonicalize_pair(&t, AssetKind::Spell, &once.0, &once.1);
                assert_eq!(once, twice, "({a:?}, {b:?})");
            }
        }
    }

    #[test]
    fn pair_is_ordered_by_normalized_label() {
        let t = AliasTable::builtin();
        assert_eq!(
            canonicalize_pair(&t, AssetKind::Spell, "SummonerHeal", "SummonerFlash"),
            ("Flash".to_string(), "Heal".to_string())
        );
        assert_eq!(
            canonicalize_pair(&t, AssetKind::Spell, "mark", "Flash"),
            ("Flash".to_string(), "Mark".to_string())
        );
    }
}
