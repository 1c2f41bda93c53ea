use serde::Deserialize;
use std::collections::HashMap;

// Data Dragon champion.json
#[derive(Debug, Deserialize)]
pub struct ChampionListDto {
    pub data: HashMap<String, ChampionDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChampionDto {
    pub id: String,
    pub key: String,
    pub name: String,
}

// Data Dragon item.json, keyed by item id
#[derive(Debug, Deserialize)]
pub struct ItemListDto {
    pub data: HashMap<String, ItemDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ItemDto {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub into: Vec<String>,
}

// Data Dragon summoner.json
#[derive(Debug, Deserialize)]
pub struct SummonerSpellListDto {
    pub data: HashMap<String, SummonerSpellDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummonerSpellDto {
    pub id: String,
    pub key: String,
    pub name: String,
}

// Data Dragon runesReforged.json
#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RuneTreeDto {
    pub id: u32,
    pub key: String,
    pub icon: String,
    pub name: String,
    #[serde(default)]
    pub slots: Vec<RuneSlotDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuneSlotDto {
    pub runes: Vec<RuneDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RuneDto {
    pub id: u32,
    pub key: String,
    pub icon: String,
    pub name: String,
}
