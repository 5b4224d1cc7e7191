// Record types for the TableCfg resources served by the backend.
//
// Field names follow the camelCase of the data dump. Everything defaults when
// absent so a new game patch adding or dropping fields does not break a load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::language::Language;

/// A named data table: string id to record.
pub type GameDataTable<T> = HashMap<String, T>;

/// Text id to translated string, for one language.
pub type I18nTextTable = HashMap<String, String>;

/// A localisable reference: text id plus the untranslated default text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationKey {
    pub id: String,
    pub text: String,
}

impl TranslationKey {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: TranslationKey,
    pub desc: TranslationKey,
    pub deco_desc: TranslationKey,
    pub icon_id: String,
    pub icon_composite_id: String,
    pub model_key: String,
    /// `None` when the dump omits the field.
    pub rarity: Option<i32>,
    #[serde(rename = "type")]
    pub item_type: i32,
    pub showing_type: i32,
    pub valuable_tab_type: i32,
    pub max_stack_count: i64,
    pub max_backpack_stack_count: i64,
    pub backpack_can_discard: bool,
    pub obtain_way_ids: Vec<String>,
    pub outcome_item_ids: Vec<String>,
    pub sort_id1: i64,
    pub sort_id2: i64,
}

/// Which essence slot a gem term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemTermType {
    Attribute,
    Secondary,
    Skill,
}

impl GemTermType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(GemTermType::Attribute),
            1 => Some(GemTermType::Secondary),
            2 => Some(GemTermType::Skill),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Gem {
    pub gem_term_id: String,
    pub is_skill_term: bool,
    pub sort_order: i32,
    pub tag_desc: TranslationKey,
    pub tag_icon: String,
    pub tag_id: String,
    pub tag_name: TranslationKey,
    pub term_type: i32,
}

impl Gem {
    pub fn term_type(&self) -> Option<GemTermType> {
        GemTermType::from_raw(self.term_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaponBasic {
    pub weapon_id: String,
    pub eng_name: TranslationKey,
    pub weapon_desc: TranslationKey,
    pub rarity: i32,
    pub weapon_type: i32,
    pub max_lv: i32,
    pub weapon_skill_list: Vec<String>,
    pub weapon_potential_skill: String,
    pub potential_up_item_list: Vec<String>,
    pub breakthrough_template_id: String,
    pub level_template_id: String,
    pub talent_template_id: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillPatch {
    pub skill_id: String,
    pub skill_name: TranslationKey,
    pub description: TranslationKey,
    pub icon_id: String,
    pub level: i32,
    pub tag_id: String,
    pub cool_down: f64,
    pub cost_type: i32,
    pub cost_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillPatchBundle {
    #[serde(rename = "SkillPatchDataBundle")]
    pub levels: Vec<SkillPatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityColor {
    pub color: String,
    pub rarity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WikiEntryData {
    pub id: String,
    pub desc: TranslationKey,
    pub group_id: String,
    pub order: i32,
    pub prts_id: String,
    pub ref_item_id: String,
    pub ref_monster_template_id: String,
}

/// Ordered list of wiki entry ids under one group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiEntry {
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WikiGroupEntry {
    pub group_id: String,
    pub group_name: TranslationKey,
    pub icon_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiGroup {
    pub list: Vec<WikiGroupEntry>,
}

/// The tables fetched from `TableCfg`, in fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Gem,
    GemTagId,
    Item,
    RarityColor,
    SkillPatch,
    WeaponBasic,
    WikiEntryData,
    WikiEntry,
    WikiGroup,
}

impl TableName {
    pub const ALL: [TableName; 9] = [
        TableName::Gem,
        TableName::GemTagId,
        TableName::Item,
        TableName::RarityColor,
        TableName::SkillPatch,
        TableName::WeaponBasic,
        TableName::WikiEntryData,
        TableName::WikiEntry,
        TableName::WikiGroup,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            TableName::Gem => "GemTable",
            TableName::GemTagId => "GemTagIdTable",
            TableName::Item => "ItemTable",
            TableName::RarityColor => "RarityColorTable",
            TableName::SkillPatch => "SkillPatchTable",
            TableName::WeaponBasic => "WeaponBasicTable",
            TableName::WikiEntryData => "WikiEntryDataTable",
            TableName::WikiEntry => "WikiEntryTable",
            TableName::WikiGroup => "WikiGroupTable",
        }
    }

    /// Resource path under `/api/data/`.
    pub fn resource_path(&self) -> String {
        format!("endfielddata/TableCfg/{}.json", self.file_stem())
    }
}

/// Resource path of the localisation table for `language`.
pub fn i18n_resource_path(language: Language) -> String {
    format!("endfielddata/TableCfg/I18nTextTable_{}.json", language.code())
}

/// Every table the store holds. Built whole, then swapped in.
#[derive(Debug, Clone, Default)]
pub struct GameTables {
    pub gems: GameDataTable<Gem>,
    pub gem_tag_ids: GameDataTable<String>,
    pub items: GameDataTable<Item>,
    pub rarity_colors: GameDataTable<RarityColor>,
    pub skill_patches: GameDataTable<SkillPatchBundle>,
    pub weapons: GameDataTable<WeaponBasic>,
    pub wiki_entry_data: GameDataTable<WikiEntryData>,
    pub wiki_entries: GameDataTable<WikiEntry>,
    pub wiki_groups: GameDataTable<WikiGroup>,
    pub i18n: HashMap<Language, I18nTextTable>,
}

impl GameTables {
    /// Resolve `key` in `language`: the trimmed translation when present and
    /// non-blank, the key's default text otherwise.
    pub fn translate(&self, key: &TranslationKey, language: Language) -> String {
        self.i18n
            .get(&language)
            .and_then(|table| table.get(&key.id))
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| key.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::parse::parse_table;

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            TableName::WikiGroup.resource_path(),
            "endfielddata/TableCfg/WikiGroupTable.json"
        );
        assert_eq!(
            i18n_resource_path(Language::Kr),
            "endfielddata/TableCfg/I18nTextTable_KR.json"
        );
    }

    #[test]
    fn test_item_table_from_dump_shape() {
        let text = r#"{
            "item_gold": {
                "id": "item_gold",
                "name": {"id": 8420187654321098765, "text": "Gold"},
                "iconId": "icon_gold",
                "rarity": 3,
                "type": 12,
                "obtainWayIds": ["shop"],
                "someFutureField": {"nested": true}
            }
        }"#;
        let table: GameDataTable<Item> = parse_table("ItemTable.json", text).unwrap();
        let item = &table["item_gold"];
        assert_eq!(item.name.id, "8420187654321098765");
        assert_eq!(item.name.text, "Gold");
        assert_eq!(item.icon_id, "icon_gold");
        assert_eq!(item.rarity, Some(3));
        assert_eq!(item.item_type, 12);
        assert!(item.desc.text.is_empty());
    }

    #[test]
    fn test_skill_patch_bundle_field_name() {
        let text = r#"{"sk_1": {"SkillPatchDataBundle": [{"skillId": "sk_1", "tagId": "tag_a", "level": 1}]}}"#;
        let table: GameDataTable<SkillPatchBundle> = parse_table("SkillPatchTable.json", text).unwrap();
        assert_eq!(table["sk_1"].levels[0].tag_id, "tag_a");
    }

    #[test]
    fn test_translate_trims_and_falls_back() {
        let mut tables = GameTables::default();
        let mut en = I18nTextTable::new();
        en.insert("1".into(), "  Sword \n".into());
        en.insert("2".into(), "   ".into());
        tables.i18n.insert(Language::En, en);

        assert_eq!(tables.translate(&TranslationKey::new("1", "剑"), Language::En), "Sword");
        assert_eq!(tables.translate(&TranslationKey::new("2", " 盾 "), Language::En), " 盾 ");
        assert_eq!(tables.translate(&TranslationKey::new("3", "弓"), Language::En), "弓");
        assert_eq!(tables.translate(&TranslationKey::new("1", "剑"), Language::Jp), "剑");
    }
}
