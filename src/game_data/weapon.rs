// Weapon and essence-stat lookups built on the gem, skill patch and wiki tables.

use std::collections::HashMap;

use serde::Serialize;

use super::language::Language;
use super::store::GameDataStore;
use super::tables::{GameTables, GemTermType, TranslationKey};

pub const GROUP_ICON_BASE_URL: &str =
    "https://cos.yituliu.cn/endfield/sprites_selective/wiki/groupicon";

/// Wiki group listing the weapon categories.
pub const WEAPON_TYPE_WIKI_GROUP: &str = "wiki_type_weapon";

/// The three essence stats a weapon rolls, as gem term ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeaponStats {
    pub attribute: Option<String>,
    pub secondary: Option<String>,
    pub skill: Option<String>,
}

pub fn group_icon_url(icon_id: &str) -> String {
    format!("{GROUP_ICON_BASE_URL}/{icon_id}.png")
}

impl GameTables {
    /// Gem term ids of the given slot, ordered by the gem's sort order.
    pub fn gem_ids_by_term_type(&self, term_type: GemTermType) -> Vec<String> {
        let mut gems: Vec<_> = self
            .gems
            .values()
            .filter(|gem| gem.term_type() == Some(term_type))
            .collect();
        gems.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.gem_term_id.cmp(&b.gem_term_id))
        });
        gems.into_iter().map(|gem| gem.gem_term_id.clone()).collect()
    }

    pub fn weapon_stats(&self, weapon_id: &str) -> WeaponStats {
        let mut stats = WeaponStats::default();
        let Some(weapon) = self.weapons.get(weapon_id) else {
            return stats;
        };

        for skill_id in &weapon.weapon_skill_list {
            let gem = self
                .skill_patches
                .get(skill_id)
                .and_then(|bundle| bundle.levels.first())
                .and_then(|patch| self.gem_tag_ids.get(&patch.tag_id))
                .and_then(|gem_id| self.gems.get(gem_id));
            let Some(gem) = gem else {
                tracing::debug!("Weapon {weapon_id}: skill {skill_id} has no gem term");
                continue;
            };
            let slot = match gem.term_type() {
                Some(GemTermType::Attribute) => &mut stats.attribute,
                Some(GemTermType::Secondary) => &mut stats.secondary,
                Some(GemTermType::Skill) => &mut stats.skill,
                None => continue,
            };
            *slot = Some(gem.gem_term_id.clone());
        }
        stats
    }

    /// Weapon item id to the translation key of its weapon type.
    pub fn weapon_type_names(&self) -> HashMap<String, TranslationKey> {
        let mut names = HashMap::new();
        let Some(group) = self.wiki_groups.get(WEAPON_TYPE_WIKI_GROUP) else {
            return names;
        };
        for group_entry in &group.list {
            let Some(entries) = self.wiki_entries.get(&group_entry.group_id) else {
                continue;
            };
            for entry_id in &entries.list {
                if let Some(data) = self.wiki_entry_data.get(entry_id) {
                    names.insert(data.ref_item_id.clone(), group_entry.group_name.clone());
                }
            }
        }
        names
    }
}

impl GameDataStore {
    pub fn all_attribute_stats(&self) -> Vec<String> {
        self.tables().gem_ids_by_term_type(GemTermType::Attribute)
    }

    pub fn all_secondary_stats(&self) -> Vec<String> {
        self.tables().gem_ids_by_term_type(GemTermType::Secondary)
    }

    pub fn all_skill_stats(&self) -> Vec<String> {
        self.tables().gem_ids_by_term_type(GemTermType::Skill)
    }

    /// Localised gem tag name; the term id when the gem is unknown.
    pub fn gem_tag_name(&self, gem_term_id: &str, language: Option<Language>) -> String {
        let language = self.resolve_language(language);
        let tables = self.tables();
        match tables.gems.get(gem_term_id) {
            Some(gem) => tables.translate(&gem.tag_name, language),
            None => gem_term_id.to_string(),
        }
    }

    /// Localised weapon name: the item name when the weapon is also an item,
    /// else the weapon's own name key, else the id.
    pub fn weapon_name(&self, weapon_id: &str, language: Option<Language>) -> String {
        let language = self.resolve_language(language);
        let tables = self.tables();
        if let Some(item) = tables.items.get(weapon_id) {
            return tables.translate(&item.name, language);
        }
        match tables.weapons.get(weapon_id) {
            Some(weapon) => tables.translate(&weapon.eng_name, language),
            None => weapon_id.to_string(),
        }
    }

    pub fn weapon_stats(&self, weapon_id: &str) -> WeaponStats {
        self.tables().weapon_stats(weapon_id)
    }

    /// Localised weapon-type name for a weapon item, if the wiki lists it.
    pub fn weapon_type_name(&self, weapon_id: &str, language: Option<Language>) -> Option<String> {
        let language = self.resolve_language(language);
        let tables = self.tables();
        let key = tables.weapon_type_names().remove(weapon_id)?;
        Some(tables.translate(&key, language))
    }
}
