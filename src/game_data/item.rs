// Item lookups: names, icons and rarity colours.

use super::color::Rgba;
use super::language::Language;
use super::store::GameDataStore;

pub const ITEM_ICON_BASE_URL: &str = "https://cos.yituliu.cn/endfield/unpack-images/items";

impl GameDataStore {
    /// Localised item name; the id itself when the item is unknown.
    pub fn item_name(&self, item_id: &str, language: Option<Language>) -> String {
        let language = self.resolve_language(language);
        let tables = self.tables();
        match tables.items.get(item_id) {
            Some(item) => tables.translate(&item.name, language),
            None => item_id.to_string(),
        }
    }

    pub fn item_icon_url(&self, item_id: &str) -> Option<String> {
        let tables = self.tables();
        let item = tables.items.get(item_id)?;
        if item.icon_id.is_empty() {
            return None;
        }
        Some(format!("{ITEM_ICON_BASE_URL}/{}.webp", item.icon_id))
    }

    pub fn item_rarity(&self, item_id: &str) -> Option<i32> {
        self.tables().items.get(item_id).and_then(|item| item.rarity)
    }

    /// Colour of the item's rarity tier, transparent when the item, its rarity
    /// entry or the colour string is missing.
    pub fn item_tier_color(&self, item_id: &str) -> Rgba {
        let Some(rarity) = self.item_rarity(item_id) else {
            return Rgba::TRANSPARENT;
        };
        self.tables()
            .rarity_colors
            .get(&rarity.to_string())
            .and_then(|entry| Rgba::from_hex(&entry.color))
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::store::tests::{store_with, FakeSource};
    use crate::game_data::tables::TableName;

    const ITEMS: &str = r#"{
        "item_plate": {
            "id": "item_plate",
            "name": {"id": 5000000000000000001, "text": "钢板"},
            "iconId": "item_plate_icon",
            "rarity": 4
        },
        "item_odd": {"id": "item_odd", "name": {"id": 2, "text": "Odd"}, "rarity": 9},
        "item_plain": {"id": "item_plain", "name": {"id": 3, "text": "Plain"}}
    }"#;
    const RARITY: &str = r#"{
        "0": {"color": "FFFFFF", "rarity": 0},
        "4": {"color": "9452FA", "rarity": 4},
        "9": {"color": "not-a-colour", "rarity": 9}
    }"#;

    async fn loaded_store() -> GameDataStore {
        let mut fake =
            FakeSource::with_tables(&[(TableName::Item, ITEMS), (TableName::RarityColor, RARITY)]);
        fake.set_i18n(Language::En, r#"{"5000000000000000001": "Steel Plate "}"#);
        let (store, _source) = store_with(fake);
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_item_name() {
        let store = loaded_store().await;
        assert_eq!(store.item_name("item_plate", None), "Steel Plate");
        assert_eq!(store.item_name("item_plate", Some(Language::Cn)), "钢板");
        assert_eq!(store.item_name("item_missing", None), "item_missing");
    }

    #[tokio::test]
    async fn test_item_icon_url() {
        let store = loaded_store().await;
        assert_eq!(
            store.item_icon_url("item_plate").as_deref(),
            Some("https://cos.yituliu.cn/endfield/unpack-images/items/item_plate_icon.webp")
        );
        assert_eq!(store.item_icon_url("item_odd"), None);
        assert_eq!(store.item_icon_url("item_missing"), None);
    }

    #[tokio::test]
    async fn test_item_tier_color() {
        let store = loaded_store().await;
        assert_eq!(store.item_rarity("item_plate"), Some(4));
        assert_eq!(store.item_tier_color("item_plate"), Rgba::new(0x94, 0x52, 0xfa, 255));
        assert_eq!(store.item_tier_color("item_odd"), Rgba::TRANSPARENT);
        assert_eq!(store.item_tier_color("item_missing"), Rgba::TRANSPARENT);
    }

    #[tokio::test]
    async fn test_absent_rarity_is_none() {
        let store = loaded_store().await;
        assert_eq!(store.item_rarity("item_plain"), None);
        // A rarity-0 colour entry must not be picked up for items without a rarity.
        assert_eq!(store.item_tier_color("item_plain"), Rgba::TRANSPARENT);
    }

    #[tokio::test]
    async fn test_lookups_before_load_fall_back() {
        let (store, _source) = store_with(FakeSource::with_tables(&[]));
        assert_eq!(store.item_name("item_plate", None), "item_plate");
        assert_eq!(store.item_rarity("item_plate"), None);
        assert_eq!(store.item_tier_color("item_plate"), Rgba::TRANSPARENT);
    }
}
