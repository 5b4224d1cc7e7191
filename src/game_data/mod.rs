// Game-data tables fetched from the backend and the lookups built on them.

pub mod color;
pub mod item;
pub mod language;
pub mod parse;
pub mod source;
pub mod store;
pub mod tables;
pub mod weapon;

pub use color::Rgba;
pub use language::{Language, LanguagePreference};
pub use parse::parse_with_id_preservation;
pub use source::{HttpTableSource, TableSource};
pub use store::GameDataStore;
pub use tables::{GameDataTable, GameTables, GemTermType, TableName, TranslationKey};
pub use weapon::WeaponStats;
