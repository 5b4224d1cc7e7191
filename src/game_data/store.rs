// Shared game-data store: loads the TableCfg catalog once and serves lookups.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::Instant;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::metrics;

use super::language::{Language, LanguagePreference};
use super::parse::parse_table;
use super::source::{HttpTableSource, TableSource};
use super::tables::{i18n_resource_path, GameTables, I18nTextTable, TableName, TranslationKey};

/// One fetched and parsed resource, before it is placed into [`GameTables`].
enum Loaded {
    Table(TableName, Box<dyn FnOnce(&mut GameTables) + Send>),
    I18n(Language, I18nTextTable),
}

/// Process-wide cache of the game's data tables.
///
/// Tables are built into a staging [`GameTables`] and published only when every
/// resource in the batch loaded, so readers never see a half-loaded state.
pub struct GameDataStore {
    source: Arc<dyn TableSource>,
    language: Arc<LanguagePreference>,
    tables: RwLock<GameTables>,
    loaded: AtomicBool,
    init_lock: Mutex<()>,
}

impl GameDataStore {
    pub fn new(source: Arc<dyn TableSource>, language: Arc<LanguagePreference>) -> Self {
        Self {
            source,
            language,
            tables: RwLock::new(GameTables::default()),
            loaded: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    /// Store fetching from the backend at `base_url`.
    pub fn http(base_url: &str, language: Arc<LanguagePreference>) -> Self {
        Self::new(Arc::new(HttpTableSource::new(base_url)), language)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn language(&self) -> &Arc<LanguagePreference> {
        &self.language
    }

    /// Load every table and localisation file. A no-op once loaded; concurrent
    /// callers wait for the first load instead of starting their own.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        let _guard = self.init_lock.lock().await;
        if self.is_loaded() {
            return Ok(());
        }
        self.load_all().await
    }

    /// Drop the loaded flag and fetch everything again.
    pub async fn reload(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        self.loaded.store(false, Ordering::Release);
        metrics::GAME_DATA_LOADED.set(0);
        self.load_all().await
    }

    async fn load_all(&self) -> Result<()> {
        tracing::info!("Initializing game data...");
        let started = Instant::now();

        let mut batch: Vec<BoxFuture<'_, Result<Loaded>>> = TableName::ALL
            .into_iter()
            .map(|name| self.fetch_table(name).boxed())
            .collect();
        batch.extend(
            Language::ALL
                .into_iter()
                .map(|language| self.fetch_i18n(language).boxed()),
        );

        let results = match try_join_all(batch).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Game data load failed: {e}");
                return Err(e);
            }
        };

        let mut staging = GameTables::default();
        for loaded in results {
            match loaded {
                Loaded::Table(name, install) => {
                    tracing::debug!("Parsed {}", name.file_stem());
                    install(&mut staging);
                }
                Loaded::I18n(language, table) => {
                    staging.i18n.insert(language, table);
                }
            }
        }

        *self.tables.write().unwrap_or_else(|e| e.into_inner()) = staging;
        self.loaded.store(true, Ordering::Release);

        metrics::GAME_DATA_LOADED.set(1);
        metrics::GAME_DATA_LOAD_SECONDS.observe(started.elapsed().as_secs_f64());
        tracing::info!(
            "Game data initialized in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    async fn fetch_table(&self, name: TableName) -> Result<Loaded> {
        let path = name.resource_path();
        let text = self.fetch(&path, "table").await?;
        let install: Box<dyn FnOnce(&mut GameTables) + Send> = match name {
            TableName::Gem => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.gems = t)
            }
            TableName::GemTagId => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.gem_tag_ids = t)
            }
            TableName::Item => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.items = t)
            }
            TableName::RarityColor => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.rarity_colors = t)
            }
            TableName::SkillPatch => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.skill_patches = t)
            }
            TableName::WeaponBasic => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.weapons = t)
            }
            TableName::WikiEntryData => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.wiki_entry_data = t)
            }
            TableName::WikiEntry => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.wiki_entries = t)
            }
            TableName::WikiGroup => {
                let t = parse_table(&path, &text)?;
                Box::new(move |g: &mut GameTables| g.wiki_groups = t)
            }
        };
        Ok(Loaded::Table(name, install))
    }

    async fn fetch_i18n(&self, language: Language) -> Result<Loaded> {
        let path = i18n_resource_path(language);
        let text = self.fetch(&path, "i18n").await?;
        let table: I18nTextTable =
            serde_json::from_str(&text).map_err(|e| Error::parse(&path, e))?;
        Ok(Loaded::I18n(language, table))
    }

    async fn fetch(&self, path: &str, kind: &str) -> Result<String> {
        metrics::TABLE_FETCHES_TOTAL.with_label_values(&[kind]).inc();
        self.source.fetch_text(path).await.inspect_err(|_| {
            metrics::TABLE_FETCH_ERRORS_TOTAL
                .with_label_values(&[kind])
                .inc();
        })
    }

    /// Read access to the loaded tables. Empty until [`initialize`](Self::initialize)
    /// succeeds.
    pub fn tables(&self) -> RwLockReadGuard<'_, GameTables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Translate `key` into `language`, or the current language when `None`.
    pub fn get_translation(&self, key: &TranslationKey, language: Option<Language>) -> String {
        let language = self.resolve_language(language);
        self.tables().translate(key, language)
    }

    /// Resolve a caller-supplied language against the preference.
    pub(crate) fn resolve_language(&self, language: Option<Language>) -> Language {
        language.unwrap_or_else(|| self.language.current())
    }
}
