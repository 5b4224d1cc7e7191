// Application context: the shared services handed to every consumer.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::game_data::{GameDataStore, LanguagePreference};
use crate::log_stream::{LogStreamClient, LogStreamOptions, ReconnectPolicy};

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub language: Arc<LanguagePreference>,
    pub game_data: Arc<GameDataStore>,
    pub logs: LogStreamClient,
}

impl AppContext {
    /// Wire up the services described by `config`. No I/O beyond reading the
    /// persisted language; call [`GameDataStore::initialize`] and
    /// [`LogStreamClient::mount`] to start fetching.
    pub fn from_config(config: Config) -> Result<Self> {
        let language = Arc::new(LanguagePreference::load(&config.language_file));
        if let Some(forced) = config.language {
            language.set(forced)?;
        }

        let game_data = Arc::new(GameDataStore::http(
            &config.api_base_url,
            language.clone(),
        ));

        let logs = LogStreamClient::websocket(
            config.logs_ws_url(),
            LogStreamOptions {
                policy: ReconnectPolicy::fixed(config.reconnect_delay),
                convert_ansi: config.log_html,
                ..Default::default()
            },
        );

        Ok(Self {
            config,
            language,
            game_data,
            logs,
        })
    }

    /// Stop background work.
    pub async fn shutdown(&self) {
        self.logs.unmount().await;
    }
}
