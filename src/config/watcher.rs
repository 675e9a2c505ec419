use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::{AppConfig, SharedConfig};

/// Reloads the configuration file into the shared config whenever it changes.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    reload_tx: broadcast::Sender<AppConfig>,
}

impl ConfigWatcher {
    /// Must be called from within a tokio runtime.
    pub fn new(config_path: &str, config: SharedConfig) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel(16);
        let handle = Handle::try_current()?;

        let path = config_path.to_string();
        let reload_tx_clone = reload_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if event.kind.is_modify() => {
                    info!("Configuration file changed, reloading...");

                    match AppConfig::load_from(&path) {
                        Ok(new_config) => {
                            let config = config.clone();
                            let reload_tx_clone = reload_tx_clone.clone();

                            handle.spawn(async move {
                                *config.write().await = new_config.clone();

                                if let Err(e) = reload_tx_clone.send(new_config) {
                                    warn!("No active config reload subscribers: {}", e);
                                } else {
                                    info!("Configuration reloaded successfully");
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("File watcher error: {}", e);
                }
            },
            Config::default(),
        )?;

        watcher.watch(Path::new(config_path), RecursiveMode::NonRecursive)?;
        info!("Started watching configuration file: {}", config_path);

        Ok(ConfigWatcher {
            _watcher: watcher,
            reload_tx,
        })
    }

    pub fn subscribe_to_reloads(&self) -> broadcast::Receiver<AppConfig> {
        self.reload_tx.subscribe()
    }
}
