use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

use crate::validate::AllowedExtensions;

pub const SETTINGS_DIRECTORY_NAME: &str = "quill";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_ALLOWED_FILE_EXTENSIONS: &str = ".pdf,.txt,.md,.csv,.png,.jpg,.jpeg";
pub const DEFAULT_STORE_ENDPOINT: &str = "http://127.0.0.1:8089/v1/files";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSettings {
    /// When the workspace routes messages over its own data, attachments are
    /// suppressed entirely.
    #[serde(default)]
    pub oyd_enabled: bool,
    #[serde(default = "default_allowed_file_extensions")]
    pub allowed_file_extensions: String,
    #[serde(default = "default_clear_on_send")]
    pub clear_on_send: bool,
    #[serde(default = "default_store_endpoint")]
    pub store_endpoint: String,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            oyd_enabled: false,
            allowed_file_extensions: default_allowed_file_extensions(),
            clear_on_send: default_clear_on_send(),
            store_endpoint: default_store_endpoint(),
        }
    }
}

impl ComposerSettings {
    pub fn normalized(mut self) -> Self {
        self.allowed_file_extensions = if self.allowed_file_extensions.trim().is_empty() {
            default_allowed_file_extensions()
        } else {
            self.allowed_file_extensions.trim().to_string()
        };
        self.store_endpoint = if self.store_endpoint.trim().is_empty() {
            default_store_endpoint()
        } else {
            self.store_endpoint.trim().to_string()
        };

        self
    }

    pub fn allowed_extensions(&self) -> AllowedExtensions {
        AllowedExtensions::parse(&self.allowed_file_extensions)
    }

    /// Comma-separated filter string handed verbatim to the platform file picker.
    pub fn picker_type_filter(&self) -> &str {
        &self.allowed_file_extensions
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<ComposerSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".quill"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> Arc<ComposerSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: ComposerSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &PathBuf) -> ComposerSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            return ComposerSettings::default();
        }

        let figment = Figment::from(Serialized::defaults(ComposerSettings::default()))
            .merge(Json::file(path));

        match figment.extract::<ComposerSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                ComposerSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ComposerSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_allowed_file_extensions() -> String {
    DEFAULT_ALLOWED_FILE_EXTENSIONS.to_string()
}

fn default_clear_on_send() -> bool {
    true
}

fn default_store_endpoint() -> String {
    DEFAULT_STORE_ENDPOINT.to_string()
}
