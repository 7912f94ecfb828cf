use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::calendar::{Locale, SelectionMode, DEFAULT_LABEL_FORMAT};
use crate::errors::{CalendarError, Result};
use crate::utils::app_data_dir;

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Stores user-configurable picker defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default = "PickerConfig::default_locale")]
    pub locale: String,
    #[serde(default)]
    pub selection_mode: SelectionMode,
    #[serde(default = "PickerConfig::default_month_label_format")]
    pub month_label_format: String,
    /// How many months the CLI shows when `init` is given only a start date.
    #[serde(default = "PickerConfig::default_months_ahead")]
    pub months_ahead: u32,
    #[serde(default)]
    pub display_only: bool,
    #[serde(default = "PickerConfig::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            selection_mode: SelectionMode::default(),
            month_label_format: Self::default_month_label_format(),
            months_ahead: Self::default_months_ahead(),
            display_only: false,
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl PickerConfig {
    pub const KEYS: [&'static str; 6] = [
        "locale",
        "selection_mode",
        "month_label_format",
        "months_ahead",
        "display_only",
        "ui_color_enabled",
    ];

    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn default_month_label_format() -> String {
        DEFAULT_LABEL_FORMAT.into()
    }

    pub fn default_months_ahead() -> u32 {
        12
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn locale(&self) -> Locale {
        Locale::new(&self.locale)
    }

    /// Updates one key from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "locale" => self.locale = value.trim().to_string(),
            "selection_mode" => self.selection_mode = value.parse()?,
            "month_label_format" => self.month_label_format = value.to_string(),
            "months_ahead" => {
                self.months_ahead = value.trim().parse().map_err(|_| {
                    CalendarError::Config(format!("months_ahead expects a number, got `{value}`"))
                })?
            }
            "display_only" => self.display_only = parse_flag(key, value)?,
            "ui_color_enabled" => self.ui_color_enabled = parse_flag(key, value)?,
            other => {
                return Err(CalendarError::Config(format!(
                    "unknown configuration key `{other}`"
                )))
            }
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(CalendarError::Config(format!(
            "{key} expects true or false, got `{value}`"
        ))),
    }
}

/// Loads and saves [`PickerConfig`] as JSON under `<base>/config/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_root = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_root)?;
        Ok(Self {
            path: config_root.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<PickerConfig> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(PickerConfig::default())
        }
    }

    pub fn save(&self, config: &PickerConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
