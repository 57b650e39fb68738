//! Watch display settings
//!
//! Settings are stored as individual preference keys holding enum names,
//! so a value written by a newer build that this one does not recognise
//! falls back to the default instead of failing the whole read.

use crate::storage::{PreferenceStore, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

pub const TEXT_SIZE_KEY: &str = "text_size";
pub const ACCENT_COLOR_KEY: &str = "accent_color";
pub const WATCH_TYPE_KEY: &str = "watch_type";
pub const DARK_MODE_KEY: &str = "dark_mode";
pub const ENABLED_COMPLICATIONS_KEY: &str = "enabled_complications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    /// Multiplier applied to base font sizes
    pub fn scale(&self) -> f32 {
        match self {
            TextSize::Small => 0.85,
            TextSize::Medium => 1.0,
            TextSize::Large => 1.15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextSize::Small => "SMALL",
            TextSize::Medium => "MEDIUM",
            TextSize::Large => "LARGE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SMALL" => Some(TextSize::Small),
            "MEDIUM" => Some(TextSize::Medium),
            "LARGE" => Some(TextSize::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccentColor {
    #[default]
    Green,
    Blue,
    Purple,
    Red,
    Orange,
    Pink,
}

impl AccentColor {
    pub fn all() -> [AccentColor; 6] {
        [
            AccentColor::Green,
            AccentColor::Blue,
            AccentColor::Purple,
            AccentColor::Red,
            AccentColor::Orange,
            AccentColor::Pink,
        ]
    }

    /// ARGB color value
    pub fn argb(&self) -> u32 {
        match self {
            AccentColor::Green => 0xFF00C853,
            AccentColor::Blue => 0xFF2196F3,
            AccentColor::Purple => 0xFF9C27B0,
            AccentColor::Red => 0xFFF44336,
            AccentColor::Orange => 0xFFFF9800,
            AccentColor::Pink => 0xFFE91E63,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccentColor::Green => "GREEN",
            AccentColor::Blue => "BLUE",
            AccentColor::Purple => "PURPLE",
            AccentColor::Red => "RED",
            AccentColor::Orange => "ORANGE",
            AccentColor::Pink => "PINK",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchType {
    #[default]
    Digital,
    Analog,
}

impl WatchType {
    pub fn name(&self) -> &'static str {
        match self {
            WatchType::Digital => "DIGITAL",
            WatchType::Analog => "ANALOG",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DIGITAL" => Some(WatchType::Digital),
            "ANALOG" => Some(WatchType::Analog),
            _ => None,
        }
    }
}

/// Shortcut shown on the watch face
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplicationFeature {
    Settings,
    AllMeds,
    History,
    Maintenance,
    Emergency,
    Vitals,
    Upcoming,
}

impl ComplicationFeature {
    pub fn all() -> [ComplicationFeature; 7] {
        [
            ComplicationFeature::Settings,
            ComplicationFeature::AllMeds,
            ComplicationFeature::History,
            ComplicationFeature::Maintenance,
            ComplicationFeature::Emergency,
            ComplicationFeature::Vitals,
            ComplicationFeature::Upcoming,
        ]
    }

    /// Features the user cannot turn off
    pub fn is_always_enabled(&self) -> bool {
        matches!(self, ComplicationFeature::Settings | ComplicationFeature::AllMeds)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComplicationFeature::Settings => "SETTINGS",
            ComplicationFeature::AllMeds => "ALL_MEDS",
            ComplicationFeature::History => "HISTORY",
            ComplicationFeature::Maintenance => "MAINTENANCE",
            ComplicationFeature::Emergency => "EMERGENCY",
            ComplicationFeature::Vitals => "VITALS",
            ComplicationFeature::Upcoming => "UPCOMING",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComplicationFeature::Settings => "Settings",
            ComplicationFeature::AllMeds => "All Meds",
            ComplicationFeature::History => "History",
            ComplicationFeature::Maintenance => "Maintenance",
            ComplicationFeature::Emergency => "Emergency",
            ComplicationFeature::Vitals => "Vitals",
            ComplicationFeature::Upcoming => "Upcoming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub text_size: TextSize,
    pub accent_color: AccentColor,
    pub watch_type: WatchType,
    pub dark_mode: bool,
    pub enabled_complications: BTreeSet<ComplicationFeature>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            text_size: TextSize::default(),
            accent_color: AccentColor::default(),
            watch_type: WatchType::default(),
            dark_mode: false,
            enabled_complications: ComplicationFeature::all().into_iter().collect(),
        }
    }
}

impl AppSettings {
    pub fn is_enabled(&self, feature: ComplicationFeature) -> bool {
        feature.is_always_enabled() || self.enabled_complications.contains(&feature)
    }
}

/// Reads and writes `AppSettings`, publishing every change
pub struct SettingsRepository {
    prefs: Arc<dyn PreferenceStore>,
    tx: watch::Sender<AppSettings>,
}

impl SettingsRepository {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        let initial = match read_settings(prefs.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read settings, using defaults");
                AppSettings::default()
            }
        };
        let (tx, _) = watch::channel(initial);
        Self { prefs, tx }
    }

    pub fn current(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }

    pub fn update_text_size(&self, size: TextSize) -> StorageResult<()> {
        self.prefs.put_string(TEXT_SIZE_KEY, size.name())?;
        self.tx.send_modify(|s| s.text_size = size);
        Ok(())
    }

    pub fn update_accent_color(&self, color: AccentColor) -> StorageResult<()> {
        self.prefs.put_string(ACCENT_COLOR_KEY, color.name())?;
        self.tx.send_modify(|s| s.accent_color = color);
        Ok(())
    }

    pub fn update_watch_type(&self, watch_type: WatchType) -> StorageResult<()> {
        self.prefs.put_string(WATCH_TYPE_KEY, watch_type.name())?;
        self.tx.send_modify(|s| s.watch_type = watch_type);
        Ok(())
    }

    pub fn update_dark_mode(&self, enabled: bool) -> StorageResult<()> {
        self.prefs.put_bool(DARK_MODE_KEY, enabled)?;
        self.tx.send_modify(|s| s.dark_mode = enabled);
        Ok(())
    }

    /// Replace the enabled set; always-enabled features are added back
    pub fn update_enabled_complications(
        &self,
        features: impl IntoIterator<Item = ComplicationFeature>,
    ) -> StorageResult<()> {
        let mut features: BTreeSet<ComplicationFeature> = features.into_iter().collect();
        features.insert(ComplicationFeature::Settings);
        features.insert(ComplicationFeature::AllMeds);

        let names = features.iter().map(|f| f.name().to_string()).collect();
        self.prefs.put_string_set(ENABLED_COMPLICATIONS_KEY, names)?;
        self.tx.send_modify(|s| s.enabled_complications = features);
        Ok(())
    }

    /// Flip one feature. Always-enabled features are left as they are.
    pub fn toggle_complication(&self, feature: ComplicationFeature) -> StorageResult<()> {
        if feature.is_always_enabled() {
            return Ok(());
        }

        let mut features = self.tx.borrow().enabled_complications.clone();
        if !features.remove(&feature) {
            features.insert(feature);
        }
        self.update_enabled_complications(features)
    }
}

fn read_settings(prefs: &dyn PreferenceStore) -> StorageResult<AppSettings> {
    let defaults = AppSettings::default();

    let text_size = prefs
        .get_string(TEXT_SIZE_KEY)?
        .and_then(|name| TextSize::from_name(&name))
        .unwrap_or(defaults.text_size);
    let accent_color = prefs
        .get_string(ACCENT_COLOR_KEY)?
        .and_then(|name| AccentColor::from_name(&name))
        .unwrap_or(defaults.accent_color);
    let watch_type = prefs
        .get_string(WATCH_TYPE_KEY)?
        .and_then(|name| WatchType::from_name(&name))
        .unwrap_or(defaults.watch_type);
    let dark_mode = prefs.get_bool(DARK_MODE_KEY)?.unwrap_or(defaults.dark_mode);

    let enabled_complications = match prefs.get_string_set(ENABLED_COMPLICATIONS_KEY)? {
        Some(names) => names
            .iter()
            .filter_map(|name| ComplicationFeature::from_name(name))
            .collect(),
        None => defaults.enabled_complications,
    };

    Ok(AppSettings {
        text_size,
        accent_color,
        watch_type,
        dark_mode,
        enabled_complications,
    })
}
