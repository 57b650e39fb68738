//! Application State
//!
//! Composition roots for the phone and watch halves. Each owns its stores
//! for the lifetime of the app session; nothing here is global.

use crate::config::Config;
use crate::medication::{MedicationStore, TakenDoseTracker};
use crate::storage::StorageConfig;
use crate::sync::{DataEvent, DataLayer, WatchDataListener, WatchSyncChannel};
use crate::watch::{SettingsRepository, WatchMedicationStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Preference namespace of the phone stores
pub const PHONE_NAMESPACE: &str = "phone";
/// Preference namespace of the watch medication list
pub const WATCH_NAMESPACE: &str = "watch";
/// Preference namespace of the watch settings
pub const SETTINGS_NAMESPACE: &str = "settings";

/// Everything the phone app needs
pub struct PhoneState {
    pub storage: StorageConfig,
    pub medications: Arc<MedicationStore>,
    pub taken: Arc<TakenDoseTracker>,
    pub sync: Arc<WatchSyncChannel>,
    auto_sync: Option<JoinHandle<()>>,
}

impl PhoneState {
    /// Open the phone stores and start pushing changes to the watch
    ///
    /// Must be called from within a tokio runtime when sync is enabled.
    pub fn build(config: &Config, layer: Arc<dyn DataLayer>) -> Self {
        let storage = config.storage.storage_config();
        let prefs = storage.open_or_memory(PHONE_NAMESPACE);

        let medications = Arc::new(MedicationStore::with_preferences(prefs.clone()));
        let taken = Arc::new(TakenDoseTracker::with_preferences(prefs));
        let sync = Arc::new(WatchSyncChannel::new(layer, config.sync.clone()));

        let auto_sync = if sync.is_enabled() {
            Some(sync.clone().start_auto_sync(medications.subscribe()))
        } else {
            tracing::info!("Watch sync disabled");
            None
        };

        tracing::info!(
            medications = medications.len(),
            backend = %storage.backend,
            format = %config.sync.format,
            "Phone state ready"
        );

        Self {
            storage,
            medications,
            taken,
            sync,
            auto_sync,
        }
    }

    pub fn is_auto_syncing(&self) -> bool {
        self.auto_sync.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PhoneState {
    fn drop(&mut self) {
        if let Some(handle) = self.auto_sync.take() {
            handle.abort();
        }
    }
}

/// Everything the watch app needs
pub struct WatchState {
    pub medications: Arc<WatchMedicationStore>,
    pub settings: SettingsRepository,
}

impl WatchState {
    pub fn build(config: &Config) -> Self {
        let storage = config.storage.storage_config();

        let medications = Arc::new(WatchMedicationStore::with_preferences(
            storage.open_or_memory(WATCH_NAMESPACE),
        ));
        let settings = SettingsRepository::new(storage.open_or_memory(SETTINGS_NAMESPACE));

        tracing::info!(medications = medications.len(), "Watch state ready");

        Self {
            medications,
            settings,
        }
    }

    /// Listener that applies phone pushes to this watch's store
    pub fn listener(&self) -> WatchDataListener {
        WatchDataListener::new(self.medications.clone())
    }

    /// Spawn the listener on `events`
    pub fn listen(&self, events: broadcast::Receiver<DataEvent>) -> JoinHandle<()> {
        self.listener().spawn(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::Medication;
    use crate::storage::PrefsBackend;
    use crate::sync::{InProcessDataLayer, SyncOutcome};
    use chrono::NaiveTime;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, backend: PrefsBackend) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.to_string_lossy().to_string();
        config.storage.backend = backend;
        config
    }

    async fn wait_for(watch: &WatchState, count: usize) {
        let mut rx = watch.medications.subscribe();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|list| list.len() == count))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_phone_changes_reach_watch() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), PrefsBackend::Json);

        let layer = Arc::new(InProcessDataLayer::default());
        let watch = WatchState::build(&config);
        let listener = watch.listen(layer.subscribe());
        let phone = PhoneState::build(&config, layer.clone());
        assert!(phone.is_auto_syncing());

        let med = Medication::new("Amoxicillin", "500mg").at(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let id = med.id.clone();
        phone.medications.add(med).unwrap();
        wait_for(&watch, 1).await;
        assert_eq!(watch.medications.get(&id).unwrap().time, "8:00 AM");

        phone.medications.delete(&id).unwrap();
        wait_for(&watch, 0).await;

        // The push records its outcome just after publishing
        let delivered_empty = Some(SyncOutcome::Delivered { count: 0 });
        for _ in 0..100 {
            if phone.sync.status().await.last_outcome == delivered_empty {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(phone.sync.status().await.last_outcome, delivered_empty);

        drop(layer);
        drop(phone);
        listener.abort();
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), PrefsBackend::Sqlite);
        let layer: Arc<dyn DataLayer> = Arc::new(InProcessDataLayer::default());

        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let today = chrono::Local::now().date_naive();
        let id = {
            let phone = PhoneState::build(&config, layer.clone());
            let med = Medication::new("Metformin", "500mg").at(time);
            let id = med.id.clone();
            phone.medications.add(med).unwrap();
            phone.taken.mark_taken(&id, time, today);
            id
        };

        let phone = PhoneState::build(&config, layer);
        assert_eq!(phone.medications.len(), 1);
        assert!(phone.taken.is_taken(&id, time, today));
    }

    #[tokio::test]
    async fn test_delete_keeps_taken_history() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), PrefsBackend::Memory);
        let phone = PhoneState::build(&config, Arc::new(InProcessDataLayer::default()));

        let time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let today = chrono::Local::now().date_naive();
        let med = Medication::new("Amoxicillin", "500mg").at(time);
        let id = med.id.clone();
        phone.medications.add(med).unwrap();
        phone.taken.mark_taken(&id, time, today);

        phone.medications.delete(&id).unwrap();

        assert!(phone.medications.get(&id).is_none());
        assert!(phone.taken.is_taken(&id, time, today));
        assert_eq!(phone.taken.taken_count_on(today), 1);
    }

    #[tokio::test]
    async fn test_sync_disabled() {
        let dir = tempdir().unwrap();
        let mut config = config(dir.path(), PrefsBackend::Memory);
        config.sync.enabled = false;

        let phone = PhoneState::build(&config, Arc::new(InProcessDataLayer::default()));
        assert!(!phone.is_auto_syncing());
    }

    #[test]
    fn test_watch_settings_namespace() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), PrefsBackend::Json);

        {
            let watch = WatchState::build(&config);
            watch.settings.update_dark_mode(true).unwrap();
        }

        let watch = WatchState::build(&config);
        assert!(watch.settings.current().dark_mode);
        assert!(dir.path().join("prefs").join("settings.json").exists());
    }
}
