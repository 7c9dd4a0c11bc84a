pub mod api;
pub mod collection;
pub mod error;
pub mod file_manager;
pub mod lifecycle;
pub mod models;
pub mod scan;
pub mod utils;

use std::sync::Arc;

use log::warn;

use api::WarrantyApi;
use collection::CollectionStore;
use lifecycle::CountdownTicker;
use models::Settings;
use scan::ScanWorkflow;

pub use collection::filter::FilterTab;
pub use error::WalletError;
pub use models::{AuthStatus, CollectionStats, WarrantyRecord, WarrantyStatus};
pub use scan::ScanState;

fn initialize_app_data() -> Result<(), String> {
    utils::initialize_data_directories()?;
    file_manager::initialize_json_file(&utils::get_settings_json_path(), &Settings::default())?;
    Ok(())
}

/// Read settings from disk, falling back to defaults on a missing or
/// unreadable file.
pub fn load_settings() -> Settings {
    file_manager::read_json_file_or_default(&utils::get_settings_json_path()).unwrap_or_else(|e| {
        warn!("Falling back to default settings: {}", e);
        Settings::default()
    })
}

/// The assembled engine: API client, record store, scan workflow, and
/// the shared countdown tick.
///
/// The host constructs one of these at startup, drives it from its UI
/// events, and renders from the store and ticker outputs.
pub struct WarrantyWallet {
    pub api: Arc<WarrantyApi>,
    pub store: Arc<CollectionStore<WarrantyApi>>,
    pub scan: ScanWorkflow<WarrantyApi>,
    pub ticker: CountdownTicker,
}

impl WarrantyWallet {
    /// Wire up the engine against the configured backend, seeding local
    /// data files and restoring any persisted session.
    pub fn new(settings: &Settings) -> Result<Self, WalletError> {
        if let Err(e) = initialize_app_data() {
            warn!("Failed to initialize app data: {}", e);
        }

        let api = Arc::new(WarrantyApi::new(settings)?);
        api.restore_session();

        let store = Arc::new(CollectionStore::new(api.clone()));
        let scan = ScanWorkflow::new(api.clone(), store.clone());

        Ok(Self {
            api,
            store,
            scan,
            ticker: CountdownTicker::new(),
        })
    }
}
