// Atomic JSON file operations for local state (settings, stored session)

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

lazy_static::lazy_static! {
    // Serializes all JSON file access within the process.
    static ref FILE_LOCK: Mutex<()> = Mutex::new(());
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let _lock = FILE_LOCK.lock().map_err(|e| format!("Lock error: {}", e))?;

    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

    serde_json::from_str(&contents).map_err(|e| format!("Bad JSON in {:?}: {}", path, e))
}

/// Writes JSON atomically: serialize, write to a sibling temp file,
/// fsync, rename over the target.
pub fn write_json_file<T: Serialize>(path: &Path, data: &T) -> Result<(), String> {
    let _lock = FILE_LOCK.lock().map_err(|e| format!("Lock error: {}", e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {:?}: {}", parent, e))?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| format!("Serialize error: {}", e))?;

    let temp_path = path.with_extension("tmp");
    {
        let mut temp = fs::File::create(&temp_path)
            .map_err(|e| format!("Failed to create {:?}: {}", temp_path, e))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| format!("Failed to write {:?}: {}", temp_path, e))?;
        temp.sync_all()
            .map_err(|e| format!("Failed to sync {:?}: {}", temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| format!("Failed to replace {:?}: {}", path, e))
}

/// Seed a JSON file with a default value if it does not exist yet.
pub fn initialize_json_file<T: Serialize>(path: &Path, default: &T) -> Result<(), String> {
    if !path.exists() {
        write_json_file(path, default)?;
    }
    Ok(())
}

pub fn read_json_file_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, String> {
    if path.exists() {
        read_json_file(path)
    } else {
        Ok(T::default())
    }
}

pub fn remove_json_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| format!("Failed to remove {:?}: {}", path, e))?;
    }
    Ok(())
}
