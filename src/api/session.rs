// Stored-session persistence
//
// The bearer session has an explicit lifecycle: written on successful
// login, loaded at startup, removed on logout or when the server
// answers 401.

use log::{info, warn};

use crate::file_manager::{read_json_file, remove_json_file, write_json_file};
use crate::models::StoredSession;
use crate::utils::get_session_json_path;

pub fn save_session(session: &StoredSession) -> Result<(), String> {
    let path = get_session_json_path();
    write_json_file(&path, session)?;
    info!("Session saved for {}", session.username);
    Ok(())
}

/// Load the persisted session, if any. A corrupt file is treated as no
/// session (logged, not fatal).
pub fn load_session() -> Option<StoredSession> {
    let path = get_session_json_path();
    if !path.exists() {
        return None;
    }

    match read_json_file::<StoredSession>(&path) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("Ignoring unreadable session file: {}", e);
            None
        }
    }
}

pub fn clear_session() {
    let path = get_session_json_path();
    if let Err(e) = remove_json_file(&path) {
        warn!("Failed to clear stored session: {}", e);
    }
}
