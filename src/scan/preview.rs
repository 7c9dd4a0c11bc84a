// Bill image validation and preview construction
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::WalletError;

/// Only image payloads may enter the scan workflow.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Infer a content type from the file name when the picker cannot
/// supply one (drag-and-drop of a bare path).
pub fn content_type_for_name(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Encode the selected file as a `data:` URL the host can hand straight
/// to an `<img>` tag or webview.
pub fn build_preview(content_type: &str, bytes: &[u8]) -> Result<String, WalletError> {
    if bytes.is_empty() {
        return Err(WalletError::Validation(
            "Could not read the selected image".to_string(),
        ));
    }

    Ok(format!("data:{};base64,{}", content_type, BASE64.encode(bytes)))
}
