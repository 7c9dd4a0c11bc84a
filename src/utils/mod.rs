mod paths;

pub use paths::{
    get_app_data_dir, get_data_dir, get_session_json_path, get_settings_json_path,
    initialize_data_directories,
};
