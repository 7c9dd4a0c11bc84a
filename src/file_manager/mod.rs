// Local JSON persistence
mod json_ops;

pub use json_ops::{
    initialize_json_file, read_json_file, read_json_file_or_default, remove_json_file,
    write_json_file,
};
