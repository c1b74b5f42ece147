// Utility Module
// Configuration and file handling shared by the ss binary

pub mod config;
pub mod file_ops;

pub use config::{CipherConfig, KeygenConfig};
pub use file_ops::{
    commit_staged, create_private_key_file, create_public_key_file, discard_staged, open_input,
    open_key_file, open_output, staging_path,
};
