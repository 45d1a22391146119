//! Shared filesystem utilities across relpack modules.

pub mod files;
pub mod paths;
pub mod temp;

pub use files::{copy_file, copy_metadata, write_file_with_dirs};
pub use paths::{ensure_dir_exists, remove_tree};
pub use temp::prepare_work_dir;
