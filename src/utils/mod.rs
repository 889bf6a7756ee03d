pub mod environment;
pub mod paths;

pub use environment::{LOG_FILTER_ENV, PROJECTS_DIR_ENV, RECOVERY_DIR_ENV, get_claude_dir};
pub use paths::{
    basename_matches, file_type_of, format_path_with_tilde, format_system_time,
    is_bare_file_name, path_ends_with, truncate_chars,
};
