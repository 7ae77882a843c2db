//! Default value functions used by serde for config deserialization.

pub fn default_data_dir() -> String {
    "~/.deadliner".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_db_path() -> String {
    "~/.deadliner/data/deadliner.db".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_poll_interval() -> u64 {
    15
}

pub fn default_batch_size() -> u32 {
    32
}

pub fn default_timezone() -> String {
    "America/Adak".to_string()
}

pub fn default_language() -> String {
    "Russian".to_string()
}

pub fn default_fire_tolerance() -> u64 {
    60
}

pub fn default_job_retention() -> u64 {
    168
}
