// Shared helpers for the integration tests. Every test runs against its own
// storage directory so tests stay independent and can clean up after
// themselves.
mod http_tests;
mod points_tests;

use crate::utils::store::TeamStore;
use crate::utils::UserContext;
use std::fs;
use std::path::Path;
use uuid::Uuid;

pub fn test_store() -> (TeamStore, String) {
    let dir = format!("./storage/test_{}", Uuid::new_v4());
    let store = TeamStore::new(&dir);
    store.init().expect("Failed to initialize test storage");
    (store, dir)
}

pub fn cleanup(dir: &str) {
    if Path::new(dir).exists() {
        fs::remove_dir_all(dir).expect("Failed to clean up test storage");
    }
}

pub fn member(user_id: &str, display_name: &str) -> UserContext {
    UserContext {
        user_id: user_id.to_string(),
        display_name: display_name.to_string(),
    }
}
