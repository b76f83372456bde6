#![allow(dead_code)]

use alexandria::TicketStore;
use std::sync::Once;
use tempfile::TempDir;

pub mod fixtures;
pub mod loopback;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        alexandria::logging::init_test_logging();
    });
}

pub fn test_store() -> TicketStore {
    init_test_logging();
    TicketStore::open_memory().expect("Failed to create test database")
}

pub fn test_store_with_dir() -> (TicketStore, TempDir) {
    init_test_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("tickets.db");
    let store = TicketStore::open(&db_path).expect("Failed to create test database");
    (store, dir)
}
