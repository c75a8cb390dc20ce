use std::sync::Arc;

use hrm_api::state::AppState;
use hrm_api::store::MemoryStore;

/// Service layer over a fresh in-memory store. Mirrors the production
/// wiring in main.rs, with the Postgres store swapped out.
pub fn test_state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::from_stores(store.clone(), store.clone(), store)
}
