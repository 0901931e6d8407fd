use storage::repository::Storage;

/// Shared handler state. Cloned per request; repositories sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
}

impl AppState {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// State over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Storage::in_memory())
    }
}
