//! API-backed record collections with a local write-through cache.
//!
//! The REST API is the source of truth whenever it answers. Every successful
//! read or write is mirrored into the [`LocalStore`], which is what a
//! collection falls back to when the API is disabled or unreachable. Offline
//! creates get `max(id) + 1`; nothing reconciles them with the server later.

use std::fmt;
use std::sync::Arc;

use storage::local::LocalStore;
use study_core::Notification;
use study_core::model::{RecordId, UserId, Validate};
use tracing::{debug, warn};

use crate::api_client::ApiClient;
use crate::error::SyncError;
use crate::notify::Notifier;
use crate::resource::Resource;

/// Where the current items of a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    /// Read from, or last written to, the local cache only. May be stale.
    LocalCache,
}

pub struct SyncedCollection<R: Resource> {
    api: ApiClient,
    local: LocalStore,
    notifier: Arc<dyn Notifier>,
    user_id: Option<UserId>,
    items: Vec<R>,
    loading: bool,
    source: DataSource,
}

impl<R: Resource> fmt::Debug for SyncedCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedCollection")
            .field("path", &R::PATH)
            .field("user_id", &self.user_id)
            .field("items", &self.items.len())
            .field("loading", &self.loading)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> SyncedCollection<R> {
    /// Empty, loading collection. Call [`load`](Self::load) to populate it.
    #[must_use]
    pub fn new(
        api: ApiClient,
        local: LocalStore,
        notifier: Arc<dyn Notifier>,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            api,
            local,
            notifier,
            user_id,
            items: Vec::new(),
            loading: true,
            source: DataSource::LocalCache,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn source(&self) -> DataSource {
        self.source
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Switch users. Takes effect on the next [`load`](Self::load).
    pub fn set_user(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
        self.loading = true;
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    fn write_through(&self) {
        self.local.save(R::KEY, &self.items);
    }

    fn fail(&self, action: &str) {
        self.notifier
            .notify(Notification::error(format!("Failed to {action} {}", R::NOUN)));
    }

    /// Refresh from the API, falling back to the local cache.
    pub async fn load(&mut self) {
        self.loading = true;

        if let Some(user_id) = self.user_id {
            match self.api.list::<R>(user_id).await {
                Ok(items) => {
                    debug!(path = R::PATH, count = items.len(), "loaded from API");
                    self.items = items;
                    self.source = DataSource::Remote;
                    self.write_through();
                    self.loading = false;
                    return;
                }
                Err(e) => warn!(path = R::PATH, error = %e, "API load failed; using local cache"),
            }
        }

        self.items = match self.local.load::<Vec<R>>(R::KEY) {
            Ok(Some(items)) => items,
            Ok(None) => R::initial(),
            Err(e) => {
                warn!(key = %R::KEY, error = %e, "local cache unreadable");
                self.notifier.notify(Notification::error(format!(
                    "Failed to load {} data",
                    R::LOAD_LABEL
                )));
                R::initial()
            }
        };
        self.source = DataSource::LocalCache;
        self.loading = false;
    }

    /// Create a record through the API, or locally when it is unreachable.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` if the draft is invalid.
    pub async fn add(&mut self, draft: R::Draft) -> Result<R, SyncError> {
        if let Err(e) = draft.validate() {
            self.fail("add new");
            return Err(e.into());
        }

        if self.user_id.is_some() {
            match self.api.create::<R>(&draft).await {
                Ok(record) => {
                    self.items.push(record.clone());
                    self.source = DataSource::Remote;
                    self.write_through();
                    return Ok(record);
                }
                Err(e) => warn!(path = R::PATH, error = %e, "API create failed; adding locally"),
            }
        }

        let next = self
            .items
            .iter()
            .map(|item| item.id().value())
            .max()
            .unwrap_or(0)
            + 1;
        let record = R::from_draft(R::Id::from_value(next), draft);
        self.items.push(record.clone());
        self.source = DataSource::LocalCache;
        self.write_through();
        Ok(record)
    }

    /// Apply a partial update through the API, or locally when it is
    /// unreachable.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for an invalid patch and
    /// `SyncError::NotFound` when the record is unknown locally as well.
    pub async fn update(&mut self, id: R::Id, patch: R::Patch) -> Result<R, SyncError> {
        if let Err(e) = patch.validate() {
            self.fail("update");
            return Err(e.into());
        }

        if self.user_id.is_some() {
            match self.api.update::<R>(id, &patch).await {
                Ok(Some(record)) => {
                    if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
                        *slot = record.clone();
                    }
                    self.source = DataSource::Remote;
                    self.write_through();
                    return Ok(record);
                }
                Ok(None) => warn!(path = R::PATH, %id, "record missing on server; updating locally"),
                Err(e) => warn!(path = R::PATH, error = %e, "API update failed; updating locally"),
            }
        }

        let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) else {
            self.fail("update");
            return Err(SyncError::NotFound {
                label: R::NOUN,
                id: id.value(),
            });
        };
        slot.apply_patch(patch);
        let record = slot.clone();
        self.source = DataSource::LocalCache;
        self.write_through();
        Ok(record)
    }

    /// Delete through the API when possible, then drop the record locally
    /// either way. Returns whether a local record was removed.
    pub async fn delete(&mut self, id: R::Id) -> bool {
        if self.user_id.is_some() {
            match self.api.delete::<R>(id).await {
                Ok(true) => self.source = DataSource::Remote,
                Ok(false) => {
                    debug!(path = R::PATH, %id, "record already gone on server");
                    self.source = DataSource::Remote;
                }
                Err(e) => {
                    warn!(path = R::PATH, error = %e, "API delete failed; deleting locally");
                    self.source = DataSource::LocalCache;
                }
            }
        }

        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.write_through();
        self.items.len() != before
    }
}
