use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::activity::Activity;
use crate::error::{StoreError, StoreResult};
use crate::storage::KeyValueStore;

pub const STORAGE_KEY: &str = "activities";

/// Single owner of the activity collection.
///
/// Every read goes through [`ActivityStore::load_all`] and every mutation is
/// one read-modify-write cycle that replaces the whole serialized sequence
/// with a single `set`. Mutations take `&mut self`, so one store value never
/// interleaves two cycles. Sharing the underlying medium with another writer
/// (another process or thread holding its own store) is not guarded and
/// would need a lock or compare-and-swap around the key.
#[derive(Debug)]
pub struct ActivityStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ActivityStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[tracing::instrument(skip(self))]
    pub fn load_all(&self) -> StoreResult<Vec<Activity>> {
        let Some(raw) = self.backend.get(STORAGE_KEY)? else {
            debug!(key = STORAGE_KEY, "key absent, starting empty");
            return Ok(vec![]);
        };

        let activities: Vec<Activity> = serde_json::from_str(&raw).map_err(|source| {
            warn!(key = STORAGE_KEY, error = %source, "stored activities do not parse");
            StoreError::CorruptStore {
                key: STORAGE_KEY.to_string(),
                source,
            }
        })?;

        debug!(count = activities.len(), "loaded activities");
        Ok(activities)
    }

    /// Appends a new record under a freshly generated id; any id the caller
    /// set is discarded so no two records ever share one.
    #[tracing::instrument(skip(self, activity), fields(title = %activity.title))]
    pub fn append(&mut self, mut activity: Activity) -> StoreResult<Vec<Activity>> {
        activity.validate()?;
        let mut activities = self.load_all()?;

        activity.id = Some(Uuid::new_v4());
        activities.push(activity);

        self.save(&activities)?;
        info!(count = activities.len(), "appended activity");
        Ok(activities)
    }

    /// Replaces the record at `index`. The new record takes over the identity
    /// of the one it replaces.
    #[tracing::instrument(skip(self, activity), fields(title = %activity.title))]
    pub fn replace_at(&mut self, index: usize, mut activity: Activity) -> StoreResult<Vec<Activity>> {
        activity.validate()?;
        let mut activities = self.load_all()?;
        let slot = checked_slot(&mut activities, index)?;

        activity.id = Some(slot.id.unwrap_or_else(Uuid::new_v4));
        *slot = activity;

        self.save(&activities)?;
        info!(index, "replaced activity");
        Ok(activities)
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_at(&mut self, index: usize) -> StoreResult<Vec<Activity>> {
        let mut activities = self.load_all()?;
        checked_slot(&mut activities, index)?;

        let removed = activities.remove(index);

        self.save(&activities)?;
        info!(index, title = %removed.title, remaining = activities.len(), "removed activity");
        Ok(activities)
    }

    pub fn position_of(&self, id: Uuid) -> StoreResult<Option<usize>> {
        Ok(self
            .load_all()?
            .iter()
            .position(|activity| activity.id == Some(id)))
    }

    pub fn get(&self, id: Uuid) -> StoreResult<Option<Activity>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|activity| activity.id == Some(id)))
    }

    /// Id-addressed replace; the id is resolved to a position inside the same
    /// read-modify-write cycle, so an earlier removal cannot misdirect it.
    #[tracing::instrument(skip(self, activity), fields(id = %id))]
    pub fn replace(&mut self, id: Uuid, mut activity: Activity) -> StoreResult<Vec<Activity>> {
        activity.validate()?;
        let mut activities = self.load_all()?;
        let slot = activities
            .iter_mut()
            .find(|existing| existing.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;

        activity.id = Some(id);
        *slot = activity;

        self.save(&activities)?;
        info!("replaced activity by id");
        Ok(activities)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: Uuid) -> StoreResult<Vec<Activity>> {
        let mut activities = self.load_all()?;
        let index = activities
            .iter()
            .position(|existing| existing.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;

        activities.remove(index);

        self.save(&activities)?;
        info!(index, remaining = activities.len(), "removed activity by id");
        Ok(activities)
    }

    fn save(&mut self, activities: &[Activity]) -> StoreResult<()> {
        let encoded = serde_json::to_string(activities).map_err(StoreError::Encode)?;
        self.backend.set(STORAGE_KEY, &encoded)?;
        debug!(count = activities.len(), bytes = encoded.len(), "saved activities");
        Ok(())
    }
}

fn checked_slot(activities: &mut [Activity], index: usize) -> StoreResult<&mut Activity> {
    let len = activities.len();
    activities
        .get_mut(index)
        .ok_or(StoreError::IndexOutOfRange { index, len })
}
