//! In-Memory Store Backend
//!
//! Keeps all tables in process memory behind locks. Mutations are staged in a
//! per-handle buffer and applied atomically at commit against a snapshot, so a
//! failed commit leaves the tables untouched and never disturbs changes staged
//! on another handle. Foreign-key cascades (user → inspections →
//! images/analyses) are applied at commit time, mirroring the relational
//! schema.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::models::{
    Inspection, InspectionAnalysis, InspectionImage, InspectionWithRelated, User,
};
use crate::utils::error::StoreError;

use super::{
    EntityStore, InspectionAnalysisStore, InspectionImageStore, InspectionStore, Pending,
    StoreResult, UserStore,
};

#[derive(Debug, Default, Clone)]
struct Tables {
    users: BTreeMap<i64, User>,
    inspections: BTreeMap<i64, Inspection>,
    images: BTreeMap<i64, InspectionImage>,
    analyses: BTreeMap<i64, InspectionAnalysis>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: RwLock<Tables>,
    next_id: AtomicI64,
}

/// In-memory implementation of every entity store trait.
///
/// Clones share tables and the id sequence but each `begin_handle` gets its
/// own staging buffer, so concurrent units of work commit independently.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
    staged: Arc<Mutex<Vec<Pending>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                next_id: AtomicI64::new(1),
            }),
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle over the same tables with an empty staging buffer
    pub fn begin_handle(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn stage(&self, op: Pending) {
        self.staged.lock().unwrap().push(op);
    }

    fn commit_staged(&self) -> StoreResult<u64> {
        let ops: Vec<Pending> = {
            let mut staged = self.staged.lock().unwrap();
            staged.drain(..).collect()
        };

        let mut tables = self.inner.tables.write().unwrap();
        // Apply against a snapshot so a constraint violation rolls back cleanly.
        let mut snapshot = tables.clone();
        let mut affected = 0u64;

        for op in ops {
            affected += Self::apply(&mut snapshot, op)?;
        }

        *tables = snapshot;
        Ok(affected)
    }

    fn apply(tables: &mut Tables, op: Pending) -> StoreResult<u64> {
        match op {
            Pending::InsertUser(user) => {
                Self::check_email_unique(tables, &user.email, user.id)?;
                tables.users.insert(user.id, user);
                Ok(1)
            }
            Pending::UpdateUser(user) => {
                if !tables.users.contains_key(&user.id) {
                    return Ok(0);
                }
                Self::check_email_unique(tables, &user.email, user.id)?;
                tables.users.insert(user.id, user);
                Ok(1)
            }
            Pending::DeleteUser(id) => {
                if tables.users.remove(&id).is_none() {
                    return Ok(0);
                }
                let owned: Vec<i64> = tables
                    .inspections
                    .values()
                    .filter(|i| i.user_id == id)
                    .map(|i| i.id)
                    .collect();
                for inspection_id in owned {
                    Self::cascade_delete_inspection(tables, inspection_id);
                }
                Ok(1)
            }
            Pending::InsertInspection(inspection) | Pending::UpdateInspection(inspection) => {
                tables.inspections.insert(inspection.id, inspection);
                Ok(1)
            }
            Pending::DeleteInspection(id) => {
                if tables.inspections.contains_key(&id) {
                    Self::cascade_delete_inspection(tables, id);
                    Ok(1)
                } else {
                    Ok(0)
                }
            }
            Pending::InsertImage(image) | Pending::UpdateImage(image) => {
                tables.images.insert(image.id, image);
                Ok(1)
            }
            Pending::DeleteImage(id) => Ok(tables.images.remove(&id).map_or(0, |_| 1)),
            Pending::InsertAnalysis(analysis) | Pending::UpdateAnalysis(analysis) => {
                tables.analyses.insert(analysis.id, analysis);
                Ok(1)
            }
            Pending::DeleteAnalysis(id) => Ok(tables.analyses.remove(&id).map_or(0, |_| 1)),
        }
    }

    fn check_email_unique(tables: &Tables, email: &str, id: i64) -> StoreResult<()> {
        if tables
            .users
            .values()
            .any(|u| u.id != id && u.email == email)
        {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }
        Ok(())
    }

    fn cascade_delete_inspection(tables: &mut Tables, inspection_id: i64) {
        tables.inspections.remove(&inspection_id);
        tables.images.retain(|_, img| img.inspection_id != inspection_id);
        tables
            .analyses
            .retain(|_, a| a.inspection_id != inspection_id);
    }

    fn attach_related(tables: &Tables, inspection: Inspection) -> InspectionWithRelated {
        let mut images: Vec<InspectionImage> = tables
            .images
            .values()
            .filter(|img| img.inspection_id == inspection.id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut analyses: Vec<InspectionAnalysis> = tables
            .analyses
            .values()
            .filter(|a| a.inspection_id == inspection.id)
            .cloned()
            .collect();
        analyses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let owner = tables.users.get(&inspection.user_id).cloned();

        InspectionWithRelated {
            inspection,
            owner,
            images,
            analyses,
        }
    }
}

#[async_trait]
impl EntityStore<User> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.inner.tables.read().unwrap().users.get(&id).cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<User>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .users
            .values()
            .cloned()
            .collect())
    }

    async fn add(&self, mut entity: User) -> StoreResult<User> {
        entity.id = self.allocate_id();
        self.stage(Pending::InsertUser(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: User) -> StoreResult<()> {
        self.stage(Pending::UpdateUser(entity));
        Ok(())
    }

    async fn remove(&self, id: i64) -> StoreResult<()> {
        self.stage(Pending::DeleteUser(id));
        Ok(())
    }

    async fn commit(&self) -> StoreResult<u64> {
        self.commit_staged()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    fn begin(&self) -> Arc<dyn UserStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .users
            .values()
            .any(|u| u.email == email))
    }
}

#[async_trait]
impl EntityStore<Inspection> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Inspection>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .inspections
            .get(&id)
            .cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<Inspection>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .inspections
            .values()
            .cloned()
            .collect())
    }

    async fn add(&self, mut entity: Inspection) -> StoreResult<Inspection> {
        entity.id = self.allocate_id();
        self.stage(Pending::InsertInspection(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: Inspection) -> StoreResult<()> {
        self.stage(Pending::UpdateInspection(entity));
        Ok(())
    }

    async fn remove(&self, id: i64) -> StoreResult<()> {
        self.stage(Pending::DeleteInspection(id));
        Ok(())
    }

    async fn commit(&self) -> StoreResult<u64> {
        self.commit_staged()
    }
}

#[async_trait]
impl InspectionStore for MemoryStore {
    fn begin(&self) -> Arc<dyn InspectionStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_user_id(&self, user_id: i64) -> StoreResult<Vec<InspectionWithRelated>> {
        let tables = self.inner.tables.read().unwrap();
        let mut owned: Vec<Inspection> = tables
            .inspections
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(owned
            .into_iter()
            .map(|inspection| Self::attach_related(&tables, inspection))
            .collect())
    }

    async fn get_with_related(&self, id: i64) -> StoreResult<Option<InspectionWithRelated>> {
        let tables = self.inner.tables.read().unwrap();
        Ok(tables
            .inspections
            .get(&id)
            .cloned()
            .map(|inspection| Self::attach_related(&tables, inspection)))
    }
}

#[async_trait]
impl EntityStore<InspectionImage> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<InspectionImage>> {
        Ok(self.inner.tables.read().unwrap().images.get(&id).cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<InspectionImage>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .images
            .values()
            .cloned()
            .collect())
    }

    async fn add(&self, mut entity: InspectionImage) -> StoreResult<InspectionImage> {
        entity.id = self.allocate_id();
        self.stage(Pending::InsertImage(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: InspectionImage) -> StoreResult<()> {
        self.stage(Pending::UpdateImage(entity));
        Ok(())
    }

    async fn remove(&self, id: i64) -> StoreResult<()> {
        self.stage(Pending::DeleteImage(id));
        Ok(())
    }

    async fn commit(&self) -> StoreResult<u64> {
        self.commit_staged()
    }
}

#[async_trait]
impl InspectionImageStore for MemoryStore {
    fn begin(&self) -> Arc<dyn InspectionImageStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Vec<InspectionImage>> {
        let tables = self.inner.tables.read().unwrap();
        let mut images: Vec<InspectionImage> = tables
            .images
            .values()
            .filter(|img| img.inspection_id == inspection_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(images)
    }
}

#[async_trait]
impl EntityStore<InspectionAnalysis> for MemoryStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<InspectionAnalysis>> {
        Ok(self.inner.tables.read().unwrap().analyses.get(&id).cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<InspectionAnalysis>> {
        Ok(self
            .inner
            .tables
            .read()
            .unwrap()
            .analyses
            .values()
            .cloned()
            .collect())
    }

    async fn add(&self, mut entity: InspectionAnalysis) -> StoreResult<InspectionAnalysis> {
        entity.id = self.allocate_id();
        self.stage(Pending::InsertAnalysis(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: InspectionAnalysis) -> StoreResult<()> {
        self.stage(Pending::UpdateAnalysis(entity));
        Ok(())
    }

    async fn remove(&self, id: i64) -> StoreResult<()> {
        self.stage(Pending::DeleteAnalysis(id));
        Ok(())
    }

    async fn commit(&self) -> StoreResult<u64> {
        self.commit_staged()
    }
}

#[async_trait]
impl InspectionAnalysisStore for MemoryStore {
    fn begin(&self) -> Arc<dyn InspectionAnalysisStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Vec<InspectionAnalysis>> {
        let tables = self.inner.tables.read().unwrap();
        let mut analyses: Vec<InspectionAnalysis> = tables
            .analyses
            .values()
            .filter(|a| a.inspection_id == inspection_id)
            .cloned()
            .collect();
        analyses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(analyses)
    }

    async fn get_latest_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Option<InspectionAnalysis>> {
        let tables = self.inner.tables.read().unwrap();
        let mut latest: Option<&InspectionAnalysis> = None;
        for analysis in tables
            .analyses
            .values()
            .filter(|a| a.inspection_id == inspection_id)
        {
            match latest {
                Some(current) if analysis.created_at <= current.created_at => {}
                _ => latest = Some(analysis),
            }
        }
        Ok(latest.cloned())
    }
}
