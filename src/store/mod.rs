//! Data Store Abstraction
//!
//! Per-entity store traits with a shared generic contract: reads execute
//! directly, while `add`/`update`/`remove` stage a change and `commit` is the
//! separate, explicit step that persists pending changes and is the only
//! operation that can surface a persistence failure.
//!
//! Staged changes belong to the handle they were staged on. `begin` opens a
//! fresh handle over the same underlying data with an empty staging buffer, so
//! concurrent units of work never see (or roll back) each other's pending
//! operations.
//!
//! Two backends are provided: [`memory::MemoryStore`] (staging buffer over
//! in-process tables, used by the test suite) and [`postgres::PgStore`]
//! (staged operations executed in a single transaction at commit).

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{
    Inspection, InspectionAnalysis, InspectionImage, InspectionWithRelated, User,
};
use crate::utils::error::StoreError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Generic contract implemented by every entity store.
///
/// `add` assigns the entity id immediately and stages the insert; the write
/// itself happens at `commit`, which returns the number of affected rows.
#[async_trait]
pub trait EntityStore<T>: Send + Sync {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<T>>;

    async fn get_all(&self) -> StoreResult<Vec<T>>;

    /// Stage an insert; returns the entity with its assigned id
    async fn add(&self, entity: T) -> StoreResult<T>;

    /// Stage a full-row update
    async fn update(&self, entity: T) -> StoreResult<()>;

    /// Stage a delete by id
    async fn remove(&self, id: i64) -> StoreResult<()>;

    /// Persist all staged changes, returning the count of affected rows
    async fn commit(&self) -> StoreResult<u64>;
}

/// User-specific queries
#[async_trait]
pub trait UserStore: EntityStore<User> {
    /// Open a handle with its own empty staging buffer over the same data
    fn begin(&self) -> Arc<dyn UserStore>;

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
}

/// Inspection-specific queries
#[async_trait]
pub trait InspectionStore: EntityStore<Inspection> {
    /// Open a handle with its own empty staging buffer over the same data
    fn begin(&self) -> Arc<dyn InspectionStore>;

    /// Inspections owned by a user, newest first, images and analyses attached
    async fn get_by_user_id(&self, user_id: i64) -> StoreResult<Vec<InspectionWithRelated>>;

    /// A single inspection with owner, images and analyses attached
    async fn get_with_related(&self, id: i64) -> StoreResult<Option<InspectionWithRelated>>;
}

/// Inspection image queries
#[async_trait]
pub trait InspectionImageStore: EntityStore<InspectionImage> {
    /// Open a handle with its own empty staging buffer over the same data
    fn begin(&self) -> Arc<dyn InspectionImageStore>;

    /// Images of an inspection, oldest first
    async fn get_by_inspection_id(&self, inspection_id: i64)
        -> StoreResult<Vec<InspectionImage>>;
}

/// Inspection analysis queries
#[async_trait]
pub trait InspectionAnalysisStore: EntityStore<InspectionAnalysis> {
    /// Open a handle with its own empty staging buffer over the same data
    fn begin(&self) -> Arc<dyn InspectionAnalysisStore>;

    /// Analyses of an inspection, newest first
    async fn get_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Vec<InspectionAnalysis>>;

    /// The newest analysis by creation time. Ties on identical timestamps
    /// resolve to the backend's stable row order.
    async fn get_latest_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Option<InspectionAnalysis>>;
}

/// A staged mutation awaiting commit, shared by both backends
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    InsertUser(User),
    UpdateUser(User),
    DeleteUser(i64),
    InsertInspection(Inspection),
    UpdateInspection(Inspection),
    DeleteInspection(i64),
    InsertImage(InspectionImage),
    UpdateImage(InspectionImage),
    DeleteImage(i64),
    InsertAnalysis(InspectionAnalysis),
    UpdateAnalysis(InspectionAnalysis),
    DeleteAnalysis(i64),
}
