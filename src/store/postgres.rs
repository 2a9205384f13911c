//! PostgreSQL Store Backend
//!
//! Implements the store traits over a sqlx connection pool. Reads execute
//! directly against the pool; staged mutations are executed in a single
//! transaction at commit, so a constraint violation rolls the whole batch
//! back. Ids are pre-allocated from the table sequence when an insert is
//! staged. Cascades are handled by the schema's foreign keys.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{
    Inspection, InspectionAnalysis, InspectionImage, InspectionWithRelated, User,
};
use crate::utils::error::StoreError;

use super::{
    EntityStore, InspectionAnalysisStore, InspectionImageStore, InspectionStore, Pending,
    StoreResult, UserStore,
};

/// PostgreSQL implementation of every entity store trait.
///
/// The pool is shared; each `begin_handle` carries its own staging buffer so
/// concurrent units of work commit independently.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    staged: Arc<Mutex<Vec<Pending>>>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle over the same pool with an empty staging buffer
    pub fn begin_handle(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn allocate_id(&self, table: &str) -> StoreResult<i64> {
        let (id,): (i64,) = sqlx::query_as("SELECT nextval(pg_get_serial_sequence($1, 'id'))")
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    fn stage(&self, op: Pending) {
        self.staged.lock().unwrap().push(op);
    }

    async fn commit_staged(&self) -> StoreResult<u64> {
        let ops: Vec<Pending> = {
            let mut staged = self.staged.lock().unwrap();
            staged.drain(..).collect()
        };
        if ops.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;
        for op in ops {
            affected += execute_op(&mut tx, op).await.map_err(map_db_err)?;
        }
        tx.commit().await?;
        Ok(affected)
    }
}

/// Surface constraint violations distinctly so callers can map them to
/// conflicts instead of opaque database failures.
fn map_db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            return StoreError::UniqueViolation(constraint.to_string());
        }
    }
    StoreError::Database(err)
}

async fn execute_op(
    tx: &mut Transaction<'_, Postgres>,
    op: Pending,
) -> Result<u64, sqlx::Error> {
    let result = match op {
        Pending::InsertUser(user) => {
            sqlx::query(
                "INSERT INTO users (id, first_name, last_name, email, password_hash, role, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::UpdateUser(user) => {
            sqlx::query(
                "UPDATE users SET first_name = $2, last_name = $3, email = $4, password_hash = $5, \
                 role = $6, updated_at = $7 WHERE id = $1",
            )
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::DeleteUser(id) => {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?
        }
        Pending::InsertInspection(inspection) => {
            sqlx::query(
                "INSERT INTO inspections (id, plant_name, inspection_date, country, state, city, \
                 notes, status, category, user_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(inspection.id)
            .bind(&inspection.plant_name)
            .bind(inspection.inspection_date)
            .bind(&inspection.country)
            .bind(&inspection.state)
            .bind(&inspection.city)
            .bind(&inspection.notes)
            .bind(inspection.status)
            .bind(inspection.category)
            .bind(inspection.user_id)
            .bind(inspection.created_at)
            .bind(inspection.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::UpdateInspection(inspection) => {
            sqlx::query(
                "UPDATE inspections SET plant_name = $2, inspection_date = $3, country = $4, \
                 state = $5, city = $6, notes = $7, status = $8, category = $9, updated_at = $10 \
                 WHERE id = $1",
            )
            .bind(inspection.id)
            .bind(&inspection.plant_name)
            .bind(inspection.inspection_date)
            .bind(&inspection.country)
            .bind(&inspection.state)
            .bind(&inspection.city)
            .bind(&inspection.notes)
            .bind(inspection.status)
            .bind(inspection.category)
            .bind(inspection.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::DeleteInspection(id) => {
            sqlx::query("DELETE FROM inspections WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?
        }
        Pending::InsertImage(image) => {
            sqlx::query(
                "INSERT INTO inspection_images (id, inspection_id, image, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(image.id)
            .bind(image.inspection_id)
            .bind(&image.image)
            .bind(image.created_at)
            .bind(image.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::UpdateImage(image) => {
            sqlx::query("UPDATE inspection_images SET image = $2, updated_at = $3 WHERE id = $1")
                .bind(image.id)
                .bind(&image.image)
                .bind(image.updated_at)
                .execute(&mut **tx)
                .await?
        }
        Pending::DeleteImage(id) => {
            sqlx::query("DELETE FROM inspection_images WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?
        }
        Pending::InsertAnalysis(analysis) => {
            sqlx::query(
                "INSERT INTO inspection_analyses (id, inspection_id, status, confidence_score, \
                 description, treatment_recommendation, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(analysis.id)
            .bind(analysis.inspection_id)
            .bind(analysis.status)
            .bind(analysis.confidence_score)
            .bind(&analysis.description)
            .bind(&analysis.treatment_recommendation)
            .bind(analysis.created_at)
            .bind(analysis.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::UpdateAnalysis(analysis) => {
            sqlx::query(
                "UPDATE inspection_analyses SET status = $2, confidence_score = $3, \
                 description = $4, treatment_recommendation = $5, updated_at = $6 WHERE id = $1",
            )
            .bind(analysis.id)
            .bind(analysis.status)
            .bind(analysis.confidence_score)
            .bind(&analysis.description)
            .bind(&analysis.treatment_recommendation)
            .bind(analysis.updated_at)
            .execute(&mut **tx)
            .await?
        }
        Pending::DeleteAnalysis(id) => {
            sqlx::query("DELETE FROM inspection_analyses WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?
        }
    };
    Ok(result.rows_affected())
}

#[async_trait]
impl EntityStore<User> for PgStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_all(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn add(&self, mut entity: User) -> StoreResult<User> {
        entity.id = self.allocate_id("users").await?;
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
        self.commit_staged().await
    }
}

#[async_trait]
impl UserStore for PgStore {
    fn begin(&self) -> Arc<dyn UserStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl EntityStore<Inspection> for PgStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Inspection>> {
        let inspection = sqlx::query_as::<_, Inspection>("SELECT * FROM inspections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(inspection)
    }

    async fn get_all(&self) -> StoreResult<Vec<Inspection>> {
        let inspections = sqlx::query_as::<_, Inspection>("SELECT * FROM inspections ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(inspections)
    }

    async fn add(&self, mut entity: Inspection) -> StoreResult<Inspection> {
        entity.id = self.allocate_id("inspections").await?;
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
        self.commit_staged().await
    }
}

#[async_trait]
impl InspectionStore for PgStore {
    fn begin(&self) -> Arc<dyn InspectionStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_user_id(&self, user_id: i64) -> StoreResult<Vec<InspectionWithRelated>> {
        let inspections = sqlx::query_as::<_, Inspection>(
            "SELECT * FROM inspections WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = inspections.iter().map(|i| i.id).collect();

        let images = sqlx::query_as::<_, InspectionImage>(
            "SELECT * FROM inspection_images WHERE inspection_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let analyses = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses WHERE inspection_id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut images_by_inspection: HashMap<i64, Vec<InspectionImage>> = HashMap::new();
        for image in images {
            images_by_inspection
                .entry(image.inspection_id)
                .or_default()
                .push(image);
        }
        let mut analyses_by_inspection: HashMap<i64, Vec<InspectionAnalysis>> = HashMap::new();
        for analysis in analyses {
            analyses_by_inspection
                .entry(analysis.inspection_id)
                .or_default()
                .push(analysis);
        }

        Ok(inspections
            .into_iter()
            .map(|inspection| {
                let images = images_by_inspection
                    .remove(&inspection.id)
                    .unwrap_or_default();
                let analyses = analyses_by_inspection
                    .remove(&inspection.id)
                    .unwrap_or_default();
                InspectionWithRelated {
                    inspection,
                    owner: None,
                    images,
                    analyses,
                }
            })
            .collect())
    }

    async fn get_with_related(&self, id: i64) -> StoreResult<Option<InspectionWithRelated>> {
        let Some(inspection) =
            sqlx::query_as::<_, Inspection>("SELECT * FROM inspections WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let owner = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(inspection.user_id)
            .fetch_optional(&self.pool)
            .await?;

        let images = sqlx::query_as::<_, InspectionImage>(
            "SELECT * FROM inspection_images WHERE inspection_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let analyses = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses WHERE inspection_id = $1 ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(InspectionWithRelated {
            inspection,
            owner,
            images,
            analyses,
        }))
    }
}

#[async_trait]
impl EntityStore<InspectionImage> for PgStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<InspectionImage>> {
        let image =
            sqlx::query_as::<_, InspectionImage>("SELECT * FROM inspection_images WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(image)
    }

    async fn get_all(&self) -> StoreResult<Vec<InspectionImage>> {
        let images =
            sqlx::query_as::<_, InspectionImage>("SELECT * FROM inspection_images ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(images)
    }

    async fn add(&self, mut entity: InspectionImage) -> StoreResult<InspectionImage> {
        entity.id = self.allocate_id("inspection_images").await?;
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
        self.commit_staged().await
    }
}

#[async_trait]
impl InspectionImageStore for PgStore {
    fn begin(&self) -> Arc<dyn InspectionImageStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Vec<InspectionImage>> {
        let images = sqlx::query_as::<_, InspectionImage>(
            "SELECT * FROM inspection_images WHERE inspection_id = $1 ORDER BY created_at ASC",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }
}

#[async_trait]
impl EntityStore<InspectionAnalysis> for PgStore {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<InspectionAnalysis>> {
        let analysis = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(analysis)
    }

    async fn get_all(&self) -> StoreResult<Vec<InspectionAnalysis>> {
        let analyses = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(analyses)
    }

    async fn add(&self, mut entity: InspectionAnalysis) -> StoreResult<InspectionAnalysis> {
        entity.id = self.allocate_id("inspection_analyses").await?;
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
        self.commit_staged().await
    }
}

#[async_trait]
impl InspectionAnalysisStore for PgStore {
    fn begin(&self) -> Arc<dyn InspectionAnalysisStore> {
        Arc::new(self.begin_handle())
    }

    async fn get_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Vec<InspectionAnalysis>> {
        let analyses = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses WHERE inspection_id = $1 ORDER BY created_at DESC",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(analyses)
    }

    async fn get_latest_by_inspection_id(
        &self,
        inspection_id: i64,
    ) -> StoreResult<Option<InspectionAnalysis>> {
        let analysis = sqlx::query_as::<_, InspectionAnalysis>(
            "SELECT * FROM inspection_analyses WHERE inspection_id = $1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(inspection_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(analysis)
    }
}
