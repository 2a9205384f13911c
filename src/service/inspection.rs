//! Inspection Service
//!
//! CRUD over inspection records with ownership enforcement. Admins see and
//! manage every record; farmers only their own.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{
    can_view_all, CreateInspectionRequest, Identity, Inspection, InspectionDto,
    UpdateInspectionRequest,
};
use crate::store::InspectionStore;
use crate::utils::error::{ServiceError, ServiceResult};

/// Service handling inspection records
#[derive(Clone)]
pub struct InspectionService {
    inspections: Arc<dyn InspectionStore>,
}

impl InspectionService {
    pub fn new(inspections: Arc<dyn InspectionStore>) -> Self {
        Self { inspections }
    }

    /// List inspections visible to the caller.
    ///
    /// Farmers get their own records newest first with image paths attached;
    /// admins get every record in id order.
    pub async fn list(&self, identity: &Identity) -> ServiceResult<Vec<InspectionDto>> {
        if can_view_all(identity) {
            let inspections = self.inspections.get_all().await?;
            Ok(inspections.into_iter().map(InspectionDto::from).collect())
        } else {
            let inspections = self.inspections.get_by_user_id(identity.user_id).await?;
            Ok(inspections.into_iter().map(InspectionDto::from).collect())
        }
    }

    /// Fetch a single inspection with its image paths attached
    pub async fn get(&self, id: i64) -> ServiceResult<InspectionDto> {
        let inspection = self
            .inspections
            .get_with_related(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;
        Ok(inspection.into())
    }

    /// Create an inspection owned by the caller
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateInspectionRequest,
    ) -> ServiceResult<InspectionDto> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let now = Utc::now();
        let inspection = Inspection {
            id: 0,
            plant_name: request.plant_name,
            inspection_date: request.inspection_date,
            country: request.country,
            state: request.state,
            city: request.city,
            notes: request.notes,
            status: request.status,
            category: request.category,
            user_id: identity.user_id,
            created_at: now,
            updated_at: now,
        };

        let inspections = self.inspections.begin();
        let inspection = inspections.add(inspection).await?;
        inspections.commit().await?;
        Ok(inspection.into())
    }

    /// Replace an inspection's fields.
    ///
    /// Existence is checked before ownership, so a missing record reports
    /// NotFound even to a caller who would not have been allowed to touch it.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        request: UpdateInspectionRequest,
    ) -> ServiceResult<InspectionDto> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let mut inspection = self
            .inspections
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;

        if !can_view_all(identity) && inspection.user_id != identity.user_id {
            return Err(ServiceError::Unauthorized(
                "You can only update your own inspections".to_string(),
            ));
        }

        inspection.plant_name = request.plant_name;
        inspection.inspection_date = request.inspection_date;
        inspection.country = request.country;
        inspection.state = request.state;
        inspection.city = request.city;
        inspection.notes = request.notes;
        inspection.status = request.status;
        inspection.category = request.category;
        inspection.updated_at = Utc::now();

        let inspections = self.inspections.begin();
        inspections.update(inspection.clone()).await?;
        inspections.commit().await?;
        Ok(inspection.into())
    }

    /// Delete an inspection and its images and analyses
    pub async fn delete(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        let inspection = self
            .inspections
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;

        if !can_view_all(identity) && inspection.user_id != identity.user_id {
            return Err(ServiceError::Unauthorized(
                "You can only delete your own inspections".to_string(),
            ));
        }

        let inspections = self.inspections.begin();
        inspections.remove(id).await?;
        inspections.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InspectionCategory, InspectionStatus, User, UserRole};
    use crate::store::{EntityStore, MemoryStore};

    async fn seed_user(store: &Arc<MemoryStore>, email: &str, role: UserRole) -> User {
        let now = Utc::now();
        let user = EntityStore::<User>::add(
            store.as_ref(),
            User {
                id: 0,
                first_name: "Ana".to_string(),
                last_name: "Lee".to_string(),
                email: email.to_string(),
                password_hash: "hashed".to_string(),
                role,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();
        EntityStore::<User>::commit(store.as_ref()).await.unwrap();
        user
    }

    fn create_request(plant: &str) -> CreateInspectionRequest {
        CreateInspectionRequest {
            plant_name: plant.to_string(),
            inspection_date: Utc::now(),
            country: "Brazil".to_string(),
            state: "SP".to_string(),
            city: "Campinas".to_string(),
            notes: None,
            status: InspectionStatus::Pending,
            category: InspectionCategory::Plant,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_caller_as_owner() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let service = InspectionService::new(store);

        let identity = Identity::new(farmer.id, farmer.role);
        let created = service
            .create(&identity, create_request("Tomato"))
            .await
            .unwrap();

        assert_eq!(created.user_id, farmer.id);
        assert_eq!(created.plant_name, "Tomato");
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_role() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let other = seed_user(&store, "other@x.com", UserRole::Farmer).await;
        let admin = seed_user(&store, "admin@x.com", UserRole::Admin).await;
        let service = InspectionService::new(store);

        let farmer_id = Identity::new(farmer.id, farmer.role);
        let other_id = Identity::new(other.id, other.role);
        service.create(&farmer_id, create_request("Tomato")).await.unwrap();
        service.create(&other_id, create_request("Potato")).await.unwrap();

        let farmer_view = service.list(&farmer_id).await.unwrap();
        assert_eq!(farmer_view.len(), 1);
        assert_eq!(farmer_view[0].plant_name, "Tomato");

        let admin_view = service
            .list(&Identity::new(admin.id, admin.role))
            .await
            .unwrap();
        assert_eq!(admin_view.len(), 2);
    }

    #[tokio::test]
    async fn test_update_checks_existence_before_ownership() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let other = seed_user(&store, "other@x.com", UserRole::Farmer).await;
        let service = InspectionService::new(store);

        let farmer_id = Identity::new(farmer.id, farmer.role);
        let other_id = Identity::new(other.id, other.role);
        let created = service
            .create(&farmer_id, create_request("Tomato"))
            .await
            .unwrap();

        // Missing record: NotFound even for a non-owner
        let err = service
            .update(&other_id, 9999, create_request("Potato"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        // Existing record owned by someone else: Unauthorized
        let err = service
            .update(&other_id, created.id, create_request("Potato"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        // Admin may update anyone's record
        let admin = Identity::new(999, UserRole::Admin);
        let updated = service
            .update(&admin, created.id, create_request("Potato"))
            .await
            .unwrap();
        assert_eq!(updated.plant_name, "Potato");
        // Ownership is preserved on update
        assert_eq!(updated.user_id, farmer.id);
    }

    #[tokio::test]
    async fn test_delete_enforces_ownership() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let other = seed_user(&store, "other@x.com", UserRole::Farmer).await;
        let service = InspectionService::new(store);

        let farmer_id = Identity::new(farmer.id, farmer.role);
        let created = service
            .create(&farmer_id, create_request("Tomato"))
            .await
            .unwrap();

        let err = service
            .delete(&Identity::new(other.id, other.role), created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        service.delete(&farmer_id, created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
