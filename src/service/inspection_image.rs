//! Inspection Image Service
//!
//! Manages image records attached to inspections. Ownership follows the
//! parent inspection on writes: whoever may touch the inspection may attach
//! or remove its images. Reads are unfiltered.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{
    can_view_all, CreateInspectionImageRequest, Identity, Inspection, InspectionImage,
    InspectionImageDto,
};
use crate::store::{InspectionImageStore, InspectionStore};
use crate::utils::error::{ServiceError, ServiceResult};

/// Service handling inspection image records
#[derive(Clone)]
pub struct InspectionImageService {
    images: Arc<dyn InspectionImageStore>,
    inspections: Arc<dyn InspectionStore>,
}

impl InspectionImageService {
    pub fn new(images: Arc<dyn InspectionImageStore>, inspections: Arc<dyn InspectionStore>) -> Self {
        Self {
            images,
            inspections,
        }
    }

    async fn parent_inspection(&self, inspection_id: i64) -> ServiceResult<Option<Inspection>> {
        Ok(self.inspections.get_by_id(inspection_id).await?)
    }

    fn check_owner(
        identity: &Identity,
        inspection: &Inspection,
        message: &str,
    ) -> ServiceResult<()> {
        if !can_view_all(identity) && inspection.user_id != identity.user_id {
            return Err(ServiceError::Unauthorized(message.to_string()));
        }
        Ok(())
    }

    /// List the images of an inspection, oldest first.
    ///
    /// An unknown inspection id yields an empty list rather than an error.
    pub async fn list_by_inspection(
        &self,
        inspection_id: i64,
    ) -> ServiceResult<Vec<InspectionImageDto>> {
        let images = self.images.get_by_inspection_id(inspection_id).await?;
        Ok(images.into_iter().map(InspectionImageDto::from).collect())
    }

    /// Fetch a single image record
    pub async fn get(&self, id: i64) -> ServiceResult<InspectionImageDto> {
        let image = self
            .images
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection image not found".to_string()))?;
        Ok(image.into())
    }

    /// Attach an image path to an inspection.
    ///
    /// A missing parent inspection is a Conflict rather than NotFound: the
    /// request targets the image collection, and it is the referenced parent
    /// that is invalid.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateInspectionImageRequest,
    ) -> ServiceResult<InspectionImageDto> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let inspection = self
            .parent_inspection(request.inspection_id)
            .await?
            .ok_or_else(|| ServiceError::Conflict("Inspection not found".to_string()))?;
        Self::check_owner(
            identity,
            &inspection,
            "You can only add images to your own inspections",
        )?;

        let now = Utc::now();
        let image = InspectionImage {
            id: 0,
            inspection_id: request.inspection_id,
            image: request.image,
            created_at: now,
            updated_at: now,
        };

        let images = self.images.begin();
        let image = images.add(image).await?;
        images.commit().await?;
        Ok(image.into())
    }

    /// Delete an image record
    pub async fn delete(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        let image = self
            .images
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection image not found".to_string()))?;

        let inspection = self
            .parent_inspection(image.inspection_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;
        Self::check_owner(
            identity,
            &inspection,
            "You can only delete images of your own inspections",
        )?;

        let images = self.images.begin();
        images.remove(id).await?;
        images.commit().await?;
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

    async fn seed_inspection(store: &Arc<MemoryStore>, user_id: i64) -> Inspection {
        let now = Utc::now();
        let inspection = EntityStore::<Inspection>::add(
            store.as_ref(),
            Inspection {
                id: 0,
                plant_name: "Tomato".to_string(),
                inspection_date: now,
                country: "Brazil".to_string(),
                state: "SP".to_string(),
                city: "Campinas".to_string(),
                notes: None,
                status: InspectionStatus::Pending,
                category: InspectionCategory::Plant,
                user_id,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();
        EntityStore::<Inspection>::commit(store.as_ref())
            .await
            .unwrap();
        inspection
    }

    fn service(store: &Arc<MemoryStore>) -> InspectionImageService {
        InspectionImageService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_create_for_missing_inspection_is_conflict() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let service = service(&store);

        let err = service
            .create(
                &Identity::new(farmer.id, farmer.role),
                CreateInspectionImageRequest {
                    inspection_id: 9999,
                    image: "uploads/leaf.jpg".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_may_attach() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let other = seed_user(&store, "other@x.com", UserRole::Farmer).await;
        let admin = seed_user(&store, "admin@x.com", UserRole::Admin).await;
        let inspection = seed_inspection(&store, farmer.id).await;
        let service = service(&store);

        let request = CreateInspectionImageRequest {
            inspection_id: inspection.id,
            image: "uploads/leaf.jpg".to_string(),
        };

        let err = service
            .create(&Identity::new(other.id, other.role), request.clone())
            .await
            .unwrap_err();
        match err {
            ServiceError::Unauthorized(msg) => {
                assert_eq!(msg, "You can only add images to your own inspections")
            }
            other => panic!("expected Unauthorized, got {:?}", other),
        }

        service
            .create(&Identity::new(farmer.id, farmer.role), request.clone())
            .await
            .unwrap();
        service
            .create(&Identity::new(admin.id, admin.role), request)
            .await
            .unwrap();

        let images = service.list_by_inspection(inspection.id).await.unwrap();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_are_not_scoped_to_owner() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        seed_user(&store, "other@x.com", UserRole::Farmer).await;
        let inspection = seed_inspection(&store, farmer.id).await;
        let service = service(&store);

        let created = service
            .create(
                &Identity::new(farmer.id, farmer.role),
                CreateInspectionImageRequest {
                    inspection_id: inspection.id,
                    image: "uploads/leaf.jpg".to_string(),
                },
            )
            .await
            .unwrap();

        // Listing and fetching take no caller identity at all.
        let listed = service.list_by_inspection(inspection.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);

        // An unknown inspection lists as empty, not as an error.
        let empty = service.list_by_inspection(9999).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_get_and_delete_report_missing_image_distinctly() {
        let store = Arc::new(MemoryStore::new());
        let farmer = seed_user(&store, "farmer@x.com", UserRole::Farmer).await;
        let inspection = seed_inspection(&store, farmer.id).await;
        let service = service(&store);
        let identity = Identity::new(farmer.id, farmer.role);

        let err = service.get(9999).await.unwrap_err();
        match err {
            ServiceError::NotFound(msg) => assert_eq!(msg, "Inspection image not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let created = service
            .create(
                &identity,
                CreateInspectionImageRequest {
                    inspection_id: inspection.id,
                    image: "uploads/leaf.jpg".to_string(),
                },
            )
            .await
            .unwrap();

        service.delete(&identity, created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
