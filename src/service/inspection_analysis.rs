//! Inspection Analysis Service
//!
//! Manages analysis results recorded against inspections. Ownership follows
//! the parent inspection on writes, the same rule the image service applies.
//! Reads are unfiltered.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::models::{
    can_view_all, CreateInspectionAnalysisRequest, Identity, Inspection, InspectionAnalysis,
    InspectionAnalysisDto,
};
use crate::store::{InspectionAnalysisStore, InspectionStore};
use crate::utils::error::{ServiceError, ServiceResult};

/// Service handling inspection analysis records
#[derive(Clone)]
pub struct InspectionAnalysisService {
    analyses: Arc<dyn InspectionAnalysisStore>,
    inspections: Arc<dyn InspectionStore>,
}

impl InspectionAnalysisService {
    pub fn new(
        analyses: Arc<dyn InspectionAnalysisStore>,
        inspections: Arc<dyn InspectionStore>,
    ) -> Self {
        Self {
            analyses,
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

    /// List the analyses of an inspection, newest first.
    ///
    /// An unknown inspection id yields an empty list rather than an error.
    pub async fn list_by_inspection(
        &self,
        inspection_id: i64,
    ) -> ServiceResult<Vec<InspectionAnalysisDto>> {
        let analyses = self.analyses.get_by_inspection_id(inspection_id).await?;
        Ok(analyses
            .into_iter()
            .map(InspectionAnalysisDto::from)
            .collect())
    }

    /// The most recent analysis of an inspection
    pub async fn latest_by_inspection(
        &self,
        inspection_id: i64,
    ) -> ServiceResult<InspectionAnalysisDto> {
        let analysis = self
            .analyses
            .get_latest_by_inspection_id(inspection_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection analysis not found".to_string()))?;
        Ok(analysis.into())
    }

    /// Fetch a single analysis record
    pub async fn get(&self, id: i64) -> ServiceResult<InspectionAnalysisDto> {
        let analysis = self
            .analyses
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection analysis not found".to_string()))?;
        Ok(analysis.into())
    }

    /// Record an analysis against an inspection.
    ///
    /// A missing parent inspection is a Conflict, matching the image service.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateInspectionAnalysisRequest,
    ) -> ServiceResult<InspectionAnalysisDto> {
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
            "You can only add analyses to your own inspections",
        )?;

        let now = Utc::now();
        let analysis = InspectionAnalysis {
            id: 0,
            inspection_id: request.inspection_id,
            status: request.status,
            confidence_score: request.confidence_score,
            description: request.description,
            treatment_recommendation: request.treatment_recommendation,
            created_at: now,
            updated_at: now,
        };

        let analyses = self.analyses.begin();
        let analysis = analyses.add(analysis).await?;
        analyses.commit().await?;
        Ok(analysis.into())
    }

    /// Replace an analysis's fields. The parent inspection cannot be changed.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        request: CreateInspectionAnalysisRequest,
    ) -> ServiceResult<InspectionAnalysisDto> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let mut analysis = self
            .analyses
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection analysis not found".to_string()))?;

        let inspection = self
            .parent_inspection(analysis.inspection_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;
        Self::check_owner(
            identity,
            &inspection,
            "You can only update analyses of your own inspections",
        )?;

        analysis.status = request.status;
        analysis.confidence_score = request.confidence_score;
        analysis.description = request.description;
        analysis.treatment_recommendation = request.treatment_recommendation;
        analysis.updated_at = Utc::now();

        let analyses = self.analyses.begin();
        analyses.update(analysis.clone()).await?;
        analyses.commit().await?;
        Ok(analysis.into())
    }

    /// Delete an analysis record
    pub async fn delete(&self, identity: &Identity, id: i64) -> ServiceResult<()> {
        let analysis = self
            .analyses
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection analysis not found".to_string()))?;

        let inspection = self
            .parent_inspection(analysis.inspection_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Inspection not found".to_string()))?;
        Self::check_owner(
            identity,
            &inspection,
            "You can only delete analyses of your own inspections",
        )?;

        let analyses = self.analyses.begin();
        analyses.remove(id).await?;
        analyses.commit().await?;
        Ok(())
    }
}
