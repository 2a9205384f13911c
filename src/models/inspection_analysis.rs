//! Inspection Analysis Model
//!
//! Stored assessment results for an inspection. Analyses are populated by an
//! external process; this service only records them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress state of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "analysis_status", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Analysis entity as persisted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InspectionAnalysis {
    pub id: i64,
    pub inspection_id: i64,
    pub status: AnalysisStatus,
    /// Always within [0.0, 1.0]; validated at the API boundary
    pub confidence_score: f64,
    pub description: Option<String>,
    pub treatment_recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Analysis representation for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionAnalysisDto {
    pub id: i64,
    pub inspection_id: i64,
    pub status: AnalysisStatus,
    pub confidence_score: f64,
    pub description: Option<String>,
    pub treatment_recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InspectionAnalysis> for InspectionAnalysisDto {
    fn from(analysis: InspectionAnalysis) -> Self {
        InspectionAnalysisDto {
            id: analysis.id,
            inspection_id: analysis.inspection_id,
            status: analysis.status,
            confidence_score: analysis.confidence_score,
            description: analysis.description,
            treatment_recommendation: analysis.treatment_recommendation,
            created_at: analysis.created_at,
            updated_at: analysis.updated_at,
        }
    }
}
