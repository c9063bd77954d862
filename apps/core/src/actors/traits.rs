use async_trait::async_trait;

use crate::brain::AnalysisReport;
use crate::error::AppError;
use crate::models::AnalysisRequest;

/// Defines the public interface for an analysis actor.
///
/// Callers depend on this trait rather than on the handle so that tests can
/// substitute their own implementation.
#[async_trait]
pub trait AnalysisActor: Send + Sync + 'static {
    /// Runs one analysis request to completion.
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AppError>;
}
