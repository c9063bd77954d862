use tokio::sync::oneshot;

use crate::brain::AnalysisReport;
use crate::error::AppError;
use crate::models::AnalysisRequest;

/// Messages that can be sent to the analysis actor.
#[derive(Debug)]
pub enum AnalysisMessage {
    /// Run one analysis over a question batch.
    Analyze {
        request: AnalysisRequest,
        /// A channel to send the finished report back.
        responder: oneshot::Sender<Result<AnalysisReport, AppError>>,
    },
    /// Stop accepting requests. Requests already running still complete.
    Shutdown,
}
