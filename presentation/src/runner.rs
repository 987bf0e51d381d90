//! Drives an in-flight discussion operation to its end.

use council_application::{DiscussionProgress, DiscussionSession, SessionError};
use council_domain::RoundCompletion;
use tracing::info;

/// How a driven operation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The backend reported completion (`None` if nothing was in flight)
    Completed(Option<RoundCompletion>),
    Failed(SessionError),
    /// Interrupted with Ctrl-C; finished messages were kept
    Cancelled,
}

/// Run the session's in-flight operation until it ends or Ctrl-C is pressed.
pub async fn drive(
    session: &mut DiscussionSession,
    progress: &dyn DiscussionProgress,
) -> DriveOutcome {
    let result = tokio::select! {
        result = session.run_to_completion(progress) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match result {
        Some(Ok(completion)) => DriveOutcome::Completed(completion),
        Some(Err(e)) => DriveOutcome::Failed(e),
        None => {
            progress.on_operation_end(false);
            session.cancel();
            info!("Operation interrupted by user");
            DriveOutcome::Cancelled
        }
    }
}
