use archiver_core::PostOutcome;
use archiver_engine::{ArchiveEvent, ProgressSink, RunSummary};
use archiver_logging::{archive_debug, archive_info, archive_warn};

/// Reports run progress through the logger.
pub struct TerminalProgress;

impl ProgressSink for TerminalProgress {
    fn emit(&self, event: ArchiveEvent) {
        match event {
            ArchiveEvent::Discovered {
                source,
                count,
                total,
            } => {
                archive_info!("{} candidate posts from {}, {} to process", count, source, total);
            }
            ArchiveEvent::PostStarted {
                attempt,
                total,
                url,
            } => {
                archive_info!("[{}/{}] {}", attempt, total, url);
            }
            ArchiveEvent::PostFinished { url, outcome } => match outcome {
                PostOutcome::Failed => archive_warn!("Failed: {}", url),
                other => archive_debug!("{:?}: {}", other, url),
            },
            ArchiveEvent::RunFinished(summary) => report(&summary),
        }
    }
}

fn report(summary: &RunSummary) {
    archive_info!(
        "{}: {} saved, {} already archived, {} paywalled, {} unextractable, {} failed",
        summary.writer_name,
        summary.saved,
        summary.already_archived,
        summary.paywalled,
        summary.unextractable,
        summary.failed
    );
    archive_info!(
        "Ledger gained {} records ({} total)",
        summary.ledger_added,
        summary.ledger_total
    );
}
