use std::sync::Arc;

use chrono::FixedOffset;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::incident_reports::dtos::{ListingState, ReportResponseDto};
use crate::features::incident_reports::models::ReportChange;
use crate::features::incident_reports::repository::ReportRepository;
use crate::shared::data_uri::{DataUriError, PhotoDataUri};

const WATCH_BUFFER: usize = 8;

/// Discard queued changes; one query covers a burst of them
fn drain(changes: &mut broadcast::Receiver<ReportChange>) {
    loop {
        match changes.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

/// Produces the listing view, once or as a live stream
pub struct ListingService {
    repository: Arc<dyn ReportRepository>,
    offset: FixedOffset,
}

impl ListingService {
    pub fn new(repository: Arc<dyn ReportRepository>, offset: FixedOffset) -> Self {
        Self { repository, offset }
    }

    pub fn display_offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// Current contents, newest first. A failed query becomes the error state.
    pub async fn snapshot(&self) -> ListingState {
        match self.repository.list_recent().await {
            Ok(reports) => ListingState::from_reports(
                reports
                    .into_iter()
                    .map(|r| ReportResponseDto::from_report(r, &self.offset))
                    .collect(),
            ),
            Err(e) => {
                tracing::error!("Failed to list incident reports: {}", e);
                let message = if matches!(e, AppError::Subscription(_)) {
                    e.user_message()
                } else {
                    AppError::Subscription(e.to_string()).user_message()
                };
                ListingState::Error { message }
            }
        }
    }

    /// The photo attached to a stored report, as MIME type and raw bytes
    pub async fn photo(&self, id: Uuid) -> Result<(String, Vec<u8>)> {
        let report = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("incident report {}", id)))?;
        let raw = report
            .media_urls
            .first()
            .ok_or_else(|| AppError::NotFound(format!("photo of incident report {}", id)))?;

        let unreadable = |e: DataUriError| {
            AppError::Internal(format!("stored photo of {} is unreadable: {}", id, e))
        };
        let photo = PhotoDataUri::parse(raw).map_err(unreadable)?;
        let bytes = photo.decode().map_err(unreadable)?;

        Ok((photo.mime_type.to_string(), bytes))
    }

    /// Live listing: `Loading`, then a fresh snapshot after every change to
    /// the collection. Ends when the receiver is dropped.
    pub fn watch(self: &Arc<Self>) -> ReceiverStream<ListingState> {
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        // subscribe first so writes racing the initial query still trigger a refresh
        let mut changes = self.repository.subscribe();
        let service = Arc::clone(self);

        tokio::spawn(async move {
            if tx.send(ListingState::Loading).await.is_err() {
                return;
            }
            if tx.send(service.snapshot().await).await.is_err() {
                return;
            }

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(ReportChange::Inserted { id }) => {
                            tracing::debug!("Refreshing live listing after insert of {}", id);
                            drain(&mut changes);
                            if tx.send(service.snapshot().await).await.is_err() {
                                break;
                            }
                        }
                        Ok(ReportChange::Resync) | Err(RecvError::Lagged(_)) => {
                            tracing::debug!("Refreshing live listing after missed changes");
                            drain(&mut changes);
                            if tx.send(service.snapshot().await).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => {
                            tracing::warn!("Report change feed closed, ending live listing");
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Live listing subscriber detached");
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::incident_reports::models::NewIncidentReport;
    use crate::features::incident_reports::repository::InMemoryReportRepository;
    use crate::shared::test_helpers::{new_report, FailingRepository};
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn offset() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    async fn next_state(stream: &mut ReceiverStream<ListingState>) -> ListingState {
        tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("listing stream stalled")
            .expect("listing stream ended")
    }

    fn descriptions(state: &ListingState) -> Vec<String> {
        match state {
            ListingState::Populated { reports } => {
                reports.iter().map(|r| r.description.clone()).collect()
            }
            other => panic!("expected populated state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_of_empty_store() {
        let service = ListingService::new(Arc::new(InMemoryReportRepository::new()), offset());
        assert_eq!(service.snapshot().await, ListingState::Empty);
    }

    #[tokio::test]
    async fn test_snapshot_is_newest_first_and_stable() {
        let repo = Arc::new(InMemoryReportRepository::new());
        for description in ["Primeira denúncia", "Segunda denúncia", "Terceira denúncia"] {
            repo.insert(new_report(description)).await.unwrap();
        }
        let service = ListingService::new(repo, offset());

        let first = service.snapshot().await;
        assert_eq!(
            descriptions(&first),
            vec!["Terceira denúncia", "Segunda denúncia", "Primeira denúncia"]
        );
        assert_eq!(service.snapshot().await, first);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_error_state() {
        let service = ListingService::new(Arc::new(FailingRepository), offset());
        assert_eq!(
            service.snapshot().await,
            ListingState::Error {
                message: "Não foi possível buscar os dados do servidor. Por favor, tente novamente mais tarde."
                    .to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_photo_is_decoded_from_the_stored_data_uri() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let stored = repo.insert(new_report("Cachorro preso sem comida")).await.unwrap();
        let service = ListingService::new(repo, offset());

        let (mime_type, bytes) = service.photo(stored.id).await.unwrap();
        assert_eq!(mime_type, "image/png");
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_photo_of_unknown_report_is_not_found() {
        let service = ListingService::new(Arc::new(InMemoryReportRepository::new()), offset());
        assert!(matches!(
            service.photo(Uuid::now_v7()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_watch_emits_loading_then_data_then_updates() {
        let repo = Arc::new(InMemoryReportRepository::new());
        let service = Arc::new(ListingService::new(repo.clone(), offset()));
        let mut stream = service.watch();

        assert_eq!(next_state(&mut stream).await, ListingState::Loading);
        assert_eq!(next_state(&mut stream).await, ListingState::Empty);

        repo.insert(new_report("Cachorro preso sem comida"))
            .await
            .unwrap();
        assert_eq!(
            descriptions(&next_state(&mut stream).await),
            vec!["Cachorro preso sem comida"]
        );

        repo.insert(NewIncidentReport {
            location: "Parque Municipal".to_string(),
            ..new_report("Pássaros em gaiola pequena")
        })
        .await
        .unwrap();
        let state = next_state(&mut stream).await;
        assert_eq!(
            descriptions(&state),
            vec!["Pássaros em gaiola pequena", "Cachorro preso sem comida"]
        );
    }

    #[tokio::test]
    async fn test_watch_surfaces_errors() {
        let service = Arc::new(ListingService::new(Arc::new(FailingRepository), offset()));
        let mut stream = service.watch();

        assert_eq!(next_state(&mut stream).await, ListingState::Loading);
        assert!(matches!(
            next_state(&mut stream).await,
            ListingState::Error { .. }
        ));
    }
}
