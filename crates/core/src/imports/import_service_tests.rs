#[cfg(test)]
mod tests {
    use crate::errors::{Error, ImportError};
    use crate::events::Severity;
    use crate::imports::ImportService;
    use crate::record_mappings::ImporterIdentity;
    use crate::test_support::{
        InMemoryEventRepository, InMemoryImportRunRepository, InMemoryRecordMappingRepository,
    };
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct Fixture {
        runs: InMemoryImportRunRepository,
        events: InMemoryEventRepository,
        mappings: InMemoryRecordMappingRepository,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                runs: InMemoryImportRunRepository::default(),
                events: InMemoryEventRepository::default(),
                mappings: InMemoryRecordMappingRepository::default(),
            }
        }

        fn service(&self) -> ImportService {
            ImportService::new(
                Arc::new(self.runs.clone()),
                Arc::new(self.events.clone()),
                Arc::new(self.mappings.clone()),
            )
        }
    }

    #[tokio::test]
    async fn test_start_twice_fails_with_already_running() {
        let fixture = Fixture::new();
        let service = fixture.service();

        service.start(None, false).await.unwrap();
        let result = service.start(None, false).await;
        assert!(matches!(
            result,
            Err(Error::Import(ImportError::AlreadyRunning))
        ));
        assert_eq!(fixture.runs.runs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_start_fails_with_not_running() {
        let fixture = Fixture::new();
        let service = fixture.service();

        assert!(matches!(
            service.stop().await,
            Err(Error::Import(ImportError::NotRunning))
        ));
        assert!(matches!(
            service.last(),
            Err(Error::Import(ImportError::LastImportNotSet))
        ));
    }

    #[tokio::test]
    async fn test_stop_snapshots_last_run() {
        let fixture = Fixture::new();
        let service = fixture.service();

        let run = service.start(None, false).await.unwrap();
        let stopped = service.stop().await.unwrap();

        assert_eq!(stopped.id, run.id);
        assert!(stopped.ended_at.unwrap() >= stopped.started_at);
        assert!(stopped.elapsed_seconds().unwrap() >= 0);
        assert_eq!(service.last().unwrap().id, run.id);
        assert!(!service.is_running());
        assert_eq!(
            fixture.events.event_types(),
            vec!["Import.Started", "Import.Ended"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_external_run_id_requires_force() {
        let fixture = Fixture::new();

        let first = fixture.service();
        first.start(Some("nightly-2024-01-01"), false).await.unwrap();
        first.stop().await.unwrap();

        let second = fixture.service();
        let result = second.start(Some("nightly-2024-01-01"), false).await;
        match result {
            Err(Error::Import(ImportError::DuplicateRun {
                external_run_id, ..
            })) => assert_eq!(external_run_id, "nightly-2024-01-01"),
            other => panic!("expected DuplicateRun, got {:?}", other),
        }

        let forced = second.start(Some("nightly-2024-01-01"), true).await.unwrap();
        let events = fixture.events.events.lock().unwrap();
        let notice = events
            .iter()
            .find(|e| e.import_id == forced.id && e.event_type == "ImportService:start")
            .expect("forced start emits a notice");
        assert_eq!(notice.severity, Severity::Notice);
        assert!(notice.message().unwrap().contains("nightly-2024-01-01"));
    }

    #[tokio::test]
    async fn test_events_require_a_running_import() {
        let fixture = Fixture::new();
        let service = fixture.service();

        let result = service.add_event("Something", None, None, None).await;
        assert!(matches!(result, Err(Error::Import(ImportError::NotRunning))));
    }

    #[tokio::test]
    async fn test_resume_attaches_existing_run() {
        let fixture = Fixture::new();
        let orchestrator = fixture.service();
        let run = orchestrator.start(None, false).await.unwrap();

        let step = fixture.service();
        step.resume(&run.id).unwrap();
        assert_eq!(step.current_id().unwrap(), run.id);
        assert!(matches!(
            step.resume(&run.id),
            Err(Error::Import(ImportError::AlreadyRunning))
        ));

        let other = fixture.service();
        assert!(matches!(
            other.resume("missing"),
            Err(Error::Import(ImportError::RunNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_child_message_references_parent() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service.start(None, false).await.unwrap();

        let parent = service
            .add_event("NodeImporter:Record:Started", Some("42"), None, None)
            .await
            .unwrap();
        let child = service
            .add_event_message("Node:Processed:Skipped", "unchanged", Severity::Notice, Some(&parent))
            .await
            .unwrap();

        assert_eq!(child.parent_event_id.as_deref(), Some(parent.id.as_str()));
        assert_eq!(child.severity, Severity::Notice);
        assert_eq!(child.message(), Some("unchanged"));
    }

    #[tokio::test]
    async fn test_record_mapping_upsert_is_idempotent() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service.start(None, false).await.unwrap();
        let identity = ImporterIdentity::new("node", "people", "persons");

        let first = service
            .add_or_update_record_mapping(&identity, "42", None, "n-1", "/sites/demo/storage/p42")
            .await
            .unwrap();
        let second = service
            .add_or_update_record_mapping(&identity, "42", None, "n-1", "/sites/demo/storage/p42")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.modified_at, second.modified_at);
        assert_eq!(fixture.mappings.mappings.lock().unwrap().len(), 1);
        assert_eq!(
            fixture
                .events
                .event_types()
                .iter()
                .filter(|t| *t == "node:Record:Ended")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_abort_closes_run() {
        let fixture = Fixture::new();
        let service = fixture.service();
        service.start(None, false).await.unwrap();

        let aborted = service.abort("step failed").await.unwrap();
        assert!(!aborted.is_open());
        assert!(!service.is_running());
        assert_eq!(
            fixture.events.event_types().last().map(String::as_str),
            Some("Import.Aborted")
        );
    }

    #[tokio::test]
    async fn test_run_is_closed_when_start_cannot_be_recorded() {
        let fixture = Fixture::new();
        let service = fixture.service();
        fixture.events.fail_appends.store(true, Ordering::SeqCst);

        assert!(matches!(
            service.start(None, false).await,
            Err(Error::Database(_))
        ));
        assert!(!service.is_running());
        {
            let runs = fixture.runs.runs.lock().unwrap();
            assert_eq!(runs.len(), 1);
            assert!(!runs[0].is_open());
        }

        fixture.events.fail_appends.store(false, Ordering::SeqCst);
        assert!(service.start(None, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_closes_run_even_if_end_event_fails() {
        let fixture = Fixture::new();
        let service = fixture.service();
        let run = service.start(None, false).await.unwrap();
        fixture.events.fail_appends.store(true, Ordering::SeqCst);

        assert!(service.stop().await.is_err());

        assert!(!service.is_running());
        assert_eq!(service.last().unwrap().id, run.id);
        let stored = fixture.runs.runs.lock().unwrap()[0].clone();
        assert!(stored.ended_at.is_some());
    }
}
