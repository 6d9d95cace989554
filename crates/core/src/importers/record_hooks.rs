//! Bookkeeping around every processed record.

use serde_json::json;

use super::Importer;
use crate::constants::EVENT_MESSAGE_KEY;
use crate::data_providers::Record;
use crate::errors::Result;
use crate::events::{AuditEvent, Severity};
use crate::imports::ImportService;

/// Emits `<Importer>:Record:Started` carrying the record data.
pub async fn begin_record(
    importer: &dyn Importer,
    record: &Record,
    import_service: &ImportService,
) -> Result<AuditEvent> {
    let external_id = importer.external_identifier(record);
    let label = importer.label(record);

    let mut data = record.clone();
    data.insert(
        EVENT_MESSAGE_KEY.to_string(),
        json!(format!(
            "{}: \"{}\" ({})",
            importer.name(),
            label.as_deref().unwrap_or("-- No label --"),
            external_id.as_deref().unwrap_or_default()
        )),
    );
    import_service
        .add_event(
            &format!("{}:Record:Started", importer.name()),
            external_id.as_deref(),
            Some(data),
            None,
        )
        .await
}

/// Closes a record. Failures are recorded below the record event.
pub async fn end_record(
    importer: &dyn Importer,
    outcome: &Result<()>,
    event: &AuditEvent,
    import_service: &ImportService,
) -> Result<()> {
    if let Err(err) = outcome {
        import_service
            .add_event_message(
                &format!("{}:Record:Failed", importer.name()),
                &err.to_string(),
                Severity::Error,
                Some(event),
            )
            .await?;
    }
    Ok(())
}

/// Feeds every record through the importer, wrapped by the record hooks.
///
/// Stops at the first failing record.
pub async fn process_records(
    importer: &mut dyn Importer,
    records: Vec<Record>,
    import_service: &ImportService,
) -> Result<usize> {
    for record in &records {
        let event = begin_record(importer, record, import_service).await?;
        let outcome = importer
            .process_record(record, Some(&event))
            .await
            .map(|_| ());
        end_record(importer, &outcome, &event, import_service).await?;
        outcome?;
    }
    Ok(importer.processed_records())
}
