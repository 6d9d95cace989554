//! Runs a whole preset against a real SQLite file.

use std::io::Write;
use std::sync::Arc;

use contentimport_core::batch::{
    BatchOrchestrator, BatchRequest, InProcessStepExecutor, Registries, StepEnvironmentFactory,
};
use contentimport_core::content::{ContentRepositoryTrait, Dimensions, Node, NodeTemplate};
use contentimport_core::events::EventRepositoryTrait;
use contentimport_core::imports::ImportRunRepositoryTrait;
use contentimport_core::record_mappings::{ImporterIdentity, RecordMappingRepositoryTrait};
use contentimport_core::settings::Settings;
use contentimport_storage_sqlite::SqliteEnvironmentFactory;

const PEOPLE: &str = "id,name,email\n\
    1,Ada Lovelace,ada@example.com\n\
    2,Grace Hopper,grace@example.com\n\
    3,Linus Torvalds,linus@example.com\n\
    4,Barbara Liskov,barbara@example.com\n\
    5,Ken Thompson,ken@example.com\n";

fn settings(csv_path: &str) -> Settings {
    Settings::from_toml_str(&format!(
        r#"
[node_types.Person]
properties = ["title", "email"]
super_types = ["Page"]

[[presets.people.parts]]
name = "persons"
label = "Persons"
data_provider = "csv"
importer = "node"
batch_size = 2

[presets.people.parts.data_provider_options]
csv_file_path = "{}"
skip_header = true
columns = ["__externalIdentifier", "__label", "email"]

[presets.people.parts.importer_options]
node_type = "Person"
site_node_path = "/sites/demo"
node_name_prefix = "person-"
"#,
        csv_path
    ))
    .unwrap()
}

async fn seed_site(factory: &SqliteEnvironmentFactory) {
    let env = factory.open().unwrap();
    let sites = env
        .content
        .create_child(&Node::root(), NodeTemplate::new("unstructured", "sites"))
        .await
        .unwrap();
    env.content
        .create_child(&sites, NodeTemplate::new("Page", "demo"))
        .await
        .unwrap();
}

async fn run_people(factory: &Arc<SqliteEnvironmentFactory>, settings: &Arc<Settings>) -> usize {
    let registries = Arc::new(Registries::default());
    let executor = Arc::new(InProcessStepExecutor::new(
        factory.clone(),
        settings.clone(),
        registries.clone(),
    ));
    let env = factory.open().unwrap();
    let mut orchestrator = BatchOrchestrator::new(
        settings.clone(),
        registries,
        Arc::new(env.import_service()),
        executor,
    );
    let report = orchestrator
        .run(&BatchRequest {
            preset: "people".to_string(),
            ..BatchRequest::default()
        })
        .await
        .unwrap();

    assert!(report.started_at <= report.ended_at.unwrap());
    assert_eq!(report.parts[0].steps, 3);
    report.total_records()
}

#[tokio::test]
async fn test_people_preset_is_imported_in_three_steps() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    csv.write_all(PEOPLE.as_bytes()).unwrap();

    let db_path = dir.path().join("data").join("importer.db");
    let factory = Arc::new(SqliteEnvironmentFactory::new(db_path.display().to_string()));
    factory.migrate().unwrap();
    seed_site(&factory).await;
    let settings = Arc::new(settings(&csv.path().display().to_string()));

    assert_eq!(run_people(&factory, &settings).await, 5);

    let env = factory.open().unwrap();
    let identity = ImporterIdentity::new("node", "people", "persons");
    assert_eq!(env.record_mappings.count_for_importer(&identity).unwrap(), 5);

    let storage = env
        .content
        .get_by_path("/sites/demo/storage", &Dimensions::new())
        .unwrap()
        .unwrap();
    assert_eq!(env.content.count_children(&storage).unwrap(), 5);

    let ada = env.record_mappings.find(&identity, "1").unwrap().unwrap();
    let node = env
        .content
        .get_by_identifier(&ada.node_id, &Dimensions::new())
        .unwrap()
        .unwrap();
    assert_eq!(node.path, ada.node_path);
    assert_eq!(node.properties["email"], serde_json::json!("ada@example.com"));

    let runs = env.import_runs.list_recent(5).unwrap();
    assert_eq!(runs.len(), 1);
    let events = env.events.list_for_import(&runs[0].id).unwrap();
    assert!(events.iter().any(|e| e.event_type == "Import.Started"));
    assert!(events.iter().any(|e| e.event_type == "Import.Ended"));
}

#[tokio::test]
async fn test_second_run_reuses_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    csv.write_all(PEOPLE.as_bytes()).unwrap();

    let factory = Arc::new(SqliteEnvironmentFactory::new(
        dir.path().join("importer.db").display().to_string(),
    ));
    factory.migrate().unwrap();
    seed_site(&factory).await;
    let settings = Arc::new(settings(&csv.path().display().to_string()));

    run_people(&factory, &settings).await;
    run_people(&factory, &settings).await;

    let env = factory.open().unwrap();
    let storage = env
        .content
        .get_by_path("/sites/demo/storage", &Dimensions::new())
        .unwrap()
        .unwrap();
    assert_eq!(env.content.count_children(&storage).unwrap(), 5);
    assert_eq!(env.import_runs.list_recent(5).unwrap().len(), 2);
}
