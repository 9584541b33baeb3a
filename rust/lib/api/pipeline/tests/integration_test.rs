/// Integration tests: full generation runs against a temporary output root

use std::cell::RefCell;
use std::rc::Rc;

use appgen_pipeline::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Records every sink call in order.
#[derive(Default, Clone)]
struct Recorder {
    events: Rc<RefCell<Vec<SinkEvent>>>,
}

impl ProgressSink for Recorder {
    fn progress(&mut self, event: &ProgressEvent) {
        self.events.borrow_mut().push(SinkEvent::Progress(event.clone()));
    }

    fn error(&mut self, message: &str) {
        self.events.borrow_mut().push(SinkEvent::Error {
            message: message.to_string(),
        });
    }
}

impl Recorder {
    fn percents(&self) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Progress(p) => Some(p.percent),
                SinkEvent::Error { .. } => None,
            })
            .collect()
    }

    fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Error { message } => Some(message.clone()),
                SinkEvent::Progress(_) => None,
            })
            .collect()
    }
}

/// Answers every prompt with the same document.
struct CannedDrafter(Value);

impl SchemaDrafter for CannedDrafter {
    fn draft(&self, _prompt: &str) -> Result<Value, DraftError> {
        Ok(self.0.clone())
    }
}

struct FailingDrafter;

impl SchemaDrafter for FailingDrafter {
    fn draft(&self, _prompt: &str) -> Result<Value, DraftError> {
        Err(DraftError::EmptyResponse)
    }
}

fn todo() -> Value {
    json!({
        "name": "Todo",
        "entities": [{"name": "task", "columns": [{"name": "title", "type": "text", "required": true}]}]
    })
}

fn tracker() -> Value {
    json!({
        "name": "Subscription Tracker",
        "description": "Track recurring spend",
        "entities": [
            {"name": "subscription", "displayName": "Subscription", "columns": [
                {"name": "name", "type": "text", "required": true, "unique": true},
                {"name": "amount", "type": "number", "required": true},
                {"name": "renews_on", "type": "date"},
                {"name": "website", "type": "url"}
            ]},
            {"name": "payment", "columns": [
                {"name": "subscription_id", "type": "text", "required": true},
                {"name": "paid_on", "type": "date", "required": true}
            ]}
        ],
        "pages": [{"name": "overview", "type": "dashboard", "entity": "subscription", "title": "Overview"}]
    })
}

#[test]
fn test_generate_writes_full_tree() {
    let dir = TempDir::new().unwrap();
    let recorder = Recorder::default();
    let mut orch = Orchestrator::new(recorder.clone());

    let report = orch
        .generate(Source::Document(tracker()), dir.path(), &GenerateOptions::default())
        .unwrap();

    for rel in [
        "dsl.json",
        "migration.sql",
        "rollback.sql",
        "backend/Cargo.toml",
        "backend/src/main.rs",
        "backend/src/models/subscription.rs",
        "backend/src/routes/payment.rs",
        "frontend/package.json",
        "frontend/src/App.tsx",
        "frontend/src/services/subscriptionService.ts",
        "frontend/src/pages/PaymentList.tsx",
        "docker-compose.yml",
        "backend/Dockerfile",
        "frontend/Dockerfile",
        "README.md",
    ] {
        assert!(dir.path().join(rel).is_file(), "missing {rel}");
    }

    assert_eq!(report.schema.name, "Subscription Tracker");
    assert_eq!(report.written[0], dir.path().join("dsl.json"));
    assert!(report.written.iter().all(|p| p.starts_with(dir.path())));
    assert!(recorder.errors().is_empty());
}

#[test]
fn test_progress_strictly_increases() {
    let dir = TempDir::new().unwrap();
    let recorder = Recorder::default();
    let mut orch = Orchestrator::new(recorder.clone());

    orch.generate(Source::Document(todo()), dir.path(), &GenerateOptions::default())
        .unwrap();

    let percents = recorder.percents();
    assert_eq!(percents, vec![0, 20, 40, 60, 80, 90, 100]);
    assert!(percents.windows(2).all(|w| w[0] < w[1]));

    let steps: Vec<Step> = recorder
        .events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Progress(p) => Some(p.step),
            SinkEvent::Error { .. } => None,
        })
        .collect();
    assert_eq!(steps, Step::ALL.to_vec());
}

#[test]
fn test_dsl_json_is_canonical() {
    let dir = TempDir::new().unwrap();
    let mut orch = Orchestrator::new(Recorder::default());

    let report = orch
        .generate(Source::Document(todo()), dir.path(), &GenerateOptions::default())
        .unwrap();

    let text = std::fs::read_to_string(dir.path().join(DSL_FILE)).unwrap();
    let written: appgen_ir::Schema = serde_json::from_str(&text).unwrap();
    assert_eq!(written, report.schema);

    let task = written.entity("task").unwrap();
    let names: Vec<&str> = task.columns.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "title", "created_at", "updated_at"]);
    assert_eq!(written.pages.len(), 3);
    assert_eq!(written.version, "1.0.0");

    // pretty-printed, camelCase keys
    assert!(text.starts_with("{\n  \"name\": \"Todo\""));
    assert!(text.contains("\"createdAt\""));
    assert!(text.contains("\"primaryKey\": true"));
}

#[test]
fn test_regenerate_from_dsl_file() {
    let first = TempDir::new().unwrap();
    let mut orch = Orchestrator::new(Recorder::default());
    let original = orch
        .generate(Source::Document(tracker()), first.path(), &GenerateOptions::default())
        .unwrap();

    let second = TempDir::new().unwrap();
    let again = orch
        .generate(
            Source::DslFile(first.path().join(DSL_FILE)),
            second.path(),
            &GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(again.schema.entities, original.schema.entities);
    assert_eq!(again.schema.pages, original.schema.pages);
    assert_eq!(again.written.len(), original.written.len());

    // files that don't carry the generation timestamp come out identical
    for rel in [
        "backend/src/routes/subscription.rs",
        "backend/src/models/payment.rs",
        "frontend/src/App.tsx",
        "frontend/src/services/subscriptionService.ts",
        "docker-compose.yml",
    ] {
        let a = std::fs::read_to_string(first.path().join(rel)).unwrap();
        let b = std::fs::read_to_string(second.path().join(rel)).unwrap();
        assert_eq!(a, b, "{rel} differs after regeneration");
    }
}

#[test]
fn test_failure_emits_single_error_and_keeps_earlier_files() {
    let dir = TempDir::new().unwrap();
    // a directory where the migration should go makes the sql step fail
    std::fs::create_dir(dir.path().join("migration.sql")).unwrap();

    let recorder = Recorder::default();
    let mut orch = Orchestrator::new(recorder.clone());
    let err = orch
        .generate(Source::Document(todo()), dir.path(), &GenerateOptions::default())
        .unwrap_err();

    assert!(matches!(err, GenerateError::Io { .. }));
    assert_eq!(recorder.errors(), vec![err.to_string()]);
    assert_eq!(recorder.percents(), vec![0, 20, 40]);
    assert!(matches!(
        recorder.events.borrow().last(),
        Some(SinkEvent::Error { .. })
    ));

    assert!(dir.path().join(DSL_FILE).is_file());
    assert!(!dir.path().join("backend").exists());
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn test_structural_errors_abort_before_writing() {
    let dir = TempDir::new().unwrap();
    let recorder = Recorder::default();
    let mut orch = Orchestrator::new(recorder.clone());

    let bad = json!({
        "name": "Broken",
        "entities": [{"name": "thing", "columns": [{"name": "x", "type": "money"}, {"type": "text"}]}]
    });
    let err = orch
        .generate(Source::Document(bad), dir.path(), &GenerateOptions::default())
        .unwrap_err();

    match &err {
        GenerateError::Normalize(e) => assert_eq!(e.issues().len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(recorder.errors().len(), 1);
    assert_eq!(recorder.percents(), vec![0, 20]);
    assert!(!dir.path().join(DSL_FILE).exists());
}

#[test]
fn test_prompt_goes_through_drafter_and_normalizer() {
    let dir = TempDir::new().unwrap();
    let mut orch = Orchestrator::new(Recorder::default()).with_drafter(CannedDrafter(todo()));

    let report = orch
        .generate(
            Source::Prompt("a todo list with titles".into()),
            dir.path(),
            &GenerateOptions::default(),
        )
        .unwrap();

    let task = report.schema.entity("task").unwrap();
    assert!(task.field("id").unwrap().primary_key);
    let main_rs = std::fs::read_to_string(dir.path().join("backend/src/main.rs")).unwrap();
    assert!(main_rs.contains(".nest(\"/tasks\", routes::task::router())"));
    let service = std::fs::read_to_string(dir.path().join("frontend/src/services/taskService.ts")).unwrap();
    assert!(service.contains("'/api/tasks'"));
}

#[test]
fn test_drafter_error_is_surfaced() {
    let dir = TempDir::new().unwrap();
    let recorder = Recorder::default();
    let mut orch = Orchestrator::new(recorder.clone()).with_drafter(FailingDrafter);

    let err = orch
        .generate(Source::Prompt("anything".into()), dir.path(), &GenerateOptions::default())
        .unwrap_err();

    assert!(matches!(err, GenerateError::Draft(DraftError::EmptyResponse)));
    assert_eq!(recorder.errors(), vec!["drafter returned an empty response".to_string()]);
}

#[test]
fn test_json_lines_sink_run() {
    let dir = TempDir::new().unwrap();
    let mut orch = Orchestrator::new(JsonLinesSink::new(Vec::new()));

    orch.generate(Source::Document(todo()), dir.path(), &GenerateOptions::default())
        .unwrap();

    let out = String::from_utf8(orch.into_sink().into_inner()).unwrap();
    let events: Vec<SinkEvent> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 7);
    assert_eq!(
        events.last(),
        Some(&SinkEvent::Progress(ProgressEvent::new(
            Step::Complete,
            "Application generated"
        )))
    );
}
