//! End-to-end hook scenarios against a temporary workspace.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use serde_json::{json, Value};
use tempfile::TempDir;
use typegate_core::lexicon::TypeKind;
use typegate_core::store::{mtime_secs, CacheStore, SessionStore, TypeInfo, VerificationRecord};
use typegate_core::{Decision, EnforcementMode, GateConfig, HookInput, Typegate};

// =============================================================================
// Helper Functions
// =============================================================================

fn hook(value: Value) -> HookInput {
    serde_json::from_value(value).unwrap()
}

fn write_user_edit(file: &str) -> HookInput {
    hook(json!({
        "tool_name": "Write",
        "session_id": "s1",
        "tool_input": {"file_path": file, "content": "User u = new User();"}
    }))
}

fn typegate(dir: &TempDir) -> Typegate {
    Typegate::with_config(dir.path(), GateConfig::default())
}

fn sourced_record(name: &str, source: &Path) -> VerificationRecord {
    VerificationRecord {
        name: name.to_string(),
        kind: TypeKind::Class,
        signature: None,
        documentation: None,
        properties: vec![],
        methods: vec![],
        verified_at: chrono::Utc::now(),
        source_file: Some(source.to_path_buf()),
        file_mtime: Some(mtime_secs(source).unwrap()),
    }
}

// =============================================================================
// Enforcement
// =============================================================================

#[test]
fn test_user_scenario_blocks_then_allows() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);

    let decision = gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict);
    let Decision::Block { guidance } = &decision else {
        panic!("expected block, got {:?}", decision);
    };
    assert_eq!(guidance.unverified, vec!["User"]);
    assert_eq!(guidance.suggested_tools.len(), 2);
    let message = decision.to_string();
    assert!(message.contains("User"));
    assert!(message.contains("mcp__codenav__csharp_hover"));
    assert!(message.contains("mcp__codenav__csharp_goto_definition"));

    // Populate the cache from a real file whose mtime is then left alone.
    let source = dir.path().join("User.cs");
    fs::write(&source, "public class User { }").unwrap();
    let store = CacheStore::new(gate.layout().cache_file());
    let mut cache = store.load();
    cache.reset("s1");
    cache
        .verified_types
        .insert("User".to_string(), sourced_record("User", &source));
    store.try_save(&cache).unwrap();

    let decision = gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict);
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn test_whitelisted_code_always_allowed() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);
    let input = hook(json!({
        "tool_name": "Edit",
        "session_id": "s1",
        "tool_input": {
            "file_path": "Names.cs",
            "new_string": "List<string> names = new List<string>();\nvar sb = new StringBuilder();"
        }
    }));

    for mode in [EnforcementMode::Strict, EnforcementMode::Warn, EnforcementMode::Disabled] {
        assert_eq!(gate.pre_edit(&input, mode), Decision::Allow);
    }
    assert!(!gate.layout().cache_file().exists());
}

#[test]
fn test_warn_mode_never_blocks() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);
    let decision = gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Warn);
    assert!(decision.is_warning());
    assert!(decision.permits_edit());
}

#[test]
fn test_enforcement_log_is_capped() {
    let dir = TempDir::new().unwrap();
    let mut config = GateConfig::default();
    config.logs.enforcement_cap = 3;
    let gate = Typegate::with_config(dir.path(), config);

    for _ in 0..5 {
        gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict);
    }
    let raw = fs::read_to_string(gate.layout().enforcement_log()).unwrap();
    let entries: Vec<Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["code_sha256"].as_str().unwrap().len() == 64));
    assert!(!raw.contains("new User()"));
}

// =============================================================================
// Cache invariants
// =============================================================================

#[test]
fn test_save_of_load_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));
    let mut info = TypeInfo::new(TypeKind::Interface);
    info.add_method("Handle");
    store.record("IHandler", info, "s1");
    store.record("Order", TypeInfo::default(), "s1");

    let before = fs::read_to_string(store.path()).unwrap();
    store.save(&store.load());
    let after = fs::read_to_string(store.path()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_session_switch_invalidates_everything() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));
    store.record("User", TypeInfo::default(), "sid1");
    store.record("Order", TypeInfo::default(), "sid1");

    let status = store.status(["Order", "User"], "sid2");
    assert!(status.verified.is_empty());
    assert_eq!(status.unverified, vec!["Order", "User"]);
}

#[test]
fn test_staleness_follows_source_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("Order.cs");
    fs::write(&source, "public class Order { }").unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));

    let mut info = TypeInfo::new(TypeKind::Class);
    info.source_file = Some(source.clone());
    let record = store.record("Order", info, "s1").unwrap();
    assert!(store.is_valid(&record), "untouched file must stay valid");

    let reloaded = store.load().get("Order").cloned().unwrap();
    assert!(store.is_valid(&reloaded), "reloaded mtime must match");

    File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
    assert!(!store.is_valid(&record), "advanced mtime must invalidate");

    fs::remove_file(&source).unwrap();
    assert!(!store.is_valid(&record), "deleted file must invalidate");
}

// =============================================================================
// Ingestion
// =============================================================================

#[test]
fn test_read_tool_ingests_declarations() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("User.cs"),
        "public class User\n{\n    public string Name { get; set; }\n    public void Save() { }\n}\n",
    )
    .unwrap();
    let gate = typegate(&dir);

    let report = gate
        .post_tool(&hook(json!({
            "tool_name": "Read",
            "session_id": "s1",
            "tool_input": {"file_path": "User.cs"},
            "tool_response": {"type": "text", "file": {"filePath": "User.cs"}}
        })))
        .unwrap();
    assert_eq!(report.recorded, vec!["User"]);
    assert!(!report.tracked);

    let cache = CacheStore::new(gate.layout().cache_file()).load();
    let user = cache.get("User").unwrap();
    assert_eq!(user.properties, vec!["Name"]);
    assert_eq!(user.methods, vec!["Save"]);

    assert_eq!(
        gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict),
        Decision::Allow
    );
}

#[test]
fn test_lookup_tool_records_and_tracks() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);

    let report = gate
        .post_tool(&hook(json!({
            "tool_name": "mcp__codenav__csharp_hover",
            "session_id": "s1",
            "tool_input": {"typeName": "User"},
            "tool_response": [{"type": "text", "text": "{\"name\": \"User\", \"kind\": \"class\"}"}]
        })))
        .unwrap();
    assert_eq!(report.recorded, vec!["User"]);
    assert!(report.tracked);
    let feedback = report.feedback.unwrap();
    assert!(feedback.starts_with("Type verified: User (class)"));
    assert!(feedback.contains("C# types verified this session: 1"));

    let session = SessionStore::new(gate.layout().session_file()).load();
    assert_eq!(session.csharp.verified_type_names, vec!["User"]);
    assert_eq!(session.statistics.total_verifications, 1);

    assert_eq!(
        gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict),
        Decision::Allow
    );
}

#[test]
fn test_codenav_hover_text_is_ingested() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Program.cs"), "var user = new User();").unwrap();
    let gate = typegate(&dir);

    let report = gate
        .post_tool(&hook(json!({
            "tool_name": "mcp__codenav__csharp_hover",
            "session_id": "s1",
            "tool_input": {"filePath": "Program.cs", "line": 3, "column": 5},
            "tool_response": {"content": [{"type": "text", "text": "```csharp\npublic class User\n```"}]}
        })))
        .unwrap();
    assert_eq!(report.recorded, vec!["User"]);
    assert!(report.tracked);

    assert_eq!(
        gate.pre_edit(&write_user_edit("Program.cs"), EnforcementMode::Strict),
        Decision::Allow
    );
}

#[test]
fn test_failed_lookup_is_ignored() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);
    let report = gate
        .post_tool(&hook(json!({
            "tool_name": "mcp__codenav__csharp_hover",
            "session_id": "s1",
            "tool_input": {"typeName": "User"},
            "tool_response": {"isError": true, "content": [{"type": "text", "text": "not found"}]}
        })))
        .unwrap();
    assert!(report.recorded.is_empty());
    assert!(!report.tracked);
    assert!(!gate.layout().cache_file().exists());
}

#[test]
fn test_load_tool_marks_workspace() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);
    let report = gate
        .post_tool(&hook(json!({
            "tool_name": "mcp__codenav__ts_load_project",
            "session_id": "s1",
            "tool_input": {"projectPath": "web/tsconfig.json"},
            "tool_response": {"content": [{"type": "text", "text": "Loaded 42 files"}]}
        })))
        .unwrap();
    assert!(report.tracked);
    assert!(report.recorded.is_empty());
    assert_eq!(
        report.feedback.as_deref(),
        Some("TypeScript workspace loaded: web/tsconfig.json\n")
    );

    let session = SessionStore::new(gate.layout().session_file()).load();
    assert!(session.typescript.workspace_loaded);
    assert_eq!(session.typescript.loaded_path.as_deref(), Some("web/tsconfig.json"));
}

// =============================================================================
// Session start and status
// =============================================================================

#[test]
fn test_bootstrap_detects_one_manifest_per_dialect() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/Api")).unwrap();
    fs::create_dir_all(dir.path().join("client")).unwrap();
    fs::write(dir.path().join("src/Api/Api.csproj"), "<Project />").unwrap();
    fs::write(dir.path().join("client/tsconfig.json"), "{}").unwrap();
    let gate = typegate(&dir);

    let report = gate
        .session_start(
            &hook(json!({"session_id": "s9", "source": "startup"})),
            EnforcementMode::Strict,
        )
        .unwrap();

    let detection = &report.state.project_detection;
    assert!(detection.csharp.detected);
    assert_eq!(detection.csharp.manifests, vec!["src/Api/Api.csproj"]);
    assert!(detection.typescript.detected);
    assert_eq!(detection.typescript.manifests, vec!["client/tsconfig.json"]);

    let persisted = SessionStore::new(gate.layout().session_file()).load();
    assert_eq!(persisted.session_id, "s9");
    assert_eq!(persisted.project_detection, *detection);
    assert!(gate.layout().guidance_file().exists());
}

#[test]
fn test_status_report() {
    let dir = TempDir::new().unwrap();
    let gate = typegate(&dir);
    CacheStore::new(gate.layout().cache_file()).record("Order", TypeInfo::default(), "s1");

    let status = gate.status(EnforcementMode::Warn).unwrap();
    assert_eq!(status.cache_session_id, "s1");
    assert_eq!(status.cached_types, vec!["Order"]);
    assert_eq!(status.valid_types, vec!["Order"]);
    assert_eq!(status.mode, EnforcementMode::Warn);
}
