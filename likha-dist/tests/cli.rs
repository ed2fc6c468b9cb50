use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

/// Creates a config file with a single asset published on a release host.
fn create_release_config() -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"fallback: release\nrelease:\n  owner: likha-app\n  repo: likha\n  version: v1.0.0\nassets:\n  - name: kinder\n    object_key: likha-kinder.apk\n    static_path: /downloads/likha-kinder.apk\n    release_file: likha-kinder.apk\n",
    )
    .expect("Writing temp config failed");
    config
}

#[test]
fn defaults_prints_every_grade_without_storage() {
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.arg("defaults")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY");

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"status\": \"pending\"")
                .and(predicate::str::contains("/downloads/likha-kinder.apk"))
                .and(predicate::str::contains("/downloads/likha-grade1.apk"))
                .and(predicate::str::contains("/downloads/likha-grade2.apk"))
                .and(predicate::str::contains("/downloads/likha-grade3.apk")),
        );
}

#[test]
fn defaults_honours_release_fallback_from_config() {
    let config = create_release_config();
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.arg("defaults")
        .arg("--config")
        .arg(config.path())
        .arg("--format")
        .arg("text");

    cmd.assert().success().stdout(predicate::str::contains(
        "kinder\thttps://github.com/likha-app/likha/releases/download/v1.0.0/likha-kinder.apk",
    ));
}

#[test]
fn resolve_against_unreachable_storage_degrades_and_succeeds() {
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.arg("resolve")
        .env("SUPABASE_URL", "http://127.0.0.1:9")
        .env("SUPABASE_ANON_KEY", "test-anon-key");

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"status\": \"degraded\"")
                .and(predicate::str::contains("/downloads/likha-grade3.apk")),
        );
}

#[test]
fn resolve_without_credentials_writes_degraded_defaults() {
    // Run outside the crate so no developer `.env` brings credentials back.
    let workdir = tempdir().expect("temp dir");
    let out = NamedTempFile::new().expect("temp output");
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.current_dir(workdir.path())
        .arg("resolve")
        .arg("--output")
        .arg(out.path())
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY");

    cmd.assert().success();

    let written = std::fs::read_to_string(out.path()).expect("output written");
    let json: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["links"]["kinder"], "/downloads/likha-kinder.apk");
}

#[test]
fn objects_requires_credentials() {
    let workdir = tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.current_dir(workdir.path())
        .arg("objects")
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be set to list storage objects"));
}

#[test]
fn objects_reports_unreachable_storage() {
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.arg("objects")
        .arg("--format")
        .arg("text")
        .env("SUPABASE_URL", "http://127.0.0.1:9")
        .env("SUPABASE_ANON_KEY", "test-anon-key");

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to list objects in bucket `apk-files`"));
}

#[test]
fn invalid_config_fails() {
    let config = NamedTempFile::new().expect("temp config");
    write(config.path(), b"not-yaml: [:::").unwrap();
    let mut cmd = Command::cargo_bin("likha-dist").expect("Binary exists");
    cmd.arg("resolve").arg("--config").arg(config.path());

    cmd.assert().failure();
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use likha_dist::cli::{run, Cli, Commands, OutputFormat};

    let cli = Cli {
        command: Commands::Defaults {
            config: None,
            format: OutputFormat::Json,
        },
    };

    run(cli).await.expect("defaults never fails without a config file");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
