#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary routine file
pub struct CliTestHarness {
    temp_dir: TempDir,
    data_file: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty temporary directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let data_file = temp_dir.path().join("routines.json");

        Self { temp_dir, data_file }
    }

    /// Create a harness whose routine file holds `contents`
    pub fn with_routines(contents: &str) -> Self {
        let harness = Self::new();
        std::fs::write(&harness.data_file, contents).expect("Failed to write routine file");
        harness
    }

    /// Get a Command instance isolated from the host configuration
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("rota").expect("Failed to find rota binary");

        cmd.current_dir(self.temp_dir.path())
            .env("ROTA_CONFIG", self.temp_dir.path().join("absent.toml"))
            .env("ROTA_DATA_FILE", &self.data_file)
            .env("ROTA_DEFAULT_TIMEZONE", "UTC")
            .env_remove("RUST_LOG");

        cmd
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The routine file parsed as JSON
    pub fn stored(&self) -> serde_json::Value {
        let contents = std::fs::read_to_string(&self.data_file).expect("Failed to read routine file");
        serde_json::from_str(&contents).expect("Routine file is not valid JSON")
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Four routines: two recurring, one legacy overdue, one corrupt
    pub const ROUTINES: &'static str = r#"[
        {
            "id": "cooler",
            "title": "Walk-in cooler temperature log",
            "industry": "hospitality",
            "category": "checklist",
            "priority": "high",
            "dueDate": "2024-03-01T07:00:00",
            "recurrence": {"type": "daily", "interval": 1}
        },
        {
            "id": "forklift",
            "title": "Forklift inspection",
            "industry": "manufacturing",
            "category": "inspection",
            "priority": "critical",
            "dueDate": "2024-03-04",
            "recurrence": {"type": "weekly", "interval": 1, "daysOfWeek": [1, 4]},
            "assignee": "j.okafor"
        },
        {
            "id": "fire-audit",
            "title": "Fire safety audit",
            "industry": "manufacturing",
            "category": "audit",
            "dueDate": "2024-02-15",
            "frequency": "quarterly"
        },
        {
            "id": "broken",
            "title": "Imported with a bad date",
            "dueDate": "15.03.2024",
            "recurrence": {"type": "daily"}
        }
    ]"#;

    /// A weekly routine whose recurrence ends before its next occurrence
    pub const ENDING: &'static str = r#"[
        {
            "id": "pool",
            "title": "Pool chlorine check",
            "dueDate": "2024-09-28",
            "recurrence": {"type": "weekly", "interval": 1, "endDate": "2024-09-30"}
        }
    ]"#;
}
