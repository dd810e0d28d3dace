//! Common test utilities and helpers

use ordertrack::{Result, Tracker, TrackerWorkspace};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub workspace: TrackerWorkspace,
}

impl TestFixture {
    /// Create a new test fixture with initialized workspace
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let workspace = TrackerWorkspace::create_new(temp_dir.path().to_path_buf())?;

        Ok(Self {
            temp_dir,
            workspace,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Open a tracker over the fixture workspace
    pub fn tracker(&self) -> Result<Tracker> {
        Tracker::open(&self.workspace)
    }

    /// Create a test CSV file with sample data
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();

        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run an ordertrack command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use ordertrack::cli::Cli;
        use ordertrack::commands::execute_command;

        let mut cmd_args = vec!["ordertrack"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| ordertrack::TrackError::invalid_input(e.to_string()))?;

        // Default to the fixture root when no --workspace flag was given
        let workspace_path = cli.workspace.as_deref().or(Some(self.fixture.root()));
        execute_command(cli.command, workspace_path)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> ordertrack::TrackError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample dataset builders for engine-level tests
pub mod sample_data {
    use ordertrack::dataset::{RawDataset, Row};
    use serde_json::json;

    fn columns() -> Vec<String> {
        ["UniqueID", "Location Code", "Customer", "Fabric Type", "GPU Model", "Quantity"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row(id: &str, location: &str, customer: &str, fabric: &str, gpu: &str, qty: i64) -> Row {
        let mut fields = Row::new();
        fields.insert("UniqueID".to_string(), json!(id));
        fields.insert("Location Code".to_string(), json!(location));
        fields.insert("Customer".to_string(), json!(customer));
        fields.insert("Fabric Type".to_string(), json!(fabric));
        fields.insert("GPU Model".to_string(), json!(gpu));
        fields.insert("Quantity".to_string(), json!(qty));
        fields
    }

    /// Three-order upload used as the baseline in most tests
    pub fn baseline_upload() -> RawDataset {
        RawDataset::new(
            vec![
                row("1001", "LOC001", "Acme Corp", "Cotton", "RTX 4090", 5),
                row("1002", "LOC002", "TechGiant", "Polyester", "RTX 4080", 3),
                row("1003", "LOC001", "DataSystems", "Wool", "RTX 3090", 2),
            ],
            columns(),
        )
    }

    /// The baseline with 1001 modified, 1003 gone, and 1004 added
    pub fn revised_upload() -> RawDataset {
        RawDataset::new(
            vec![
                row("1001", "LOC001", "Acme Corp", "Cotton", "RTX 5090", 5),
                row("1002", "LOC002", "TechGiant", "Polyester", "RTX 4080", 3),
                row("1004", "LOC003", "CloudHost", "Silk", "RTX 4090", 8),
            ],
            columns(),
        )
    }

    /// CSV rows matching [`baseline_upload`] for file-based ingest tests
    pub fn baseline_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["UniqueID", "Location Code", "Customer", "Fabric Type", "GPU Model", "Quantity"],
            vec!["1001", "LOC001", "Acme Corp", "Cotton", "RTX 4090", "5"],
            vec!["1002", "LOC002", "TechGiant", "Polyester", "RTX 4080", "3"],
            vec!["1003", "LOC001", "DataSystems", "Wool", "RTX 3090", "2"],
        ]
    }
}
