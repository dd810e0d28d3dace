//! Workspace management for ordertrack state

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Manages the .ordertrack data directory holding the keyed stores
#[derive(Debug, Clone)]
pub struct TrackerWorkspace {
    /// Project root directory (where .ordertrack/ lives)
    pub root: PathBuf,
    /// .ordertrack/ directory path
    pub data_dir: PathBuf,
}

impl TrackerWorkspace {
    /// Find existing workspace or create a new one
    pub fn find_or_create(start_dir: Option<&Path>) -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        let start = start_dir.unwrap_or(&current_dir);

        if let Some(workspace) = Self::find_existing(start)? {
            return Ok(workspace);
        }

        Self::create_new(start.to_path_buf())
    }

    /// Find an existing .ordertrack workspace by walking up the directory tree
    fn find_existing(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir;

        loop {
            let data_dir = current.join(".ordertrack");
            if data_dir.exists() && data_dir.is_dir() {
                return Ok(Some(Self::from_root(current.to_path_buf())));
            }

            // A .git directory marks the project root; stop searching above it.
            if current.join(".git").exists() {
                break;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Create a new workspace in the specified root directory
    pub fn create_new(root: PathBuf) -> Result<Self> {
        let workspace = Self::from_root(root);

        fs::create_dir_all(&workspace.data_dir)?;
        workspace.create_config(false)?;
        workspace.ensure_gitignore()?;

        log::info!("Created ordertrack workspace at: {}", workspace.root.display());

        Ok(workspace)
    }

    /// Build workspace paths from a root directory without touching the disk
    pub fn from_root(root: PathBuf) -> Self {
        let data_dir = root.join(".ordertrack");
        Self { root, data_dir }
    }

    /// Path of the record store file (identifier → record)
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }

    /// Path of the snapshot store file (snapshot id → snapshot)
    pub fn snapshots_path(&self) -> PathBuf {
        self.data_dir.join("snapshots.json")
    }

    /// Path of the settings store file (preference key → value)
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    /// Path of the version store file (snapshot id → record versions)
    pub fn versions_path(&self) -> PathBuf {
        self.data_dir.join("versions.json")
    }

    /// Write the workspace config file, optionally overwriting an existing one
    pub fn create_config(&self, force: bool) -> Result<()> {
        let config_path = self.data_dir.join("config.json");

        if config_path.exists() && !force {
            return Ok(());
        }

        let config = serde_json::json!({
            "version": crate::FORMAT_VERSION,
            "created": chrono::Utc::now(),
            "header_scan_limit": crate::HEADER_SCAN_LIMIT,
        });

        fs::write(config_path, serde_json::to_string_pretty(&config)?)?;
        Ok(())
    }

    /// Ensure .gitignore excludes the data directory
    pub fn ensure_gitignore(&self) -> Result<()> {
        let gitignore_path = self.root.join(".gitignore");
        let ignore_entry = "# Ignore ordertrack data stores\n.ordertrack/\n";

        if gitignore_path.exists() {
            let content = fs::read_to_string(&gitignore_path)?;
            if !content.contains(".ordertrack/") {
                let new_content = if content.ends_with('\n') {
                    format!("{}\n{}", content, ignore_entry)
                } else {
                    format!("{}\n\n{}", content, ignore_entry)
                };
                fs::write(gitignore_path, new_content)?;
                log::info!("Updated .gitignore with ordertrack entries");
            }
        } else {
            fs::write(gitignore_path, ignore_entry)?;
            log::info!("Created .gitignore with ordertrack entries");
        }

        Ok(())
    }
}
