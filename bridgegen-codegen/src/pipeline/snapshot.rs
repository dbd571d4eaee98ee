//! Pipeline snapshot plugin for visualization and debugging.
//!
//! Captures the pipeline state after each phase so the intermediate results
//! of a run can be inspected.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use eyre::{Result, WrapErr};
use serde::Serialize;

use super::{CompilationContext, Diagnostic, Plugin};
use crate::{inventory::Inventory, output::GeneratedServer, plan::Resolution};

/// A snapshot of the pipeline state at a specific phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSnapshot {
    /// The phase that just completed.
    pub phase: String,

    /// Paths of the parsed files (available after "parse").
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,

    /// Method inventory (available after "inventory").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Inventory>,

    /// Method plans and callback stubs (available after "resolve").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,

    /// Output path and edits (available after "emit").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<GeneratedServer>,

    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,
}

/// A plugin that captures pipeline state after each phase.
///
/// Used by the `--visualize` flag to dump each phase's results as JSON.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(SnapshotPlugin::with_output_dir(".bridgegen/debug"));
/// let ctx = pipeline.run(manifest, sources)?;
/// ```
pub struct SnapshotPlugin {
    snapshots: RwLock<Vec<PhaseSnapshot>>,
    /// Directory each snapshot is written to as `<phase>.json`.
    output_dir: Option<PathBuf>,
}

impl SnapshotPlugin {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: None,
        }
    }

    /// Create a snapshot plugin that writes each snapshot as it is taken.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Get all collected snapshots.
    pub fn snapshots(&self) -> Vec<PhaseSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write all snapshots to `dir`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        for snapshot in snapshots.iter() {
            write_snapshot(dir, snapshot)?;
        }
        Ok(())
    }

    fn capture_snapshot(&self, phase: &str, ctx: &CompilationContext) -> PhaseSnapshot {
        let snapshot = PhaseSnapshot {
            phase: phase.to_string(),
            files: ctx
                .symbols
                .as_ref()
                .map(|s| s.files.iter().map(|f| f.path.clone()).collect())
                .unwrap_or_default(),
            inventory: ctx.inventory.clone(),
            resolution: ctx.resolution.clone(),
            output: ctx.output.clone(),
            diagnostics: ctx.diagnostics.clone(),
        };
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        snapshot
    }
}

impl Default for SnapshotPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let snapshot = self.capture_snapshot(phase, ctx);
        if let Some(dir) = &self.output_dir {
            write_snapshot(dir, &snapshot)?;
        }
        Ok(())
    }
}

fn write_snapshot(dir: &Path, snapshot: &PhaseSnapshot) -> Result<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", snapshot.phase));
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, json).wrap_err_with(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pipeline::Pipeline, testing::Fixture};

    #[test]
    fn test_snapshot_plugin_creation() {
        let plugin = SnapshotPlugin::new();
        assert!(plugin.snapshots().is_empty());
    }

    #[test]
    fn test_snapshots_written_per_phase() {
        let fixture = Fixture::openzwave();
        let debug_dir = fixture.root().join(".bridgegen/debug");
        Pipeline::new()
            .plugin(SnapshotPlugin::with_output_dir(&debug_dir))
            .run(fixture.manifest(), fixture.sources())
            .unwrap();

        for phase in ["parse", "inventory", "resolve", "emit"] {
            assert!(debug_dir.join(format!("{}.json", phase)).is_file());
        }
        let resolve = std::fs::read_to_string(debug_dir.join("resolve.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&resolve).unwrap();
        assert_eq!(json["phase"], "resolve");
        assert!(json["resolution"]["callbacks"]["BeginControllerCommand_callback"].is_object());
        assert!(json.get("output").is_none());
    }
}
