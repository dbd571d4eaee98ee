//! Fixture workspaces for pipeline tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bridgegen_manifest::{Manifest, ResolvedSources, Roots};
use tempfile::TempDir;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// A copy of a fixture tree in a temporary directory, laid out like a
/// thrift4ozw checkout: `gen-cpp/` next to an OpenZWave root (`ozw/`) and a
/// Thrift include root (`thrift/`).
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn openzwave() -> Self {
        let dir = TempDir::new().unwrap();
        copy_dir(&Path::new(FIXTURES).join("openzwave"), dir.path());
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn roots(&self) -> Roots {
        Roots {
            library: self.root().join("ozw"),
            thrift: self.root().join("thrift"),
        }
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::default()
    }

    pub fn sources(&self) -> ResolvedSources {
        self.manifest().sources.resolve(&self.roots(), self.root())
    }

    pub fn skeleton_path(&self) -> PathBuf {
        self.sources().skeleton
    }

    pub fn skeleton(&self) -> String {
        fs::read_to_string(self.skeleton_path()).unwrap()
    }

    pub fn write_skeleton(&self, text: &str) {
        fs::write(self.skeleton_path(), text).unwrap();
    }

    pub fn write_manager_header(&self, text: &str) {
        fs::write(self.sources().manager_header, text).unwrap();
    }
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}
