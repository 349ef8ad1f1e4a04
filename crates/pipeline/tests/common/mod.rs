//! Shared fixtures for end-to-end runs.

use d2b_models::Participant;
use d2b_pipeline::{D2b, Report};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch workspace holding one input directory, a description
/// configuration and an output directory.
pub struct Fixture {
    dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new(config: Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("in")).unwrap();
        fs::write(dir.path().join("d2b-config.json"), serde_json::to_vec_pretty(&config).unwrap()).unwrap();
        Self { dir }
    }

    /// Writes a sidecar into the input directory.
    pub fn sidecar(self, name: &str, contents: Value) -> Self {
        self.file(name, &contents.to_string())
    }

    /// Writes an arbitrary file into the input directory; the contents
    /// default to the file name so every payload is distinguishable.
    pub fn payload(self, name: &str) -> Self {
        self.file(name, name)
    }

    pub fn file(self, name: &str, contents: &str) -> Self {
        let path = self.input().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("in")
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("d2b-config.json")
    }

    pub fn out(&self) -> PathBuf {
        self.dir.path().join("bids")
    }

    pub fn d2b(&self) -> D2b {
        D2b::new(Participant::with_session("a", "1").unwrap(), self.config(), [self.input()], self.out())
            .with_version("test")
    }

    pub fn run(&self) -> Report {
        self.d2b().run().unwrap()
    }

    /// Reads an output sidecar, checking and stripping the version field.
    pub fn output_sidecar(&self, path: &str) -> Value {
        let mut sidecar: Value = serde_json::from_slice(&fs::read(self.out().join(path)).unwrap()).unwrap();
        let version = sidecar.as_object_mut().unwrap().remove("D2bVersion");
        assert_eq!(version, Some(Value::from("test")), "{path}");
        sidecar
    }

    pub fn output(&self, path: &str) -> String {
        fs::read_to_string(self.out().join(path)).unwrap()
    }

    /// Every file below the output directory, relative to it.
    pub fn outputs(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect(&self.out(), &self.out(), &mut files);
        files.sort();
        files
    }
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            files.push(path.strip_prefix(root).unwrap().to_str().unwrap().to_string());
        }
    }
}
