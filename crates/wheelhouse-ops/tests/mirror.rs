//! Operation-level tests against an in-memory package provider and a
//! temporary output root.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use wheelhouse_ops::ops_mirror::mirror_with;
use wheelhouse_ops::ops_plan::plan_with;
use wheelhouse_ops::MirrorOptions;
use wheelhouse_pypi::registry::FetchOutcome;
use wheelhouse_pypi::release::{ArtifactEntry, ProjectIndex, ProjectInfo};
use wheelhouse_resolver::provider::PackageProvider;

#[derive(Default)]
struct FixtureProvider {
    projects: HashMap<String, ProjectIndex>,
    artifacts: HashMap<String, Vec<u8>>,
}

impl PackageProvider for FixtureProvider {
    async fn project(&self, name: &str) -> FetchOutcome {
        match self.projects.get(name) {
            Some(index) => FetchOutcome::Found(Arc::new(index.clone())),
            None => FetchOutcome::NotFound,
        }
    }

    async fn artifact_bytes(&self, url: &str) -> miette::Result<Option<Vec<u8>>> {
        Ok(self.artifacts.get(url).cloned())
    }

    async fn fetch_artifact(
        &self,
        url: &str,
        dest: &Path,
        _label: &str,
        _show_progress: bool,
    ) -> miette::Result<u64> {
        match self.artifacts.get(url) {
            Some(bytes) => {
                std::fs::write(dest, bytes).map_err(|e| miette::miette!("{e}"))?;
                Ok(bytes.len() as u64)
            }
            None => Err(miette::miette!("no fixture artifact for {url}")),
        }
    }
}

fn entry(filename: &str, packagetype: &str) -> ArtifactEntry {
    ArtifactEntry {
        url: format!("https://files.example/{filename}"),
        filename: filename.to_string(),
        packagetype: packagetype.to_string(),
    }
}

fn project(name: &str, version: &str, deps: &[&str], artifacts: Vec<ArtifactEntry>) -> ProjectIndex {
    let mut releases = BTreeMap::new();
    releases.insert(version.to_string(), artifacts);
    ProjectIndex {
        info: ProjectInfo {
            name: name.to_string(),
            version: version.to_string(),
            requires_dist: Some(deps.iter().map(|d| d.to_string()).collect()),
        },
        releases,
    }
}

fn fixture_with_artifacts(projects: Vec<ProjectIndex>) -> FixtureProvider {
    let mut provider = FixtureProvider::default();
    for index in projects {
        for entries in index.releases.values() {
            for entry in entries {
                provider
                    .artifacts
                    .insert(entry.url.clone(), b"artifact".to_vec());
            }
        }
        provider.projects.insert(index.info.name.clone(), index);
    }
    provider
}

fn options(root: &TempDir, requirements: &str) -> MirrorOptions {
    let path = root.path().join("requirements.txt");
    std::fs::write(&path, requirements).unwrap();
    MirrorOptions {
        requirements_path: Some(path),
        python_version: "3.12".to_string(),
        index_url: "https://pypi.example".to_string(),
        output_root: root.path().to_path_buf(),
        jobs: 1,
        verbose: false,
    }
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn sdist_only_packages_land_in_both_directories() {
    let provider = fixture_with_artifacts(vec![
        project("alpha", "1.0", &[], vec![entry("alpha-1.0.tar.gz", "sdist")]),
        project("beta", "2.0", &[], vec![entry("beta-2.0.tar.gz", "sdist")]),
    ]);
    let root = TempDir::new().unwrap();
    let opts = options(&root, "alpha\nbeta\n");

    let summary = mirror_with(Arc::new(provider), &opts).await.unwrap();

    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.failed, 0);
    // Two source archives fanned out to both platform directories.
    assert_eq!(summary.downloaded, 4);
    assert_eq!(summary.directories.len(), 2);
    for dir in &summary.directories {
        let entries = dir_entries(dir);
        assert!(entries.contains(&"alpha-1.0.tar.gz".to_string()));
        assert!(entries.contains(&"beta-2.0.tar.gz".to_string()));
        assert!(entries.contains(&"requirements.txt".to_string()));
        assert_eq!(entries.len(), 4, "two archives, requirements, script: {entries:?}");
    }
    assert!(summary.directories[0]
        .file_name()
        .is_some_and(|n| n == "pypackage_win_x86_64_py3_12"));
    assert!(summary.directories[1]
        .file_name()
        .is_some_and(|n| n == "pypackage_linux_amd64_py3_12"));
}

#[tokio::test]
async fn platform_wheels_split_between_directories() {
    let provider = fixture_with_artifacts(vec![project(
        "gamma",
        "1.5",
        &[],
        vec![
            entry("gamma-1.5-cp312-cp312-win_amd64.whl", "bdist_wheel"),
            entry(
                "gamma-1.5-cp312-cp312-manylinux_2_17_x86_64.whl",
                "bdist_wheel",
            ),
        ],
    )]);
    let root = TempDir::new().unwrap();
    let opts = options(&root, "gamma==1.5\n");

    let summary = mirror_with(Arc::new(provider), &opts).await.unwrap();

    assert_eq!(summary.downloaded, 2);
    let windows = dir_entries(&summary.directories[0]);
    let linux = dir_entries(&summary.directories[1]);
    assert!(windows.contains(&"gamma-1.5-cp312-cp312-win_amd64.whl".to_string()));
    assert!(!windows.iter().any(|n| n.contains("manylinux")));
    assert!(linux.contains(&"gamma-1.5-cp312-cp312-manylinux_2_17_x86_64.whl".to_string()));
    assert!(!linux.iter().any(|n| n.contains("win_amd64")));
}

#[tokio::test]
async fn missing_package_is_reported_not_fatal() {
    let provider = fixture_with_artifacts(vec![project(
        "alpha",
        "1.0",
        &[],
        vec![entry("alpha-1.0.tar.gz", "sdist")],
    )]);
    let root = TempDir::new().unwrap();
    let opts = options(&root, "alpha\nno-such-package\n");

    let summary = mirror_with(Arc::new(provider), &opts).await.unwrap();

    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.downloaded, 2);
    for dir in &summary.directories {
        assert!(dir_entries(dir).contains(&"alpha-1.0.tar.gz".to_string()));
    }
}

#[tokio::test]
async fn missing_requirements_file_is_fatal() {
    let root = TempDir::new().unwrap();
    let opts = MirrorOptions {
        requirements_path: Some(root.path().join("absent.txt")),
        python_version: "3.12".to_string(),
        index_url: "https://pypi.example".to_string(),
        output_root: root.path().to_path_buf(),
        jobs: 1,
        verbose: false,
    };

    let result = mirror_with(Arc::new(FixtureProvider::default()), &opts).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn plan_resolves_without_writing_anything() {
    let provider = fixture_with_artifacts(vec![
        project(
            "alpha",
            "1.0",
            &["beta"],
            vec![entry("alpha-1.0.tar.gz", "sdist")],
        ),
        project("beta", "2.0", &[], vec![entry("beta-2.0.tar.gz", "sdist")]),
    ]);
    let root = TempDir::new().unwrap();
    let opts = options(&root, "alpha\n");

    let plan = plan_with(Arc::new(provider), &opts).await.unwrap();

    assert_eq!(plan.downloads.len(), 2);
    assert_eq!(plan.graph.node_count(), 2);
    // Only the requirements file we wrote ourselves is in the output root.
    let entries: Vec<PathBuf> = std::fs::read_dir(root.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
}
