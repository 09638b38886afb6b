use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
};

pub mod result;
pub mod transpile;

use crate::bundler::transpile::transpile_entry;

/// Every output unit is a browser script: the entry runs inside
/// `(() => { ... })();` with its module syntax removed. Source maps are
/// never produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BundleOptions {
    pub minify: bool,
}

/// The compiled text of one entry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// `[dir]/[name].js`, relative to the deepest directory shared by all
    /// entries of the build.
    pub path: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLog {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for BuildLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => self.message.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// One unit per entry, in entry order.
    Success(Vec<OutputUnit>),
    Failure(Vec<BuildLog>),
}

/// Compiles a list of entry files into named text outputs, or reports why
/// it could not.
pub trait Bundler: Send + Sync {
    fn build(
        &self,
        entries: &[PathBuf],
        options: &BundleOptions,
    ) -> impl Future<Output = BuildOutcome> + Send;
}

/// Transpiles each entry on its own with oxc. Entries are not linked
/// together, so anything one entry imports at runtime is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcBundler;

impl Bundler for OxcBundler {
    async fn build(
        &self,
        entries: &[PathBuf],
        options: &BundleOptions,
    ) -> BuildOutcome {
        let entries = entries.to_vec();
        let options = options.clone();
        match tokio::task::spawn_blocking(move || {
            bundle_entries(&entries, &options)
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(error) => BuildOutcome::Failure(vec![BuildLog {
                path: None,
                message: format!("bundler task failed: {}", error),
            }]),
        }
    }
}

/// Transpiles all entries. Any failing entry fails the whole build, with a
/// log for every entry that failed.
pub fn bundle_entries(
    entries: &[PathBuf],
    options: &BundleOptions,
) -> BuildOutcome {
    let root = common_root(entries);
    let mut outputs = Vec::with_capacity(entries.len());
    let mut logs = Vec::new();

    for entry in entries {
        log::debug!("transpiling {}", entry.display());
        match transpile_entry(entry, options) {
            Ok(text) => outputs.push(OutputUnit {
                path: output_path(&root, entry),
                text,
            }),
            Err(error) => logs.push(BuildLog {
                path: Some(entry.clone()),
                message: error.to_string(),
            }),
        }
    }

    if logs.is_empty() {
        BuildOutcome::Success(outputs)
    } else {
        BuildOutcome::Failure(logs)
    }
}

/// Deepest directory containing every entry.
fn common_root(entries: &[PathBuf]) -> PathBuf {
    let mut parents = entries
        .iter()
        .map(|entry| entry.parent().unwrap_or(Path::new("")));
    let Some(first) = parents.next() else {
        return PathBuf::new();
    };
    parents.fold(first.to_path_buf(), |root, parent| {
        root.components()
            .zip(parent.components())
            .take_while(|(left, right)| left == right)
            .map(|(component, _)| component)
            .collect()
    })
}

fn output_path(root: &Path, entry: &Path) -> PathBuf {
    entry
        .strip_prefix(root)
        .unwrap_or(entry)
        .with_extension("js")
}
