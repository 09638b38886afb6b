use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{debug, error, info};

use crate::{
    bundler::{BuildLog, BuildOutcome, BundleOptions, Bundler, OutputUnit},
    category::Category,
    collector::{SOURCE_SUFFIX, collect_files},
};

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Holds one subdirectory per category.
    pub source_dir: PathBuf,
    /// Deleted and recreated on every build.
    pub out_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            source_dir: PathBuf::from("./src"),
            out_dir: PathBuf::from("./dist"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryReport {
    /// Missing directory, or no source files in it.
    Skipped,
    Built(PathBuf),
    Failed(Vec<BuildLog>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub reports: Vec<(Category, CategoryReport)>,
}

impl BuildSummary {
    pub fn report(&self, category: Category) -> Option<&CategoryReport> {
        self.reports
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, report)| report)
    }
}

pub async fn reset_output_dir(out_dir: &Path) -> Result<()> {
    if tokio::fs::try_exists(out_dir).await.unwrap_or(false) {
        tokio::fs::remove_dir_all(out_dir).await.with_context(|| {
            format!("failed to remove {}", out_dir.display())
        })?;
    }
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))
}

pub fn merge_outputs(outputs: &[OutputUnit]) -> String {
    outputs
        .iter()
        .map(|output| output.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds every category concurrently into a freshly reset output
/// directory.
///
/// All category tasks run to completion before this returns. A bundler
/// failure only affects its own category and is part of the summary. Any
/// other error, such as an unreadable source directory, is returned once
/// the sibling tasks have settled; the files they wrote stay in place.
pub async fn build<B: Bundler + 'static>(
    config: &BuildConfig,
    bundler: Arc<B>,
) -> Result<BuildSummary> {
    reset_output_dir(&config.out_dir).await?;

    let tasks = Category::ALL.map(|category| {
        let config = config.clone();
        let bundler = bundler.clone();
        tokio::spawn(async move {
            build_category(category, &config, bundler.as_ref()).await
        })
    });

    let mut reports = Vec::with_capacity(Category::ALL.len());
    for (category, result) in Category::ALL.into_iter().zip(join_all(tasks).await)
    {
        let report = result
            .with_context(|| format!("build task for {} panicked", category))??;
        reports.push((category, report));
    }

    Ok(BuildSummary { reports })
}

pub async fn build_category<B: Bundler>(
    category: Category,
    config: &BuildConfig,
    bundler: &B,
) -> Result<CategoryReport> {
    let category_dir = config.source_dir.join(category.name());
    if !tokio::fs::try_exists(&category_dir).await.unwrap_or(false) {
        debug!("skipping {}: {} not found", category, category_dir.display());
        return Ok(CategoryReport::Skipped);
    }

    let walk_dir = category_dir.clone();
    let files = tokio::task::spawn_blocking(move || {
        collect_files(&walk_dir, SOURCE_SUFFIX)
    })
    .await?
    .with_context(|| {
        format!("failed to collect files in {}", category_dir.display())
    })?;
    if files.is_empty() {
        debug!("skipping {}: no source files", category);
        return Ok(CategoryReport::Skipped);
    }

    debug!("bundling {} entries for {}", files.len(), category);
    match bundler.build(&files, &BundleOptions::default()).await {
        BuildOutcome::Failure(logs) => {
            let details = logs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            error!("failed to build {}:\n{}", category, details);
            Ok(CategoryReport::Failed(logs))
        }
        BuildOutcome::Success(outputs) => {
            let output_path = config.out_dir.join(category.output_file_name());
            tokio::fs::write(&output_path, merge_outputs(&outputs))
                .await
                .with_context(|| {
                    format!("failed to write {}", output_path.display())
                })?;
            info!("{} built successfully", category.output_file_name());
            Ok(CategoryReport::Built(output_path))
        }
    }
}
