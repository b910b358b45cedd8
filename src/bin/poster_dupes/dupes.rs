//! Duplicate poster folder detection.
//!
//! Folder names are compared pairwise with fuzzy matching at each directory
//! depth: duplicates are only meaningful among siblings of the same level.
//! The scan is read-only; it produces a report and mutates nothing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use walkdir::WalkDir;

use poster_tools::matching::token_set_ratio;

use crate::Args;
use crate::config::{Config, DEFAULT_POSTER_DIR, DupesConfig};

/// Minimum pairwise similarity for two folder names to cluster as duplicates.
pub const DUPLICATE_SCORE_THRESHOLD: u8 = 74;

/// A group of folder names that look like duplicates of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCluster {
    /// Member names in first-encounter order.
    pub names: Vec<String>,
    /// Highest pairwise score within the cluster.
    pub representative_score: u8,
}

pub struct DupeScan {
    config: Config,
    root: PathBuf,
}

/// Cluster folder names whose pairwise similarity reaches the threshold.
///
/// All-pairs comparison on the raw names; a cluster is a connected group
/// where every member scores at or above [`DUPLICATE_SCORE_THRESHOLD`]
/// against at least one other member. Cluster and member order follow first
/// encounter. Names without a partner are not reported.
pub fn find_duplicates<S: AsRef<str>>(folder_names: &[S]) -> Vec<DuplicateCluster> {
    let names: Vec<&str> = folder_names.iter().map(std::convert::AsRef::as_ref).collect();
    let count = names.len();

    let mut parent: Vec<usize> = (0..count).collect();
    let mut edges: Vec<(usize, usize, u8)> = Vec::new();
    for i in 0..count {
        for j in (i + 1)..count {
            let score = token_set_ratio(names[i], names[j]);
            if score >= DUPLICATE_SCORE_THRESHOLD {
                union(&mut parent, i, j);
                edges.push((i, j, score));
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_for_root: HashMap<usize, usize> = HashMap::new();
    for i in 0..count {
        let root = find(&mut parent, i);
        let position = *group_for_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[position].push(i);
    }

    groups
        .into_iter()
        .filter(|group| group.len() >= 2)
        .map(|group| {
            let representative_score = edges
                .iter()
                .filter(|(a, _, _)| group.contains(a))
                .map(|&(_, _, score)| score)
                .max()
                .unwrap_or(0);
            DuplicateCluster {
                names: group.iter().map(|&index| names[index].to_string()).collect(),
                representative_score,
            }
        })
        .collect()
}

fn find(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        // Lower index wins so clusters keep first-encounter order
        parent[root_a.max(root_b)] = root_a.min(root_b);
    }
}

impl DupeScan {
    pub fn new(args: Args) -> Result<Self> {
        let user_config = DupesConfig::get_user_config();
        let root = if let Some(path) = args.path.as_deref() {
            poster_tools::resolve_input_path(Some(path))?
        } else if let Some(default_dir) = user_config.default_dir.as_deref() {
            poster_tools::resolve_input_path(Some(default_dir))?
        } else {
            poster_tools::resolve_input_path(Some(Path::new(DEFAULT_POSTER_DIR)))?
        };
        let config = Config::from_args(&args);
        Ok(Self { config, root })
    }

    pub fn run(&self) -> Result<()> {
        if self.config.verbose {
            println!("Scanning {}", poster_tools::path_to_string(&self.root).magenta());
        }

        let directories = self.collect_directories()?;
        if directories.len() < 2 {
            anyhow::bail!(
                "There must be at least 2 subdirectories in {} to find duplicates",
                self.root.display()
            );
        }

        let max_depth = directories.iter().map(|(_, depth)| *depth).max().unwrap_or(0);
        for depth in 0..=max_depth {
            println!("{}", format!("Checking for duplicates at level {depth}...").cyan().bold());
            let names: Vec<String> = directories
                .iter()
                .filter(|(_, directory_depth)| *directory_depth == depth)
                .map(|(path, _)| poster_tools::path_to_filename_string(path))
                .collect();

            let clusters = find_duplicates(&names);
            if clusters.is_empty() {
                println!("  {}", format!("No duplicates found at level {depth}").green());
                continue;
            }
            for cluster in clusters {
                println!(
                    "  {} {} (score: {})",
                    "Potential duplicates:".yellow().bold(),
                    cluster.names.join("  <-->  "),
                    cluster.representative_score
                );
            }
        }

        Ok(())
    }

    /// Recursively collect subdirectories with their depth below the root.
    fn collect_directories(&self) -> Result<Vec<(PathBuf, usize)>> {
        let mut directories = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !poster_tools::is_hidden(entry))
        {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = poster_tools::os_str_to_string(entry.file_name());
            if self.config.ignore_dirs.iter().any(|ignored| *ignored == name) {
                continue;
            }
            directories.push((entry.path().to_path_buf(), entry.depth()));
        }
        Ok(directories)
    }
}
