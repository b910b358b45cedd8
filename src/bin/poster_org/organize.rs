//! Organizer orchestration: discovery, matching, planning, and execution.
//!
//! Everything runs strictly sequentially, one library, one bundle, and one
//! file at a time. Caller intent lives in the immutable per-run [`Config`];
//! interactive decisions go through the injected [`Confirmer`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;

use poster_tools::matching::{find_best_match, token_set_ratio};
use poster_tools::normalize::normalize;
use poster_tools::{discover, get_normalized_file_name_and_extension, print_error, print_warning, show_diff};

use crate::Args;
use crate::catalog::{CatalogEntry, Library, MediaKind};
use crate::config::{Action, Config};
use crate::pipeline::{self, ZipBundle};
use crate::planner::{self, OrganizationPlan, PlanAction, PlanOutcome, SYNC_MATCH_CUTOFF};
use crate::prompt::{Confirmer, ConsoleConfirmer};

/// Minimum fuzzy score for the --filter option to keep a poster folder.
const FILTER_SCORE_CUTOFF: u8 = 50;

pub struct Organizer {
    config: Config,
    poster_dir: PathBuf,
    confirmer: Box<dyn Confirmer>,
}

impl Organizer {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::from_args(args);
        let poster_dir = poster_tools::resolve_input_path(Some(&config.poster_dir))?;
        if config.verbose {
            eprintln!("Config: {config:#?}");
            eprintln!("Poster dir: {}", poster_dir.display());
        }
        Ok(Self {
            config,
            poster_dir,
            confirmer: Box::new(ConsoleConfirmer),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let libraries = self.selected_libraries();
        if libraries.is_empty() {
            anyhow::bail!("No libraries configured; add [[posterorg.libraries]] entries to the config file");
        }
        for library in libraries {
            if let Err(error) = self.process_library(&library) {
                print_error!("Failed to process library {}: {error}", library.title);
            }
        }
        Ok(())
    }

    fn selected_libraries(&self) -> Vec<Library> {
        if self.config.library_names.is_empty() {
            return self.config.libraries.clone();
        }
        let mut selected = Vec::new();
        for name in &self.config.library_names {
            match self
                .config
                .libraries
                .iter()
                .find(|library| library.title.eq_ignore_ascii_case(name))
            {
                Some(library) => selected.push(library.clone()),
                None => print_error!("Library '{name}' not found in config"),
            }
        }
        selected
    }

    fn process_library(&mut self, library: &Library) -> Result<()> {
        println!("\n{} {}", "Processing library:".cyan().bold(), library.title);

        let catalog = library.catalog_entries()?;
        if catalog.is_empty() {
            print_warning!("No media folders found for library {}", library.title);
            return Ok(());
        }

        let poster_roots = self.discover_poster_roots(&library.title)?;
        if poster_roots.is_empty() {
            print_warning!("No poster folders match library {}", library.title);
            return Ok(());
        }
        if self.config.verbose {
            println!(
                "Poster folders: {}",
                poster_roots
                    .iter()
                    .map(|path| poster_tools::path_to_filename_string(path))
                    .join(", ")
            );
        }

        let mut posters = pipeline::find_posters(&poster_roots, self.config.dryrun)?;
        if let Some(filter) = self.config.filter.clone() {
            posters.folders = Self::filter_folders(posters.folders, &filter);
            println!(
                "{} {} folder(s) match filter '{filter}'",
                "Filtered:".cyan().bold(),
                posters.folders.len()
            );
        }

        if self.config.unlinked {
            self.process_unlinked(library, &catalog, &posters.folders)?;
        } else {
            match self.config.action {
                Action::New => {
                    if library.kind == MediaKind::Movie {
                        self.offer_loose_posters(&posters.files, &catalog)?;
                    }
                    self.process_bundles(library, &catalog, &posters.bundles);
                }
                Action::Sync => self.sync_poster_folders(library, &catalog, &posters.folders)?,
            }
        }

        if self.config.copy {
            for folder in &posters.folders {
                if let Err(error) = self.copy_posters(folder, &catalog) {
                    print_error!("Failed to link posters from {}: {error}", folder.display());
                }
            }
        }

        Ok(())
    }

    /// List the poster root and keep subfolders matching the library title.
    fn discover_poster_roots(&self, library_title: &str) -> Result<Vec<PathBuf>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.poster_dir)
            .with_context(|| format!("Failed to read poster directory {}", self.poster_dir.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let name = poster_tools::get_normalized_dir_name(&entry.path())?;
                if !poster_tools::is_hidden_name(&name) && name != pipeline::ARCHIVE_DIR_NAME {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(discover::discover_library_folders(library_title, &names)
            .into_iter()
            .map(|name| self.poster_dir.join(name))
            .collect())
    }

    /// Narrow poster folders with the fuzzy filter string.
    /// Exact matches win: if any folder scores 100, only those are kept.
    fn filter_folders(folders: Vec<PathBuf>, filter: &str) -> Vec<PathBuf> {
        let scored: Vec<(PathBuf, u8)> = folders
            .into_iter()
            .map(|folder| {
                let score = token_set_ratio(
                    &normalize(filter),
                    &normalize(&poster_tools::path_to_filename_string(&folder)),
                );
                (folder, score)
            })
            .filter(|(_, score)| *score >= FILTER_SCORE_CUTOFF)
            .collect();

        if scored.iter().any(|(_, score)| *score == 100) {
            scored
                .into_iter()
                .filter(|(_, score)| *score == 100)
                .map(|(folder, _)| folder)
                .collect()
        } else {
            scored.into_iter().map(|(folder, _)| folder).collect()
        }
    }

    /// Offer loose movie poster files into a Custom subfolder.
    fn offer_loose_posters(&mut self, files: &[PathBuf], catalog: &[CatalogEntry]) -> Result<()> {
        for poster in files {
            let file_name = poster_tools::path_to_filename_string(poster);
            if !self
                .confirmer
                .confirm(&format!("Move poster file {file_name} to Custom posters folder?"))
            {
                println!("{}", "Skipped".yellow());
                continue;
            }

            let source_dir = poster.parent().context("Failed to get poster parent directory")?;
            let custom_dir = if source_dir.ends_with("Custom") {
                source_dir.to_path_buf()
            } else {
                source_dir.join("Custom")
            };

            if self.config.dryrun {
                show_diff(&file_name, &format!("Custom/{file_name}"));
                continue;
            }
            fs::create_dir_all(&custom_dir).with_context(|| format!("Failed to create {}", custom_dir.display()))?;
            let target = custom_dir.join(&file_name);
            fs::rename(poster, &target)
                .with_context(|| format!("Failed to move {} to {}", poster.display(), target.display()))?;
            self.organize_movie_folder(&custom_dir, catalog)?;
        }
        Ok(())
    }

    /// Process every zip bundle, isolating failures per bundle.
    fn process_bundles(&mut self, library: &Library, catalog: &[CatalogEntry], bundles: &[ZipBundle]) {
        for bundle in bundles {
            if let Err(error) = self.process_bundle(library, catalog, bundle) {
                print_error!("Failed to process bundle {}: {error}", bundle.path.display());
            }
        }
    }

    /// Match, extract, organize, and archive one zip bundle.
    fn process_bundle(&mut self, library: &Library, catalog: &[CatalogEntry], bundle: &ZipBundle) -> Result<()> {
        let titles: Vec<&str> = catalog.iter().map(|entry| entry.title.as_str()).collect();
        let file_name = poster_tools::path_to_filename_string(&bundle.path);
        let best = find_best_match(&bundle.name, &titles);
        let parent = bundle.path.parent().context("Failed to get bundle directory")?.to_path_buf();

        let (destination, as_collection) = match library.kind {
            MediaKind::Series => {
                let Some(best) = best else {
                    print_warning!("No matching media found for {file_name}");
                    return Ok(());
                };
                if !self.confirmer.confirm(&format!(
                    "Matched zip file {file_name} to series {} [score: {}], proceed?",
                    best.candidate, best.score
                )) {
                    println!("{}", "Skipped".yellow());
                    return Ok(());
                }
                (parent.join(&best.candidate), false)
            }
            MediaKind::Movie => match best {
                Some(best) if !planner::is_collection_match(best.score) => {
                    if !self.confirmer.confirm(&format!(
                        "Matched zip file {file_name} to movie {} [score: {}], proceed?",
                        best.candidate, best.score
                    )) {
                        println!("{}", "Skipped".yellow());
                        return Ok(());
                    }
                    (parent.join(&best.candidate), false)
                }
                Some(best) => {
                    if !self.confirmer.confirm(&format!(
                        "Low match score ({}) for {file_name} to {}. Unzip as collection and organize individually?",
                        best.score, best.candidate
                    )) {
                        println!("{}", "Skipped".yellow());
                        return Ok(());
                    }
                    (parent.join(&bundle.name), true)
                }
                None => {
                    if !self.confirmer.confirm(&format!(
                        "No direct match found for {file_name}. Unzip as collection and organize individually?"
                    )) {
                        println!("{}", "Skipped".yellow());
                        return Ok(());
                    }
                    (parent.join(&bundle.name), true)
                }
            },
        };

        if self.config.dryrun {
            println!("Would extract {file_name} to {}", destination.display());
            return Ok(());
        }

        if destination.is_dir() {
            if !(self.config.all
                || self
                    .confirmer
                    .confirm(&format!("Destination {} already exists, replace it?", destination.display())))
            {
                println!("{}", "Skipped".yellow());
                return Ok(());
            }
            fs::remove_dir_all(&destination)
                .with_context(|| format!("Failed to remove {}", destination.display()))?;
        }

        pipeline::extract_zip(&bundle.path, &destination)?;

        match library.kind {
            MediaKind::Series => self.organize_series_folder(&destination)?,
            MediaKind::Movie if as_collection => {
                println!(
                    "{} {}",
                    "Processing collection folder:".cyan().bold(),
                    poster_tools::path_to_filename_string(&destination)
                );
                self.organize_collection_folder(&destination, catalog)?;
            }
            MediaKind::Movie => self.organize_movie_folder(&destination, catalog)?,
        }

        // Destination files are in place; only now may the bundle leave the source folder.
        if self.config.all || self.confirmer.confirm("Move zip file to archive folder?") {
            let archived = pipeline::archive_bundle(&bundle.path, &self.poster_dir)?;
            if self.config.verbose {
                println!("Archived bundle to {}", archived.display());
            }
        }

        Ok(())
    }

    /// Organize each poster file in a movie folder into `<title>/poster.<ext>`.
    fn organize_movie_folder(&mut self, folder: &Path, catalog: &[CatalogEntry]) -> Result<()> {
        let titles: Vec<&str> = catalog.iter().map(|entry| entry.title.as_str()).collect();
        for file_path in Self::files_in(folder)? {
            let file_name = poster_tools::path_to_filename_string(&file_path);
            let (stem, _) = get_normalized_file_name_and_extension(&file_path)?;

            // Collection posters organize under their own name without matching
            let forced = self.config.force || stem.contains("Collection");
            let best = if forced { None } else { find_best_match(&stem, &titles) };
            let outcome = planner::plan_movie_poster(folder, &file_name, &stem, best.as_ref(), forced, |best| {
                self.confirmer.confirm_match(&file_name, &best.candidate, best.score)
            });

            match outcome {
                PlanOutcome::Planned(plan) => self.execute_plan(&plan)?,
                PlanOutcome::Unmatched { query } => print_warning!("No match found for {query}"),
                PlanOutcome::Skipped => println!("{}", format!("Skipped {file_name}").yellow()),
            }
        }
        Ok(())
    }

    /// Rename series posters to the SeasonNN / poster naming convention.
    fn organize_series_folder(&mut self, folder: &Path) -> Result<()> {
        for file_path in Self::files_in(folder)? {
            let file_name = poster_tools::path_to_filename_string(&file_path);
            let plan = planner::plan_series_file(folder, &file_name);
            self.execute_plan(&plan)?;
        }
        Ok(())
    }

    /// Match every poster inside a collection bundle to its own title folder.
    fn organize_collection_folder(&mut self, folder: &Path, catalog: &[CatalogEntry]) -> Result<()> {
        let titles: Vec<&str> = catalog.iter().map(|entry| entry.title.as_str()).collect();
        let mut unmatched: Vec<String> = Vec::new();

        for file_path in Self::files_in(folder)? {
            let file_name = poster_tools::path_to_filename_string(&file_path);
            let (stem, _) = get_normalized_file_name_and_extension(&file_path)?;

            let best = find_best_match(&stem, &titles);
            let outcome =
                planner::plan_movie_poster(folder, &file_name, &stem, best.as_ref(), self.config.force, |best| {
                    self.confirmer.confirm_match(&file_name, &best.candidate, best.score)
                });

            match outcome {
                PlanOutcome::Planned(plan) => self.execute_plan(&plan)?,
                PlanOutcome::Unmatched { .. } => {
                    if self
                        .confirmer
                        .confirm(&format!("No match found for poster file {file_name}. Force rename?"))
                    {
                        let plan = planner::plan_movie_file(folder, &file_name, &stem);
                        self.execute_plan(&plan)?;
                    } else {
                        unmatched.push(file_name);
                    }
                }
                PlanOutcome::Skipped => println!("{}", format!("Skipped {file_name}").yellow()),
            }
        }

        if !unmatched.is_empty() {
            print_warning!(
                "{} unmatched file(s) left in {} for manual organization:",
                unmatched.len(),
                folder.display()
            );
            for name in unmatched {
                println!("  - {name}");
            }
        }
        Ok(())
    }

    /// Re-organize existing poster folders without a fresh archive.
    fn sync_poster_folders(&mut self, library: &Library, catalog: &[CatalogEntry], folders: &[PathBuf]) -> Result<()> {
        match library.kind {
            MediaKind::Movie => {
                for folder in folders {
                    if Self::files_in(folder)?.is_empty() {
                        continue;
                    }
                    if self.config.all
                        || self
                            .confirmer
                            .confirm(&format!("Process folder \"{}\"?", folder.display()))
                    {
                        self.organize_movie_folder(folder, catalog)?;
                    }
                }
            }
            MediaKind::Series => {
                for folder in folders {
                    if !Self::has_file_with_stem(folder, "poster")? {
                        self.organize_series_folder(folder)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Match a single poster folder to a media title and rename it.
    fn sync_movie_folder(&mut self, folder: &Path, catalog: &[CatalogEntry]) -> Result<()> {
        if Self::entries_in(folder)?.len() > 1 {
            println!("{} {}", "Organizing complex folder:".cyan().bold(), folder.display());
            return self.organize_movie_folder(folder, catalog);
        }

        let titles: Vec<&str> = catalog.iter().map(|entry| entry.title.as_str()).collect();
        let folder_name = poster_tools::get_normalized_dir_name(folder)?;
        let Some(best) = find_best_match(&folder_name, &titles).filter(|best| best.score >= SYNC_MATCH_CUTOFF) else {
            print_warning!("No match found for {folder_name}");
            return Ok(());
        };

        if !self.confirmer.confirm(&format!(
            "Matched folder {folder_name} to movie {} [score: {}], proceed?",
            best.candidate, best.score
        )) {
            println!("{}", "Skipped".yellow());
            return Ok(());
        }

        let new_path = folder.with_file_name(&best.candidate);
        if new_path.exists() {
            print_error!("Target directory {} already exists, skipping rename", new_path.display());
            return Ok(());
        }
        show_diff(&folder_name, &best.candidate);
        if !self.config.dryrun {
            fs::rename(folder, &new_path)
                .with_context(|| format!("Failed to rename {} to {}", folder.display(), new_path.display()))?;
        }
        Ok(())
    }

    /// Find poster subfolders that match no media title and offer to sync them.
    fn process_unlinked(&mut self, library: &Library, catalog: &[CatalogEntry], folders: &[PathBuf]) -> Result<()> {
        if library.kind != MediaKind::Movie {
            print_warning!("Unlinked processing only supports movie libraries");
            return Ok(());
        }

        let mut unlinked: Vec<PathBuf> = Vec::new();
        for folder in folders {
            if folder.ends_with("Custom") {
                continue;
            }
            for entry_path in Self::entries_in(folder)? {
                if entry_path.is_file() {
                    // Loose files at the root mean the folder itself still needs organizing
                    if !unlinked.contains(folder) {
                        unlinked.push(folder.clone());
                    }
                    continue;
                }
                let name = poster_tools::get_normalized_dir_name(&entry_path)?;
                if name == "Custom" || name.contains("Collection") {
                    continue;
                }
                let has_posters = !Self::files_in(&entry_path)?.is_empty();
                let normalized = normalize(&name);
                let linked = catalog.iter().any(|entry| entry.normalized_title == normalized);
                if has_posters && !linked && !unlinked.contains(&entry_path) {
                    unlinked.push(entry_path);
                }
            }
        }

        if unlinked.is_empty() {
            println!("{}", "No unlinked folders found".green());
            return Ok(());
        }
        println!("{}", format!("{} unlinked folder(s) found", unlinked.len()).yellow().bold());
        if !self.confirmer.confirm("Start processing them?") {
            return Ok(());
        }
        for folder in unlinked {
            self.sync_movie_folder(&folder, catalog)?;
        }
        Ok(())
    }

    /// Hard link organized poster files into every media folder of the entry.
    fn copy_posters(&mut self, folder: &Path, catalog: &[CatalogEntry]) -> Result<()> {
        let media_name = poster_tools::get_normalized_dir_name(folder)?;
        let Some(entry) = catalog.iter().find(|entry| entry.title == media_name) else {
            return Ok(());
        };
        let poster_files = Self::files_in(folder)?;
        if poster_files.is_empty() {
            return Ok(());
        }

        let targets_display = entry.storage_paths.iter().map(|path| path.display().to_string()).join(", ");
        if !(self.config.all
            || self
                .confirmer
                .confirm(&format!("Hardlink posters from [{media_name}] to [{targets_display}]?")))
        {
            return Ok(());
        }

        let mut replace_files = false;
        for poster in &poster_files {
            let link_name = Self::media_poster_name(&poster_tools::path_to_filename_string(poster));
            for media_root in &entry.storage_paths {
                let target = media_root.join(&entry.title).join(&link_name);
                if self.config.dryrun {
                    println!("Would link {} to {}", poster.display(), target.display());
                    continue;
                }
                if target.exists() {
                    if !(replace_files || self.config.all || self.confirmer.confirm("Replace existing files?")) {
                        print_warning!("Skipping existing file: {}", target.display());
                        continue;
                    }
                    replace_files = true;
                    fs::remove_file(&target).with_context(|| format!("Failed to remove {}", target.display()))?;
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                fs::hard_link(poster, &target).with_context(|| {
                    format!("Failed to hard link {} to {}", poster.display(), target.display())
                })?;
            }
        }
        Ok(())
    }

    /// Poster file name as media managers expect it inside the media folder.
    /// Season00 is the specials slot; other seasons get a lowercase poster suffix.
    fn media_poster_name(file_name: &str) -> String {
        let path = Path::new(file_name);
        let stem = poster_tools::path_to_file_stem_string(path);
        let extension = poster_tools::path_to_file_extension_string(path);
        if stem == "Season00" {
            return format!("season-specials-poster.{extension}");
        }
        if stem.starts_with("Season") {
            return format!("{}-poster.{extension}", stem.to_lowercase());
        }
        file_name.to_string()
    }

    /// Execute a single organization plan, honouring dry run and conflicts.
    fn execute_plan(&mut self, plan: &OrganizationPlan) -> Result<()> {
        if plan.action == PlanAction::Skip {
            if self.config.verbose {
                println!("Already organized: {}", plan.source.display());
            }
            return Ok(());
        }

        let parent = plan.source.parent().unwrap_or_else(|| Path::new(""));
        let old_display = poster_tools::path_to_filename_string(&plan.source);
        let new_display = poster_tools::get_relative_path_or_filename(&plan.destination, parent);
        show_diff(&old_display, &new_display);
        if self.config.dryrun {
            return Ok(());
        }

        if plan.destination.exists() {
            if !(self.config.all
                || self
                    .confirmer
                    .confirm(&format!("Replace existing file {}?", plan.destination.display())))
            {
                print_warning!("Skipping existing file: {}", plan.destination.display());
                return Ok(());
            }
            fs::remove_file(&plan.destination)
                .with_context(|| format!("Failed to remove {}", plan.destination.display()))?;
        }

        if let Some(directory) = plan.destination.parent() {
            fs::create_dir_all(directory).with_context(|| format!("Failed to create {}", directory.display()))?;
        }
        fs::rename(&plan.source, &plan.destination).with_context(|| {
            format!(
                "Failed to move {} to {}",
                plan.source.display(),
                plan.destination.display()
            )
        })?;
        Ok(())
    }

    /// Non-hidden files directly inside the folder, sorted by name.
    fn files_in(folder: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(folder).with_context(|| format!("Failed to read {}", folder.display()))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name = poster_tools::os_str_to_string(&entry.file_name());
                if !poster_tools::is_hidden_name(&name) {
                    files.push(entry.path());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// All non-hidden entries directly inside the folder, sorted by name.
    fn entries_in(folder: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(folder).with_context(|| format!("Failed to read {}", folder.display()))? {
            let entry = entry?;
            let name = poster_tools::os_str_to_string(&entry.file_name());
            if !poster_tools::is_hidden_name(&name) {
                entries.push(entry.path());
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Check if the folder contains a file with the given stem, any extension.
    fn has_file_with_stem(folder: &Path, stem: &str) -> Result<bool> {
        Ok(Self::files_in(folder)?
            .iter()
            .any(|path| poster_tools::path_to_file_stem_string(path) == stem))
    }
}

#[cfg(test)]
mod organize_tests {
    use super::*;

    use std::collections::VecDeque;
    use std::fs::File;
    use std::io::Write;

    use tempfile::tempdir;

    use crate::config::DEFAULT_POSTER_DIR;
    use crate::prompt::Decision;

    struct ScriptedConfirmer {
        decisions: VecDeque<Decision>,
        answers: VecDeque<bool>,
    }

    impl Confirmer for ScriptedConfirmer {
        fn confirm_match(&mut self, _item: &str, _candidate: &str, _score: u8) -> Decision {
            self.decisions.pop_front().unwrap_or(Decision::Decline)
        }

        fn confirm(&mut self, _message: &str) -> bool {
            self.answers.pop_front().unwrap_or(false)
        }
    }

    fn make_config() -> Config {
        Config {
            action: Action::New,
            all: false,
            copy: false,
            dryrun: false,
            filter: None,
            force: false,
            libraries: Vec::new(),
            library_names: Vec::new(),
            poster_dir: PathBuf::from(DEFAULT_POSTER_DIR),
            unlinked: false,
            verbose: false,
        }
    }

    fn make_organizer(poster_dir: &Path, decisions: &[Decision], answers: &[bool]) -> Organizer {
        Organizer {
            config: make_config(),
            poster_dir: poster_dir.to_path_buf(),
            confirmer: Box::new(ScriptedConfirmer {
                decisions: decisions.iter().copied().collect(),
                answers: answers.iter().copied().collect(),
            }),
        }
    }

    fn make_entry(title: &str, kind: MediaKind) -> CatalogEntry {
        CatalogEntry {
            title: title.to_string(),
            kind,
            normalized_title: normalize(title),
            storage_paths: Vec::new(),
        }
    }

    fn write_zip(path: &Path, entry_names: &[&str]) {
        let file = File::create(path).expect("should create zip file");
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for name in entry_names {
            writer.start_file(*name, options).expect("should start zip entry");
            writer.write_all(b"not really an image").expect("should write zip entry");
        }
        writer.finish().expect("should finish zip");
    }

    #[test]
    fn series_folder_renames_posters() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("Season 1.jpg")).expect("should create file");
        File::create(folder.join("Specials.png")).expect("should create file");
        File::create(folder.join("Cool Show.jpg")).expect("should create file");

        let mut organizer = make_organizer(folder, &[], &[]);
        organizer.organize_series_folder(folder).expect("should organize");

        assert!(folder.join("Season01.jpg").is_file());
        assert!(folder.join("Season00.png").is_file());
        assert!(folder.join("poster.jpg").is_file());
        assert!(!folder.join("Season 1.jpg").exists());
        assert!(!folder.join("Specials.png").exists());
        assert!(!folder.join("Cool Show.jpg").exists());
    }

    #[test]
    fn movie_folder_accepted_match_moves_into_title_subfolder() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("The Matrix (1999).jpg")).expect("should create file");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        let mut organizer = make_organizer(folder, &[Decision::Accept], &[]);
        organizer.organize_movie_folder(folder, &catalog).expect("should organize");

        assert!(folder.join("The Matrix/poster.jpg").is_file());
        assert!(!folder.join("The Matrix (1999).jpg").exists());
    }

    #[test]
    fn movie_folder_declined_match_leaves_file() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("The Matrix (1999).jpg")).expect("should create file");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        let mut organizer = make_organizer(folder, &[Decision::Decline], &[]);
        organizer.organize_movie_folder(folder, &catalog).expect("should organize");

        assert!(folder.join("The Matrix (1999).jpg").is_file());
        assert!(!folder.join("The Matrix").exists());
    }

    #[test]
    fn movie_folder_force_flag_uses_source_name() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("Custom Fan Art.jpg")).expect("should create file");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        let mut organizer = make_organizer(folder, &[], &[]);
        organizer.config.force = true;
        organizer.organize_movie_folder(folder, &catalog).expect("should organize");

        assert!(folder.join("Custom Fan Art/poster.jpg").is_file());
    }

    #[test]
    fn collection_poster_skips_matching() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("James Bond Collection.jpg")).expect("should create file");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        // No scripted decisions: a Collection poster must not consult the confirmer
        let mut organizer = make_organizer(folder, &[], &[]);
        organizer.organize_movie_folder(folder, &catalog).expect("should organize");

        assert!(folder.join("James Bond Collection/poster.jpg").is_file());
    }

    #[test]
    fn collection_folder_unmatched_file_stays_without_force() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("IMG_0001.jpg")).expect("should create file");

        // Empty catalog: nothing can match, the file surfaces as unmatched
        let mut organizer = make_organizer(folder, &[], &[false]);
        organizer.organize_collection_folder(folder, &[]).expect("should organize");

        assert!(folder.join("IMG_0001.jpg").is_file());
        assert!(!folder.join("IMG_0001").exists());
    }

    #[test]
    fn collection_folder_unmatched_file_forced_into_own_folder() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("IMG_0001.jpg")).expect("should create file");

        let mut organizer = make_organizer(folder, &[], &[true]);
        organizer.organize_collection_folder(folder, &[]).expect("should organize");

        assert!(folder.join("IMG_0001/poster.jpg").is_file());
    }

    #[test]
    fn bundle_with_strong_movie_match_extracts_directly() {
        // End to end: Dune_Part_Two_set_by_fan123.zip cleans to the query
        // "Dune Part Two", matches the catalog entry with score 100, extracts
        // into the matched folder, and the bundle lands in Archives.
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        write_zip(&poster_dir.join("Dune_Part_Two_set_by_fan123.zip"), &["Dune Part Two.jpg"]);
        let catalog = vec![make_entry("Dune: Part Two", MediaKind::Movie)];
        let library = Library {
            title: "Movies".to_string(),
            kind: MediaKind::Movie,
            locations: Vec::new(),
        };

        let posters = pipeline::find_posters(&[poster_dir.clone()], false).expect("should scan");
        assert_eq!(posters.bundles.len(), 1);
        assert_eq!(posters.bundles[0].name, "Dune Part Two set by fan123");

        // Answers: proceed with the match, then archive the bundle
        let mut organizer = make_organizer(&poster_dir, &[Decision::Accept], &[true, true]);
        organizer
            .process_bundle(&library, &catalog, &posters.bundles[0])
            .expect("should process bundle");

        let extracted = poster_dir.join("Dune: Part Two");
        assert!(extracted.join("Dune: Part Two/poster.jpg").is_file());
        assert!(poster_dir.join("Archives/Dune Part Two set by fan123.zip").is_file());
        assert!(!poster_dir.join("Dune Part Two set by fan123.zip").exists());
    }

    #[test]
    fn bundle_with_weak_match_organizes_as_collection() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        write_zip(
            &poster_dir.join("Best_of_Nolan.zip"),
            &["Inception.jpg", "Oppenheimer.jpg"],
        );
        let catalog = vec![
            make_entry("Inception", MediaKind::Movie),
            make_entry("Oppenheimer", MediaKind::Movie),
        ];
        let library = Library {
            title: "Movies".to_string(),
            kind: MediaKind::Movie,
            locations: Vec::new(),
        };

        let posters = pipeline::find_posters(&[poster_dir.clone()], false).expect("should scan");

        // Answers: unzip as collection, then archive; decisions accept both files
        let mut organizer = make_organizer(&poster_dir, &[Decision::Accept, Decision::Accept], &[true, true]);
        organizer
            .process_bundle(&library, &catalog, &posters.bundles[0])
            .expect("should process bundle");

        let collection = poster_dir.join("Best of Nolan");
        assert!(collection.join("Inception/poster.jpg").is_file());
        assert!(collection.join("Oppenheimer/poster.jpg").is_file());
        assert!(poster_dir.join("Archives/Best of Nolan.zip").is_file());
    }

    #[test]
    fn broken_bundle_does_not_stop_the_rest() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        fs::write(poster_dir.join("AAA Broken.zip"), b"not a zip archive").expect("should write file");
        write_zip(&poster_dir.join("The Matrix.zip"), &["The Matrix.jpg"]);
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];
        let library = Library {
            title: "Movies".to_string(),
            kind: MediaKind::Movie,
            locations: Vec::new(),
        };

        let posters = pipeline::find_posters(&[poster_dir.clone()], false).expect("should scan");
        assert_eq!(posters.bundles.len(), 2);

        // Broken bundle: no direct match -> unzip as collection (fails inside).
        // Valid bundle: proceed with the match, accept the file, archive.
        let mut organizer = make_organizer(&poster_dir, &[Decision::Accept], &[true, true, true]);
        organizer.process_bundles(&library, &catalog, &posters.bundles);

        // The broken bundle stays put, the valid one is fully processed
        assert!(poster_dir.join("AAA Broken.zip").is_file());
        assert!(poster_dir.join("The Matrix/The Matrix/poster.jpg").is_file());
        assert!(poster_dir.join("Archives/The Matrix.zip").is_file());
    }

    #[test]
    fn sync_renames_single_entry_folder_to_match() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        let folder = poster_dir.join("The Matrix Posters");
        fs::create_dir(&folder).expect("should create dir");
        File::create(folder.join("poster.jpg")).expect("should create file");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        let mut organizer = make_organizer(&poster_dir, &[], &[true]);
        organizer.sync_movie_folder(&folder, &catalog).expect("should sync");

        assert!(poster_dir.join("The Matrix/poster.jpg").is_file());
        assert!(!folder.exists());
    }

    #[test]
    fn sync_does_not_replace_existing_target_folder() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        let folder = poster_dir.join("The Matrix Posters");
        fs::create_dir(&folder).expect("should create dir");
        File::create(folder.join("poster.jpg")).expect("should create file");
        fs::create_dir(poster_dir.join("The Matrix")).expect("should create dir");
        let catalog = vec![make_entry("The Matrix", MediaKind::Movie)];

        let mut organizer = make_organizer(&poster_dir, &[], &[true]);
        organizer.sync_movie_folder(&folder, &catalog).expect("should sync");

        // Conflict: the folder keeps its old name
        assert!(folder.join("poster.jpg").is_file());
    }

    #[test]
    fn unlinked_folders_are_found_and_synced() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        let root = poster_dir.join("Movies - Posters");
        fs::create_dir(&root).expect("should create dir");
        fs::create_dir(root.join("Inception Posters")).expect("should create dir");
        File::create(root.join("Inception Posters/poster.jpg")).expect("should create file");
        fs::create_dir(root.join("The Matrix")).expect("should create dir");
        File::create(root.join("The Matrix/poster.jpg")).expect("should create file");
        fs::create_dir(root.join("Custom")).expect("should create dir");
        let catalog = vec![
            make_entry("Inception", MediaKind::Movie),
            make_entry("The Matrix", MediaKind::Movie),
        ];
        let library = Library {
            title: "Movies".to_string(),
            kind: MediaKind::Movie,
            locations: Vec::new(),
        };

        // Answers: start processing, then confirm the rename
        let mut organizer = make_organizer(&poster_dir, &[], &[true, true]);
        organizer
            .process_unlinked(&library, &catalog, &[root.clone()])
            .expect("should process");

        assert!(root.join("Inception/poster.jpg").is_file());
        assert!(!root.join("Inception Posters").exists());
        // Linked folder untouched
        assert!(root.join("The Matrix/poster.jpg").is_file());
    }

    #[test]
    fn copy_posters_hard_links_into_media_folders() {
        let dir = tempdir().expect("should create tempdir");
        let media_root = dir.path().join("media");
        fs::create_dir(&media_root).expect("should create dir");
        let folder = dir.path().join("Cool Show");
        fs::create_dir(&folder).expect("should create dir");
        File::create(folder.join("poster.jpg")).expect("should create file");
        File::create(folder.join("Season00.jpg")).expect("should create file");
        File::create(folder.join("Season01.jpg")).expect("should create file");

        let mut entry = make_entry("Cool Show", MediaKind::Series);
        entry.storage_paths = vec![media_root.clone()];

        let mut organizer = make_organizer(dir.path(), &[], &[true]);
        organizer.copy_posters(&folder, &[entry]).expect("should link");

        assert!(media_root.join("Cool Show/poster.jpg").is_file());
        assert!(media_root.join("Cool Show/season-specials-poster.jpg").is_file());
        assert!(media_root.join("Cool Show/season01-poster.jpg").is_file());
    }

    #[test]
    fn copy_posters_skips_existing_files_without_confirmation() {
        let dir = tempdir().expect("should create tempdir");
        let media_root = dir.path().join("media");
        fs::create_dir_all(media_root.join("Cool Show")).expect("should create dir");
        fs::write(media_root.join("Cool Show/poster.jpg"), b"existing").expect("should write file");
        let folder = dir.path().join("Cool Show");
        fs::create_dir(&folder).expect("should create dir");
        File::create(folder.join("poster.jpg")).expect("should create file");

        let mut entry = make_entry("Cool Show", MediaKind::Series);
        entry.storage_paths = vec![media_root.clone()];

        // Hardlink prompt: yes; replace prompt: no
        let mut organizer = make_organizer(dir.path(), &[], &[true, false]);
        organizer.copy_posters(&folder, &[entry]).expect("should link");

        let content = fs::read(media_root.join("Cool Show/poster.jpg")).expect("should read file");
        assert_eq!(content, b"existing");
    }

    #[test]
    fn media_poster_names_follow_convention() {
        assert_eq!(Organizer::media_poster_name("Season00.jpg"), "season-specials-poster.jpg");
        assert_eq!(Organizer::media_poster_name("Season01.jpg"), "season01-poster.jpg");
        assert_eq!(Organizer::media_poster_name("Season12.png"), "season12-poster.png");
        assert_eq!(Organizer::media_poster_name("poster.jpg"), "poster.jpg");
    }

    #[test]
    fn filter_keeps_only_exact_matches_when_present() {
        let folders = vec![
            PathBuf::from("/p/Marvel Avengers"),
            PathBuf::from("/p/Avengers Tower"),
            PathBuf::from("/p/DC"),
        ];
        let filtered = Organizer::filter_folders(folders, "Marvel Avengers");
        assert_eq!(filtered, vec![PathBuf::from("/p/Marvel Avengers")]);
    }

    #[test]
    fn filter_keeps_close_matches_when_no_exact_match() {
        let folders = vec![PathBuf::from("/p/Avengers Tower"), PathBuf::from("/p/DC")];
        let filtered = Organizer::filter_folders(folders, "Marvel Avengers");
        assert_eq!(filtered, vec![PathBuf::from("/p/Avengers Tower")]);
    }

    #[test]
    fn discovers_poster_roots_for_library() {
        let dir = tempdir().expect("should create tempdir");
        let poster_dir = dir.path().to_path_buf();
        fs::create_dir(poster_dir.join("Movies - Posters")).expect("should create dir");
        fs::create_dir(poster_dir.join("TV Shows")).expect("should create dir");
        fs::create_dir(poster_dir.join("Archives")).expect("should create dir");

        let organizer = make_organizer(&poster_dir, &[], &[]);
        let roots = organizer.discover_poster_roots("Movies").expect("should discover");

        assert_eq!(roots, vec![poster_dir.join("Movies - Posters")]);
    }

    #[test]
    fn dryrun_plans_without_touching_files() {
        let dir = tempdir().expect("should create tempdir");
        let folder = dir.path();
        File::create(folder.join("Season 1.jpg")).expect("should create file");

        let mut organizer = make_organizer(folder, &[], &[]);
        organizer.config.dryrun = true;
        organizer.organize_series_folder(folder).expect("should organize");

        assert!(folder.join("Season 1.jpg").is_file());
        assert!(!folder.join("Season01.jpg").exists());
    }
}
