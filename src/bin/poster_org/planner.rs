//! Destination planning rules for poster files.
//!
//! Pure path computation and classification: the planner decides where a
//! poster should live and leaves the file operations and prompting policy to
//! the caller. Per item the flow is
//! `Unclassified -> Matched | Unmatched -> Planned | Skipped`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use poster_tools::matching::BestMatch;

use crate::prompt::Decision;

/// Movie matches scoring below this organize as multi-title collections.
///
/// Deliberately distinct from `discover::LIBRARY_FOLDER_THRESHOLD` even
/// though both are currently 70; the two cutoffs tune independently.
pub const COLLECTION_MATCH_THRESHOLD: u8 = 70;

/// Minimum score for renaming an existing folder to a media title in sync mode.
pub const SYNC_MATCH_CUTOFF: u8 = 70;

/// Matches a season number in a poster file name, e.g. "Season 1".
static RE_SEASON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bSeason\s*(\d+)").expect("Invalid season regex"));

/// What the file operation layer should do with a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Rename in place within the same folder.
    Rename,
    /// Create a per-title subfolder and move the file into it.
    MoveIntoSubfolder,
    /// Nothing to do, the source already matches its destination.
    Skip,
}

/// A single planned file operation, executed exactly once and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub action: PlanAction,
    pub season: Option<u32>,
}

/// Per-item planning outcome.
///
/// `Unmatched` is a valid result, not an error: the caller decides whether to
/// prompt, force, or skip. The planner never blocks or retries on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Planned(OrganizationPlan),
    Unmatched { query: String },
    Skipped,
}

/// Extract the season number encoded in a poster file name.
///
/// "Specials" maps to the reserved season zero slot.
#[must_use]
pub fn parse_season(file_name: &str) -> Option<u32> {
    if let Some(captures) = RE_SEASON.captures(file_name) {
        return captures.get(1)?.as_str().parse().ok();
    }
    file_name.contains("Specials").then_some(0)
}

/// Season poster file name: zero-padded to two digits, season zero is specials.
#[must_use]
pub fn season_file_name(season: u32, extension: &str) -> String {
    format!("Season{season:02}.{extension}")
}

/// Plan a single file inside a series poster folder.
///
/// Season posters rename to `SeasonNN.<ext>`, anything else is the main show
/// poster `poster.<ext>`. Already-organized files plan to a no-op.
#[must_use]
pub fn plan_series_file(folder: &Path, file_name: &str) -> OrganizationPlan {
    let extension = poster_tools::path_to_file_extension_string(Path::new(file_name));
    let season = parse_season(file_name);
    let destination_name = season.map_or_else(|| format!("poster.{extension}"), |number| season_file_name(number, &extension));

    let action = if file_name == destination_name {
        PlanAction::Skip
    } else {
        PlanAction::Rename
    };

    OrganizationPlan {
        source: folder.join(file_name),
        destination: folder.join(destination_name),
        action,
        season,
    }
}

/// Plan a movie poster into its own `<title>/poster.<ext>` subfolder.
#[must_use]
pub fn plan_movie_file(folder: &Path, file_name: &str, title: &str) -> OrganizationPlan {
    let extension = poster_tools::path_to_file_extension_string(Path::new(file_name));
    OrganizationPlan {
        source: folder.join(file_name),
        destination: folder.join(title).join(format!("poster.{extension}")),
        action: PlanAction::MoveIntoSubfolder,
        season: None,
    }
}

/// True when a movie-kind match is too weak for a single title and the
/// bundle should organize as a multi-title collection instead.
#[must_use]
pub const fn is_collection_match(score: u8) -> bool {
    score < COLLECTION_MATCH_THRESHOLD
}

/// Resolve a movie poster file to a plan.
///
/// `force` bypasses matching entirely and organizes under `fallback_title`
/// (the raw source name). Otherwise the injected `decide` callback settles
/// the match; no hard score cutoff applies here.
pub fn plan_movie_poster(
    folder: &Path,
    file_name: &str,
    fallback_title: &str,
    best: Option<&BestMatch>,
    force: bool,
    decide: impl FnOnce(&BestMatch) -> Decision,
) -> PlanOutcome {
    if force {
        return PlanOutcome::Planned(plan_movie_file(folder, file_name, fallback_title));
    }
    match best {
        None => PlanOutcome::Unmatched {
            query: fallback_title.to_string(),
        },
        Some(best) => match decide(best) {
            Decision::Accept => PlanOutcome::Planned(plan_movie_file(folder, file_name, &best.candidate)),
            Decision::Force => PlanOutcome::Planned(plan_movie_file(folder, file_name, fallback_title)),
            Decision::Decline => PlanOutcome::Skipped,
        },
    }
}
