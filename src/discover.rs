//! Poster root folder discovery for a library.

use crate::matching::partial_ratio;

/// Minimum partial-similarity score for a folder name to belong to a library.
///
/// Deliberately a separate constant from the planner's collection threshold
/// even though both are currently 70: the two cutoffs tune independently.
pub const LIBRARY_FOLDER_THRESHOLD: u8 = 70;

/// Find the candidate folders that belong to the given library.
///
/// Folder names are compared raw, without normalization, since poster folders
/// deliberately carry extra words ("Movies - Posters" for a "Movies" library).
/// Result order preserves candidate order. A score of exactly
/// [`LIBRARY_FOLDER_THRESHOLD`] does not qualify. Side-effect-free: the caller
/// supplies the directory listing.
pub fn discover_library_folders<S: AsRef<str>>(library_title: &str, candidate_folder_names: &[S]) -> Vec<String> {
    candidate_folder_names
        .iter()
        .map(std::convert::AsRef::as_ref)
        .filter(|name| partial_ratio(library_title, name) > LIBRARY_FOLDER_THRESHOLD)
        .map(std::string::ToString::to_string)
        .collect()
}
