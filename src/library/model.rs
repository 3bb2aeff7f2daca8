use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One playable entry in the generated player config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// `<genre id>-<n>`, numbered from 1 in sorted filename order.
    pub id: String,
    /// `<folder name>/<file>` relative to the audio root.
    pub file_name: String,
    pub display_name: String,
    pub artist: String,
    /// `M:SS`
    pub duration: String,
    /// Only serialized when set.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreEntry {
    pub id: String,
    pub genre_name: String,
    pub album_cover: String,
    pub tracks: Vec<Track>,
}

/// Genre id -> genre entry. Keys serialize in ascending order.
pub type ConfigDocument = BTreeMap<String, GenreEntry>;
