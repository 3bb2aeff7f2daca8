use crate::config::ArtistSettings;

/// Infer the artist for a track from its original filename and genre.
///
/// Rules are checked in order against the lowercased filename and the first
/// marker found wins. Without a match the orchestra genre gets its own default
/// and everything else gets the catch-all artist.
pub fn resolve_artist(file_name: &str, genre_id: &str, settings: &ArtistSettings) -> String {
    let lower = file_name.to_lowercase();

    for rule in &settings.rules {
        let marker = rule.marker.to_lowercase();
        if !marker.is_empty() && lower.contains(&marker) {
            return rule.artist.clone();
        }
    }

    if genre_id == settings.orchestra_genre {
        settings.orchestra_default.clone()
    } else {
        settings.default_artist.clone()
    }
}
