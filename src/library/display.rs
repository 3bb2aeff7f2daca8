use once_cell::sync::Lazy;
use regex::Regex;

/// Removal rules, applied in order. Bracketed spans go first so the suffix
/// rules and the collapsing passes below see what they leave behind.
static NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Session / version notes: 【Live】, (v2), （完全版）
        r"(?i)【[^】]*】",
        r"(?i)\([^)]*\)",
        r"(?i)（[^）]*）",
        // Engineering suffixes left over from the mixing desk
        r"(?i)_Full_\d+_Mastered",
        r"(?i)_Kuri_Full_\d+",
        r"(?i)_demo\d*",
        r"(?i)_Demo_\d+",
        r"(?i)_piano_\d+",
        r"(?i)_\d+$",
        r"(?i)\(\d+\)$",
        r"(?i)-\d+LUFS",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\-]+").expect("static pattern"));
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Turn a filename stem into a title fit for the player UI.
///
/// Falls back to `stem` unchanged when every character would be stripped.
pub fn clean_display_name(stem: &str) -> String {
    let mut name = stem.to_string();

    for pattern in NOISE_PATTERNS.iter() {
        name = pattern.replace_all(&name, "").into_owned();
    }

    name = SEPARATOR_RUNS.replace_all(&name, " ").into_owned();
    name = WHITESPACE_RUNS.replace_all(&name, " ").into_owned();
    let name = name.trim();

    if name.is_empty() {
        stem.to_string()
    } else {
        name.to_string()
    }
}

/// Whether a cleaned display name carries one of the hit markers.
pub fn is_hit(display_name: &str, markers: &[String]) -> bool {
    let lower = display_name.to_lowercase();
    markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .any(|m| lower.contains(&m))
}
