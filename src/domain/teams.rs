//! Team abbreviation normalization
//!
//! The provider uses a few legacy or alternate abbreviations that differ from
//! the ones stored in `teams`. Lookups by abbreviation always go through
//! [`normalize_abbreviation`] first.

/// Maps a provider abbreviation to its canonical form
///
/// Unknown abbreviations are upper-cased and returned unchanged.
///
/// # Examples
///
/// ```
/// use courtsync::domain::teams::normalize_abbreviation;
///
/// assert_eq!(normalize_abbreviation("OKL"), "OKC");
/// assert_eq!(normalize_abbreviation("bro"), "BKN");
/// assert_eq!(normalize_abbreviation("LAL"), "LAL");
/// ```
pub fn normalize_abbreviation(abbreviation: &str) -> String {
    let upper = abbreviation.trim().to_ascii_uppercase();
    let canonical = match upper.as_str() {
        "OKL" => "OKC",
        "BRO" => "BKN",
        "PHO" => "PHX",
        "GS" => "GSW",
        "NY" => "NYK",
        "SA" => "SAS",
        "NO" | "NOR" => "NOP",
        "UTAH" => "UTA",
        "WSH" => "WAS",
        _ => return upper,
    };
    canonical.to_string()
}
