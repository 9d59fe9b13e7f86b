//! Region code labels for the trending view

/// Regions offered in the settings view, with display names
pub const REGION_LABELS: &[(&str, &str)] = &[
    ("US", "United States"),
    ("IN", "India"),
    ("GB", "United Kingdom"),
    ("DE", "Germany"),
    ("FR", "France"),
    ("JP", "Japan"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("AE", "United Arab Emirates"),
];

/// Display name for a region code (case-insensitive)
pub fn region_name(code: &str) -> Option<&'static str> {
    let upper = code.to_ascii_uppercase();
    REGION_LABELS
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| *name)
}

/// Supported region codes in display order
pub fn supported_regions() -> Vec<&'static str> {
    REGION_LABELS.iter().map(|(code, _)| *code).collect()
}

/// Render `"{name} ({CODE})"`
///
/// Unknown codes use the code itself as the name; a missing or empty code
/// renders as `Unknown`.
///
/// # Examples
///
/// ```
/// use r2v_common::regions::format_region_label;
///
/// assert_eq!(format_region_label(Some("gb")), "United Kingdom (GB)");
/// assert_eq!(format_region_label(Some("NZ")), "NZ (NZ)");
/// assert_eq!(format_region_label(None), "Unknown");
/// ```
pub fn format_region_label(code: Option<&str>) -> String {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => "Unknown".to_string(),
        Some(code) => {
            let upper = code.to_uppercase();
            let name = region_name(&upper).unwrap_or(upper.as_str());
            format!("{} ({})", name, upper)
        }
    }
}
