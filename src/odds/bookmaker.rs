//! Bookmaker name resolution

/// Label used when neither the provider nor the directory knows the bookmaker
pub const UNKNOWN_BOOKMAKER: &str = "Unknown";

/// Known bookmaker ids of the data provider
pub const BOOKMAKERS: &[(u64, &str)] = &[
    (1, "10Bet"),
    (2, "bet365"),
    (5, "888Sport"),
    (9, "Betfair"),
    (16, "Unibet"),
    (20, "Pinnacle"),
    (22, "1xBet"),
    (23, "William Hill"),
    (28, "Bwin"),
    (29, "Betway"),
    (35, "Marathonbet"),
];

/// Resolve a display name: provider-supplied name, then directory, then
/// the unknown sentinel
pub fn resolve_name(bookmaker_id: u64, provided: Option<&str>) -> String {
    if let Some(name) = provided.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    BOOKMAKERS
        .iter()
        .find(|(id, _)| *id == bookmaker_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| UNKNOWN_BOOKMAKER.to_string())
}
