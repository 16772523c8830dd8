use serde::{Deserialize, Serialize};

/// Which hit a scan reports when several positions in the window match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The match closest to the end of the series.
    #[default]
    MostRecent,
    /// The match closest to the start of the scanned range.
    Earliest,
}
