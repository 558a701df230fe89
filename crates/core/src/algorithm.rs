use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::SortVizError;

/// Sorting algorithm family whose trace is being played back.
///
/// The identifier selects the classification rules applied to each snapshot
/// transition and which trace source command is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bubble,
    Merge,
    Quick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bubble, Algorithm::Merge, Algorithm::Quick];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }

    /// Human-readable label, as shown in the renderer's menu.
    pub fn display_name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Merge => "Merge Sort",
            Algorithm::Quick => "Quick Sort",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SortVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let stem = lowered.strip_suffix("_sort").unwrap_or(&lowered);
        let stem = stem.strip_suffix("sort").unwrap_or(stem).trim_end_matches(['-', ' ']);
        match stem {
            "bubble" => Ok(Algorithm::Bubble),
            "merge" => Ok(Algorithm::Merge),
            "quick" => Ok(Algorithm::Quick),
            _ => Err(SortVizError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_names() {
        assert_eq!("bubble".parse::<Algorithm>().unwrap(), Algorithm::Bubble);
        assert_eq!("Merge".parse::<Algorithm>().unwrap(), Algorithm::Merge);
        assert_eq!("quick_sort".parse::<Algorithm>().unwrap(), Algorithm::Quick);
        assert_eq!("Quick Sort".parse::<Algorithm>().unwrap(), Algorithm::Quick);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "heap".parse::<Algorithm>().unwrap_err();
        assert!(format!("{err}").contains("heap"));
    }

    #[test]
    fn serialises_lowercase() {
        let json = serde_json::to_string(&Algorithm::Quick).unwrap();
        assert_eq!(json, "\"quick\"");
    }
}
