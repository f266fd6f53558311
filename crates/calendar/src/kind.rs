//! Precipitation-family detection.

/// Variable names exempt from leap-day folding.
pub const PRECIPITATION_VARIABLES: [&str; 3] = ["pr", "prsn", "prec"];

/// How a variable's leap day is mapped onto the 365-band record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Precipitation fluxes: the leap day keeps its own band and the last
    /// source day of the year is dropped.
    Precipitation,
    /// Every other variable: the leap day is folded into February.
    Other,
}

impl VariableKind {
    /// Classifies a NetCDF variable name. Matching is exact and
    /// case-sensitive.
    pub fn from_name(name: &str) -> Self {
        if PRECIPITATION_VARIABLES.contains(&name) {
            Self::Precipitation
        } else {
            Self::Other
        }
    }

    /// Returns `true` for [`VariableKind::Precipitation`].
    pub fn is_precipitation(self) -> bool {
        self == Self::Precipitation
    }
}
