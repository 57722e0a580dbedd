//! Regions the site offers streaming-availability data for.
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    IE,
    GB,
    US,
    CA,
    AU,
    NZ,
    DE,
    FR,
    ES,
    IT,
    NL,
    RO,
}

pub const FALLBACK_REGION: Region = Region::IE;

pub const ALL_REGIONS: [Region; 12] = [
    Region::IE,
    Region::GB,
    Region::US,
    Region::CA,
    Region::AU,
    Region::NZ,
    Region::DE,
    Region::FR,
    Region::ES,
    Region::IT,
    Region::NL,
    Region::RO,
];

impl Region {
    pub fn code(&self) -> &'static str {
        match self {
            Region::IE => "IE",
            Region::GB => "GB",
            Region::US => "US",
            Region::CA => "CA",
            Region::AU => "AU",
            Region::NZ => "NZ",
            Region::DE => "DE",
            Region::FR => "FR",
            Region::ES => "ES",
            Region::IT => "IT",
            Region::NL => "NL",
            Region::RO => "RO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::IE => "Ireland",
            Region::GB => "United Kingdom",
            Region::US => "United States",
            Region::CA => "Canada",
            Region::AU => "Australia",
            Region::NZ => "New Zealand",
            Region::DE => "Germany",
            Region::FR => "France",
            Region::ES => "Spain",
            Region::IT => "Italy",
            Region::NL => "Netherlands",
            Region::RO => "Romania",
        }
    }

    /// Case-insensitive lookup in the allow-list.
    pub fn parse(input: &str) -> Option<Region> {
        let wanted = input.trim();
        ALL_REGIONS
            .iter()
            .copied()
            .find(|r| r.code().eq_ignore_ascii_case(wanted))
    }

    /// Validates a user-supplied region, replacing anything unknown or missing
    /// with `default`.
    pub fn resolve(input: Option<&str>, default: Region) -> Region {
        input.and_then(Region::parse).unwrap_or(default)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes_case_insensitively() {
        assert_eq!(Region::parse("US"), Some(Region::US));
        assert_eq!(Region::parse("gb"), Some(Region::GB));
        assert_eq!(Region::parse(" ro "), Some(Region::RO));
        assert_eq!(Region::parse("XX"), None);
        assert_eq!(Region::parse(""), None);
    }

    #[test]
    fn unknown_or_missing_region_falls_back_to_default() {
        assert_eq!(Region::resolve(Some("ZZ"), Region::DE), Region::DE);
        assert_eq!(Region::resolve(None, Region::FR), Region::FR);
        assert_eq!(Region::resolve(Some("ca"), Region::FR), Region::CA);
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = ALL_REGIONS.iter().map(|r| r.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), ALL_REGIONS.len());
    }
}
