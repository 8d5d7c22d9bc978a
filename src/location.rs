//! File-name based location lookup.
//!
//! Exports are named after the city mailing list they came from
//! (`Berlin_Export.csv`, `newsletter-muenchen.csv`, ...). The first known
//! keyword found in the lower-cased name decides the location.

use crate::models::Location;

/// A known city and the file name fragments that identify it
struct KnownLocation {
    keywords: &'static [&'static str],
    country_code: &'static str,
    state_code: &'static str,
    city: &'static str,
    countries_of_interest: &'static str,
}

/// Checked top to bottom; the first hit wins even if a later keyword is longer.
const KNOWN_LOCATIONS: &[KnownLocation] = &[
    KnownLocation {
        keywords: &["berlin"],
        country_code: "DE",
        state_code: "BE",
        city: "Berlin",
        countries_of_interest: "DE",
    },
    KnownLocation {
        keywords: &["dresden"],
        country_code: "DE",
        state_code: "SN",
        city: "Dresden",
        countries_of_interest: "DE",
    },
    KnownLocation {
        keywords: &["munich", "munchen"],
        country_code: "DE",
        state_code: "BY",
        city: "Munich",
        countries_of_interest: "DE",
    },
    KnownLocation {
        keywords: &["nurenberg", "nuernberg", "nuremberg"],
        country_code: "DE",
        state_code: "BY",
        city: "Nuremberg",
        countries_of_interest: "DE",
    },
    KnownLocation {
        keywords: &["london"],
        country_code: "GB",
        state_code: "ENG",
        city: "London",
        countries_of_interest: "GB",
    },
];

/// Resolve the location for an export file name.
///
/// Returns an all-empty [`Location`] when no keyword matches.
pub fn resolve_location(file_name: &str) -> Location {
    let name = file_name.to_lowercase();

    KNOWN_LOCATIONS
        .iter()
        .find(|known| known.keywords.iter().any(|kw| name.contains(kw)))
        .map(|known| {
            Location::new(
                known.country_code,
                known.state_code,
                known.city,
                known.countries_of_interest,
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_berlin_export() {
        let location = resolve_location("Berlin_Export.csv");
        assert_eq!(location.country_code, "DE");
        assert_eq!(location.state_code, "BE");
        assert_eq!(location.city, "Berlin");
    }

    #[test]
    fn test_unknown_city_is_empty() {
        let location = resolve_location("unknown_city.csv");
        assert!(location.is_unset());
        assert_eq!(location, Location::default());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(resolve_location("DRESDEN-2023.CSV").city, "Dresden");
        assert_eq!(resolve_location("london_subscribers.csv").country_code, "GB");
    }

    #[test]
    fn test_city_spelling_variants() {
        assert_eq!(resolve_location("munich.csv").city, "Munich");
        assert_eq!(resolve_location("Newsletter_Munchen.csv").city, "Munich");
        assert_eq!(resolve_location("nurenberg.csv").city, "Nuremberg");
        assert_eq!(resolve_location("Nuernberg_list.csv").city, "Nuremberg");
        assert_eq!(resolve_location("NUREMBERG.csv").city, "Nuremberg");
    }

    #[test]
    fn test_priority_follows_list_order() {
        // Berlin is checked before London regardless of position in the name
        assert_eq!(resolve_location("london_and_berlin.csv").city, "Berlin");
        assert_eq!(resolve_location("berlin_and_london.csv").city, "Berlin");
        assert_eq!(resolve_location("dresden_munich.csv").city, "Dresden");
    }

    #[test]
    fn test_umlaut_spelling_does_not_match() {
        // Only the ASCII spellings are known
        assert!(resolve_location("münchen.csv").is_unset());
    }
}
