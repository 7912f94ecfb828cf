use std::{collections::HashMap, fmt};

use chrono::Weekday;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const DEFAULT_TAG: &str = "en-US";

/// Regions whose calendars do not start the week on Monday.
static REGION_WEEK_START: Lazy<HashMap<&'static str, Weekday>> = Lazy::new(|| {
    let sunday = [
        "US", "CA", "MX", "BR", "JP", "KR", "TW", "HK", "PH", "IL", "IN", "ZA", "PE", "CO",
        "VE", "GT", "SV", "HN", "NI", "PA", "DO", "PR", "TH", "SG", "KE",
    ];
    let saturday = [
        "AE", "AF", "BH", "DJ", "DZ", "EG", "IQ", "IR", "JO", "KW", "LY", "OM", "QA", "SA",
        "SD", "SY",
    ];
    sunday
        .into_iter()
        .map(|region| (region, Weekday::Sun))
        .chain(saturday.into_iter().map(|region| (region, Weekday::Sat)))
        .collect()
});

/// Fallback week start for tags that carry a language but no region.
static LANGUAGE_WEEK_START: Lazy<HashMap<&'static str, Weekday>> = Lazy::new(|| {
    HashMap::from([
        ("en", Weekday::Sun),
        ("ja", Weekday::Sun),
        ("ko", Weekday::Sun),
        ("he", Weekday::Sun),
        ("iw", Weekday::Sun),
        ("pt", Weekday::Sun),
        ("ar", Weekday::Sat),
        ("fa", Weekday::Sat),
    ])
});

static RTL_LANGUAGES: [&str; 7] = ["ar", "he", "iw", "fa", "ur", "yi", "ps"];

/// The pieces of a locale the grid cares about: week start and day order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    tag: String,
    first_day_of_week: Weekday,
    right_to_left: bool,
}

impl Locale {
    /// Parses tags such as `en-US`, `fr_FR` or `ar`. Unknown regions start on Monday.
    pub fn new(tag: &str) -> Self {
        let tag = tag.trim();
        let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };
        let mut parts = tag.split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts
            .find(|part| {
                part.len() == 2 || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
            })
            .map(|part| part.to_ascii_uppercase());

        let first_day_of_week = match region.as_deref() {
            Some(region) => REGION_WEEK_START.get(region).copied(),
            None => LANGUAGE_WEEK_START.get(language.as_str()).copied(),
        }
        .unwrap_or(Weekday::Mon);

        Self {
            tag: tag.to_string(),
            first_day_of_week,
            right_to_left: RTL_LANGUAGES.contains(&language.as_str()),
        }
    }

    pub fn with_first_day_of_week(mut self, weekday: Weekday) -> Self {
        self.first_day_of_week = weekday;
        self
    }

    pub fn with_right_to_left(mut self, rtl: bool) -> Self {
        self.right_to_left = rtl;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Weekday header in presentation order; reversed for right-to-left locales.
    pub fn weekday_order(&self) -> [Weekday; 7] {
        let mut order = [self.first_day_of_week; 7];
        for idx in 1..7 {
            order[idx] = order[idx - 1].succ();
        }
        if self.right_to_left {
            order.reverse();
        }
        order
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_start_follows_region() {
        assert_eq!(Locale::new("en-US").first_day_of_week(), Weekday::Sun);
        assert_eq!(Locale::new("en-GB").first_day_of_week(), Weekday::Mon);
        assert_eq!(Locale::new("fr_FR").first_day_of_week(), Weekday::Mon);
        assert_eq!(Locale::new("ar-EG").first_day_of_week(), Weekday::Sat);
        assert_eq!(Locale::new("es-419").first_day_of_week(), Weekday::Mon);
    }

    #[test]
    fn language_only_tags_use_language_fallback() {
        assert_eq!(Locale::new("en").first_day_of_week(), Weekday::Sun);
        assert_eq!(Locale::new("de").first_day_of_week(), Weekday::Mon);
        assert_eq!(Locale::new("").tag(), "en-US");
    }

    #[test]
    fn rtl_reverses_header_only() {
        let hebrew = Locale::new("he-IL");
        assert!(hebrew.is_right_to_left());
        assert_eq!(hebrew.weekday_order()[0], Weekday::Sat);
        assert_eq!(hebrew.weekday_order()[6], Weekday::Sun);

        let english = Locale::new("en-US");
        assert!(!english.is_right_to_left());
        assert_eq!(english.weekday_order()[0], Weekday::Sun);
    }

    #[test]
    fn overrides_apply() {
        let locale = Locale::new("en-US")
            .with_first_day_of_week(Weekday::Mon)
            .with_right_to_left(true);
        assert_eq!(locale.weekday_order()[6], Weekday::Mon);
    }
}
