//! Canonical day-type keys.

use std::fmt;

use serde::Serialize;

/// Which service pattern a timetable applies to.
///
/// The declaration order is the canonical processing order used when
/// merging: `General`, then `Weekday`, then `Weekend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    General,
    Weekday,
    Weekend,
}

/// Tokens marking a weekday-only timetable.
const WEEKDAY_TOKENS: &[&str] = &["평일", "주중"];

/// Tokens marking weekend, Saturday, Sunday or public-holiday timetables.
const WEEKEND_TOKENS: &[&str] = &["주말", "휴일", "토", "일", "공휴"];

/// Vacation timetables run the reduced weekend pattern.
const VACATION_TOKENS: &[&str] = &["방학"];

impl DayType {
    /// All day types in canonical order.
    pub const ALL: [DayType; 3] = [DayType::General, DayType::Weekday, DayType::Weekend];

    /// Map a raw day-type label to its canonical key.
    ///
    /// Matching is by substring, weekday tokens first. Empty or
    /// unrecognised labels yield `General`; the canonical key names map to
    /// themselves.
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_timetable::domain::DayType;
    ///
    /// assert_eq!(DayType::normalize("평일"), DayType::Weekday);
    /// assert_eq!(DayType::normalize("토,일,공휴일"), DayType::Weekend);
    /// assert_eq!(DayType::normalize("방학"), DayType::Weekend);
    /// assert_eq!(DayType::normalize(""), DayType::General);
    /// assert_eq!(DayType::normalize("weekend"), DayType::Weekend);
    /// ```
    pub fn normalize(raw: &str) -> DayType {
        let label = raw.trim().to_lowercase();
        if label.is_empty() {
            return DayType::General;
        }

        if let Some(day_type) = DayType::ALL.into_iter().find(|d| d.as_str() == label) {
            return day_type;
        }

        let contains_any = |tokens: &[&str]| tokens.iter().any(|t| label.contains(t));

        if contains_any(WEEKDAY_TOKENS) {
            DayType::Weekday
        } else if contains_any(WEEKEND_TOKENS) || contains_any(VACATION_TOKENS) {
            DayType::Weekend
        } else {
            DayType::General
        }
    }

    /// The key used in merged schedules.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::General => "general",
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_labels() {
        assert_eq!(DayType::normalize("평일"), DayType::Weekday);
        assert_eq!(DayType::normalize("주중"), DayType::Weekday);
        assert_eq!(DayType::normalize("평일운행"), DayType::Weekday);
    }

    #[test]
    fn weekend_labels() {
        assert_eq!(DayType::normalize("주말"), DayType::Weekend);
        assert_eq!(DayType::normalize("휴일"), DayType::Weekend);
        assert_eq!(DayType::normalize("토요일"), DayType::Weekend);
        assert_eq!(DayType::normalize("일요일"), DayType::Weekend);
        assert_eq!(DayType::normalize("공휴일"), DayType::Weekend);
        assert_eq!(DayType::normalize("방학"), DayType::Weekend);
    }

    #[test]
    fn weekday_wins_over_weekend_tokens() {
        // "평일" contains "일", but is a weekday label
        assert_eq!(DayType::normalize("평일"), DayType::Weekday);
    }

    #[test]
    fn missing_or_unknown_is_general() {
        assert_eq!(DayType::normalize(""), DayType::General);
        assert_eq!(DayType::normalize("   "), DayType::General);
        assert_eq!(DayType::normalize("심야"), DayType::General);
        assert_eq!(DayType::normalize("express"), DayType::General);
    }

    #[test]
    fn canonical_keys_map_to_themselves() {
        for day_type in DayType::ALL {
            assert_eq!(DayType::normalize(day_type.as_str()), day_type);
        }
        assert_eq!(DayType::normalize("Weekday"), DayType::Weekday);
    }

    #[test]
    fn canonical_order() {
        let mut types = vec![DayType::Weekend, DayType::General, DayType::Weekday];
        types.sort();
        assert_eq!(types, DayType::ALL.to_vec());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DayType::Weekend).unwrap(),
            "\"weekend\""
        );
    }
}
