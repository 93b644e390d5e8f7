//! Route numbers, route identifiers and listing metadata.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::{DayType, DirectionList};

/// Error returned when a route identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route identifier: {reason}")]
pub struct InvalidRouteIdentifier {
    reason: &'static str,
}

/// A route number such as "30" or "34-1".
///
/// This is the identity key of a merged route; all day-type variants of a
/// route share it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RouteNumber(String);

impl RouteNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteNumber({})", self.0)
    }
}

impl fmt::Display for RouteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\S+?)(\(.*\))?$").expect("identifier pattern is a valid regex")
    })
}

/// An identifier naming one timetable page, e.g. "30" or "34-1(평일)".
///
/// Carries the route number and the optional parenthetical day-type label.
///
/// # Examples
///
/// ```
/// use bus_timetable::domain::{DayType, RouteIdentifier};
///
/// let id = RouteIdentifier::parse("34-1(평일)").unwrap();
/// assert_eq!(id.route_number().as_str(), "34-1");
/// assert_eq!(id.day_label(), Some("평일"));
/// assert_eq!(id.day_type(), DayType::Weekday);
///
/// let id = RouteIdentifier::parse("30").unwrap();
/// assert_eq!(id.day_type(), DayType::General);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RouteIdentifier {
    raw: String,
    number: RouteNumber,
    day_label: Option<String>,
}

impl RouteIdentifier {
    /// Split an identifier into route number and day-type label.
    ///
    /// Identifiers that do not fit the `number(label)` shape (for example
    /// ones containing whitespace) fall back to everything before the
    /// first `(` as the route number, with no label.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteIdentifier> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(InvalidRouteIdentifier {
                reason: "must not be empty",
            });
        }

        let (number, day_label) = match identifier_pattern().captures(raw) {
            Some(caps) => {
                let label = caps
                    .get(2)
                    .map(|m| m.as_str().trim_start_matches('(').trim_end_matches(')'))
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                (caps[1].to_string(), label)
            }
            None => (
                raw.split('(').next().unwrap_or(raw).trim().to_string(),
                None,
            ),
        };

        if number.is_empty() || number.starts_with('(') {
            return Err(InvalidRouteIdentifier {
                reason: "missing route number",
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            number: RouteNumber(number),
            day_label,
        })
    }

    /// The identifier exactly as the listing page carries it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn route_number(&self) -> &RouteNumber {
        &self.number
    }

    /// The raw day-type label without parentheses, if any.
    pub fn day_label(&self) -> Option<&str> {
        self.day_label.as_deref()
    }

    /// The canonical day type of this identifier.
    pub fn day_type(&self) -> DayType {
        DayType::normalize(self.day_label.as_deref().unwrap_or_default())
    }
}

impl fmt::Debug for RouteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteIdentifier({})", self.raw)
    }
}

impl fmt::Display for RouteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// What the listing page says about a route.
///
/// Built once from the listing and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMetadata {
    pub number: RouteNumber,
    pub origin: String,
    pub destination: String,
    pub directions: DirectionList,
}

impl RouteMetadata {
    pub fn new(
        number: RouteNumber,
        origin: impl Into<String>,
        destination: impl Into<String>,
        directions: DirectionList,
    ) -> Self {
        Self {
            number,
            origin: origin.into(),
            destination: destination.into(),
            directions,
        }
    }

    /// Human-readable description of the route's end points.
    pub fn description(&self) -> String {
        format!("{} ↔ {}", self.origin, self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_number() {
        let id = RouteIdentifier::parse("30").unwrap();
        assert_eq!(id.route_number().as_str(), "30");
        assert_eq!(id.day_label(), None);
        assert_eq!(id.as_str(), "30");
    }

    #[test]
    fn parse_with_day_label() {
        let id = RouteIdentifier::parse("30(주말)").unwrap();
        assert_eq!(id.route_number().as_str(), "30");
        assert_eq!(id.day_label(), Some("주말"));
        assert_eq!(id.day_type(), DayType::Weekend);
        assert_eq!(id.to_string(), "30(주말)");
    }

    #[test]
    fn parse_hyphenated_number() {
        let id = RouteIdentifier::parse("34-1(평일)").unwrap();
        assert_eq!(id.route_number().as_str(), "34-1");
        assert_eq!(id.day_type(), DayType::Weekday);
    }

    #[test]
    fn parse_empty_parentheses() {
        let id = RouteIdentifier::parse("51()").unwrap();
        assert_eq!(id.route_number().as_str(), "51");
        assert_eq!(id.day_label(), None);
        assert_eq!(id.day_type(), DayType::General);
    }

    #[test]
    fn parse_with_whitespace_falls_back() {
        let id = RouteIdentifier::parse("2 (평일)").unwrap();
        assert_eq!(id.route_number().as_str(), "2");
        assert_eq!(id.day_label(), None);
    }

    #[test]
    fn reject_empty() {
        assert!(RouteIdentifier::parse("").is_err());
        assert!(RouteIdentifier::parse("   ").is_err());
        assert!(RouteIdentifier::parse("(평일)").is_err());
    }

    #[test]
    fn metadata_description() {
        let meta = RouteMetadata::new(
            RouteNumber::new("30"),
            "단구동",
            "문막",
            DirectionList::from_labels(["단구동", "문막"]),
        );
        assert_eq!(meta.description(), "단구동 ↔ 문막");
    }

    #[test]
    fn route_number_ordering() {
        assert!(RouteNumber::new("30") < RouteNumber::new("34-1"));
    }
}
