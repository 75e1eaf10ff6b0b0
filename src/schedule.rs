//! Weekly timetable structure built from day/period spreadsheet columns
//!
//! Columns named `<DayCode><Period>` (e.g. `M3`, `Th6`) carry the room or
//! subject code for that slot. Day codes are M, T, W, Th, F, Sa; periods run
//! 1 through 7. Everything else in the week stays null.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Number of period slots per day.
pub const PERIODS_PER_DAY: usize = 7;

static DAY_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(M|T|W|Th|F|Sa)([1-7])$").unwrap());

/// Weekdays covered by the timetable (no Sunday column in the source sheets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Parse a spreadsheet day code (`M`, `T`, `W`, `Th`, `F`, `Sa`).
    pub fn from_code(code: &str) -> Option<Day> {
        match code {
            "M" => Some(Day::Monday),
            "T" => Some(Day::Tuesday),
            "W" => Some(Day::Wednesday),
            "Th" => Some(Day::Thursday),
            "F" => Some(Day::Friday),
            "Sa" => Some(Day::Saturday),
            _ => None,
        }
    }

    /// Column name used in the timetable table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }
}

/// Parse a header like `Th6` into its day and 0-based period index.
pub fn parse_day_period(header: &str) -> Option<(Day, usize)> {
    let caps = DAY_PERIOD_RE.captures(header)?;
    let day = Day::from_code(caps.get(1)?.as_str())?;
    let period: usize = caps.get(2)?.as_str().parse().ok()?;
    Some((day, period - 1))
}

/// A full week of period slots, one ordered list per day.
///
/// Serializes to exactly the column layout of the timetable table: six
/// lowercase day keys, each a 7-element array of strings or nulls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Week {
    monday: Vec<Option<String>>,
    tuesday: Vec<Option<String>>,
    wednesday: Vec<Option<String>>,
    thursday: Vec<Option<String>>,
    friday: Vec<Option<String>>,
    saturday: Vec<Option<String>>,
}

impl Default for Week {
    fn default() -> Self {
        Self::empty()
    }
}

impl Week {
    /// A week with every slot marked absent.
    pub fn empty() -> Self {
        Self {
            monday: vec![None; PERIODS_PER_DAY],
            tuesday: vec![None; PERIODS_PER_DAY],
            wednesday: vec![None; PERIODS_PER_DAY],
            thursday: vec![None; PERIODS_PER_DAY],
            friday: vec![None; PERIODS_PER_DAY],
            saturday: vec![None; PERIODS_PER_DAY],
        }
    }

    fn slots_mut(&mut self, day: Day) -> &mut Vec<Option<String>> {
        match day {
            Day::Monday => &mut self.monday,
            Day::Tuesday => &mut self.tuesday,
            Day::Wednesday => &mut self.wednesday,
            Day::Thursday => &mut self.thursday,
            Day::Friday => &mut self.friday,
            Day::Saturday => &mut self.saturday,
        }
    }

    pub fn slots(&self, day: Day) -> &[Option<String>] {
        match day {
            Day::Monday => &self.monday,
            Day::Tuesday => &self.tuesday,
            Day::Wednesday => &self.wednesday,
            Day::Thursday => &self.thursday,
            Day::Friday => &self.friday,
            Day::Saturday => &self.saturday,
        }
    }

    /// Set one slot; out-of-range periods are ignored (the column pattern
    /// already caps periods at 7).
    pub fn set(&mut self, day: Day, period: usize, value: impl Into<String>) {
        if let Some(slot) = self.slots_mut(day).get_mut(period) {
            *slot = Some(value.into());
        }
    }

    /// Number of populated slots across the whole week.
    pub fn populated(&self) -> usize {
        Day::ALL
            .iter()
            .map(|d| self.slots(*d).iter().filter(|s| s.is_some()).count())
            .sum()
    }

    /// Build a week from `(header, cell)` pairs, keeping only headers that
    /// match the day/period pattern and cells with a non-empty value.
    pub fn from_columns<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut week = Week::empty();
        for (header, value) in columns {
            let Some((day, period)) = parse_day_period(header.trim()) else {
                continue;
            };
            let value = value.trim();
            if !value.is_empty() {
                week.set(day, period, value);
            }
        }
        week
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_day_period() {
        assert_eq!(parse_day_period("M1"), Some((Day::Monday, 0)));
        assert_eq!(parse_day_period("Th6"), Some((Day::Thursday, 5)));
        assert_eq!(parse_day_period("Sa7"), Some((Day::Saturday, 6)));
        assert_eq!(parse_day_period("T3"), Some((Day::Tuesday, 2)));
        assert_eq!(parse_day_period("Su1"), None); // no Sunday column
        assert_eq!(parse_day_period("M8"), None); // period out of range
        assert_eq!(parse_day_period("M0"), None);
        assert_eq!(parse_day_period("Mail id"), None);
        assert_eq!(parse_day_period("Staff Name"), None);
        assert_eq!(parse_day_period(""), None);
    }

    #[test]
    fn test_two_slots_rest_absent() {
        let week = Week::from_columns([
            ("M1", "Math"),
            ("Th7", "Lab"),
            ("W4", "   "),
            ("Dept", "CSE"),
        ]);

        assert_eq!(week.slots(Day::Monday)[0].as_deref(), Some("Math"));
        assert_eq!(week.slots(Day::Thursday)[6].as_deref(), Some("Lab"));
        assert_eq!(week.populated(), 2);

        let absent: usize = Day::ALL
            .iter()
            .map(|d| week.slots(*d).iter().filter(|s| s.is_none()).count())
            .sum();
        assert_eq!(absent, 40);
    }

    #[test]
    fn test_serializes_to_table_columns() {
        let mut week = Week::empty();
        week.set(Day::Monday, 0, "101");

        let value = serde_json::to_value(&week).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        for day in Day::ALL {
            let slots = obj[day.column_name()].as_array().unwrap();
            assert_eq!(slots.len(), PERIODS_PER_DAY);
        }
        assert_eq!(
            value["monday"],
            json!(["101", null, null, null, null, null, null])
        );
    }

    #[test]
    fn test_values_are_trimmed() {
        let week = Week::from_columns([("F2", "  ECE-Lab ")]);
        assert_eq!(week.slots(Day::Friday)[1].as_deref(), Some("ECE-Lab"));
    }
}
