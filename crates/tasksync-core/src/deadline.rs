//! Deadline input handling
//!
//! Deadlines are stored as `dd/mm/yyyy` text. These helpers turn what a user
//! types into that form and refuse days that have already passed.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Storage format for deadlines
pub const DEADLINE_FORMAT: &str = "%d/%m/%Y";

/// Errors from parsing a deadline typed by the user
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("Deadline cannot be empty")]
    Empty,

    #[error("Invalid deadline '{0}'. Use dd/mm/yyyy, yyyy-mm-dd, 'today' or 'tomorrow'.")]
    Invalid(String),

    #[error("Deadline {0} is in the past")]
    InPast(String),
}

/// Format a date the way deadlines are stored
pub fn format(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}

/// Parse user input into a stored deadline
///
/// Accepts `dd/mm/yyyy`, `yyyy-mm-dd`, `today` and `tomorrow`. Dates before
/// `today` are rejected.
pub fn parse_input(input: &str, today: NaiveDate) -> Result<String, DeadlineError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DeadlineError::Empty);
    }

    let date = match input.to_ascii_lowercase().as_str() {
        "today" => today,
        "tomorrow" => today + Duration::days(1),
        _ => NaiveDate::parse_from_str(input, DEADLINE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
            .map_err(|_| DeadlineError::Invalid(input.to_string()))?,
    };

    if date < today {
        return Err(DeadlineError::InPast(format(date)));
    }

    Ok(format(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
    }

    #[test]
    fn test_parse_stored_format() {
        assert_eq!(parse_input("01/07/2030", today()).unwrap(), "01/07/2030");
        assert_eq!(parse_input(" 1/7/2030 ", today()).unwrap(), "01/07/2030");
    }

    #[test]
    fn test_parse_iso_format() {
        assert_eq!(parse_input("2030-12-25", today()).unwrap(), "25/12/2030");
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_input("today", today()).unwrap(), "15/06/2030");
        assert_eq!(parse_input("Tomorrow", today()).unwrap(), "16/06/2030");
    }

    #[test]
    fn test_rejects_past_dates() {
        assert_eq!(
            parse_input("14/06/2030", today()),
            Err(DeadlineError::InPast("14/06/2030".to_string()))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_input("   ", today()), Err(DeadlineError::Empty));
        assert!(matches!(
            parse_input("next week", today()),
            Err(DeadlineError::Invalid(_))
        ));
        assert!(matches!(
            parse_input("31/02/2030", today()),
            Err(DeadlineError::Invalid(_))
        ));
    }

    #[test]
    fn test_format() {
        let date = NaiveDate::from_ymd_opt(2031, 3, 4).unwrap();
        assert_eq!(format(date), "04/03/2031");
    }
}
