use chrono::{Datelike, Local, NaiveDate, ParseResult};

/// Pattern of a partial date once the year has been joined in front of it.
const DATE_PATTERN: &str = "%Y-%m月%d日";

/// Parses a `<month>月<day>日` cell such as `3月15日` into a date in `year`.
pub fn parse_partial_date(raw: &str, year: i32) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{year}-{}", raw.trim()), DATE_PATTERN)
}

pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_and_day_markers() {
        let date = parse_partial_date("3月15日", 2024).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn accepts_padding_and_surrounding_whitespace() {
        let date = parse_partial_date("  03月01日 ", 2025).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let date = parse_partial_date("12月31日", 2025).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_partial_date("2024-03-15", 2024).is_err());
        assert!(parse_partial_date("3/15", 2024).is_err());
        assert!(parse_partial_date("3月15", 2024).is_err());
        assert!(parse_partial_date("", 2024).is_err());
    }

    #[test]
    fn rejects_impossible_days() {
        assert!(parse_partial_date("2月30日", 2024).is_err());
        assert!(parse_partial_date("2月29日", 2023).is_err());
        assert!(parse_partial_date("2月29日", 2024).is_ok());
    }
}
