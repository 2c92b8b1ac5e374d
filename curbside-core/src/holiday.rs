//! Extraction of holiday-adjusted pickup dates from provider advisory text.
//!
//! Advisories are free text such as
//! `"Thanksgiving: service will be on a 1 day delay for 11/26 except in Springfield"`.
//! The parser only understands `month/day[/year]` mentions followed by a
//! `<n> [day] delay` phrase. City-specific exceptions mentioned in the text are
//! not interpreted.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

use crate::model::HolidayImpact;

const DELAY_WORD: &[u8] = b"delay";
const YEARS_TO_SEARCH: i32 = 8;

/// A `month/day[/year]` mention and its byte span in the advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateMention {
    date: NaiveDate,
    start: usize,
    end: usize,
}

/// Whether a pickup advisory says a holiday affects the schedule.
#[must_use]
pub fn signals_holiday(advisory: &str) -> bool {
    advisory.to_uppercase().contains("HOLIDAY")
}

/// Map every date mentioned in `message` to the date service actually happens.
///
/// Dates without a year resolve to their next occurrence on or after `today`.
/// The text between one date and the next is searched for a delay phrase; without one
/// the date maps to itself. Unreadable text never fails the parse, it only yields
/// fewer or undelayed entries.
#[must_use]
pub fn parse_impacted_dates(message: &str, today: NaiveDate) -> HolidayImpact {
    let mentions = find_date_mentions(message, today);
    let mut impact = HolidayImpact::new();

    for (idx, mention) in mentions.iter().enumerate() {
        let slice_end = mentions
            .get(idx + 1)
            .map_or(message.len(), |next| next.start);
        let trailing = message.get(mention.end..slice_end).unwrap_or_default();

        let adjusted = find_delay_days(trailing)
            .and_then(|days| mention.date.checked_add_days(Days::new(days)))
            .unwrap_or(mention.date);

        // a repeated mention only replaces an earlier no-delay reading
        if impact
            .get(mention.date)
            .is_none_or(|existing| existing == mention.date)
        {
            impact.insert(mention.date, adjusted);
        }
    }

    tracing::debug!(
        mentioned = mentions.len(),
        delayed = impact.iter().filter(|(from, to)| from != to).count(),
        "parsed holiday advisory"
    );

    impact
}

fn find_date_mentions(message: &str, today: NaiveDate) -> Vec<DateMention> {
    let bytes = message.as_bytes();
    let mut mentions = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(parsed) = match_month_day(bytes, pos) else {
            pos += 1;
            continue;
        };

        match resolve_date(parsed.month, parsed.day, parsed.year, today) {
            Some(date) => mentions.push(DateMention {
                date,
                start: pos,
                end: parsed.end,
            }),
            None => tracing::debug!(
                month = parsed.month,
                day = parsed.day,
                "ignoring impossible date in advisory"
            ),
        }
        pos = parsed.end;
    }

    mentions
}

struct MonthDay {
    month: u32,
    day: u32,
    year: Option<i32>,
    end: usize,
}

/// Match `\d{1,2}/\d{1,2}(/\d{4}|/\d{2})?` starting exactly at `start`.
fn match_month_day(bytes: &[u8], start: usize) -> Option<MonthDay> {
    let month_len = digit_run(bytes, start, 2);
    if month_len == 0 {
        return None;
    }
    let slash = start + month_len;
    if bytes.get(slash) != Some(&b'/') {
        return None;
    }

    let day_start = slash + 1;
    let day_len = digit_run(bytes, day_start, 2);
    if day_len == 0 {
        return None;
    }

    let month = parse_digits(bytes, start, slash)?;
    let day = parse_digits(bytes, day_start, day_start + day_len)?;
    let mut end = day_start + day_len;
    let mut year = None;

    if bytes.get(end) == Some(&b'/') {
        let year_start = end + 1;
        let year_len = digit_run(bytes, year_start, 4);
        if year_len == 4 || year_len == 2 {
            let raw: i32 = parse_digits(bytes, year_start, year_start + year_len)?;
            year = Some(if year_len == 2 { 2000 + raw } else { raw });
            end = year_start + year_len;
        }
    }

    Some(MonthDay {
        month,
        day,
        year,
        end,
    })
}

/// Number of ASCII digits at `start`, capped at `max`.
fn digit_run(bytes: &[u8], start: usize, max: usize) -> usize {
    bytes
        .iter()
        .skip(start)
        .take(max)
        .take_while(|byte| byte.is_ascii_digit())
        .count()
}

fn parse_digits<T: FromStr>(bytes: &[u8], start: usize, end: usize) -> Option<T> {
    let digits = bytes.get(start..end)?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}

fn resolve_date(month: u32, day: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // Feb 29 may need several years to come around again
    (0..=YEARS_TO_SEARCH)
        .filter_map(|offset| NaiveDate::from_ymd_opt(today.year() + offset, month, day))
        .find(|candidate| *candidate >= today)
}

/// Find the first `<digits> [day[s]] delay` phrase in `text` and return its day count.
fn find_delay_days(text: &str) -> Option<u64> {
    let lowered = text.to_ascii_lowercase();
    let bytes = lowered.as_bytes();

    bytes
        .windows(DELAY_WORD.len())
        .enumerate()
        .filter(|(_pos, window)| *window == DELAY_WORD)
        .find_map(|(pos, _window)| delay_count_before(bytes, pos))
}

/// Walk backwards from a `delay` at `pos` over an optional `day`/`days` to the count.
fn delay_count_before(bytes: &[u8], pos: usize) -> Option<u64> {
    let mut cursor = skip_separators_back(bytes, pos);

    for unit in [b"days".as_slice(), b"day".as_slice()] {
        if cursor >= unit.len() && bytes.get(cursor - unit.len()..cursor) == Some(unit) {
            cursor = skip_separators_back(bytes, cursor - unit.len());
            break;
        }
    }

    let digits_end = cursor;
    while cursor > 0 && bytes.get(cursor - 1).is_some_and(u8::is_ascii_digit) {
        cursor -= 1;
    }
    if cursor == digits_end {
        return None;
    }

    // overflowing counts are treated as no delay
    parse_digits(bytes, cursor, digits_end)
}

fn skip_separators_back(bytes: &[u8], mut cursor: usize) -> usize {
    while cursor > 0
        && bytes
            .get(cursor - 1)
            .is_some_and(|byte| byte.is_ascii_whitespace() || *byte == b'-')
    {
        cursor -= 1;
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_single_delay() {
        let message = "holiday, your scheduled service will not be delayed except for 11/24, \
                       it will be on a 1 day delay";
        let impact = parse_impacted_dates(message, ymd(2026, 10, 19));

        assert_eq!(impact.len(), 1);
        assert_eq!(impact.get(ymd(2026, 11, 24)), Some(ymd(2026, 11, 25)));
    }

    #[test]
    fn test_no_dates() {
        let impact = parse_impacted_dates("no dates mentioned", ymd(2026, 10, 19));
        assert!(impact.is_empty());
    }

    #[test]
    fn test_past_date_rolls_to_next_year() {
        let impact =
            parse_impacted_dates("11/25 service will be on 1 day delay", ymd(2026, 12, 1));

        assert_eq!(impact.get(ymd(2027, 11, 25)), Some(ymd(2027, 11, 26)));
        assert_eq!(impact.get(ymd(2026, 11, 25)), None);
    }

    #[test]
    fn test_today_is_not_in_the_past() {
        let impact = parse_impacted_dates("12/25 on a 1 day delay", ymd(2026, 12, 25));
        assert_eq!(impact.get(ymd(2026, 12, 25)), Some(ymd(2026, 12, 26)));
    }

    #[test]
    fn test_trailing_text_belongs_to_preceding_date() {
        let message = "Thanksgiving 11/26: service will be on a 1 day delay. \
                       Christmas 12/25 no change in service. \
                       New Year 1/1 will be on a 2-day delay";
        let impact = parse_impacted_dates(message, ymd(2026, 10, 19));

        assert_eq!(impact.get(ymd(2026, 11, 26)), Some(ymd(2026, 11, 27)));
        assert_eq!(impact.get(ymd(2026, 12, 25)), Some(ymd(2026, 12, 25)));
        assert_eq!(impact.get(ymd(2027, 1, 1)), Some(ymd(2027, 1, 3)));
    }

    #[test]
    fn test_delay_phrase_before_date_is_ignored() {
        let impact = parse_impacted_dates("1 day delay announced for 7/4", ymd(2026, 6, 1));
        assert_eq!(impact.get(ymd(2026, 7, 4)), Some(ymd(2026, 7, 4)));
    }

    #[test]
    fn test_delay_without_digits_is_no_delay() {
        let message = "7/4 will be on a one day delay, 9/7 delayed as well";
        let impact = parse_impacted_dates(message, ymd(2026, 6, 1));

        assert_eq!(impact.get(ymd(2026, 7, 4)), Some(ymd(2026, 7, 4)));
        assert_eq!(impact.get(ymd(2026, 9, 7)), Some(ymd(2026, 9, 7)));
    }

    #[test]
    fn test_holiday_word_ending_in_day_is_not_a_unit() {
        let impact = parse_impacted_dates("5/25 holiday delay", ymd(2026, 5, 1));
        assert_eq!(impact.get(ymd(2026, 5, 25)), Some(ymd(2026, 5, 25)));
    }

    #[test]
    fn test_plural_days_and_case() {
        let impact = parse_impacted_dates("12/25 WILL BE ON A 2 DAYS DELAY", ymd(2026, 10, 19));
        assert_eq!(impact.get(ymd(2026, 12, 25)), Some(ymd(2026, 12, 27)));
    }

    #[test]
    fn test_explicit_year() {
        let message = "12/31/2025 on a 1 day delay and 1/1/27 on a 1 day delay";
        let impact = parse_impacted_dates(message, ymd(2026, 10, 19));

        assert_eq!(impact.get(ymd(2025, 12, 31)), Some(ymd(2026, 1, 1)));
        assert_eq!(impact.get(ymd(2027, 1, 1)), Some(ymd(2027, 1, 2)));
    }

    #[test]
    fn test_impossible_date_is_skipped() {
        let impact = parse_impacted_dates("13/45 then 2/30 then 3/2 1 day delay", ymd(2026, 1, 1));

        assert_eq!(impact.len(), 1);
        assert_eq!(impact.get(ymd(2026, 3, 2)), Some(ymd(2026, 3, 3)));
    }

    #[test]
    fn test_leap_day_finds_next_leap_year() {
        let impact = parse_impacted_dates("2/29 1 day delay", ymd(2026, 10, 19));
        assert_eq!(impact.get(ymd(2028, 2, 29)), Some(ymd(2028, 3, 1)));
    }

    #[test]
    fn test_absurd_delay_count_is_no_delay() {
        let impact =
            parse_impacted_dates("7/4 99999999999999999999999 day delay", ymd(2026, 6, 1));
        assert_eq!(impact.get(ymd(2026, 7, 4)), Some(ymd(2026, 7, 4)));
    }

    #[test]
    fn test_non_ascii_text_around_dates() {
        let impact = parse_impacted_dates("Día festivo – 9/7 · 1 day delay ✓", ymd(2026, 6, 1));
        assert_eq!(impact.get(ymd(2026, 9, 7)), Some(ymd(2026, 9, 8)));
    }

    #[test]
    fn test_signals_holiday() {
        assert!(signals_holiday("Holiday schedule in effect"));
        assert!(signals_holiday("HOLIDAY"));
        assert!(!signals_holiday("Your next pickup is Monday"));
    }
}
