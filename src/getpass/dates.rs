//! Date resolution: Gregorian input string to Hijri date, Arabic weekday name
//! and zero-padded Gregorian components.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use hijri_date::HijriDate;

use super::GetpassError;

/// Weekday names starting from Sunday.
pub const ARABIC_DAY_NAMES: [&str; 7] = [
    "الأحد",
    "الإثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
    "السبت",
];

/// Arabic weekday name for a Gregorian date.
pub fn arabic_weekday(date: NaiveDate) -> &'static str {
    let from_monday = date.weekday().num_days_from_monday() as usize;
    ARABIC_DAY_NAMES[(from_monday + 1) % 7]
}

/// Time of day assumed when the input carries a bare date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTimePolicy {
    #[default]
    Midday,
    Midnight,
}

impl MissingTimePolicy {
    pub fn time(&self) -> NaiveTime {
        match self {
            Self::Midday => NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
            Self::Midnight => NaiveTime::MIN,
        }
    }
}

impl FromStr for MissingTimePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "midday" | "noon" => Ok(Self::Midday),
            "midnight" => Ok(Self::Midnight),
            other => Err(format!("expected `midday` or `midnight`, got `{other}`")),
        }
    }
}

impl fmt::Display for MissingTimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Midday => f.write_str("midday"),
            Self::Midnight => f.write_str("midnight"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDay {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

/// Gregorian to Hijri conversion.
pub trait HijriCalendar: Send + Sync {
    fn to_hijri(&self, date: NaiveDate) -> Result<HijriDay, String>;
}

impl<T: HijriCalendar + ?Sized> HijriCalendar for Arc<T> {
    fn to_hijri(&self, date: NaiveDate) -> Result<HijriDay, String> {
        (**self).to_hijri(date)
    }
}

/// First Gregorian year covered by the Umm al-Qura tables.
pub const HIJRI_MIN_YEAR: i32 = 1938;
/// Last Gregorian year covered by the Umm al-Qura tables.
pub const HIJRI_MAX_YEAR: i32 = 2076;

/// Umm al-Qura calendar from the `hijri_date` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct UmmAlQura;

impl HijriCalendar for UmmAlQura {
    fn to_hijri(&self, date: NaiveDate) -> Result<HijriDay, String> {
        if !(HIJRI_MIN_YEAR..=HIJRI_MAX_YEAR).contains(&date.year()) {
            return Err(format!(
                "{date} is outside the supported range {HIJRI_MIN_YEAR}-{HIJRI_MAX_YEAR}"
            ));
        }

        let hijri = HijriDate::from_gr(
            date.year() as usize,
            date.month() as usize,
            date.day() as usize,
        )
        .map_err(|e| e.to_string())?;

        Ok(HijriDay {
            year: hijri.year() as u32,
            month: hijri.month() as u32,
            day: hijri.day() as u32,
        })
    }
}

/// A request date with every value the template needs, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    pub gregorian: NaiveDate,
    pub hijri_day: String,
    pub hijri_month: String,
    pub hijri_year: String,
    pub gregorian_day: String,
    pub gregorian_month: String,
    pub gregorian_year: String,
    pub weekday_name: String,
}

impl ResolvedDate {
    pub fn new(gregorian: NaiveDate, hijri: HijriDay) -> Self {
        Self {
            gregorian,
            hijri_day: format!("{:02}", hijri.day),
            hijri_month: format!("{:02}", hijri.month),
            hijri_year: hijri.year.to_string(),
            gregorian_day: format!("{:02}", gregorian.day()),
            gregorian_month: format!("{:02}", gregorian.month()),
            gregorian_year: gregorian.year().to_string(),
            weekday_name: arabic_weekday(gregorian).to_string(),
        }
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses request date strings and resolves them against a Hijri calendar.
pub struct DateConverter<C: HijriCalendar> {
    calendar: C,
    missing_time: MissingTimePolicy,
}

impl<C: HijriCalendar> DateConverter<C> {
    pub fn new(calendar: C, missing_time: MissingTimePolicy) -> Self {
        Self {
            calendar,
            missing_time,
        }
    }

    pub fn resolve(&self, input: &str) -> Result<ResolvedDate, GetpassError> {
        let timestamp = self.parse(input)?;
        let date = timestamp.date();
        let hijri = self
            .calendar
            .to_hijri(date)
            .map_err(|_| GetpassError::InvalidDateFormat(input.to_string()))?;
        Ok(ResolvedDate::new(date, hijri))
    }

    /// Reads the wall-clock timestamp as written; offsets are accepted but
    /// never shift the calendar date.
    pub fn parse(&self, input: &str) -> Result<NaiveDateTime, GetpassError> {
        let trimmed = input.trim();
        let invalid = || GetpassError::InvalidDateFormat(input.to_string());
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let normalized = match trimmed.strip_suffix(['Z', 'z']) {
            Some(rest) => format!("{rest}+00:00"),
            None => trimmed.to_string(),
        };
        let normalized = expand_short_forms(normalized);

        if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
            return Ok(parsed.naive_local());
        }
        for format in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
            if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
                return Ok(parsed.naive_local());
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
                return Ok(parsed);
            }
        }
        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .map(|date| date.and_time(self.missing_time.time()))
            .map_err(|_| invalid())
    }
}

/// Rewrites the ISO 8601 basic date (`20240101`) and hour-only times
/// (`2024-01-01T10`) into the extended forms the parsers expect.
fn expand_short_forms(mut input: String) -> String {
    let bytes = input.as_bytes();
    if bytes.len() >= 8
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && (bytes.len() == 8 || matches!(bytes[8], b'T' | b' '))
    {
        input = format!("{}-{}-{}{}", &input[..4], &input[4..6], &input[6..8], &input[8..]);
    }

    let bytes = input.as_bytes();
    if bytes.len() >= 13
        && matches!(bytes[10], b'T' | b' ')
        && bytes[11].is_ascii_digit()
        && bytes[12].is_ascii_digit()
        && (bytes.len() == 13 || matches!(bytes[13], b'+' | b'-'))
    {
        input.insert_str(13, ":00");
    }
    input
}

impl Default for DateConverter<UmmAlQura> {
    fn default() -> Self {
        Self::new(UmmAlQura, MissingTimePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCalendar;

    impl HijriCalendar for FixedCalendar {
        fn to_hijri(&self, _date: NaiveDate) -> Result<HijriDay, String> {
            Ok(HijriDay {
                year: 1445,
                month: 6,
                day: 9,
            })
        }
    }

    struct RejectingCalendar;

    impl HijriCalendar for RejectingCalendar {
        fn to_hijri(&self, _date: NaiveDate) -> Result<HijriDay, String> {
            Err("out of range".to_string())
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_new_year_date() {
        let resolved = DateConverter::<UmmAlQura>::default().resolve("2024-01-01").unwrap();
        assert_eq!(resolved.hijri_day, "19");
        assert_eq!(resolved.hijri_month, "06");
        assert_eq!(resolved.hijri_year, "1445");
        assert_eq!(resolved.gregorian_day, "01");
        assert_eq!(resolved.gregorian_month, "01");
        assert_eq!(resolved.gregorian_year, "2024");
        assert_eq!(resolved.weekday_name, "الإثنين");
    }

    #[test]
    fn test_weekday_follows_iso_weekday_for_a_full_week() {
        // 2024-01-07 is a Sunday.
        let start = ymd(2024, 1, 7);
        for offset in 0..14 {
            let date = start + chrono::Duration::days(offset);
            let expected = ARABIC_DAY_NAMES[date.weekday().num_days_from_sunday() as usize];
            assert_eq!(arabic_weekday(date), expected);
        }
        assert_eq!(arabic_weekday(start), "الأحد");
        assert_eq!(arabic_weekday(ymd(2024, 1, 13)), "السبت");
    }

    #[test]
    fn test_components_are_padded_years_are_not() {
        let converter = DateConverter::new(FixedCalendar, MissingTimePolicy::Midday);
        let resolved = converter.resolve("2024-03-05").unwrap();
        assert_eq!(resolved.hijri_day, "09");
        assert_eq!(resolved.hijri_month, "06");
        assert_eq!(resolved.hijri_year, "1445");
        assert_eq!(resolved.gregorian_day, "05");
        assert_eq!(resolved.gregorian_month, "03");
    }

    #[test]
    fn test_accepts_date_time_variants_without_shifting_the_day() {
        let converter = DateConverter::new(FixedCalendar, MissingTimePolicy::Midday);
        for input in [
            "2024-01-01",
            "2024-01-01T00:00:00",
            "2024-01-01T23:59:59.250",
            "2024-01-01T23:30:00Z",
            "2024-01-01T01:00:00+03:00",
            "2024-01-01T23:00:00-05:00",
            "2024-01-01 08:15",
            " 2024-01-01 ",
            "2024-01-01T10",
            "2024-01-01T10Z",
            "2024-01-01T10+03:00",
            "20240101",
            "20240101T10:30:00",
        ] {
            let resolved = converter.resolve(input).unwrap();
            assert_eq!(resolved.gregorian, ymd(2024, 1, 1), "input {input}");
        }
    }

    #[test]
    fn test_hour_only_time_reads_as_full_hour() {
        let converter = DateConverter::new(FixedCalendar, MissingTimePolicy::Midday);
        assert_eq!(
            converter.parse("2024-01-01T10").unwrap().time(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            converter.parse("20240101").unwrap(),
            ymd(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_time_policy() {
        let midday = DateConverter::new(FixedCalendar, MissingTimePolicy::Midday);
        let midnight = DateConverter::new(FixedCalendar, MissingTimePolicy::Midnight);
        assert_eq!(
            midday.parse("2024-01-01").unwrap().time(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap()
        );
        assert_eq!(midnight.parse("2024-01-01").unwrap().time(), NaiveTime::MIN);
        assert_eq!("MIDNIGHT".parse::<MissingTimePolicy>(), Ok(MissingTimePolicy::Midnight));
        assert!("dawn".parse::<MissingTimePolicy>().is_err());
    }

    #[test]
    fn test_rejects_unparseable_input() {
        let converter = DateConverter::new(FixedCalendar, MissingTimePolicy::Midday);
        for input in ["not-a-date", "", "2024-13-01", "2024-02-30", "01/02/2024", "20241301", "2024-01-01T1"] {
            let err = converter.resolve(input).unwrap_err();
            assert!(matches!(err, GetpassError::InvalidDateFormat(ref s) if s == input));
        }
    }

    #[test]
    fn test_umm_al_qura_rejects_years_outside_its_tables() {
        let calendar = UmmAlQura;
        assert!(calendar.to_hijri(ymd(HIJRI_MIN_YEAR - 1, 12, 31)).is_err());
        assert!(calendar.to_hijri(ymd(HIJRI_MAX_YEAR + 1, 1, 1)).is_err());
        assert!(calendar.to_hijri(ymd(1800, 1, 1)).is_err());

        let converter = DateConverter::<UmmAlQura>::default();
        for input in ["1800-01-01T00:00:00", "2150-01-01T00:00:00"] {
            let err = converter.resolve(input).unwrap_err();
            assert!(matches!(err, GetpassError::InvalidDateFormat(ref s) if s == input));
        }
    }

    #[test]
    fn test_calendar_failure_is_an_invalid_date() {
        let converter = DateConverter::new(RejectingCalendar, MissingTimePolicy::Midday);
        let err = converter.resolve("1800-01-01").unwrap_err();
        assert!(matches!(err, GetpassError::InvalidDateFormat(_)));
    }
}
