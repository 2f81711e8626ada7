use {
    crate::constants::{ISO8601_COMPACT_FORMAT, ISO8601_DATE_FORMAT},
    chrono::{
        naive::{NaiveDate, NaiveDateTime, NaiveTime},
        DateTime, Utc,
    },
    lazy_static::lazy_static,
    regex::Regex,
};

lazy_static! {
    /// ISO 8601 basic format timestamp in UTC, as used by SigV4: `20150830T123600Z`.
    static ref ISO_8601_BASIC_UTC_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})
        (?P<month>0[1-9]|1[0-2])
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3])
        (?P<minute>[0-5][0-9])
        (?P<second>[0-5][0-9])
        Z$").unwrap();
}

/// Parsing of the ISO 8601 basic format used for `X-Amz-Date`.
pub trait ParseISO8601Basic: Sized {
    /// Parse `YYYYMMDD'T'HHMMSS'Z'`. Returns `None` if the string is not in that exact format or
    /// names a date that does not exist (e.g. February 30th).
    fn parse_from_iso8601_basic(s: &str) -> Option<Self>;
}

impl ParseISO8601Basic for DateTime<Utc> {
    fn parse_from_iso8601_basic(s: &str) -> Option<Self> {
        let cap = ISO_8601_BASIC_UTC_REGEX.captures(s)?;

        let year = cap["year"].parse::<i32>().ok()?;
        let month = cap["month"].parse::<u32>().ok()?;
        let day = cap["day"].parse::<u32>().ok()?;
        let naive_date = NaiveDate::from_ymd_opt(year, month, day)?;

        let hour = cap["hour"].parse::<u32>().ok()?;
        let minute = cap["minute"].parse::<u32>().ok()?;
        let second = cap["second"].parse::<u32>().ok()?;
        let naive_time = NaiveTime::from_hms_opt(hour, minute, second)?;

        Some(DateTime::<Utc>::from_naive_utc_and_offset(NaiveDateTime::new(naive_date, naive_time), Utc))
    }
}

/// Format a timestamp as `YYYYMMDD'T'HHMMSS'Z'`.
#[inline]
pub(crate) fn format_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_COMPACT_FORMAT).to_string()
}

/// Format the date portion of a timestamp as `YYYYMMDD`.
#[inline]
pub(crate) fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(ISO8601_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use {
        super::{format_date, format_iso8601, ParseISO8601Basic},
        chrono::{DateTime, Datelike, Timelike, Utc},
    };

    #[test_log::test]
    fn check_iso8601_basic() {
        let dt = DateTime::<Utc>::parse_from_iso8601_basic("20150830T123600Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2015, 8, 30));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (12, 36, 0));
        assert_eq!(format_iso8601(&dt), "20150830T123600Z");
        assert_eq!(format_date(&dt), "20150830");
    }

    #[test_log::test]
    fn check_iso8601_error_handling() {
        for bad in [
            "",
            "blatantly-wrong",
            "2015-08-30T12:36:00Z",
            "20150830T123600",
            "20150830T123600+0000",
            "20150230T123600Z",
            "20150830T243600Z",
            " 20150830T123600Z",
        ] {
            assert!(DateTime::<Utc>::parse_from_iso8601_basic(bad).is_none(), "accepted {:?}", bad);
        }
    }
}
