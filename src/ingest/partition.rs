/// Date range partitioning for the DWR export service.
///
/// The export endpoint refuses requests spanning more than one year, so a
/// longer range is split into consecutive boundaries no more than
/// `MAX_CHUNK_DAYS` apart. Adjacent sub-ranges share their boundary date.

use chrono::{Duration, NaiveDate};

use crate::model::{DATE_FORMAT, MAX_CHUNK_DAYS, StreamflowError};

/// Parses a user-supplied date in the literal `YYYY/MM/DD` format.
///
/// The shape is checked before chrono sees the string: chrono accepts
/// unpadded fields ("2010/1/1"), which the service does not.
pub fn parse_date(input: &str) -> Result<NaiveDate, StreamflowError> {
    let invalid = || StreamflowError::InvalidDateFormat {
        input: input.to_string(),
    };

    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())
}

/// Splits `[start, end]` into boundaries at most 365 days apart.
///
/// # Errors
/// - `StreamflowError::InvalidRange` if `end < start`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use streamflow_service::ingest::partition::partition;
///
/// let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
/// assert_eq!(partition(start, end).unwrap(), vec![start, end]);
/// ```
pub fn partition(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, StreamflowError> {
    partition_with_span(start, end, MAX_CHUNK_DAYS)
}

/// Same as [`partition`] with a caller-chosen maximum span.
///
/// `span_days` is clamped to `1..=MAX_CHUNK_DAYS`.
pub fn partition_with_span(
    start: NaiveDate,
    end: NaiveDate,
    span_days: i64,
) -> Result<Vec<NaiveDate>, StreamflowError> {
    if end < start {
        return Err(StreamflowError::InvalidRange { start, end });
    }

    let step = Duration::days(span_days.clamp(1, MAX_CHUNK_DAYS));
    let mut boundaries = vec![start];

    // Always step at least once so a zero-length range still yields [start, end].
    let mut last = start;
    loop {
        match last.checked_add_signed(step) {
            // A step past `end`, or past chrono's last date, lands on `end`.
            Some(next) if next < end => {
                boundaries.push(next);
                last = next;
            }
            _ => {
                boundaries.push(end);
                break;
            }
        }
    }

    Ok(boundaries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // --- parse_date ---------------------------------------------------------

    #[test]
    fn test_parse_date_accepts_slash_format() {
        assert_eq!(parse_date("2015/10/01").unwrap(), date(2015, 10, 1));
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for input in ["2015-10-01", "10/01/2015", "2015/1/1", "2015/10/1", "", "2015/10/01 ", "x015/10/01"] {
            assert!(
                matches!(parse_date(input), Err(StreamflowError::InvalidDateFormat { .. })),
                "'{}' should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_date_rejects_impossible_calendar_dates() {
        assert!(parse_date("2015/02/30").is_err());
        assert!(parse_date("2015/13/01").is_err());
        assert!(parse_date("2016/02/29").is_ok(), "2016 is a leap year");
    }

    // --- partition: documented cases ----------------------------------------

    #[test]
    fn test_partition_exactly_one_year_is_one_chunk() {
        let bounds = partition(date(2010, 1, 1), date(2011, 1, 1)).unwrap();
        assert_eq!(bounds, vec![date(2010, 1, 1), date(2011, 1, 1)]);
    }

    #[test]
    fn test_partition_multi_year_truncates_last_segment() {
        let bounds = partition(date(2010, 1, 1), date(2012, 6, 1)).unwrap();
        assert_eq!(bounds.first(), Some(&date(2010, 1, 1)));
        assert_eq!(bounds[1], date(2011, 1, 1));
        assert_eq!(bounds.last(), Some(&date(2012, 6, 1)));
        // 2011-01-01 to 2012-06-01 is 517 days, so one more boundary is needed.
        assert_eq!(
            bounds,
            vec![date(2010, 1, 1), date(2011, 1, 1), date(2012, 1, 1), date(2012, 6, 1)]
        );
        let last_gap = (bounds[3] - bounds[2]).num_days();
        assert!(last_gap < 365, "final segment should be short, got {}", last_gap);
    }

    #[test]
    fn test_partition_zero_length_range() {
        let d = date(2015, 10, 1);
        assert_eq!(partition(d, d).unwrap(), vec![d, d]);
    }

    #[test]
    fn test_partition_rejects_reversed_range() {
        let result = partition(date(2012, 1, 1), date(2011, 1, 1));
        assert!(matches!(result, Err(StreamflowError::InvalidRange { .. })));
    }

    #[test]
    fn test_partition_one_day_range() {
        let bounds = partition(date(2015, 10, 1), date(2015, 10, 2)).unwrap();
        assert_eq!(bounds, vec![date(2015, 10, 1), date(2015, 10, 2)]);
    }

    #[test]
    fn test_partition_near_last_representable_date() {
        let start = NaiveDate::MAX.pred_opt().unwrap();
        assert_eq!(
            partition(start, NaiveDate::MAX).unwrap(),
            vec![start, NaiveDate::MAX]
        );

        let start = NaiveDate::MAX - Duration::days(500);
        let bounds = partition(start, NaiveDate::MAX).unwrap();
        assert_eq!(bounds, vec![start, start + Duration::days(365), NaiveDate::MAX]);

        let d = NaiveDate::MAX;
        assert_eq!(partition(d, d).unwrap(), vec![d, d], "no step past the last date");
    }

    #[test]
    fn test_partition_across_leap_day_uses_fixed_day_step() {
        // 2016 is a leap year: 365 days after 2016-01-01 is 2016-12-31.
        let bounds = partition(date(2016, 1, 1), date(2017, 6, 1)).unwrap();
        assert_eq!(bounds, vec![date(2016, 1, 1), date(2016, 12, 31), date(2017, 6, 1)]);
    }

    // --- partition: invariants over a sweep of ranges -----------------------

    #[test]
    fn test_partition_invariants_hold_across_many_ranges() {
        let starts = [date(1999, 12, 31), date(2010, 1, 1), date(2012, 2, 29), date(2015, 10, 1)];
        for start in starts {
            for len in [0_i64, 1, 30, 364, 365, 366, 729, 730, 731, 1000, 3650] {
                let end = start + Duration::days(len);
                let bounds = partition(start, end).unwrap();

                assert!(bounds.len() >= 2, "{}+{}: at least two boundaries", start, len);
                assert_eq!(bounds[0], start, "{}+{}: first must equal start", start, len);
                assert_eq!(*bounds.last().unwrap(), end, "{}+{}: last must equal end", start, len);

                for pair in bounds.windows(2) {
                    let gap = (pair[1] - pair[0]).num_days();
                    assert!(gap <= MAX_CHUNK_DAYS, "{}+{}: gap {} too long", start, len, gap);
                    if len > 0 {
                        assert!(gap > 0, "{}+{}: boundaries must increase", start, len);
                    }
                }
            }
        }
    }

    #[test]
    fn test_partition_with_smaller_span() {
        let bounds = partition_with_span(date(2020, 1, 1), date(2020, 3, 1), 30).unwrap();
        assert_eq!(
            bounds,
            vec![date(2020, 1, 1), date(2020, 1, 31), date(2020, 3, 1)]
        );
    }

    #[test]
    fn test_partition_span_is_clamped_to_service_limit() {
        let bounds = partition_with_span(date(2010, 1, 1), date(2012, 1, 1), 1000).unwrap();
        for pair in bounds.windows(2) {
            assert!((pair[1] - pair[0]).num_days() <= MAX_CHUNK_DAYS);
        }
    }
}
