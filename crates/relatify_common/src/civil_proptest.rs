#[cfg(test)]
mod tests {
    use crate::civil::CivilDate;
    use chrono::{FixedOffset, TimeZone};
    use proptest::prelude::*;

    // Every UTC offset in use today lies in -12:00..=+14:00.
    const MIN_OFFSET_MINUTES: i32 = -12 * 60;
    const MAX_OFFSET_MINUTES: i32 = 14 * 60;

    proptest! {
        // Extracting the civil day from an instant built on that day, then
        // reconstructing and re-extracting, is idempotent for every offset.
        #[test]
        fn test_from_datetime_round_trips_for_all_offsets(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            offset_minutes in MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES,
        ) {
            let civil = CivilDate::from_ymd(year, month, day).unwrap();
            let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
            let instant = offset
                .with_ymd_and_hms(year, month, day, hour, minute, 0)
                .single()
                .expect("fixed offsets have no gaps or folds");

            let extracted = CivilDate::from_datetime(&instant);
            prop_assert_eq!(extracted, civil);

            // Reconstruct from the extracted triple and extract again.
            let rebuilt = offset
                .with_ymd_and_hms(
                    extracted.year(),
                    extracted.month(),
                    extracted.day(),
                    hour,
                    minute,
                    0,
                )
                .single()
                .unwrap();
            prop_assert_eq!(CivilDate::from_datetime(&rebuilt), extracted);
        }

        // The date key parses back to the same day, under any inputs.
        #[test]
        fn test_date_key_round_trips(
            year in 1i32..3000,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let civil = CivilDate::from_ymd(year, month, day).unwrap();
            let key = civil.date_key();
            prop_assert_eq!(key.len(), 10);
            prop_assert_eq!(CivilDate::parse(&key).unwrap(), civil);
        }

        // DST transition dates are just calendar days: the UTC-offset-based
        // extraction never shifts them.
        #[test]
        fn test_dst_transition_dates_stay_put(
            offset_minutes in MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES,
            hour in 0u32..24,
        ) {
            for key in ["2024-03-10", "2024-11-03", "2024-03-31", "2024-10-27"] {
                let civil = CivilDate::parse(key).unwrap();
                let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
                let instant = offset
                    .with_ymd_and_hms(civil.year(), civil.month(), civil.day(), hour, 30, 0)
                    .single()
                    .unwrap();
                prop_assert_eq!(CivilDate::from_datetime(&instant).date_key(), key);
            }
        }
    }
}
