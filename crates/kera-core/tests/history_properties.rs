//! Property tests for the history engine.

use kera_core::habit::history::month_history;
use kera_core::{reconstruct, untracked_history, Date, DayEdit, DayStatus, TrackedWeekDays};
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = Date> {
    (2024i32..=2026, 1u32..=12)
        .prop_flat_map(|(y, m)| {
            let days = Date::from_ymd(y, m, 1).unwrap().days_in_month();
            (Just(y), Just(m), 1..=days)
        })
        .prop_map(|(y, m, d)| Date::from_ymd(y, m, d).unwrap())
}

fn schedule_strategy() -> impl Strategy<Value = TrackedWeekDays> {
    (1u8..0b1000_0000).prop_map(|mask| TrackedWeekDays::from_bits(mask).unwrap())
}

proptest! {
    #[test]
    fn length_and_dates_follow_the_month(
        anchor in date_strategy(),
        bitmap in any::<u32>(),
        schedule in schedule_strategy(),
        start in date_strategy(),
        end in proptest::option::of(date_strategy()),
        today in date_strategy(),
    ) {
        let history = reconstruct(anchor, bitmap, &schedule, start, end, today);
        prop_assert_eq!(history.len() as u32, anchor.days_in_month());
        let first = anchor.first_of_month();
        for (i, day) in history.iter().enumerate() {
            prop_assert_eq!(day.date, first.add_days(i as i64));
        }
    }

    #[test]
    fn out_of_scope_days_are_untracked(
        anchor in date_strategy(),
        bitmap in any::<u32>(),
        schedule in schedule_strategy(),
        start in date_strategy(),
        end in proptest::option::of(date_strategy()),
        today in date_strategy(),
    ) {
        let history = reconstruct(anchor, bitmap, &schedule, start, end, today);
        for day in &history {
            if day.date < start || day.date > today || end.is_some_and(|e| day.date > e) {
                prop_assert_eq!(day.status, DayStatus::Untracked);
            }
            if !schedule.tracks(day.date) {
                prop_assert_eq!(day.status, DayStatus::Untracked);
            }
            if day.status == DayStatus::Pending {
                prop_assert_eq!(day.date, today);
            }
        }
    }

    #[test]
    fn today_without_bit_is_pending(
        today in date_strategy(),
        bitmap in any::<u32>(),
    ) {
        let bit = 1u32 << (today.day() - 1);
        let history = reconstruct(
            today,
            bitmap & !bit,
            &TrackedWeekDays::EVERY_DAY,
            today.first_of_month(),
            None,
            today,
        );
        prop_assert_eq!(history.status_on(today), Some(DayStatus::Pending));
    }

    #[test]
    fn missing_row_matches_zero_bitmap(
        anchor in date_strategy(),
        schedule in schedule_strategy(),
        start in date_strategy(),
        end in proptest::option::of(date_strategy()),
        today in date_strategy(),
    ) {
        prop_assert_eq!(
            month_history(anchor, None, &schedule, start, end, today),
            reconstruct(anchor, 0, &schedule, start, end, today)
        );
    }

    #[test]
    fn shortcut_never_changes_the_result(
        anchor in date_strategy(),
        bitmap in any::<u32>(),
        schedule in schedule_strategy(),
        start in date_strategy(),
        end in proptest::option::of(date_strategy()),
        today in date_strategy(),
    ) {
        prop_assert_eq!(
            month_history(anchor, Some(bitmap), &schedule, start, end, today),
            reconstruct(anchor, bitmap, &schedule, start, end, today)
        );
    }

    #[test]
    fn toggle_pairs_cancel(existing in proptest::option::of(any::<u32>()), day in 0u32..31) {
        let bit = 1u32 << day;
        let once = DayEdit::Toggle.apply(existing, bit);
        prop_assert_eq!(DayEdit::Toggle.apply(Some(once), bit), existing.unwrap_or(0));
    }

    #[test]
    fn month_end_today_is_pending_and_counted(year in 2024i32..=2026, month in 1u32..=12) {
        let first = Date::from_ymd(year, month, 1).unwrap();
        let today = first.last_of_month();
        let history = reconstruct(first, 0, &TrackedWeekDays::EVERY_DAY, first, None, today);
        prop_assert_eq!(history.status_on(today), Some(DayStatus::Pending));
        prop_assert_eq!(history.summary().missed + 1, first.days_in_month());
    }

    #[test]
    fn untracked_history_has_month_length(anchor in date_strategy()) {
        let history = untracked_history(anchor);
        prop_assert_eq!(history.len() as u32, anchor.days_in_month());
        prop_assert!(history.iter().all(|d| d.status == DayStatus::Untracked));
    }
}
