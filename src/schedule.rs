// Lecture unlocking against the authoritative server time. Callers must
// pass lists pre-sorted by lecture sequence; nothing here re-sorts.

use chrono::{DateTime, Utc};

use crate::models::ChallengeLecture;

/// Date-portion-only comparison (UTC calendar date), time of day ignored.
pub fn is_same_calendar_day(open_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    open_at.date_naive() == now.date_naive()
}

/// Inclusive boundary: a lecture opens the instant `now` reaches `open_at`.
pub fn is_open(open_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= open_at
}

/// Index of the lecture whose open date is today's calendar date, if any.
/// Call sites fall back to the first lecture when this returns `None`.
pub fn today_index(lectures: &[ChallengeLecture], now: DateTime<Utc>) -> Option<usize> {
    debug_assert_sorted(lectures);
    lectures
        .iter()
        .position(|cl| is_same_calendar_day(cl.open_at, now))
}

/// One flag per lecture, in input order.
pub fn unlocked_flags(lectures: &[ChallengeLecture], now: DateTime<Utc>) -> Vec<bool> {
    lectures.iter().map(|cl| is_open(cl.open_at, now)).collect()
}

/// The "current" lecture: last unlocked one in sequence order, or the first
/// lecture when none are unlocked yet. `None` only for an empty list, so a
/// non-empty classroom always resolves to some lecture.
pub fn current_index(lectures: &[ChallengeLecture], now: DateTime<Utc>) -> Option<usize> {
    debug_assert_sorted(lectures);
    if lectures.is_empty() {
        return None;
    }
    Some(
        lectures
            .iter()
            .rposition(|cl| is_open(cl.open_at, now))
            .unwrap_or(0),
    )
}

fn debug_assert_sorted(lectures: &[ChallengeLecture]) {
    debug_assert!(
        lectures
            .windows(2)
            .all(|w| w[0].lecture.sequence < w[1].lecture.sequence),
        "challenge lectures must be pre-sorted by sequence"
    );
}
