//! Rendering of second counts in finding details.

/// Renders a duration in the largest unit that divides it evenly, so policy
/// margins read naturally ("20 days", "6 hours") while odd values stay
/// exact ("90 seconds").
pub(crate) fn human_duration(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 3_600;
    const DAY: u64 = 86_400;

    let (quantity, unit) = if secs >= DAY && secs % DAY == 0 {
        (secs / DAY, "day")
    } else if secs >= HOUR && secs % HOUR == 0 {
        (secs / HOUR, "hour")
    } else if secs >= MINUTE && secs % MINUTE == 0 {
        (secs / MINUTE, "minute")
    } else {
        (secs, "second")
    };
    if quantity == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", quantity, unit)
    }
}
