use chrono::NaiveTime;

/// Whole minutes between two service timestamps. Returns `None` when either
/// endpoint is missing or when end precedes start; never a negative value.
/// Formatting ("1h 30min") is left to the presentation layer.
pub fn compute_duration(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<i64> {
    let (start, end) = (start?, end?);
    if end < start {
        return None;
    }
    Some((end - start).num_minutes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn computes_whole_minutes() {
        assert_eq!(compute_duration(Some(time(9, 0)), Some(time(10, 30))), Some(90));
        assert_eq!(compute_duration(Some(time(14, 15)), Some(time(14, 15))), Some(0));
    }

    #[test]
    fn missing_endpoint_is_unavailable() {
        assert_eq!(compute_duration(None, Some(time(10, 0))), None);
        assert_eq!(compute_duration(Some(time(10, 0)), None), None);
        assert_eq!(compute_duration(None, None), None);
    }

    #[test]
    fn end_before_start_is_unavailable_never_negative() {
        assert_eq!(compute_duration(Some(time(11, 0)), Some(time(10, 0))), None);
    }
}
