//! Clip window planning.

/// Time range of one clip to cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    /// Position of the onset in its table.
    pub index: usize,
    /// Start time in seconds (the onset).
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

/// Plan one window per onset.
///
/// Each window spans `clip_secs` from its onset. With `until_next` it is
/// cut short at the following onset, so that clips never overlap.
pub fn plan_windows(times: &[f64], clip_secs: f64, until_next: bool) -> Vec<ClipWindow> {
    times
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let mut end = start + clip_secs;
            if until_next
                && let Some(&next) = times.get(index + 1)
                && next > start
            {
                end = end.min(next);
            }
            ClipWindow { index, start, end }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_windows() {
        let windows = plan_windows(&[0.5, 0.8, 3.0], 1.0, false);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].end, 1.5);
        assert_eq!(windows[1].end, 1.8);
        assert_eq!(windows[2].index, 2);
    }

    #[test]
    fn test_until_next_clamps_to_following_onset() {
        let windows = plan_windows(&[0.5, 0.8, 3.0], 1.0, true);
        assert_eq!(windows[0].end, 0.8);
        assert_eq!(windows[1].end, 1.8);
        assert_eq!(windows[2].end, 4.0);
    }

    #[test]
    fn test_empty_times() {
        assert!(plan_windows(&[], 1.0, true).is_empty());
    }
}
