//! Shareable result text.

use chrono::NaiveDate;

/// Clock-style `m:ss`.
pub fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Compact `1m 5s` form for summaries.
pub fn format_elapsed(total_secs: u64) -> String {
    let (m, s) = (total_secs / 60, total_secs % 60);
    match (m, s) {
        (0, s) => format!("{}s", s),
        (m, 0) => format!("{}m", m),
        (m, s) => format!("{}m {}s", m, s),
    }
}

/// Streak figures printed under the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakLine {
    pub current: u32,
    pub longest: Option<u32>,
}

/// Plain-text result: title and date, time, optional streak, challenge link.
pub fn build_share_text(
    title: &str,
    day: NaiveDate,
    elapsed_secs: u64,
    assisted: bool,
    streak: Option<StreakLine>,
    site_url: &str,
) -> String {
    let mut lines = vec![
        format!("{} - {}", title, day),
        format!(
            "Time: {}{}",
            format_clock(elapsed_secs),
            if assisted { " (assisted)" } else { "" }
        ),
    ];
    if let Some(streak) = streak {
        let longest = streak
            .longest
            .map(|n| format!(" (Longest: {})", n))
            .unwrap_or_default();
        lines.push(format!("Streak: {}{}", streak.current, longest));
    }
    let url = format!("{}/play/{}", site_url.trim_end_matches('/'), day);
    format!("{}\n\nCan you beat this time? {}", lines.join("\n"), url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 27).unwrap()
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(42), "42s");
        assert_eq!(format_elapsed(120), "2m");
        assert_eq!(format_elapsed(65), "1m 5s");
        assert_eq!(format_clock(65), "1:05");
    }

    #[test]
    fn test_share_text_clean() {
        let text = build_share_text(
            "Mini Crossword",
            day(),
            83,
            false,
            Some(StreakLine {
                current: 3,
                longest: Some(5),
            }),
            "https://mini.example/",
        );
        assert_eq!(
            text,
            "Mini Crossword - 2025-09-27\nTime: 1:23\nStreak: 3 (Longest: 5)\n\n\
             Can you beat this time? https://mini.example/play/2025-09-27"
        );
    }

    #[test]
    fn test_share_text_marks_assisted() {
        let text = build_share_text("Mini", day(), 5, true, None, "");
        assert!(text.contains("Time: 0:05 (assisted)"));
        assert!(!text.contains("Streak"));
        assert!(text.ends_with("/play/2025-09-27"));
    }
}
