use std::time::Duration;

/// Number of hash workers to use when none is configured.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(1)
}

pub fn format_human_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    match (hours, minutes) {
        (0, 0) => format!("{seconds}.{millis:03} seconds"),
        (0, _) => format!("{minutes}:{seconds:02}.{millis:03} (m:ss.mmm)"),
        _ => format!("{hours}:{minutes:02}:{seconds:02}.{millis:03} (h:mm:ss.mmm)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_workers_has_floor() {
        assert!(available_workers() >= 1);
    }

    #[test]
    fn test_format_human_elapsed() {
        assert_eq!(format_human_elapsed(Duration::from_millis(2_050)), "2.050 seconds");
        assert_eq!(
            format_human_elapsed(Duration::from_millis(61_007)),
            "1:01.007 (m:ss.mmm)"
        );
        assert_eq!(
            format_human_elapsed(Duration::from_secs(3_725)),
            "1:02:05.000 (h:mm:ss.mmm)"
        );
    }
}
