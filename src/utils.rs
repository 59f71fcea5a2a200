/// `MM:SS` below one hour, `H:MM:SS` from there on.
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Usable width of the terminal, falling back to 80 columns.
pub fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// `[#####.....]` bar of `width` cells (brackets included) filled to `percent`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let inner = width.saturating_sub(2).max(1);
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * inner as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(inner - filled))
}

/// Weight without a trailing `.0` for whole numbers.
pub fn format_weight(weight: f32) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{:.1}", weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formats() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3600), "1:00:00");
        assert_eq!(format_elapsed(3 * 3600 + 7 * 60 + 9), "3:07:09");
    }

    #[test]
    fn bars() {
        assert_eq!(progress_bar(0.0, 12), "[..........]");
        assert_eq!(progress_bar(50.0, 12), "[#####.....]");
        assert_eq!(progress_bar(100.0, 12), "[##########]");
        assert_eq!(progress_bar(250.0, 6), "[####]");
    }

    #[test]
    fn weights() {
        assert_eq!(format_weight(50.0), "50");
        assert_eq!(format_weight(22.5), "22.5");
    }
}
