//! Display formatting for token figures

/// Sparkline glyphs from lowest to highest
const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format a USD amount the way the token rows show it
///
/// Sub-cent prices keep enough decimals to be readable; large values are
/// abbreviated to K/M.
pub fn format_usd(value: f64) -> String {
    if value < 0.000001 {
        format!("${:.10}", value)
    } else if value < 0.001 {
        format!("${:.8}", value)
    } else if value > 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value > 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.4}", value)
    }
}

/// Signed percentage with one decimal
pub fn format_pct(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// Render sparkline values in [0, 100] as block glyphs
pub fn render_sparkline(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| {
            let clamped = v.clamp(0.0, 100.0);
            let idx = ((clamped / 100.0) * (SPARK_GLYPHS.len() - 1) as f64).round() as usize;
            SPARK_GLYPHS[idx.min(SPARK_GLYPHS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd_tiers() {
        assert_eq!(format_usd(0.0000005), "$0.0000005000");
        assert_eq!(format_usd(0.00012345), "$0.00012345");
        assert_eq!(format_usd(1_500_000.0), "$1.50M");
        assert_eq!(format_usd(52_340.0), "$52.3K");
        assert_eq!(format_usd(12.5), "$12.5000");
    }

    #[test]
    fn test_format_usd_boundaries() {
        // exactly 1000 and 1M fall through to the lower tier
        assert_eq!(format_usd(1_000.0), "$1000.0000");
        assert_eq!(format_usd(1_000_000.0), "$1000.0K");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(12.345), "+12.3%");
        assert_eq!(format_pct(-4.0), "-4.0%");
        assert_eq!(format_pct(0.0), "+0.0%");
    }

    #[test]
    fn test_render_sparkline() {
        assert_eq!(render_sparkline(&[0.0, 100.0]), "▁█");
        assert_eq!(render_sparkline(&[150.0, -3.0]), "█▁");
        assert_eq!(render_sparkline(&[50.0; 15]).chars().count(), 15);
    }
}
