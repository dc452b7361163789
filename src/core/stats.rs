// LogPulse - core/stats.rs
//
// Chart input derived from the latest backend stats snapshot.
// Both charts (level bars and level share) consume the same array.

use crate::core::model::{Level, StatsSnapshot};

/// One chart bar / slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDatum {
    pub name: &'static str,
    pub count: u64,
    /// RGB colour, fixed per level so both charts agree.
    pub color: [u8; 3],
}

/// Fixed colour for a level in charts and badges.
pub fn level_rgb(level: Level) -> [u8; 3] {
    match level {
        Level::Info => [59, 130, 246],  // Blue 500
        Level::Warn => [245, 158, 11],  // Amber 500
        Level::Error => [239, 68, 68],  // Red 500
    }
}

/// Build chart data from a snapshot: one entry per level, INFO, WARN, ERROR.
pub fn chart_data(stats: &StatsSnapshot) -> Vec<ChartDatum> {
    Level::all()
        .iter()
        .map(|&level| ChartDatum {
            name: level.as_str(),
            count: stats.counts.get(level),
            color: level_rgb(level),
        })
        .collect()
}

/// Fraction of the chart total each datum represents (0.0 when empty).
pub fn shares(data: &[ChartDatum]) -> Vec<f32> {
    let total: u64 = data.iter().map(|d| d.count).sum();
    if total == 0 {
        return vec![0.0; data.len()];
    }
    data.iter()
        .map(|d| d.count as f32 / total as f32)
        .collect()
}

/// Error rate for display. The backend's figure is shown as-is; it is never
/// recomputed from local records.
pub fn error_rate_label(stats: &StatsSnapshot) -> String {
    match stats.error_rate {
        Some(rate) if rate.is_finite() => format!("{rate:.1}%"),
        _ => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LevelCounts;

    fn snapshot(info: u64, warn: u64, error: u64) -> StatsSnapshot {
        StatsSnapshot {
            total: info + warn + error,
            counts: LevelCounts { info, warn, error },
            error_rate: Some(12.345),
        }
    }

    #[test]
    fn test_chart_data_order_and_counts() {
        let data = chart_data(&snapshot(5, 3, 2));
        let names: Vec<_> = data.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["INFO", "WARN", "ERROR"]);
        let counts: Vec<_> = data.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![5, 3, 2]);
        assert_eq!(data[2].color, level_rgb(Level::Error));
    }

    #[test]
    fn test_shares_handle_empty_window() {
        let data = chart_data(&StatsSnapshot::default());
        assert_eq!(shares(&data), vec![0.0, 0.0, 0.0]);

        let data = chart_data(&snapshot(1, 1, 2));
        assert_eq!(shares(&data), vec![0.25, 0.25, 0.5]);
    }

    #[test]
    fn test_error_rate_label_is_opaque() {
        assert_eq!(error_rate_label(&snapshot(1, 0, 0)), "12.3%");
        assert_eq!(error_rate_label(&StatsSnapshot::default()), "--");
    }
}
