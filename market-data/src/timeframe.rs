//! Candle timeframes

use std::fmt;

/// Supported candle durations. Unknown labels are treated as one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    M1,
    M5,
    M15,
}

impl Timeframe {
    pub const DEFAULT_LABEL: &'static str = "1m";

    /// Map a label such as `"5m"` to a timeframe; never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "5m" => Self::M5,
            "15m" => Self::M15,
            _ => Self::M1,
        }
    }

    pub fn step_secs(self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 300,
            Self::M15 => 900,
        }
    }

    pub fn step_ms(self) -> i64 {
        self.step_secs() * 1000
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(Timeframe::from_label("1m").step_secs(), 60);
        assert_eq!(Timeframe::from_label("5m").step_secs(), 300);
        assert_eq!(Timeframe::from_label("15m").step_secs(), 900);
    }

    #[test]
    fn test_unknown_label_falls_back_to_one_minute() {
        for label in ["2h", "", "1d", "5M"] {
            assert_eq!(Timeframe::from_label(label), Timeframe::M1);
        }
        assert_eq!(Timeframe::from_label("1h").step_ms(), 60_000);
    }

    #[test]
    fn test_label_round_trip() {
        for tf in [Timeframe::M1, Timeframe::M5, Timeframe::M15] {
            assert_eq!(Timeframe::from_label(tf.label()), tf);
            assert_eq!(tf.to_string(), tf.label());
        }
    }
}
