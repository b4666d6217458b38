use pictura_core::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};

/// WebP quality in `[MIN_QUALITY, MAX_QUALITY]`. The top of the range means lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Default for Quality {
    fn default() -> Self {
        Quality(DEFAULT_QUALITY)
    }
}

impl Quality {
    /// Clamp any numeric value into the accepted range.
    pub fn new(value: i64) -> Self {
        let clamped = value.clamp(MIN_QUALITY as i64, MAX_QUALITY as i64);
        if clamped != value {
            tracing::warn!(
                requested = value,
                applied = clamped,
                "Quality out of range, clamping"
            );
        }
        Quality(clamped as u8)
    }

    /// Interpret a raw form value. Absent, blank and non-numeric input fall
    /// back to `default`; numeric input is clamped.
    pub fn from_param(raw: Option<&str>, default: Quality) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return default;
        };

        if let Ok(value) = raw.parse::<i64>() {
            return Quality::new(value);
        }

        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Quality::new(value.round() as i64),
            _ => {
                tracing::debug!(raw = %raw, "Unparseable quality, using default");
                default
            }
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lossless(self) -> bool {
        self.0 == MAX_QUALITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_or_garbage_uses_default() {
        let default = Quality::default();
        assert_eq!(Quality::from_param(None, default).value(), 85);
        assert_eq!(Quality::from_param(Some(""), default).value(), 85);
        assert_eq!(Quality::from_param(Some("high"), default).value(), 85);
        assert_eq!(Quality::from_param(Some("NaN"), default).value(), 85);
    }

    #[test]
    fn test_in_range_values_pass_through() {
        let default = Quality::default();
        assert_eq!(Quality::from_param(Some("50"), default).value(), 50);
        assert_eq!(Quality::from_param(Some(" 72 "), default).value(), 72);
        assert_eq!(Quality::from_param(Some("90.4"), default).value(), 90);
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let default = Quality::default();
        assert_eq!(Quality::from_param(Some("10"), default).value(), 50);
        assert_eq!(Quality::from_param(Some("-3"), default).value(), 50);
        assert_eq!(Quality::from_param(Some("150"), default).value(), 100);
    }

    #[test]
    fn test_lossless_only_at_maximum() {
        for q in 50..=99 {
            assert!(!Quality::new(q).is_lossless(), "quality {q} must be lossy");
        }
        assert!(Quality::new(100).is_lossless());
        assert!(Quality::new(250).is_lossless());
    }
}
