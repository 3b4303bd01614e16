//! Virtual-user profiles
//!
//! A profile answers one question for the executor: how many virtual users
//! should be running `elapsed` into the test.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use shopcheck_common::{CheckError, CheckResult};

/// One ramp: move linearly to `target` VUs over `duration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub target: usize,
}

impl Stage {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }

    /// Build from a duration string such as `"2m"`
    pub fn parse(duration: &str, target: usize) -> CheckResult<Self> {
        Ok(Self::new(parse_duration(duration)?, target))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadProfile {
    /// A fixed number of VUs for the whole duration
    Constant {
        vus: usize,
        #[serde(with = "duration_ms")]
        duration: Duration,
    },
    /// Stages ramping from zero VUs
    Ramping { stages: Vec<Stage> },
}

impl LoadProfile {
    pub fn constant(vus: usize, duration: Duration) -> Self {
        LoadProfile::Constant { vus, duration }
    }

    pub fn ramping(stages: Vec<Stage>) -> Self {
        LoadProfile::Ramping { stages }
    }

    pub fn total_duration(&self) -> Duration {
        match self {
            LoadProfile::Constant { duration, .. } => *duration,
            LoadProfile::Ramping { stages } => stages
                .iter()
                .fold(Duration::ZERO, |total, s| total.saturating_add(s.duration)),
        }
    }

    pub fn max_vus(&self) -> usize {
        match self {
            LoadProfile::Constant { vus, .. } => *vus,
            LoadProfile::Ramping { stages } => stages.iter().map(|s| s.target).max().unwrap_or(0),
        }
    }

    /// VUs that should be active at `elapsed`.
    ///
    /// Ramping interpolates linearly from the previous stage's target (zero
    /// for the first stage) and rounds to the nearest VU. Past the end the
    /// constant profile is at zero and a ramping profile stays at its last
    /// target.
    pub fn target_at(&self, elapsed: Duration) -> usize {
        match self {
            LoadProfile::Constant { vus, duration } => {
                if elapsed < *duration {
                    *vus
                } else {
                    0
                }
            }
            LoadProfile::Ramping { stages } => {
                let mut from = 0usize;
                let mut stage_start = Duration::ZERO;
                for stage in stages {
                    let stage_end = stage_start.saturating_add(stage.duration);
                    if elapsed < stage_end {
                        let progress =
                            (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                        let vus = from as f64 + (stage.target as f64 - from as f64) * progress;
                        return vus.round().max(0.0) as usize;
                    }
                    from = stage.target;
                    stage_start = stage_end;
                }
                from
            }
        }
    }

    pub fn validate(&self) -> CheckResult<()> {
        if self.total_duration().is_zero() {
            return Err(CheckError::Load("profile has zero duration".to_string()));
        }
        if self.max_vus() == 0 {
            return Err(CheckError::Load("profile never starts a virtual user".to_string()));
        }
        Ok(())
    }
}

/// Parse durations like `30s`, `2m`, `1h`, `500ms` or `1m30s`
pub fn parse_duration(input: &str) -> CheckResult<Duration> {
    let invalid = || CheckError::InvalidConfig(format!("invalid duration '{}'", input));

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Some(Duration::from_millis(value)),
            "s" => Some(Duration::from_secs(value)),
            "m" => value.checked_mul(60).map(Duration::from_secs),
            "h" => value.checked_mul(3600).map(Duration::from_secs),
            _ => return Err(invalid()),
        };
        total = part
            .and_then(|part| total.checked_add(part))
            .ok_or_else(invalid)?;
        rest = &rest[unit_len..];
    }
    Ok(total)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("30s", 30_000 ; "seconds")]
    #[test_case("2m", 120_000 ; "minutes")]
    #[test_case("1h", 3_600_000 ; "hours")]
    #[test_case("500ms", 500 ; "millis")]
    #[test_case("1m30s", 90_000 ; "compound")]
    fn test_parse_duration(input: &str, millis: u64) {
        assert_eq!(parse_duration(input).unwrap(), Duration::from_millis(millis));
    }

    #[test_case("" ; "empty")]
    #[test_case("30" ; "no unit")]
    #[test_case("s" ; "no number")]
    #[test_case("3d" ; "unknown unit")]
    #[test_case("6000000000000000000h" ; "hours overflow")]
    #[test_case("18446744073709551615s1s" ; "sum overflow")]
    fn test_parse_duration_rejects(input: &str) {
        assert!(parse_duration(input).is_err());
    }

    fn spike() -> LoadProfile {
        LoadProfile::ramping(vec![
            Stage::parse("10s", 100).unwrap(),
            Stage::parse("1m", 100).unwrap(),
            Stage::parse("10s", 500).unwrap(),
            Stage::parse("10s", 0).unwrap(),
        ])
    }

    #[test]
    fn test_ramping_interpolates() {
        let profile = spike();
        assert_eq!(profile.total_duration(), Duration::from_secs(90));
        assert_eq!(profile.max_vus(), 500);

        assert_eq!(profile.target_at(Duration::ZERO), 0);
        assert_eq!(profile.target_at(Duration::from_secs(5)), 50);
        assert_eq!(profile.target_at(Duration::from_secs(30)), 100);
        assert_eq!(profile.target_at(Duration::from_secs(75)), 300);
        assert_eq!(profile.target_at(Duration::from_secs(85)), 250);
        assert_eq!(profile.target_at(Duration::from_secs(120)), 0);
    }

    #[test]
    fn test_constant_profile() {
        let profile = LoadProfile::constant(10, Duration::from_secs(30));
        assert_eq!(profile.target_at(Duration::from_secs(29)), 10);
        assert_eq!(profile.target_at(Duration::from_secs(30)), 0);
        assert!(profile.validate().is_ok());
        assert!(LoadProfile::constant(0, Duration::from_secs(1)).validate().is_err());
        assert!(LoadProfile::ramping(vec![]).validate().is_err());
    }
}
