use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const SWEEP_SEEDS: u64 = 32;

/// Seed plus where it came from, for report labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    #[must_use]
    pub fn labelled(seed: u64, label: impl Into<String>) -> Self {
        Self {
            seed,
            label: Some(label.into()),
        }
    }

    /// Seed for a calendar day (`YYYYMMDD`), so a daily run replays the same questions.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        let seed = u64::try_from(date.year()).unwrap_or(0) * 10_000
            + u64::from(date.month()) * 100
            + u64::from(date.day());
        Self::labelled(seed, format!("daily {date}"))
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports decimal and `0x` hex literals, `today` for the daily seed, and
/// `sweep` which expands to seeds `1..=32`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("today") {
            pending.push(SeedInfo::for_date(Utc::now().date_naive()));
            continue;
        }

        if token.eq_ignore_ascii_case("sweep") {
            pending.extend((1..=SWEEP_SEEDS).map(SeedInfo::from_numeric));
            continue;
        }

        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            let seed = u64::from_str_radix(hex, 16)
                .with_context(|| format!("invalid hex seed: {token}"))?;
            pending.push(SeedInfo::labelled(seed, token.to_lowercase()));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|info| seen.insert(info.seed));

    if pending.is_empty() {
        pending.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn resolves_numeric_and_hex() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xFF"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![42, 7, 255]);
        assert_eq!(seeds[2].label.as_deref(), Some("0xff"));
    }

    #[test]
    fn deduplicates_and_defaults() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "5", "0x5"])).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(5)]);
        let fallback = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(fallback, vec![SeedInfo::from_numeric(1337)]);
    }

    #[test]
    fn sweep_expands_and_daily_is_dated() {
        let seeds = resolve_seed_inputs(&tokens(&["sweep"])).unwrap();
        assert_eq!(seeds.len(), 32);
        let daily = SeedInfo::for_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(daily.seed, 20_240_501);
        assert_eq!(daily.label.as_deref(), Some("daily 2024-05-01"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0xZZ"])).is_err());
    }
}
