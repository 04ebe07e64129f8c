//! Detection and quantitation limits from signal-to-noise

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::criteria::{EvaluationRecord, Metric};
use crate::core::rounding::{truncate, RATIO_DIGITS};

/// Which limit a low-level injection was prepared to demonstrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitRole {
    Lod,
    Loq,
}

impl std::fmt::Display for LimitRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitRole::Lod => write!(f, "lod"),
            LimitRole::Loq => write!(f, "loq"),
        }
    }
}

/// Signal and baseline noise read from one low-level injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalNoise {
    pub label: String,

    /// Limit this injection is judged against; blank judges both
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<LimitRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<LimitRole>,
    pub signal: Option<Decimal>,
    pub noise: Option<Decimal>,
    pub sn_ratio: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub injections: Vec<SensitivityRow>,
    pub records: Vec<EvaluationRecord>,
}

/// `trunc(signal / noise, 1)`
pub fn signal_to_noise(signal: Option<Decimal>, noise: Option<Decimal>) -> Option<Decimal> {
    let ratio = signal?.checked_div(noise?)?;
    Some(truncate(ratio, RATIO_DIGITS))
}

impl SensitivityResult {
    /// Judge each injection against its own limit, or both when untagged
    pub fn evaluate(injections: &[SignalNoise]) -> Self {
        let mut rows = Vec::with_capacity(injections.len());
        let mut records = Vec::with_capacity(injections.len() * 2);

        for inj in injections {
            let sn = signal_to_noise(inj.signal, inj.noise);
            if inj.role != Some(LimitRole::Loq) {
                records.extend(EvaluationRecord::canonical(
                    format!("{} LOD", inj.label),
                    Metric::LodSignalToNoise,
                    sn,
                ));
            }
            if inj.role != Some(LimitRole::Lod) {
                records.extend(EvaluationRecord::canonical(
                    format!("{} LOQ", inj.label),
                    Metric::LoqSignalToNoise,
                    sn,
                ));
            }
            rows.push(SensitivityRow {
                label: inj.label.clone(),
                role: inj.role,
                signal: inj.signal,
                noise: inj.noise,
                sn_ratio: sn,
            });
        }

        Self {
            injections: rows,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::Verdict;
    use rust_decimal_macros::dec;

    fn sn(signal: Option<Decimal>, noise: Option<Decimal>) -> SignalNoise {
        SignalNoise {
            label: "1%".to_string(),
            role: None,
            signal,
            noise,
        }
    }

    #[test]
    fn test_ratio_three_passes_lod_only() {
        let result = SensitivityResult::evaluate(&[sn(Some(dec!(30)), Some(dec!(10)))]);
        assert_eq!(result.injections[0].sn_ratio, Some(dec!(3.0)));
        assert_eq!(result.records[0].metric, Metric::LodSignalToNoise);
        assert_eq!(result.records[0].verdict, Verdict::Pass);
        assert_eq!(result.records[1].metric, Metric::LoqSignalToNoise);
        assert_eq!(result.records[1].verdict, Verdict::Fail);
    }

    #[test]
    fn test_tagged_injections_meet_their_own_limit() {
        let injections = [
            SignalNoise {
                label: "LOD 1%".to_string(),
                role: Some(LimitRole::Lod),
                signal: Some(dec!(35)),
                noise: Some(dec!(10)),
            },
            SignalNoise {
                label: "LOQ 3%".to_string(),
                role: Some(LimitRole::Loq),
                signal: Some(dec!(120)),
                noise: Some(dec!(10)),
            },
        ];
        let result = SensitivityResult::evaluate(&injections);
        let labels: Vec<&str> = result.records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["LOD 1% LOD", "LOQ 3% LOQ"]);
        assert!(result.records.iter().all(|r| r.verdict == Verdict::Pass));
        assert_eq!(result.injections[0].role, Some(LimitRole::Lod));
    }

    #[test]
    fn test_role_parses_from_yaml() {
        let inj: SignalNoise =
            serde_yml::from_str("{ label: \"3%\", role: loq, signal: 99, noise: 10 }").unwrap();
        assert_eq!(inj.role, Some(LimitRole::Loq));
        let result = SensitivityResult::evaluate(&[inj]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].metric, Metric::LoqSignalToNoise);
        assert_eq!(result.records[0].verdict, Verdict::Fail);
    }

    #[test]
    fn test_ratio_is_truncated() {
        assert_eq!(signal_to_noise(Some(dec!(29.99)), Some(dec!(10))), Some(dec!(2.9)));
        assert_eq!(signal_to_noise(Some(dec!(105)), Some(dec!(10))), Some(dec!(10.5)));
    }

    #[test]
    fn test_zero_or_blank_noise_is_indeterminate() {
        assert_eq!(signal_to_noise(Some(dec!(30)), Some(Decimal::ZERO)), None);
        let result = SensitivityResult::evaluate(&[sn(Some(dec!(30)), None)]);
        assert!(result
            .records
            .iter()
            .all(|r| r.verdict == Verdict::Indeterminate));
    }
}
