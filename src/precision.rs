use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric precision tier, ordered from most aggressive to baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Fp4,
    Fp8,
    Fp16,
    Fp32,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fp4 => "fp4",
            Tier::Fp8 => "fp8",
            Tier::Fp16 => "fp16",
            Tier::Fp32 => "fp32",
        }
    }

    /// fp4/fp8 need specialized kernel support and are advisory labels;
    /// execution degrades to fp16 when the runtime lacks them.
    pub fn is_low_bit(&self) -> bool {
        matches!(self, Tier::Fp4 | Tier::Fp8)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static energy/performance characteristics of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierCharacteristics {
    pub power_saved_percent: f64,
    pub memory_saved_percent: f64,
    pub relative_speed: f64,
}

/// Energy metrics for one precision decision. The cumulative counter is
/// owned by the governor that produced it and only ever increases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetrics {
    pub tier: Tier,
    pub power_saved_percent: f64,
    pub memory_saved_percent: f64,
    pub relative_speed: f64,
    cumulative_energy_saved: f64,
}

impl EnergyMetrics {
    fn new(tier: Tier, chars: TierCharacteristics) -> Self {
        Self {
            tier,
            power_saved_percent: chars.power_saved_percent,
            memory_saved_percent: chars.memory_saved_percent,
            relative_speed: chars.relative_speed,
            cumulative_energy_saved: 0.0,
        }
    }

    /// Total joules accumulated against this decision.
    pub fn cumulative_energy_saved(&self) -> f64 {
        self.cumulative_energy_saved
    }

    /// Accumulate joules saved. Negative or non-finite amounts are
    /// dropped so the counter stays monotonically non-decreasing.
    pub(crate) fn add_energy_saved(&mut self, joules: f64) {
        if joules.is_finite() && joules > 0.0 {
            self.cumulative_energy_saved += joules;
        }
    }
}

/// The single score-to-tier threshold table. Boundaries are inclusive on
/// the cheaper tier; no other component duplicates these thresholds.
const TIER_TABLE: [(f64, Tier, TierCharacteristics); 4] = [
    (
        0.05,
        Tier::Fp4,
        TierCharacteristics {
            power_saved_percent: 65.0,
            memory_saved_percent: 75.0,
            relative_speed: 2.2,
        },
    ),
    (
        0.2,
        Tier::Fp8,
        TierCharacteristics {
            power_saved_percent: 55.0,
            memory_saved_percent: 60.0,
            relative_speed: 2.0,
        },
    ),
    (
        0.7,
        Tier::Fp16,
        TierCharacteristics {
            power_saved_percent: 45.0,
            memory_saved_percent: 50.0,
            relative_speed: 1.5,
        },
    ),
    (
        f64::INFINITY,
        Tier::Fp32,
        TierCharacteristics {
            power_saved_percent: 0.0,
            memory_saved_percent: 0.0,
            relative_speed: 1.0,
        },
    ),
];

/// Maps complexity scores to precision tiers.
pub struct PrecisionPolicy;

impl PrecisionPolicy {
    /// Select the most energy-efficient tier for a complexity score.
    ///
    /// Deterministic and monotonic: identical scores always yield the
    /// same tier. A non-finite score selects the fp32 baseline.
    pub fn select(score: f64) -> (Tier, EnergyMetrics) {
        if !score.is_finite() {
            let (_, tier, chars) = TIER_TABLE[TIER_TABLE.len() - 1];
            return (tier, EnergyMetrics::new(tier, chars));
        }
        let score = score.clamp(0.0, 1.0);
        for (upper, tier, chars) in TIER_TABLE {
            if score <= upper {
                return (tier, EnergyMetrics::new(tier, chars));
            }
        }
        unreachable!("tier table ends with an unbounded range")
    }

    /// Static characteristics for a tier.
    pub fn characteristics(tier: Tier) -> TierCharacteristics {
        for (_, t, chars) in TIER_TABLE {
            if t == tier {
                return chars;
            }
        }
        unreachable!("every tier appears in the table")
    }

    /// Execution fallback for tiers without native kernel support.
    /// The nominal tier and its reported savings are unchanged by this;
    /// only the requested execution mode degrades.
    pub fn degrade(tier: Tier) -> Tier {
        if tier.is_low_bit() { Tier::Fp16 } else { tier }
    }
}
