use std::num::ParseIntError;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Score returned when a descriptor cannot be analyzed. Maps to the
/// low-complexity profile, never to an error.
pub const SAFE_DEFAULT_SCORE: f64 = 0.3;

static MATRIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,6})\s*[x×]\s*(\d{1,6})").expect("Invalid matrix regex"));
static BATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:batch[\s_-]*size|\bbs\b)\s*[:=]?\s*(\d{1,6})").expect("Invalid batch regex")
});
static VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,6})\s*(gb|mb|kb)\b").expect("Invalid volume regex"));
static ITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:iterations?|epochs?|steps?)\s*[:=]?\s*(\d{1,7})").expect("Invalid iter regex")
});
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("Invalid token regex"));

/// Operation keywords and their severity weights. The maximum matched
/// weight wins, so synonyms do not inflate the score.
static KEYWORDS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"\btrain(?:ing)?\b", 0.9),
        (r"\bbackprop\b", 0.95),
        (r"\bconvolutions?\b", 0.8),
        (r"\bfft\b", 0.7),
        (r"\brender(?:ing)?\b", 0.9),
        (r"\bray[- ]?trac(?:e|ing)\b", 1.0),
        (r"\binference\b", 0.5),
        (r"\bsimulat", 0.8),
        (r"\boptimi[sz]e\b", 0.6),
        (r"\badd\b", 0.05),
        (r"\bmean\b", 0.05),
    ]
    .iter()
    .map(|(patt, weight)| (Regex::new(patt).expect("Invalid keyword regex"), *weight))
    .collect()
});

// Signal weights, summing to 1.0.
const OP_WEIGHT: f64 = 0.5;
const SIZE_WEIGHT: f64 = 0.35;
const VOLUME_WEIGHT: f64 = 0.15;

// Saturation points for the log-scaled signals.
const MATRIX_AREA_SATURATION: f64 = 4096.0 * 4096.0;
const BATCH_SATURATION: f64 = 256.0;
const DATA_BYTES_SATURATION: f64 = 1e12;
const TOKEN_CEILING: f64 = 2000.0;
const ITERATION_CEILING: f64 = 1000.0;

/// Workload description accepted by the estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkloadDescriptor {
    /// Free-text description, scanned for size/operation/volume signals.
    Text(String),
    /// Pre-computed complexity score, clamped to [0,1].
    Score(f64),
    /// Structured hint with pre-extracted dimensions.
    Structured {
        batch_size: Option<u32>,
        matrix_dims: Option<(u32, u32)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

/// Immutable analysis result: the raw score plus the power profile
/// derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub raw_score: f64,
    /// Target power limit in watts
    pub target_power: u32,
    /// Target GPU utilization in percent
    pub target_utilization: u32,
    /// Target memory clock in MHz
    pub target_memory_clock: u32,
    /// Target core clock in MHz
    pub target_core_clock: u32,
    pub level: ComplexityLevel,
}

/// Saturating log normalization: maps [0, inf) into [0, 1], reaching 1.0
/// at the saturation point so extreme inputs do not dominate linearly.
fn norm_log(x: f64, saturation: f64) -> f64 {
    let x = x.clamp(0.0, 1e12);
    ((x + 1.0).ln() / (saturation + 1.0).ln()).min(1.0)
}

/// Estimate workload complexity in [0,1].
///
/// Pure and side-effect-free: identical descriptors always yield
/// identical scores. Malformed text never produces an error; it falls
/// back to [`SAFE_DEFAULT_SCORE`] and is logged.
pub fn estimate(descriptor: &WorkloadDescriptor) -> f64 {
    match descriptor {
        WorkloadDescriptor::Score(s) => {
            if !s.is_finite() {
                warn!("Non-finite complexity hint; using safe default");
                return SAFE_DEFAULT_SCORE;
            }
            s.clamp(0.0, 1.0)
        }
        WorkloadDescriptor::Structured {
            batch_size,
            matrix_dims,
        } => {
            let matrix_factor = matrix_dims
                .map(|(a, b)| norm_log(f64::from(a) * f64::from(b), MATRIX_AREA_SATURATION))
                .unwrap_or(0.0);
            let batch_factor = batch_size
                .map(|b| norm_log(f64::from(b), BATCH_SATURATION))
                .unwrap_or(0.0);
            (SIZE_WEIGHT * matrix_factor.max(batch_factor)).clamp(0.0, 1.0)
        }
        WorkloadDescriptor::Text(text) => match estimate_text(text) {
            Ok(score) => score,
            Err(e) => {
                warn!("Complexity analysis failed ({e}); using safe default");
                SAFE_DEFAULT_SCORE
            }
        },
    }
}

fn estimate_text(text: &str) -> Result<f64, ParseIntError> {
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    let s = text.to_lowercase();

    // Size signal: largest matrix area, data-volume token or batch size.
    let mut matrix_factor: f64 = 0.0;
    for caps in MATRIX_RE.captures_iter(&s) {
        let a: u64 = caps[1].parse()?;
        let b: u64 = caps[2].parse()?;
        matrix_factor = matrix_factor.max(norm_log((a * b) as f64, MATRIX_AREA_SATURATION));
    }
    let mut volume_bytes_factor: f64 = 0.0;
    for caps in VOLUME_RE.captures_iter(&s) {
        let n: u64 = caps[1].parse()?;
        let bytes = match &caps[2] {
            "gb" => n.saturating_mul(1024 * 1024 * 1024),
            "mb" => n.saturating_mul(1024 * 1024),
            _ => n.saturating_mul(1024),
        };
        volume_bytes_factor = volume_bytes_factor.max(norm_log(bytes as f64, DATA_BYTES_SATURATION));
    }
    let batch_factor = match BATCH_RE.captures(&s) {
        Some(caps) => norm_log(caps[1].parse::<u64>()? as f64, BATCH_SATURATION),
        None => 0.0,
    };
    let size_factor = matrix_factor.max(volume_bytes_factor).max(batch_factor);

    // Operation-keyword signal: maximum matched severity.
    let op_factor = KEYWORDS
        .iter()
        .filter(|(re, _)| re.is_match(&s))
        .map(|(_, weight)| *weight)
        .fold(0.0, f64::max);

    // Volume/iteration signal: token count or explicit counters.
    let token_factor = (TOKEN_RE.find_iter(&s).count() as f64 / TOKEN_CEILING).min(1.0);
    let iter_factor = match ITER_RE.captures(&s) {
        Some(caps) => (caps[1].parse::<u64>()? as f64 / ITERATION_CEILING).min(1.0),
        None => 0.0,
    };
    let volume_factor = token_factor.max(iter_factor);

    let final_score = OP_WEIGHT * op_factor + SIZE_WEIGHT * size_factor + VOLUME_WEIGHT * volume_factor;
    Ok(final_score.clamp(0.0, 1.0))
}

/// Estimate complexity and derive the full power profile.
pub fn score(descriptor: &WorkloadDescriptor) -> ComplexityScore {
    let raw = estimate(descriptor);
    let (level, power, util, mem_clock, core_clock) = if raw < 0.4 {
        (ComplexityLevel::Low, 80, 60, 4000, 1200)
    } else if raw < 0.7 {
        (ComplexityLevel::Medium, 150, 85, 6000, 1600)
    } else {
        (ComplexityLevel::High, 250, 100, 7500, 1900)
    };
    ComplexityScore {
        raw_score: raw,
        target_power: power,
        target_utilization: util,
        target_memory_clock: mem_clock,
        target_core_clock: core_clock,
        level,
    }
}
