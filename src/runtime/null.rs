use crate::precision::Tier;
use crate::runtime::PrecisionRuntime;

/// Runtime adapter for environments without any mode switching.
/// Everything executes at the fp32 baseline.
#[derive(Debug, Default)]
pub struct NullRuntime;

impl NullRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl PrecisionRuntime for NullRuntime {
    fn supports(&self, tier: Tier) -> bool {
        tier == Tier::Fp32
    }

    fn enter(&mut self, tier: Tier) -> Result<(), String> {
        if tier == Tier::Fp32 {
            Ok(())
        } else {
            Err(format!("NullRuntime cannot execute in {tier}"))
        }
    }

    fn exit(&mut self, _prior: Tier) {}

    fn current(&self) -> Tier {
        Tier::Fp32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_runtime_baseline_only() {
        let mut rt = NullRuntime::new();
        assert!(rt.supports(Tier::Fp32));
        assert!(!rt.supports(Tier::Fp16));
        assert!(!rt.supports(Tier::Fp4));
        assert!(rt.enter(Tier::Fp32).is_ok());
        assert!(rt.enter(Tier::Fp16).is_err());
        assert_eq!(rt.current(), Tier::Fp32);
    }
}
