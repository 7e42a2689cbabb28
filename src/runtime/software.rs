use log::info;

use crate::precision::Tier;
use crate::runtime::PrecisionRuntime;

/// Autocast-style software runtime: native fp16 and fp32 execution,
/// no low-bit kernels. Mode switches cache a small workspace that
/// `release` frees again.
#[derive(Debug)]
pub struct SoftwareRuntime {
    current: Tier,
    transitions: u64,
    cached_workspaces: usize,
}

impl SoftwareRuntime {
    pub fn new() -> Self {
        Self {
            current: Tier::Fp32,
            transitions: 0,
            cached_workspaces: 0,
        }
    }

    /// Number of mode transitions performed, entries and exits both.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn cached_workspaces(&self) -> usize {
        self.cached_workspaces
    }
}

impl Default for SoftwareRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecisionRuntime for SoftwareRuntime {
    fn supports(&self, tier: Tier) -> bool {
        matches!(tier, Tier::Fp16 | Tier::Fp32)
    }

    fn enter(&mut self, tier: Tier) -> Result<(), String> {
        if !self.supports(tier) {
            return Err(format!("No native {tier} kernels in software runtime"));
        }
        if tier != self.current {
            self.transitions += 1;
            self.cached_workspaces += 1;
        }
        self.current = tier;
        Ok(())
    }

    fn exit(&mut self, prior: Tier) {
        if prior != self.current {
            self.transitions += 1;
        }
        self.current = prior;
    }

    fn current(&self) -> Tier {
        self.current
    }

    fn release(&mut self) {
        if self.cached_workspaces > 0 {
            info!("Releasing {} cached precision workspaces", self.cached_workspaces);
        }
        self.cached_workspaces = 0;
    }
}
