pub mod null;
pub mod software;

use log::warn;

use crate::precision::Tier;

pub use null::NullRuntime;
pub use software::SoftwareRuntime;

/// Capability contract for the numeric execution mode of a compute
/// runtime. Selected at construction time; the governor never probes
/// for support at decision time beyond `supports`.
pub trait PrecisionRuntime: Send + 'static {
    /// Whether the runtime has native kernels for this tier.
    fn supports(&self, tier: Tier) -> bool;

    /// Switch the runtime into the given execution mode.
    fn enter(&mut self, tier: Tier) -> Result<(), String>;

    /// Restore a previously active execution mode.
    fn exit(&mut self, prior: Tier);

    /// The currently active execution mode.
    fn current(&self) -> Tier;

    /// Free cached allocations held for mode switching.
    fn release(&mut self) {}
}

/// Scoped execution-mode handle.
///
/// Entering switches the runtime to the requested mode; dropping
/// restores the prior mode on every exit path, including panics of the
/// wrapped workload. When the switch itself fails the context stays on
/// the prior mode and the workload runs at baseline.
pub struct ExecutionContext<'a, R: PrecisionRuntime> {
    runtime: &'a mut R,
    prior: Tier,
    nominal: Tier,
    active: Tier,
}

impl<'a, R: PrecisionRuntime> ExecutionContext<'a, R> {
    pub(crate) fn enter(runtime: &'a mut R, nominal: Tier, mode: Tier) -> Self {
        let prior = runtime.current();
        let active = match runtime.enter(mode) {
            Ok(()) => mode,
            Err(e) => {
                warn!("Failed to enter {mode} execution mode ({e}); staying on {prior}");
                prior
            }
        };
        Self {
            runtime,
            prior,
            nominal,
            active,
        }
    }

    /// The tier the policy selected and whose savings are reported.
    pub fn nominal_tier(&self) -> Tier {
        self.nominal
    }

    /// The execution mode actually in effect, after any fallback.
    pub fn active_tier(&self) -> Tier {
        self.active
    }
}

impl<R: PrecisionRuntime> Drop for ExecutionContext<'_, R> {
    fn drop(&mut self) {
        self.runtime.exit(self.prior);
    }
}
