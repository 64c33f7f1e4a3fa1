//! The bulk-synchronous round loop.
//!
//! A round is one launch on every unit, a read of every `nf_updated` flag,
//! and one [`FrontierExchange::reduce_and_broadcast`]. The loop ends on the
//! first round in which no unit discovered anything, so a graph whose
//! deepest reachable node sits at level `D` takes `D + 1` rounds.

use crate::bfs_error::BfsError;
use crate::fleet::ComputeFleet;

use super::context::OrchestratorContext;
use super::exchange::{FrontierExchange, Step};

/// Where the engine is in the traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Populated, not launched yet.
    Init,
    /// About to run round `n` (1-based).
    Round(u32),
    Converged,
}

/// Summary of a finished traversal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Launches performed, including the final idle one.
    pub rounds: u32,
    /// Level reached when the loop stopped; equals the deepest level found.
    pub final_level: u32,
    /// Sum over rounds of the busiest unit's work; zero when the fleet does
    /// not count work.
    pub critical_work: u64,
}

#[derive(Debug)]
pub struct SyncEngine<S> {
    strategy: S,
    state: EngineState,
    dirty: Vec<bool>,
    rounds: u32,
    critical_work: u64,
}

impl<S: FrontierExchange> SyncEngine<S> {
    pub fn new(strategy: S, units: u32) -> Self {
        Self {
            strategy,
            state: EngineState::Init,
            dirty: vec![false; units as usize],
            rounds: 0,
            critical_work: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run a single round. A converged engine stays converged and does not
    /// launch again.
    pub fn step<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
    ) -> Result<EngineState, BfsError> {
        let round = match self.state {
            EngineState::Converged => return Ok(EngineState::Converged),
            EngineState::Init => 1,
            EngineState::Round(n) => n,
        };
        ctx.launch()?;
        self.rounds += 1;
        if let Some(work) = ctx.fleet().launch_work() {
            let (busiest, max) = work
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|&(_, w)| w)
                .unwrap_or_default();
            self.critical_work += max;
            log::debug!(
                "round {round} (level {}): busiest unit {busiest} scanned {max} edges",
                ctx.level()
            );
        }
        let active = ctx.collect_dirty(&mut self.dirty)?;
        log::debug!(
            "round {round} (level {}): {active}/{} units discovered nodes",
            ctx.level(),
            self.dirty.len()
        );
        self.state = match self.strategy.reduce_and_broadcast(ctx, &self.dirty)? {
            Step::Converged => EngineState::Converged,
            Step::Advanced => EngineState::Round(round + 1),
        };
        Ok(self.state)
    }

    /// Step until convergence.
    pub fn run<F: ComputeFleet>(
        &mut self,
        ctx: &mut OrchestratorContext<F>,
    ) -> Result<RoundStats, BfsError> {
        while self.step(ctx)? != EngineState::Converged {}
        let stats = RoundStats {
            rounds: self.rounds,
            final_level: ctx.level(),
            critical_work: self.critical_work,
        };
        log::info!(
            "converged after {} rounds at level {}",
            stats.rounds,
            stats.final_level
        );
        Ok(stats)
    }
}
