//! Module interfaces and scheduling
//!
//! Each cyclic module in `ik_exec` (the controller and the target sampler)
//! implements `State`, and is ticked at its own rate by a loop driven with a
//! `CycleTimer`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;
use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation, usually the parameter file name.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for one tick.
    type InputData;
    /// Data produced by one tick.
    type OutputData;
    /// A report on what happened during the tick.
    type StatusReport;
    /// An error which can occur during a tick.
    type ProcError;

    /// Load parameters and open archives. The session gives the archive root.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one tick of the module.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Run one tick, logging a warning named after `module_name` instead of
    /// returning the error. A failed tick must not stop the calling loop.
    fn proc_or_warn(
        &mut self,
        input_data: &Self::InputData,
        module_name: &str,
    ) -> Option<(Self::OutputData, Self::StatusReport)>
    where
        Self::ProcError: Display,
    {
        match self.proc(input_data) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("Error during {} processing: {}", module_name, e);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SCHEDULING
// ---------------------------------------------------------------------------

/// Keeps a loop running at a fixed period.
///
/// Call `start` at the top of each cycle and `end_and_sleep` at the bottom.
#[derive(Debug, Clone, Copy)]
pub struct CycleTimer {
    period: Duration,
    cycle_start: Instant,
}

/// How a cycle finished relative to its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    /// The cycle finished early, with this much of the period left.
    OnTime(Duration),

    /// The cycle took longer than the period, by this much.
    Overrun(Duration),
}

impl CycleTimer {
    /// Create a timer for a loop at `frequency_hz`, which must be positive and
    /// finite.
    pub fn from_frequency_hz(frequency_hz: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / frequency_hz),
            cycle_start: Instant::now(),
        }
    }

    /// Target period of one cycle.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Mark the start of a cycle.
    pub fn start(&mut self) {
        self.cycle_start = Instant::now();
    }

    /// Compare the time since `start` with the period.
    pub fn end(&self) -> CycleEnd {
        let elapsed = self.cycle_start.elapsed();

        match self.period.checked_sub(elapsed) {
            Some(d) => CycleEnd::OnTime(d),
            None => CycleEnd::Overrun(elapsed - self.period),
        }
    }

    /// As `end`, then sleep out the rest of the period if there is any.
    pub fn end_and_sleep(&self) -> CycleEnd {
        let end = self.end();

        if let CycleEnd::OnTime(d) = end {
            thread::sleep(d);
        }

        end
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
