// dynsys-core - A numerical engine for integrating ODE trajectories
// Copyright (C) 2021 Julian Jeggle, Raphael Wittkowski

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Jobs: the outer loop that drives a bound (solver, ODE) pair to produce an
//! artifact.

pub mod portrait;

pub use portrait::Portrait;

use std::io;

use crate::argument::ArgValues;
use crate::error::CoreError;
use crate::ode::{OdeInstance, OdeSystem};
use crate::solver::Solver;

/// A job is invoked with a bound `(ode, solver)` pair and a populated
/// argument set, and reports its own progress as it runs.
pub trait Job<S: OdeSystem, Sv: Solver<S>> {
    fn run(
        &self,
        ode: &mut OdeInstance<S>,
        solver: &mut Sv,
        args: &ArgValues,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), CoreError>;
}

/// A monotone integer-percentage progress stream. One line per call,
/// flushed immediately.
pub trait ProgressSink {
    fn report(&mut self, percent: u32) -> io::Result<()>;
}

impl<W: io::Write> ProgressSink for W {
    fn report(&mut self, percent: u32) -> io::Result<()> {
        writeln!(self, "{}", percent)?;
        self.flush()
    }
}

/// A [`ProgressSink`] that records every value reported, for tests that
/// check monotonicity without touching stdout.
#[derive(Default)]
pub struct RecordingProgress {
    pub values: Vec<u32>,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, percent: u32) -> io::Result<()> {
        self.values.push(percent);
        Ok(())
    }
}
