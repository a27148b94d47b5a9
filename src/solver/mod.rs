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

//! The step-to-endpoint contract shared by every solver.

pub mod dopri5;
pub mod rk4;

pub use dopri5::Dopri5Solver;
pub use rk4::Rk4Solver;

use crate::error::CoreError;
use crate::ode::{OdeInstance, OdeSystem};

/// A solver that advances an [`OdeInstance`] from its current time toward a
/// caller-specified endpoint.
///
/// A solver owns scratch buffers sized to the ODE it is bound to, and may
/// cache state across calls (e.g. a trial step size). It never owns the
/// ODE itself: both are borrowed for the duration of one call.
pub trait Solver<S: OdeSystem> {
    /// Bind this solver to an ODE of a given dimension, (re)allocating
    /// scratch space as needed. Rebinding to the same dimension as last
    /// time is a no-op; rebinding to a different dimension discards and
    /// reallocates scratch and resets any persistent step-size state.
    fn bind(&mut self, ode: &OdeInstance<S>) -> Result<(), CoreError>;

    /// Advance `ode` from its current time to `t_target`, mutating `ode.t`
    /// and `ode.x` in place. On success, `ode.t == t_target`. On failure,
    /// `ode.t`/`ode.x` must be considered indeterminate.
    fn step(&mut self, ode: &mut OdeInstance<S>, t_target: f64) -> Result<(), CoreError>;
}

/// Internal cap on sub-steps within a single `step` call, shared by every
/// solver.
pub(crate) const MAX_SUBSTEPS: u64 = 1_000_000_000;

/// The sign of travel from `t` to `t_target`: `+1.0` forward, `-1.0`
/// backward. `t_target == t` is treated as forward, matching the reference
/// (`t_end > *t ? 1 : -1`); the portrait driver never calls `step` with
/// `t_target == ode.t` in practice since it validates `t_step > 0` first.
pub(crate) fn direction(t: f64, t_target: f64) -> f64 {
    if t_target > t {
        1.0
    } else {
        -1.0
    }
}
