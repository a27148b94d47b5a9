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

//! The ODE instance: state vector, parameter vector, current time, and the
//! right-hand-side function that evolves them.

use crate::error::CoreError;

/// A right-hand-side function `f(t, x; p)` for a system of ODEs.
///
/// Implementations must be pure with respect to `t` and `x`: stages of a
/// single solver step evaluate `rhs` at intermediate points that are not
/// necessarily the instance's current `t`/`x`, and must not observe or
/// mutate anything but the arguments they are given.
pub trait OdeSystem {
    /// Dimension of the state vector `x`. Immutable for the lifetime of the
    /// value.
    fn x_dim(&self) -> usize;

    /// Dimension of the parameter vector `p`. Immutable for the lifetime of
    /// the value.
    fn p_dim(&self) -> usize;

    /// Evaluate the derivative at `(t, x)` given the current parameters
    /// `p`, writing the result into `dxdt`. Must not allocate and must not
    /// retain `x`, `p` or `dxdt` beyond the call.
    fn rhs(&self, t: f64, x: &[f64], p: &[f64], dxdt: &mut [f64]);
}

/// An ODE bound to a concrete state: current time `t`, state vector `x`,
/// and parameter vector `p`, plus the [`OdeSystem`] that evaluates `f`.
///
/// `x` and `p` are disjoint allocations owned exclusively by this instance;
/// a solver borrows it for the duration of one `step` call and never keeps
/// a reference to its contents afterwards.
pub struct OdeInstance<S: OdeSystem> {
    system: S,
    t: f64,
    x: Vec<f64>,
    p: Vec<f64>,
}

impl<S: OdeSystem> OdeInstance<S> {
    /// Create a new ODE instance with the given initial time, state and
    /// parameters. `x0.len()` and `p0.len()` must match `system.x_dim()`
    /// and `system.p_dim()`.
    pub fn new(system: S, t0: f64, x0: Vec<f64>, p0: Vec<f64>) -> Result<Self, CoreError> {
        if x0.len() != system.x_dim() {
            return Err(CoreError::configuration(format!(
                "initial state has {} component(s), expected {}",
                x0.len(),
                system.x_dim()
            )));
        }
        if p0.len() != system.p_dim() {
            return Err(CoreError::configuration(format!(
                "parameter vector has {} component(s), expected {}",
                p0.len(),
                system.p_dim()
            )));
        }
        Ok(OdeInstance {
            system,
            t: t0,
            x: x0,
            p: p0,
        })
    }

    pub fn x_dim(&self) -> usize {
        self.system.x_dim()
    }

    pub fn p_dim(&self) -> usize {
        self.system.p_dim()
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn p(&self) -> &[f64] {
        &self.p
    }

    /// Mutable access to the parameter vector. Safe to call between steps;
    /// must not be called while a step is in progress (the borrow checker
    /// already forbids this, since a step takes `&mut self`).
    pub fn p_mut(&mut self) -> &mut [f64] {
        &mut self.p
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    /// Evaluate `f` at an arbitrary `(t, x)`, using this instance's current
    /// parameters. Used by solvers to evaluate intermediate stages without
    /// mutating the instance's own `t`/`x`.
    pub fn eval(&self, t: f64, x: &[f64], dxdt: &mut [f64]) {
        self.system.rhs(t, x, &self.p, dxdt);
    }

    /// Overwrite the current time and state in one call, as solvers do
    /// when committing an accepted step.
    pub(crate) fn commit(&mut self, t: f64, x: &[f64]) {
        self.t = t;
        self.x.copy_from_slice(x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;
    impl OdeSystem for Counter {
        fn x_dim(&self) -> usize {
            1
        }
        fn p_dim(&self) -> usize {
            0
        }
        fn rhs(&self, _t: f64, _x: &[f64], _p: &[f64], dxdt: &mut [f64]) {
            dxdt[0] = 1.0;
        }
    }

    #[test]
    fn rejects_mismatched_initial_state() {
        let err = OdeInstance::new(Counter, 0.0, vec![0.0, 0.0], vec![]).unwrap_err();
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn eval_does_not_touch_current_state() {
        let ode = OdeInstance::new(Counter, 0.0, vec![5.0], vec![]).unwrap();
        let mut dxdt = [0.0];
        ode.eval(100.0, &[42.0], &mut dxdt);
        assert_eq!(dxdt[0], 1.0);
        assert_eq!(ode.t(), 0.0);
        assert_eq!(ode.x(), &[5.0]);
    }
}
