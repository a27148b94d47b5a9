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

//! Fixed-step classical RK4 solver.
//!
//! Shares the step-to-endpoint contract with [`super::dopri5::Dopri5Solver`]
//! but carries no adaptivity: every sub-step but the last uses `h = sign *
//! h_max`, and the final sub-step is nudged to land exactly on `t_target`.

use std::marker::PhantomData;

use super::{direction, Solver, MAX_SUBSTEPS};
use crate::argument::{ArgDefault, ArgKind, ArgSpec, ArgValues};
use crate::error::CoreError;
use crate::ode::{OdeInstance, OdeSystem};
use crate::plugin::Descriptor;

/// Argument schema: `h_max` (default `0.01`).
pub const SCHEMA: &[ArgSpec] = &[ArgSpec::new("h_max", ArgKind::Real, ArgDefault::Real(0.01))];

/// Fixed-step RK4 solver, generic over the [`OdeSystem`] it is bound to.
pub struct Rk4Solver<S: OdeSystem> {
    h_max: f64,
    n_cached: usize,
    /// Scratch: `x`, `y`, `k1`..`k4`, each of length `n_cached` (`6n` total).
    /// `x` holds the pre-step state so `step` allocates nothing.
    scratch: Vec<f64>,
    _marker: PhantomData<S>,
}

impl<S: OdeSystem> Rk4Solver<S> {
    /// Create a solver with the given `h_max`, which must satisfy
    /// `0 < h_max < 0.5`.
    pub fn new(h_max: f64) -> Result<Self, CoreError> {
        if !(h_max > 0.0 && h_max < 0.5) {
            return Err(CoreError::configuration("h_max must satisfy: 0 < h_max < 0.5"));
        }
        Ok(Rk4Solver {
            h_max,
            n_cached: 0,
            scratch: Vec::new(),
            _marker: PhantomData,
        })
    }

    /// Build from a populated [`ArgValues`] (see [`SCHEMA`]).
    pub fn from_args(args: &ArgValues) -> Result<Self, CoreError> {
        Self::new(args.real("h_max")?)
    }

    /// The static plug-in descriptor for this solver.
    pub fn descriptor() -> Descriptor<Self> {
        Descriptor::new("rk4", SCHEMA, Self::from_args)
    }
}

impl<S: OdeSystem> Solver<S> for Rk4Solver<S> {
    fn bind(&mut self, ode: &OdeInstance<S>) -> Result<(), CoreError> {
        let n = ode.x_dim();
        if n == 0 {
            return Err(CoreError::binding("ODE x_size must be positive"));
        }
        if self.n_cached == n {
            return Ok(());
        }
        self.scratch = vec![0.0; 6 * n];
        self.n_cached = n;
        Ok(())
    }

    fn step(&mut self, ode: &mut OdeInstance<S>, t_target: f64) -> Result<(), CoreError> {
        let n = self.n_cached;
        if n != ode.x_dim() {
            return Err(CoreError::binding(
                "solver is not bound to this ODE's dimension",
            ));
        }
        let h_max = self.h_max;
        let sign = direction(ode.t(), t_target);

        let mut t = ode.t();

        let (x, rest) = self.scratch.split_at_mut(n);
        x.copy_from_slice(ode.x());
        let (y, rest) = rest.split_at_mut(n);
        let (k1, rest) = rest.split_at_mut(n);
        let (k2, rest) = rest.split_at_mut(n);
        let (k3, k4) = rest.split_at_mut(n);

        let mut steps: u64 = 0;
        loop {
            if sign * (t - t_target) >= 0.0 {
                break;
            }
            if steps >= MAX_SUBSTEPS {
                return Err(CoreError::numerical(
                    "Solver has failed to finish in 1,000,000,000 steps",
                ));
            }
            let mut h = sign * h_max;
            if sign * (t + h - t_target) >= 0.0 {
                h = t_target - t + sign * 1e-10;
            }

            ode.eval(t, &x, k1);
            for i in 0..n {
                y[i] = x[i] + 0.5 * h * k1[i];
            }
            ode.eval(t + 0.5 * h, y, k2);
            for i in 0..n {
                y[i] = x[i] + 0.5 * h * k2[i];
            }
            ode.eval(t + 0.5 * h, y, k3);
            for i in 0..n {
                y[i] = x[i] + h * k3[i];
            }
            ode.eval(t + h, y, k4);

            for i in 0..n {
                x[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
            }
            t += h;
            ode.commit(t, &x);
            steps += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Linear2x2 {
        a: [[f64; 2]; 2],
    }
    impl OdeSystem for Linear2x2 {
        fn x_dim(&self) -> usize {
            2
        }
        fn p_dim(&self) -> usize {
            0
        }
        fn rhs(&self, _t: f64, x: &[f64], _p: &[f64], dxdt: &mut [f64]) {
            dxdt[0] = self.a[0][0] * x[0] + self.a[0][1] * x[1];
            dxdt[1] = self.a[1][0] * x[0] + self.a[1][1] * x[1];
        }
    }

    #[test]
    fn rejects_out_of_range_h_max() {
        let err = Rk4Solver::<Linear2x2>::new(0.9).unwrap_err();
        assert_eq!(err.to_string(), "h_max must satisfy: 0 < h_max < 0.5");
    }

    #[test]
    fn lands_exactly_on_target_time() {
        let system = Linear2x2 {
            a: [[0.0, 1.0], [-1.0, 0.0]],
        };
        let mut ode = OdeInstance::new(system, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let mut solver = Rk4Solver::new(0.01).unwrap();
        solver.bind(&ode).unwrap();
        solver.step(&mut ode, 1.0).unwrap();
        assert_eq!(ode.t(), 1.0);
        assert_relative_eq!(ode.x()[0], 1.0_f64.cos(), epsilon = 1e-6);
        assert_relative_eq!(ode.x()[1], -(1.0_f64.sin()), epsilon = 1e-6);
    }

    #[test]
    fn backward_integration_is_supported() {
        let system = Linear2x2 {
            a: [[0.0, 1.0], [-1.0, 0.0]],
        };
        let mut ode = OdeInstance::new(system, 1.0, vec![1.0_f64.cos(), -(1.0_f64.sin())], vec![]).unwrap();
        let mut solver = Rk4Solver::new(0.01).unwrap();
        solver.bind(&ode).unwrap();
        solver.step(&mut ode, 0.0).unwrap();
        assert_eq!(ode.t(), 0.0);
        assert_relative_eq!(ode.x()[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(ode.x()[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn halving_h_max_cuts_the_error_by_roughly_sixteen() {
        fn final_error(h_max: f64) -> f64 {
            let system = Linear2x2 {
                a: [[0.0, 1.0], [-1.0, 0.0]],
            };
            let mut ode = OdeInstance::new(system, 0.0, vec![1.0, 0.0], vec![]).unwrap();
            let mut solver = Rk4Solver::new(h_max).unwrap();
            solver.bind(&ode).unwrap();
            solver.step(&mut ode, 1.0).unwrap();
            (ode.x()[0] - 1.0_f64.cos()).abs()
        }

        let coarse = final_error(0.04);
        let fine = final_error(0.02);
        let ratio = coarse / fine;
        assert!(
            (12.0..20.0).contains(&ratio),
            "expected roughly fourth-order convergence, got ratio {}",
            ratio
        );
    }

    #[test]
    fn binding_to_a_zero_dimensional_ode_fails() {
        struct Empty;
        impl OdeSystem for Empty {
            fn x_dim(&self) -> usize {
                0
            }
            fn p_dim(&self) -> usize {
                0
            }
            fn rhs(&self, _t: f64, _x: &[f64], _p: &[f64], _dxdt: &mut [f64]) {}
        }
        let ode = OdeInstance::new(Empty, 0.0, vec![], vec![]).unwrap();
        let mut solver = Rk4Solver::new(0.1).unwrap();
        let err = solver.bind(&ode).unwrap_err();
        assert_eq!(err.to_string(), "ODE x_size must be positive");
    }
}
