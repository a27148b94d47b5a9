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

//! A small engine for integrating ODE trajectories: an adaptive DOPRI5
//! solver, a fixed-step RK4 solver, and a phase-portrait driver that walks
//! either one across uniform output intervals.
//!
//! Usage
//! -----
//! ```
//! use dynsys_core::argument::{ArgValues, ArgValue};
//! use dynsys_core::job::{Job, Portrait};
//! use dynsys_core::ode::{OdeInstance, OdeSystem};
//! use dynsys_core::solver::Rk4Solver;
//!
//! struct HarmonicOscillator;
//! impl OdeSystem for HarmonicOscillator {
//!     fn x_dim(&self) -> usize { 2 }
//!     fn p_dim(&self) -> usize { 0 }
//!     fn rhs(&self, _t: f64, x: &[f64], _p: &[f64], dxdt: &mut [f64]) {
//!         dxdt[0] = x[1];
//!         dxdt[1] = -x[0];
//!     }
//! }
//!
//! let mut ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
//! let mut solver = Rk4Solver::new(0.01).unwrap();
//! let args = ArgValues::from_named(
//!     dynsys_core::job::portrait::SCHEMA,
//!     &[("file", ArgValue::String("/tmp/portrait.dat".to_string()))],
//! ).unwrap();
//! let mut progress = Vec::<u8>::new();
//! Portrait::new().run(&mut ode, &mut solver, &args, &mut progress).unwrap();
//! ```

pub mod argument;
pub mod error;
pub mod job;
pub mod ode;
pub mod plugin;
pub mod solver;

pub use argument::{ArgDefault, ArgKind, ArgSpec, ArgValue, ArgValues};
pub use error::{CoreError, CoreResult};
pub use job::{Job, Portrait, ProgressSink};
pub use ode::{OdeInstance, OdeSystem};
pub use plugin::Descriptor;
pub use solver::{Dopri5Solver, Rk4Solver, Solver};
