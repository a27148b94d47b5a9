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

//! The phase-portrait driver, the reference job.
//!
//! Grounded on `examples/original_source/src/c/job/portrait.c`: the
//! validation order, the exact diagnostic strings, the row format, and the
//! monotone-progress loop all follow that file. The one deliberate
//! divergence is in how a mid-header write failure is reported: the C
//! reference lets a later `solout` call silently overwrite an earlier
//! header-write failure's message, which reads as an oversight rather than
//! a specified behavior, so here the first failure wins.

use std::fs::File;
use std::io::Write;

use super::{Job, ProgressSink};
use crate::argument::{ArgDefault, ArgKind, ArgSpec, ArgValues};
use crate::error::CoreError;
use crate::ode::{OdeInstance, OdeSystem};
use crate::plugin::Descriptor;
use crate::solver::Solver;

const MAX_STEPS: u64 = 1_000_000_000;

/// Argument schema: `t_step` (default `0.01`), `t_end` (default `1.0`),
/// `file` (default `"portrait.dat"`).
pub const SCHEMA: &[ArgSpec] = &[
    ArgSpec::new("t_step", ArgKind::Real, ArgDefault::Real(0.01)),
    ArgSpec::new("t_end", ArgKind::Real, ArgDefault::Real(1.0)),
    ArgSpec::new("file", ArgKind::String, ArgDefault::String("portrait.dat")),
];

fn write_header(file: &mut File, n: usize) -> std::io::Result<()> {
    write!(file, "t")?;
    for i in 0..n {
        write!(file, " x[{}]", i)?;
    }
    writeln!(file)
}

fn write_row(file: &mut File, t: f64, x: &[f64]) -> std::io::Result<()> {
    write!(file, "{:.6}", t)?;
    for v in x {
        write!(file, " {:.6}", v)?;
    }
    writeln!(file)
}

/// The reference job: drives a bound (solver, ODE) pair across uniform
/// output intervals and tabulates the resulting trajectory.
pub struct Portrait;

impl Portrait {
    pub fn new() -> Self {
        Portrait
    }

    /// The static plug-in descriptor for this job. `create` here only
    /// validates the argument types; `t_step`/`t_end` bounds are checked
    /// against the bound ODE's current time inside [`Job::run`].
    pub fn descriptor() -> Descriptor<Self> {
        Descriptor::new("portrait", SCHEMA, |_args| Ok(Portrait::new()))
    }
}

impl Default for Portrait {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OdeSystem, Sv: Solver<S>> Job<S, Sv> for Portrait {
    fn run(
        &self,
        ode: &mut OdeInstance<S>,
        solver: &mut Sv,
        args: &ArgValues,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), CoreError> {
        let t_step = args.real("t_step")?;
        let t_end = args.real("t_end")?;
        let file_path = args.string("file")?;

        if t_step <= 0.0 {
            return Err(CoreError::configuration("t_step must be positive"));
        }
        if t_end <= ode.t() {
            return Err(CoreError::configuration("t_end must be greater than ODE.t"));
        }
        if t_step > t_end - ode.t() {
            return Err(CoreError::configuration(
                "t_step cannot be greater than (t_end - ODE.t)",
            ));
        }

        let mut file = File::create(file_path).map_err(|e| CoreError::io(e.to_string()))?;
        let t_start = ode.t();
        let mut progress_count: u32 = 0;

        let result = (|| -> Result<(), CoreError> {
            write_header(&mut file, ode.x_dim())
                .map_err(|_| CoreError::io("Failed to write to file"))?;
            write_row(&mut file, ode.t(), ode.x())
                .map_err(|_| CoreError::io("Failed to write to file"))?;
            progress.report(0).map_err(|e| CoreError::io(e.to_string()))?;

            let mut steps: u64 = 0;
            while ode.t() < t_end {
                if steps >= MAX_STEPS {
                    return Err(CoreError::numerical(
                        "Job has failed to finish in 1,000,000,000 steps",
                    ));
                }
                let progress_next = ((ode.t() - t_start) / (t_end - t_start) * 100.0) as u32;
                while progress_count < progress_next {
                    progress_count += 1;
                    progress
                        .report(progress_count)
                        .map_err(|e| CoreError::io(e.to_string()))?;
                }

                let next = ode.t() + t_step;
                let target = if next > t_end { t_end } else { next };
                solver.step(ode, target)?;

                write_row(&mut file, ode.t(), ode.x())
                    .map_err(|_| CoreError::io("Failed to write to file"))?;
                steps += 1;
            }
            Ok(())
        })();

        drop(file);

        if result.is_ok() {
            while progress_count < 100 {
                progress_count += 1;
                progress
                    .report(progress_count)
                    .map_err(|e| CoreError::io(e.to_string()))?;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgValue;
    use crate::job::RecordingProgress;
    use crate::solver::Rk4Solver;
    use std::f64::consts::PI;
    use std::io::BufRead;

    struct HarmonicOscillator;
    impl OdeSystem for HarmonicOscillator {
        fn x_dim(&self) -> usize {
            2
        }
        fn p_dim(&self) -> usize {
            0
        }
        fn rhs(&self, _t: f64, x: &[f64], _p: &[f64], dxdt: &mut [f64]) {
            dxdt[0] = x[1];
            dxdt[1] = -x[0];
        }
    }

    fn run_oscillator(dir: &std::path::Path) -> (std::path::PathBuf, RecordingProgress) {
        let ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let solver = Rk4Solver::new(0.01).unwrap();
        let path = dir.join("portrait.dat");
        let args = ArgValues::from_named(
            SCHEMA,
            &[
                ("t_step", ArgValue::Real(0.1)),
                ("t_end", ArgValue::Real(2.0 * PI)),
                ("file", ArgValue::String(path.to_str().unwrap().to_string())),
            ],
        )
        .unwrap();
        let mut ode = ode;
        let mut solver = solver;
        let mut progress = RecordingProgress::default();
        Portrait::new()
            .run(&mut ode, &mut solver, &args, &mut progress)
            .unwrap();
        (path, progress)
    }

    #[test]
    fn harmonic_oscillator_produces_header_and_sixty_four_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (path, progress) = run_oscillator(dir.path());

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines[0], "t x[0] x[1]");
        assert_eq!(lines.len(), 1 + 64);
        let last = lines.last().unwrap();
        assert!(last.starts_with("6.283185"));

        assert_eq!(progress.values.first(), Some(&0));
        assert_eq!(progress.values.last(), Some(&100));
        assert!(progress.values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rejects_non_positive_t_step() {
        let ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let args = ArgValues::from_named(SCHEMA, &[("t_step", ArgValue::Real(0.0))]).unwrap();
        let mut ode = ode;
        let mut solver = Rk4Solver::new(0.01).unwrap();
        let mut progress = RecordingProgress::default();
        let err = Portrait::new()
            .run(&mut ode, &mut solver, &args, &mut progress)
            .unwrap_err();
        assert_eq!(err.to_string(), "t_step must be positive");
    }

    #[test]
    fn rejects_zero_length_interval() {
        let ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let args = ArgValues::from_named(SCHEMA, &[("t_end", ArgValue::Real(0.0))]).unwrap();
        let mut ode = ode;
        let mut solver = Rk4Solver::new(0.01).unwrap();
        let mut progress = RecordingProgress::default();
        let err = Portrait::new()
            .run(&mut ode, &mut solver, &args, &mut progress)
            .unwrap_err();
        assert_eq!(err.to_string(), "t_end must be greater than ODE.t");
    }

    #[test]
    fn rejects_step_larger_than_interval() {
        let ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let args = ArgValues::from_named(
            SCHEMA,
            &[("t_step", ArgValue::Real(0.5)), ("t_end", ArgValue::Real(0.3))],
        )
        .unwrap();
        let mut ode = ode;
        let mut solver = Rk4Solver::new(0.01).unwrap();
        let mut progress = RecordingProgress::default();
        let err = Portrait::new()
            .run(&mut ode, &mut solver, &args, &mut progress)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "t_step cannot be greater than (t_end - ODE.t)"
        );
    }

    #[test]
    fn unwritable_path_reports_the_open_failure_and_emits_no_progress() {
        let ode = OdeInstance::new(HarmonicOscillator, 0.0, vec![1.0, 0.0], vec![]).unwrap();
        let args = ArgValues::from_named(
            SCHEMA,
            &[("file", ArgValue::String("/nonexistent-dir/portrait.dat".to_string()))],
        )
        .unwrap();
        let mut ode = ode;
        let mut solver = Rk4Solver::new(0.01).unwrap();
        let mut progress = RecordingProgress::default();
        let err = Portrait::new()
            .run(&mut ode, &mut solver, &args, &mut progress)
            .unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
        assert!(progress.values.is_empty());
    }
}
