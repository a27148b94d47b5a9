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

//! Error taxonomy for the core.
//!
//! Every error crossing a public boundary is one of four kinds: a
//! configuration error raised at construction, a binding error raised before
//! a step runs, a runtime numerical error raised during a step, or an I/O
//! error raised by a job. `Display` reproduces the stable diagnostic strings
//! used by tests verbatim.

use thiserror::Error;

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid argument types, missing arguments, or out-of-range numeric
    /// bounds. Raised at construction; no instance is produced.
    #[error("{0}")]
    Configuration(String),

    /// Non-positive ODE dimension or allocation failure while binding a
    /// solver to an ODE. Raised before any step runs.
    #[error("{0}")]
    Binding(String),

    /// Step-budget exhaustion during integration. The ODE state is
    /// indeterminate afterwards; further steps on the same instance are
    /// undefined.
    #[error("{0}")]
    Numerical(String),

    /// Open, write or close failure in a job. Partial output is retained.
    #[error("{0}")]
    Io(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    pub fn binding(message: impl Into<String>) -> Self {
        CoreError::Binding(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        CoreError::Numerical(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        CoreError::Io(message.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
