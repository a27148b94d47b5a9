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

//! Typed, named argument schemas shared by every plug-in kind.
//!
//! A schema is an ordered list of `{name, type, default}` entries. The core
//! consumes it in two modes: construction (the host supplies values,
//! positionally or by name, overwriting a copy of the defaults before
//! handing it to a plug-in's `create`) and introspection (schema and current
//! values returned for display). The only contract the core enforces: every
//! entry receives exactly one value, of the matching type.

use crate::error::CoreError;

/// The type of a single argument value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    Integer,
    Real,
    String,
}

/// A single typed argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Integer(i64),
    Real(f64),
    String(String),
}

impl ArgValue {
    fn kind(&self) -> ArgKind {
        match self {
            ArgValue::Integer(_) => ArgKind::Integer,
            ArgValue::Real(_) => ArgKind::Real,
            ArgValue::String(_) => ArgKind::String,
        }
    }

    /// Extract the real value, or an error if this isn't a `Real`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ArgValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A schema entry's default, in a form a `const fn` can build without
/// allocating: string defaults are `&'static str` rather than `String`, and
/// are only turned into an owned [`ArgValue`] when a schema is actually
/// populated.
#[derive(Clone, Copy, Debug)]
pub enum ArgDefault {
    Integer(i64),
    Real(f64),
    String(&'static str),
}

impl ArgDefault {
    fn to_value(self) -> ArgValue {
        match self {
            ArgDefault::Integer(i) => ArgValue::Integer(i),
            ArgDefault::Real(r) => ArgValue::Real(r),
            ArgDefault::String(s) => ArgValue::String(s.to_string()),
        }
    }
}

/// One entry of a plug-in's argument schema: a name, a type, and a default
/// value. A schema is simply an ordered slice of these, and unlike the C
/// reference, no terminating sentinel entry is needed, since a Rust slice
/// already carries its own length.
#[derive(Clone, Debug)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub default: ArgDefault,
}

impl ArgSpec {
    pub const fn new(name: &'static str, kind: ArgKind, default: ArgDefault) -> Self {
        ArgSpec { name, kind, default }
    }
}

/// A populated copy of a schema: one value per entry, in schema order.
///
/// Produced by [`ArgValues::from_positional`] or [`ArgValues::from_named`];
/// never constructed by hand, so it always has exactly one value per
/// schema entry of the matching type.
#[derive(Clone, Debug)]
pub struct ArgValues {
    schema: &'static [ArgSpec],
    values: Vec<ArgValue>,
}

impl ArgValues {
    /// Build values from the schema's defaults, with no overrides.
    pub fn defaults(schema: &'static [ArgSpec]) -> Self {
        ArgValues {
            schema,
            values: schema.iter().map(|s| s.default.to_value()).collect(),
        }
    }

    /// Build values positionally: `values[i]` overwrites `schema[i]`'s
    /// default. Errors if the counts differ or a type mismatches.
    pub fn from_positional(schema: &'static [ArgSpec], values: &[ArgValue]) -> Result<Self, CoreError> {
        if values.len() != schema.len() {
            return Err(CoreError::configuration(format!(
                "expected {} argument(s), got {}",
                schema.len(),
                values.len()
            )));
        }
        for (spec, value) in schema.iter().zip(values.iter()) {
            check_kind(spec, value)?;
        }
        Ok(ArgValues {
            schema,
            values: values.to_vec(),
        })
    }

    /// Build values by name: each `(name, value)` pair overwrites the
    /// matching schema entry's default. Errors on an unknown name, a type
    /// mismatch, a name supplied more than once, or a schema entry left
    /// unset.
    pub fn from_named(schema: &'static [ArgSpec], overrides: &[(&str, ArgValue)]) -> Result<Self, CoreError> {
        let mut values: Vec<Option<ArgValue>> = schema.iter().map(|s| Some(s.default.to_value())).collect();
        let mut seen = vec![false; schema.len()];
        for (name, value) in overrides {
            let idx = schema
                .iter()
                .position(|s| s.name == *name)
                .ok_or_else(|| CoreError::configuration(format!("unknown argument: {}", name)))?;
            if seen[idx] {
                return Err(CoreError::configuration(format!("argument supplied more than once: {}", name)));
            }
            check_kind(&schema[idx], value)?;
            values[idx] = Some(value.clone());
            seen[idx] = true;
        }
        let values = values.into_iter().map(|v| v.expect("defaulted above")).collect();
        Ok(ArgValues { schema, values })
    }

    /// Look up a value by schema position.
    pub fn positional(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    /// Look up a value by name.
    pub fn named(&self, name: &str) -> Option<&ArgValue> {
        self.schema
            .iter()
            .position(|s| s.name == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Convenience accessor: a named `Real` argument.
    pub fn real(&self, name: &str) -> Result<f64, CoreError> {
        self.named(name)
            .and_then(ArgValue::as_real)
            .ok_or_else(|| CoreError::configuration(format!("missing or non-real argument: {}", name)))
    }

    /// Convenience accessor: a named `String` argument.
    pub fn string(&self, name: &str) -> Result<&str, CoreError> {
        self.named(name)
            .and_then(ArgValue::as_str)
            .ok_or_else(|| CoreError::configuration(format!("missing or non-string argument: {}", name)))
    }

    /// The schema this set of values was built from, for introspection.
    pub fn schema(&self) -> &'static [ArgSpec] {
        self.schema
    }
}

fn check_kind(spec: &ArgSpec, value: &ArgValue) -> Result<(), CoreError> {
    if value.kind() != spec.kind {
        return Err(CoreError::configuration(format!(
            "argument {} has the wrong type",
            spec.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[ArgSpec] = &[
        ArgSpec::new("h_max", ArgKind::Real, ArgDefault::Real(0.1)),
        ArgSpec::new("eps", ArgKind::Real, ArgDefault::Real(1e-3)),
    ];

    #[test]
    fn defaults_round_trip() {
        let values = ArgValues::defaults(SCHEMA);
        assert_eq!(values.real("h_max").unwrap(), 0.1);
        assert_eq!(values.real("eps").unwrap(), 1e-3);
    }

    #[test]
    fn named_override_replaces_one_entry() {
        let values = ArgValues::from_named(SCHEMA, &[("eps", ArgValue::Real(1e-6))]).unwrap();
        assert_eq!(values.real("h_max").unwrap(), 0.1);
        assert_eq!(values.real("eps").unwrap(), 1e-6);
    }

    #[test]
    fn positional_requires_exact_count() {
        let err = ArgValues::from_positional(SCHEMA, &[ArgValue::Real(0.2)]).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let err = ArgValues::from_named(SCHEMA, &[("eps", ArgValue::Integer(1))]).unwrap_err();
        assert!(err.to_string().contains("eps"));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = ArgValues::from_named(SCHEMA, &[("bogus", ArgValue::Real(1.0))]).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = ArgValues::from_named(
            SCHEMA,
            &[("eps", ArgValue::Real(1e-4)), ("eps", ArgValue::Real(1e-5))],
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
