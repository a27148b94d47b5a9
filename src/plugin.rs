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

//! Static plug-in descriptors.
//!
//! The C reference exposes every plug-in kind (ODE, solver, job) through a
//! function-pointer table: a name, an argument schema, and `create`/`destroy`
//! entry points, looked up through a registry and invoked through `void*`.
//! Rust has no need for the `destroy` half of that table (values are dropped
//! by ownership) and no need to erase `create`'s return type behind a
//! pointer: a `Descriptor<T>` is a plain value pairing a name and schema with
//! a typed factory function. Dynamic loading and allocator injection, both
//! present in the reference's plug-in table, are explicitly out of scope
//! and have no counterpart here.

use crate::argument::{ArgSpec, ArgValues};
use crate::error::CoreError;

/// Describes one concrete plug-in: its stable name, its argument schema, and
/// the factory that builds it from a populated [`ArgValues`].
pub struct Descriptor<T> {
    pub name: &'static str,
    pub schema: &'static [ArgSpec],
    create: fn(&ArgValues) -> Result<T, CoreError>,
}

impl<T> Descriptor<T> {
    pub const fn new(
        name: &'static str,
        schema: &'static [ArgSpec],
        create: fn(&ArgValues) -> Result<T, CoreError>,
    ) -> Self {
        Descriptor { name, schema, create }
    }

    /// Build a value from this schema's defaults, with no overrides.
    pub fn create_default(&self) -> Result<T, CoreError> {
        (self.create)(&ArgValues::defaults(self.schema))
    }

    /// Build a value from an already-populated [`ArgValues`]. The caller is
    /// responsible for having built `args` from this descriptor's own
    /// schema; a mismatched schema will generally fail inside `create`.
    pub fn create(&self, args: &ArgValues) -> Result<T, CoreError> {
        (self.create)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{ArgDefault, ArgKind, ArgValue};

    const SCHEMA: &[ArgSpec] = &[ArgSpec::new("scale", ArgKind::Real, ArgDefault::Real(2.0))];

    fn make(args: &ArgValues) -> Result<f64, CoreError> {
        args.real("scale")
    }

    #[test]
    fn default_construction_uses_schema_defaults() {
        let d = Descriptor::new("scaler", SCHEMA, make);
        assert_eq!(d.create_default().unwrap(), 2.0);
    }

    #[test]
    fn construction_from_named_overrides() {
        let d = Descriptor::new("scaler", SCHEMA, make);
        let args = ArgValues::from_named(SCHEMA, &[("scale", ArgValue::Real(5.0))]).unwrap();
        assert_eq!(d.create(&args).unwrap(), 5.0);
    }
}
