//! Non-owning aliases to bindings.

use std::fmt;

use cowl_ir::Name;

use crate::environment::WeakSlot;

/// An alias to a specific binding, created for `ref`/`ref mut` parameters.
///
/// A reference does not own the binding's storage: it holds a weak handle
/// to the binding slot, so the slot dies with its scope regardless of how
/// many references point at it.
#[derive(Clone)]
pub struct Reference {
    target: WeakSlot,
    name: Name,
    mutable: bool,
}

impl Reference {
    pub(crate) fn new(target: WeakSlot, name: Name, mutable: bool) -> Self {
        Reference {
            target,
            name,
            mutable,
        }
    }

    /// The weak handle to the aliased binding.
    pub(crate) fn target(&self) -> &WeakSlot {
        &self.target
    }

    /// Name of the aliased binding in the caller's scope.
    pub fn name(&self) -> Name {
        self.name
    }

    /// Whether this is a `ref mut` alias.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Whether the aliased binding's scope is still alive.
    pub fn is_live(&self) -> bool {
        self.target.is_live()
    }

    /// Whether two references alias the same binding.
    pub fn same_target(&self, other: &Reference) -> bool {
        self.target.ptr_eq(&other.target)
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("name", &self.name)
            .field("mutable", &self.mutable)
            .field("live", &self.is_live())
            .finish()
    }
}
