//! Binding environment: lexical scopes grouped into call frames.
//!
//! Scopes are pushed and popped in lock-step with blocks, `match` arms and
//! function bodies. A call frame hides the caller's local scopes from the
//! callee; only the global scope (index 0) stays visible across frames.
//!
//! Each binding lives in its own [`BindingSlot`] so that a
//! [`Reference`](crate::Reference) can alias it without owning it. A slot
//! is dropped together with its scope; references observe that through
//! their weak handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use cowl_ir::{Name, SharedInterner};
use rustc_hash::FxHashMap;

use crate::errors::{dangling_reference, redefinition, EvalError};
use crate::Value;

/// Whether a binding may be mutated or reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Declared with `mut`.
    Mutable,
    /// Declared without `mut`.
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }

    #[inline]
    pub fn from_flag(mutable: bool) -> Self {
        if mutable {
            Mutability::Mutable
        } else {
            Mutability::Immutable
        }
    }
}

/// A named slot: `{ name, mutability, value }`.
#[derive(Debug)]
pub struct Binding {
    pub name: Name,
    pub mutability: Mutability,
    pub value: Value,
}

/// Shared handle to a binding, owned by exactly one scope.
///
/// Other holders (the evaluator mid-mutation) only keep a clone for the
/// duration of a single operation.
#[derive(Clone)]
pub struct BindingSlot(Rc<RefCell<Binding>>);

impl BindingSlot {
    fn new(binding: Binding) -> Self {
        BindingSlot(Rc::new(RefCell::new(binding)))
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, Binding> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, Binding> {
        self.0.borrow_mut()
    }

    /// Non-owning handle for references.
    pub fn downgrade(&self) -> WeakSlot {
        WeakSlot(Rc::downgrade(&self.0))
    }
}

impl fmt::Debug for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BindingSlot").field(&self.0).finish()
    }
}

/// Weak handle to a [`BindingSlot`].
#[derive(Clone)]
pub struct WeakSlot(Weak<RefCell<Binding>>);

impl WeakSlot {
    /// The slot, if its scope is still alive.
    pub fn upgrade(&self) -> Option<BindingSlot> {
        self.0.upgrade().map(BindingSlot)
    }

    /// The slot, or `DanglingReferenceError` naming `name`.
    pub fn resolve(&self, name: &str) -> Result<BindingSlot, EvalError> {
        self.upgrade().ok_or_else(|| dangling_reference(name))
    }

    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn ptr_eq(&self, other: &WeakSlot) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }

    /// A handle to the target's current value, if alive.
    pub fn read(&self) -> Option<Value> {
        let slot = self.upgrade()?;
        let value = slot.borrow().value.clone_handle();
        Some(value)
    }
}

/// One lexical scope.
#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<Name, BindingSlot>,
}

/// Scope stack with call-frame boundaries.
pub struct Environment {
    /// Innermost scope last. Index 0 is the global scope.
    scopes: Vec<Scope>,
    /// First scope index of each active call frame.
    frames: Vec<usize>,
    interner: SharedInterner,
}

impl Environment {
    /// Create an environment containing only the global scope.
    pub fn new(interner: &SharedInterner) -> Self {
        Environment {
            scopes: vec![Scope::default()],
            frames: Vec::new(),
            interner: interner.clone(),
        }
    }

    /// The interner names in this environment resolve through.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Total number of scopes, global included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Number of active call frames.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Enter a lexical block.
    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Leave a lexical block, dropping its bindings.
    ///
    /// The global scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Enter a function body: hides caller locals and opens the body scope.
    pub fn push_frame(&mut self) {
        self.frames.push(self.scopes.len());
        self.push_scope();
    }

    /// Leave a function body, dropping every scope it opened.
    pub fn pop_frame(&mut self) {
        if let Some(base) = self.frames.pop() {
            self.scopes.truncate(base.max(1));
        }
    }

    /// Lowest scope index visible to the current frame (besides global).
    fn frame_base(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    /// Define a binding in the innermost scope.
    ///
    /// Shadows outer bindings of the same name; fails with
    /// `RedefinitionError` if the innermost scope already has one.
    pub fn define(
        &mut self,
        name: Name,
        value: Value,
        mutability: Mutability,
    ) -> Result<(), EvalError> {
        let interner = &self.interner;
        let Some(scope) = self.scopes.last_mut() else {
            return Err(redefinition(interner.lookup(name)));
        };
        if scope.bindings.contains_key(&name) {
            return Err(redefinition(interner.lookup(name)));
        }
        scope.bindings.insert(
            name,
            BindingSlot::new(Binding {
                name,
                mutability,
                value,
            }),
        );
        Ok(())
    }

    /// Find the slot a name resolves to, innermost first.
    pub fn lookup_slot(&self, name: Name) -> Option<BindingSlot> {
        let base = self.frame_base();
        self.scopes[base..]
            .iter()
            .rev()
            .chain(if base > 0 { self.scopes.first() } else { None })
            .find_map(|scope| scope.bindings.get(&name))
            .cloned()
    }

    /// Whether a name resolves in the current frame.
    pub fn contains(&self, name: Name) -> bool {
        self.lookup_slot(name).is_some()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("scopes", &self.scopes.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
