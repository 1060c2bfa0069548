//! RAII guards for scope and call-frame management.
//!
//! A guard holds `&mut Interpreter` and derefs to it, so evaluation code uses
//! it exactly like the interpreter. Dropping the guard (including during
//! unwinding or an early `?` return) pops what it pushed.

use std::ops::{Deref, DerefMut};

use super::Interpreter;

/// Pops one lexical scope on drop.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Interpreter {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Interpreter {
        self.interpreter
    }
}

/// Pops one call frame on drop.
pub struct FramedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for FramedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_frame();
    }
}

impl Deref for FramedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Interpreter {
        self.interpreter
    }
}

impl DerefMut for FramedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Interpreter {
        self.interpreter
    }
}

impl Interpreter {
    /// Enter a lexical scope, popped when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.env.push_scope();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` in a fresh lexical scope.
    pub fn with_env_scope<T>(&mut self, f: impl FnOnce(&mut ScopedInterpreter<'_>) -> T) -> T {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }

    /// Enter a call frame, popped when the guard drops.
    ///
    /// The caller is responsible for checking the depth limit first.
    pub(crate) fn framed(&mut self) -> FramedInterpreter<'_> {
        self.env.push_frame();
        FramedInterpreter { interpreter: self }
    }
}
