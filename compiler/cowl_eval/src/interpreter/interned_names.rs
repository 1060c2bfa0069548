//! Pre-interned builtin names.
//!
//! Interned once at interpreter construction so that builtin dispatch is a
//! `Name` comparison instead of a string lookup per call.

use cowl_ir::{Name, StringInterner};

/// Builtin free functions, used when no `def` has the name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BuiltinFn {
    Print,
    Len,
    ToStr,
}

/// Builtin sequence methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SeqMethod {
    // Read-only
    Len,
    IsEmpty,
    Get,
    Contains,
    First,
    Last,
    // Mutating
    Push,
    Pop,
    Insert,
    Remove,
    Clear,
}

impl SeqMethod {
    /// Whether the method changes its receiver.
    pub(crate) fn is_mutating(self) -> bool {
        matches!(
            self,
            SeqMethod::Push | SeqMethod::Pop | SeqMethod::Insert | SeqMethod::Remove | SeqMethod::Clear
        )
    }

    /// Number of arguments the method takes.
    pub(crate) fn arity(self) -> usize {
        match self {
            SeqMethod::Len
            | SeqMethod::IsEmpty
            | SeqMethod::First
            | SeqMethod::Last
            | SeqMethod::Pop
            | SeqMethod::Clear => 0,
            SeqMethod::Get | SeqMethod::Contains | SeqMethod::Push | SeqMethod::Remove => 1,
            SeqMethod::Insert => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct BuiltinNames {
    functions: [(Name, BuiltinFn); 3],
    methods: [(Name, SeqMethod); 11],
}

impl BuiltinNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        let f = |s: &str, b: BuiltinFn| (interner.intern(s), b);
        let m = |s: &str, method: SeqMethod| (interner.intern(s), method);
        BuiltinNames {
            functions: [
                f("print", BuiltinFn::Print),
                f("len", BuiltinFn::Len),
                f("to_str", BuiltinFn::ToStr),
            ],
            methods: [
                m("len", SeqMethod::Len),
                m("is_empty", SeqMethod::IsEmpty),
                m("get", SeqMethod::Get),
                m("contains", SeqMethod::Contains),
                m("first", SeqMethod::First),
                m("last", SeqMethod::Last),
                m("push", SeqMethod::Push),
                m("pop", SeqMethod::Pop),
                m("insert", SeqMethod::Insert),
                m("remove", SeqMethod::Remove),
                m("clear", SeqMethod::Clear),
            ],
        }
    }

    pub(crate) fn function(&self, name: Name) -> Option<BuiltinFn> {
        self.functions
            .iter()
            .find_map(|&(n, builtin)| (n == name).then_some(builtin))
    }

    pub(crate) fn seq_method(&self, name: Name) -> Option<SeqMethod> {
        self.methods
            .iter()
            .find_map(|&(n, method)| (n == name).then_some(method))
    }
}
