//! Chained environments with first-class captures.
//!
//! An environment is a chain of mutable frames: lookup walks the chain
//! outward, `define` writes the local frame, `set` mutates the nearest
//! defining frame. Frames are reference counted (`Rc<RefCell<_>>`) because
//! closures and captures can outlive the call that created them.
//!
//! # Captures
//!
//! `capture` produces a new frame linked to its source through a filtered
//! read-through view: lookups see the source's (optionally filtered)
//! bindings, but writes land in the capturing frame only — the source is
//! never mutated through a capture.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use rill_ir::Name;

use crate::value::Value;

/// Which bindings a capture exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BindingSelect {
    /// All bindings.
    #[default]
    All,
    /// Only callable bindings (procedures, classes, methods).
    CallablesOnly,
    /// Only non-callable bindings.
    VarsOnly,
}

impl BindingSelect {
    fn admits(self, value: &Value) -> bool {
        match self {
            BindingSelect::All => true,
            BindingSelect::CallablesOnly => value.is_callable(),
            BindingSelect::VarsOnly => !value.is_callable(),
        }
    }
}

/// Filter applied on the read-through link of a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureFilter {
    /// Which bindings are visible.
    pub select: BindingSelect,
    /// Whether frames beyond the source's local frame are visible.
    pub parents: bool,
}

impl Default for CaptureFilter {
    fn default() -> Self {
        CaptureFilter {
            select: BindingSelect::All,
            parents: true,
        }
    }
}

/// Link from a frame to the rest of the chain.
#[derive(Debug)]
enum Parent {
    /// Ordinary lexical parent.
    Lexical(EnvRef),
    /// Filtered read-through view onto a captured source.
    View { source: EnvRef, filter: CaptureFilter },
}

/// One mutable scope frame.
#[derive(Debug, Default)]
struct Frame {
    bindings: FxHashMap<Name, Value>,
    parent: Option<Parent>,
}

/// Error from `EnvRef::set`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetError {
    /// The symbol is not defined anywhere in the chain.
    Undefined,
}

/// A shared handle to an environment frame.
///
/// Chains are acyclic by construction: frames are only ever created with an
/// already-existing parent, so a child can never become an ancestor.
#[derive(Clone)]
pub struct EnvRef(Rc<RefCell<Frame>>);

impl EnvRef {
    /// Create a new root environment.
    pub fn new() -> Self {
        EnvRef(Rc::new(RefCell::new(Frame::default())))
    }

    /// Create a fresh child frame with `self` as lexical parent.
    #[must_use]
    pub fn child(&self) -> Self {
        EnvRef(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: Some(Parent::Lexical(self.clone())),
        })))
    }

    /// Capture `self` behind a filtered read-through view.
    ///
    /// The capture sees the source's bindings (subject to `filter`) but owns
    /// its local frame: mutation through the capture shadows locally and is
    /// never written back to the source.
    #[must_use]
    pub fn capture(&self, filter: CaptureFilter) -> Self {
        EnvRef(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: Some(Parent::View {
                source: self.clone(),
                filter,
            }),
        })))
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &EnvRef, b: &EnvRef) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Insert or overwrite a binding in the local frame. Always succeeds.
    pub fn define(&self, name: Name, value: Value) {
        self.0.borrow_mut().bindings.insert(name, value);
    }

    /// Look a symbol up through the whole chain.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some(value) = frame.bindings.get(&name) {
            return Some(value.clone());
        }
        match &frame.parent {
            Some(Parent::Lexical(parent)) => parent.lookup(name),
            Some(Parent::View { source, filter }) => source.lookup_filtered(name, *filter),
            None => None,
        }
    }

    /// Look a symbol up in the local frame only.
    pub fn lookup_local(&self, name: Name) -> Option<Value> {
        self.0.borrow().bindings.get(&name).cloned()
    }

    /// Look up through a capture filter.
    ///
    /// The nearest binding of the name decides the outcome: a binding the
    /// filter rejects hides outer bindings of the same name rather than
    /// exposing them.
    fn lookup_filtered(&self, name: Name, filter: CaptureFilter) -> Option<Value> {
        let found = if filter.parents {
            self.lookup(name)
        } else {
            self.lookup_local(name)
        }?;
        filter.select.admits(&found).then_some(found)
    }

    /// Mutate the nearest frame in which `name` is already defined.
    ///
    /// When the nearest definition is only reachable through a capture view,
    /// the new value shadows into the capturing frame instead — captures
    /// never write back to their source.
    pub fn set(&self, name: Name, value: Value) -> Result<(), SetError> {
        let mut frame = self.0.borrow_mut();
        if let Some(slot) = frame.bindings.get_mut(&name) {
            *slot = value;
            return Ok(());
        }
        match &frame.parent {
            Some(Parent::Lexical(parent)) => parent.set(name, value),
            Some(Parent::View { source, filter }) => {
                if source.lookup_filtered(name, *filter).is_some() {
                    frame.bindings.insert(name, value);
                    Ok(())
                } else {
                    Err(SetError::Undefined)
                }
            }
            None => Err(SetError::Undefined),
        }
    }
}

impl Default for EnvRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EnvRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.borrow();
        f.debug_struct("EnvRef")
            .field("bindings", &frame.bindings.len())
            .field("has_parent", &frame.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests;
