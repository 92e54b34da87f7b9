//! Classes and instances.
//!
//! A class is a named template: property defaults plus a method table.
//! Instantiating creates an instance that owns its own mutable property
//! frame, seeded from the defaults; two instances never share property
//! state. Methods receive the instance implicitly as `self` and run in a
//! child of the property frame, so `set!` on a property mutates the
//! instance while lexical lookups still reach the class's definition site.
//!
//! By convention, methods that mutate instance state carry a trailing `!`
//! in their name. The convention is not enforced.

use rustc_hash::FxHashMap;

use rill_ir::{Expr, Name};

use crate::env::EnvRef;
use crate::value::{Heap, ParamList, Value};

/// Shared handle to a method definition.
pub type MethodHandle = Heap<MethodDef>;

/// A method definition inside a class.
///
/// The declared parameter list omits the receiver; `self` is bound
/// implicitly at call time.
#[derive(Clone, Debug)]
pub struct MethodDef {
    /// Method name.
    pub name: Name,
    /// Declared parameters (without the receiver).
    pub params: ParamList,
    /// Body forms, evaluated with begin semantics.
    pub body: Vec<Expr>,
}

/// A named class template.
#[derive(Clone, Debug)]
pub struct ClassDef {
    /// Class name.
    pub name: Name,
    /// Property defaults in declaration order, evaluated at class
    /// definition time in the defining environment.
    pub defaults: Vec<(Name, Value)>,
    /// Method table.
    pub methods: FxHashMap<Name, Heap<MethodDef>>,
    /// The environment the class was defined in; instances chain to it.
    pub env: EnvRef,
}

impl ClassDef {
    /// Look a method up in the class table.
    pub fn method(&self, name: Name) -> Option<Heap<MethodDef>> {
        self.methods.get(&name).cloned()
    }
}

/// An instance of a class.
///
/// Referenced, never copied implicitly: the `Heap` handle is the identity.
#[derive(Clone, Debug)]
pub struct Instance {
    /// The owning class.
    pub class: Heap<ClassDef>,
    /// The instance's own mutable property frame, a child of the class's
    /// defining environment.
    pub props: EnvRef,
}

impl Instance {
    /// Create an instance with properties seeded from the class defaults.
    pub fn new(class: Heap<ClassDef>) -> Self {
        let props = class.env.child();
        for (name, default) in &class.defaults {
            props.define(*name, default.clone());
        }
        Instance { class, props }
    }
}
