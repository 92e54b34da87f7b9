//! Tree-walking evaluator.
//!
//! `eval` is a state machine over expression shapes: literals evaluate to
//! themselves, symbols resolve through the environment chain, and lists
//! dispatch either to a special form (recognized by pre-interned head name)
//! or to procedure application with strict left-to-right argument
//! evaluation.

mod builder;
mod special;

pub use builder::InterpreterBuilder;

use tracing::trace;

use rill_ir::{Expr, Name, SharedInterner};

use crate::class::{ClassDef, Instance, MethodHandle};
use crate::env::EnvRef;
use crate::errors::{
    arity_mismatch, destructure_mismatch, not_callable, unbound_symbol, unknown_variant,
    unqualified_conditional, EvalError, EvalResult,
};
use crate::pattern::match_value;
use crate::print_handler::SharedPrintHandler;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Closure, Heap, MapKey, Param, Value};

/// Pre-interned special form and keyword names.
///
/// Interned once at construction so dispatch is a `u32` comparison rather
/// than a string lookup per form.
#[derive(Clone, Copy)]
pub(crate) struct FormNames {
    pub(crate) quote: Name,
    pub(crate) if_: Name,
    pub(crate) define: Name,
    pub(crate) set_bang: Name,
    pub(crate) lambda: Name,
    pub(crate) defn: Name,
    pub(crate) begin: Name,
    pub(crate) match_: Name,
    pub(crate) defcond: Name,
    pub(crate) class: Name,
    pub(crate) method: Name,
    pub(crate) dot: Name,
    pub(crate) capture: Name,
    pub(crate) with: Name,
    pub(crate) for_in: Name,
    pub(crate) init: Name,
    pub(crate) self_: Name,
    pub(crate) kw_callables: Name,
    pub(crate) kw_vars: Name,
    pub(crate) kw_local: Name,
}

impl FormNames {
    fn new(interner: &SharedInterner) -> Self {
        FormNames {
            quote: interner.intern("quote"),
            if_: interner.intern("if"),
            define: interner.intern("define"),
            set_bang: interner.intern("set!"),
            lambda: interner.intern("lambda"),
            defn: interner.intern("defn"),
            begin: interner.intern("begin"),
            match_: interner.intern("match"),
            defcond: interner.intern("defcond"),
            class: interner.intern("class"),
            method: interner.intern("method"),
            dot: interner.intern("."),
            capture: interner.intern("capture"),
            with: interner.intern("with"),
            for_in: interner.intern("for-in"),
            init: interner.intern("init"),
            self_: interner.intern("self"),
            kw_callables: interner.intern("callables"),
            kw_vars: interner.intern("vars"),
            kw_local: interner.intern("local"),
        }
    }
}

/// The evaluator.
///
/// Holds the global environment (seeded with the builtin registry), the
/// shared interner, and the print handler. Single-threaded and synchronous:
/// evaluating a form blocks until every sub-expression has been evaluated.
pub struct Interpreter {
    interner: SharedInterner,
    globals: EnvRef,
    forms: FormNames,
    print: SharedPrintHandler,
}

impl Interpreter {
    /// Create an interpreter with a fresh interner, stdout printing, and
    /// the builtin registry installed.
    pub fn new() -> Self {
        InterpreterBuilder::default().build()
    }

    /// Start configuring an interpreter.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    pub(crate) fn from_parts(interner: SharedInterner, print: SharedPrintHandler) -> Self {
        let forms = FormNames::new(&interner);
        let globals = EnvRef::new();
        crate::builtins::install(&globals, &interner);
        Interpreter {
            interner,
            globals,
            forms,
            print,
        }
    }

    /// The shared interner.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// The global environment frame.
    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// The print handler.
    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    /// Evaluate a sequence of top-level forms against the global frame,
    /// returning the last value.
    pub fn eval_program(&mut self, forms: &[Expr]) -> EvalResult {
        let globals = self.globals.clone();
        let mut last = Value::Nil;
        for form in forms {
            last = self.eval(form, &globals)?;
        }
        Ok(last)
    }

    /// Evaluate one expression in an environment.
    pub fn eval(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Str(s) => Ok(Value::string(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Keyword(name) => Ok(Value::Keyword(*name)),
            Expr::Symbol(name) => self.resolve_symbol(*name, env),
            Expr::Vector(items) => self.eval_vector_literal(items, env),
            Expr::Map(pairs) => self.eval_map_literal(pairs, env),
            Expr::List(items) => {
                if items.is_empty() {
                    // The empty list is a distinguished sentinel that
                    // evaluates to itself.
                    return Ok(Value::empty_list());
                }
                let forms = self.forms;
                if let Some(Expr::Symbol(head)) = items.first() {
                    if let Some(result) = self.dispatch_special(forms, *head, &items[1..], env) {
                        return result;
                    }
                }
                self.eval_call(items, env)
            }
        }
    }

    /// Resolve a symbol: environment lookup first, then conditional
    /// definition qualifier resolution for `base/variant` names.
    fn resolve_symbol(&mut self, name: Name, env: &EnvRef) -> EvalResult {
        if let Some(value) = env.lookup(name) {
            return Ok(value);
        }
        let text = self.interner.lookup(name);
        if let Some((base_text, qualifier_text)) = split_qualifier(text) {
            let base = self.interner.intern(base_text);
            if let Some(Value::CondDef(def)) = env.lookup(base) {
                let qualifier = self.interner.intern(qualifier_text);
                if let Some(body) = def.variants.get(&qualifier) {
                    // A qualified reference is an ordinary closure over the
                    // selected branch.
                    return Ok(Value::closure(Closure {
                        name: Some(name),
                        params: def.params.clone(),
                        body: body.clone(),
                        env: def.env.clone(),
                        doc: None,
                        constraints: None,
                    }));
                }
                return Err(unknown_variant(base_text, qualifier_text));
            }
        }
        Err(unbound_symbol(text))
    }

    /// Evaluate head and arguments (left to right), then apply.
    fn eval_call(&mut self, items: &[Expr], env: &EnvRef) -> EvalResult {
        let func = self.eval(&items[0], env)?;
        let mut args = Vec::with_capacity(items.len() - 1);
        for arg_expr in &items[1..] {
            args.push(self.eval(arg_expr, env)?);
        }
        self.apply(&func, &args)
    }

    /// Apply a procedure value to already-evaluated arguments.
    pub fn apply(&mut self, func: &Value, args: &[Value]) -> EvalResult {
        trace!(kind = func.type_name(), arity = args.len(), "apply");
        match func {
            Value::Native(native) => (native.func)(self, args),
            Value::Closure(closure) => self.call_closure(&closure.clone(), args),
            Value::BoundMethod(bound) => {
                let bound = bound.clone();
                self.call_method(&bound.receiver, &bound.method, args)
            }
            Value::Class(class) => self.instantiate(&class.clone(), args),
            Value::CondDef(def) => Err(unqualified_conditional(self.interner.lookup(def.name))),
            other => Err(not_callable(other.type_name())),
        }
    }

    fn call_closure(&mut self, closure: &Heap<Closure>, args: &[Value]) -> EvalResult {
        // One fresh child frame of the *defining* environment per call.
        let frame = closure.env.child();
        self.bind_params(&closure.params, args, &frame)?;
        if let Some(constraints) = &closure.constraints {
            // Validation happens before the body; the body never runs on
            // arguments that fail.
            constraints.validate(&frame, &*self.interner)?;
        }
        self.eval_body(&closure.body, &frame)
    }

    /// Call a method with the receiver bound as `self`.
    ///
    /// The call frame is a child of the instance's property frame, so
    /// property reads and `set!` writes hit the instance while lexical
    /// lookups continue outward to the class's definition site.
    pub(crate) fn call_method(
        &mut self,
        receiver: &Heap<Instance>,
        method: &MethodHandle,
        args: &[Value],
    ) -> EvalResult {
        let frame = receiver.props.child();
        frame.define(self.forms.self_, Value::Instance(receiver.clone()));
        self.bind_params(&method.params, args, &frame)?;
        self.eval_body(&method.body, &frame)
    }

    fn instantiate(&mut self, class: &Heap<ClassDef>, args: &[Value]) -> EvalResult {
        let receiver = Heap::new(Instance::new(class.clone()));
        if let Some(init) = class.method(self.forms.init) {
            self.call_method(&receiver, &init, args)?;
        } else if !args.is_empty() {
            return Err(arity_mismatch(0, args.len()));
        }
        Ok(Value::Instance(receiver))
    }

    /// Bind declared parameters positionally, destructuring where a
    /// parameter position is itself a pattern.
    fn bind_params(
        &mut self,
        params: &[Param],
        args: &[Value],
        frame: &EnvRef,
    ) -> Result<(), EvalError> {
        if params.len() != args.len() {
            return Err(arity_mismatch(params.len(), args.len()));
        }
        for (param, arg) in params.iter().zip(args) {
            match param {
                Param::Name(name) => frame.define(*name, arg.clone()),
                Param::Pattern(pattern) => {
                    let mut bindings = Vec::new();
                    if !match_value(pattern, arg, &mut bindings) {
                        return Err(destructure_mismatch(
                            &pattern.describe(&*self.interner),
                        ));
                    }
                    for (name, value) in bindings {
                        frame.define(name, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate a body sequence, returning the last value.
    pub(crate) fn eval_body(&mut self, body: &[Expr], env: &EnvRef) -> EvalResult {
        let mut last = Value::Nil;
        for expr in body {
            last = self.eval(expr, env)?;
        }
        Ok(last)
    }

    fn eval_vector_literal(&mut self, items: &[Expr], env: &EnvRef) -> EvalResult {
        if let [form] = items {
            if form.head_symbol() == Some(self.forms.for_in) {
                return self.eval_list_comprehension(form, env);
            }
        }
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.eval(item, env)?);
        }
        Ok(Value::vector(values))
    }

    fn eval_map_literal(&mut self, pairs: &[(Expr, Expr)], env: &EnvRef) -> EvalResult {
        if let [(form, Expr::Nil)] = pairs {
            if form.head_symbol() == Some(self.forms.for_in) {
                return self.eval_dict_comprehension(form, env);
            }
        }
        let mut entries = rustc_hash::FxHashMap::default();
        for (key_expr, value_expr) in pairs {
            let key_value = self.eval(key_expr, env)?;
            let key = MapKey::from_value(&key_value).ok_or_else(|| {
                crate::errors::form_syntax(format!(
                    "map key of type {} is not hashable",
                    key_value.type_name()
                ))
            })?;
            let value = self.eval(value_expr, env)?;
            entries.insert(key, value);
        }
        Ok(Value::map(entries))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a `base/qualifier` symbol at its last slash.
///
/// Both sides must be non-empty, so the division symbol `/` itself never
/// splits.
fn split_qualifier(text: &str) -> Option<(&str, &str)> {
    let idx = text.rfind('/')?;
    if idx == 0 || idx + 1 == text.len() {
        return None;
    }
    Some((&text[..idx], &text[idx + 1..]))
}
