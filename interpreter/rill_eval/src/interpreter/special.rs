//! Special form handlers.
//!
//! A call-shaped expression whose head is one of the recognized keywords is
//! interpreted structurally here instead of being evaluated as a procedure
//! reference. Special forms always win over bindings of the same name.

use rustc_hash::FxHashMap;
use tracing::trace;

use rill_ir::{Expr, Name};

use super::{FormNames, Interpreter};
use crate::class::{ClassDef, Instance, MethodDef};
use crate::env::{BindingSelect, CaptureFilter, EnvRef};
use crate::errors::{
    destructure_mismatch, form_syntax, match_exhausted, type_mismatch, unbound_symbol,
    EvalError, EvalResult,
};
use crate::pattern::{match_value, Pattern};
use crate::typed::{TypeMap, TypeSpec};
use crate::value::{
    BoundMethod, Closure, CondDef, Heap, MapKey, Param, ParamList, Value, ValueIter,
};

impl Interpreter {
    /// Dispatch a special form by head name; `None` means the head is not a
    /// special form and the list is an ordinary call.
    pub(super) fn dispatch_special(
        &mut self,
        forms: FormNames,
        head: Name,
        args: &[Expr],
        env: &EnvRef,
    ) -> Option<EvalResult> {
        let result = if head == forms.quote {
            self.eval_quote(args)
        } else if head == forms.if_ {
            self.eval_if(args, env)
        } else if head == forms.define {
            self.eval_define(args, env)
        } else if head == forms.set_bang {
            self.eval_set(args, env)
        } else if head == forms.lambda {
            self.eval_lambda(args, env)
        } else if head == forms.defn {
            self.eval_defn(args, env)
        } else if head == forms.begin {
            self.eval_body(args, env)
        } else if head == forms.match_ {
            self.eval_match(args, env)
        } else if head == forms.defcond {
            self.eval_defcond(args, env)
        } else if head == forms.class {
            self.eval_class(args, env)
        } else if head == forms.dot {
            self.eval_dot(args, env)
        } else if head == forms.capture {
            self.eval_capture(args, env)
        } else if head == forms.with {
            self.eval_with(args, env)
        } else if head == forms.method {
            Err(form_syntax("method is only valid inside a class form"))
        } else if head == forms.for_in {
            Err(form_syntax(
                "for-in is only valid inside a vector or map literal",
            ))
        } else {
            return None;
        };
        trace!(form = self.interner().lookup(head), "special form");
        Some(result)
    }

    /// `(quote x)`
    fn eval_quote(&mut self, args: &[Expr]) -> EvalResult {
        let [datum] = args else {
            return Err(form_syntax("quote takes exactly one argument"));
        };
        Value::from_datum(datum)
    }

    /// `(if test conseq alt?)` - only `false` and `()` are falsy.
    fn eval_if(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let (test, conseq, alt) = match args {
            [test, conseq] => (test, conseq, None),
            [test, conseq, alt] => (test, conseq, Some(alt)),
            _ => return Err(form_syntax("if takes a test, a consequent, and an optional alternative")),
        };
        if self.eval(test, env)?.is_truthy() {
            self.eval(conseq, env)
        } else if let Some(alt) = alt {
            self.eval(alt, env)
        } else {
            Ok(Value::Nil)
        }
    }

    /// `(define sym expr)` - inserts into the local frame, always succeeds.
    fn eval_define(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [Expr::Symbol(name), value_expr] = args else {
            return Err(form_syntax("define takes a symbol and a value"));
        };
        let value = self.eval(value_expr, env)?;
        env.define(*name, value);
        Ok(Value::Nil)
    }

    /// `(set! sym expr)` - mutates the nearest defining frame.
    fn eval_set(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [Expr::Symbol(name), value_expr] = args else {
            return Err(form_syntax("set! takes a symbol and a value"));
        };
        let value = self.eval(value_expr, env)?;
        env.set(*name, value)
            .map_err(|_| unbound_symbol(self.interner().lookup(*name)))?;
        Ok(Value::Nil)
    }

    /// `(lambda (params...) body...)`
    fn eval_lambda(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [params_expr, body @ ..] = args else {
            return Err(form_syntax("lambda takes a parameter list and a body"));
        };
        if body.is_empty() {
            return Err(form_syntax("lambda requires at least one body form"));
        }
        let params = self.parse_params(params_expr)?;
        Ok(Value::closure(Closure {
            name: None,
            params,
            body: body.to_vec(),
            env: env.clone(),
            doc: None,
            constraints: None,
        }))
    }

    /// `(defn name (params...) [doc] [{constraints}] body...)`
    fn eval_defn(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [Expr::Symbol(name), params_expr, rest @ ..] = args else {
            return Err(form_syntax(
                "defn takes a name, a parameter list, and a body",
            ));
        };
        let params = self.parse_params(params_expr)?;

        let mut body = rest;
        let mut doc = None;
        if body.len() >= 2 {
            if let Expr::Str(docstring) = &body[0] {
                doc = Some(docstring.clone());
                body = &body[1..];
            }
        }
        let mut constraints = None;
        if body.len() >= 2 {
            if let Expr::Map(pairs) = &body[0] {
                constraints = Some(self.parse_constraints(pairs, &params)?);
                body = &body[1..];
            }
        }
        if body.is_empty() {
            return Err(form_syntax("defn requires at least one body form"));
        }

        env.define(
            *name,
            Value::closure(Closure {
                name: Some(*name),
                params,
                body: body.to_vec(),
                env: env.clone(),
                doc,
                constraints,
            }),
        );
        Ok(Value::Nil)
    }

    /// `(match scrutinee (pattern body...)...)` - first match wins, no
    /// fallthrough; exhaustion is a hard failure.
    fn eval_match(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [scrutinee_expr, clauses @ ..] = args else {
            return Err(form_syntax("match takes a value and clauses"));
        };
        let scrutinee = self.eval(scrutinee_expr, env)?;

        for clause in clauses {
            let Expr::List(clause_items) = clause else {
                return Err(form_syntax("match clause must be (pattern body...)"));
            };
            let [pattern_expr, body @ ..] = clause_items.as_slice() else {
                return Err(form_syntax("match clause must be (pattern body...)"));
            };
            if body.is_empty() {
                return Err(form_syntax("match clause requires a body"));
            }
            let pattern = Pattern::compile(pattern_expr, self.interner())?;
            let mut bindings = Vec::new();
            if match_value(&pattern, &scrutinee, &mut bindings) {
                // Bindings live in a fresh frame used only for this clause.
                let frame = env.child();
                for (name, value) in bindings {
                    frame.define(name, value);
                }
                return self.eval_body(body, &frame);
            }
        }
        Err(match_exhausted())
    }

    /// `(defcond name (params...) (/variant body...)...)`
    fn eval_defcond(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [Expr::Symbol(name), params_expr, variant_forms @ ..] = args else {
            return Err(form_syntax(
                "defcond takes a name, a parameter list, and variants",
            ));
        };
        if variant_forms.is_empty() {
            return Err(form_syntax("defcond requires at least one variant"));
        }
        let params = self.parse_params(params_expr)?;

        let mut variants: FxHashMap<Name, Vec<Expr>> = FxHashMap::default();
        for form in variant_forms {
            let Expr::List(items) = form else {
                return Err(form_syntax("defcond variant must be (/name body...)"));
            };
            let [Expr::Symbol(head), body @ ..] = items.as_slice() else {
                return Err(form_syntax("defcond variant must be (/name body...)"));
            };
            let head_text = self.interner().lookup(*head);
            let Some(variant_text) = head_text.strip_prefix('/') else {
                return Err(form_syntax("defcond variant name must start with /"));
            };
            if variant_text.is_empty() || body.is_empty() {
                return Err(form_syntax("defcond variant must be (/name body...)"));
            }
            let qualifier = self.interner().intern(variant_text);
            if variants.insert(qualifier, body.to_vec()).is_some() {
                return Err(form_syntax(format!(
                    "defcond variant /{variant_text} is defined twice"
                )));
            }
        }

        env.define(
            *name,
            Value::cond_def(CondDef {
                name: *name,
                params,
                variants,
                env: env.clone(),
            }),
        );
        Ok(Value::Nil)
    }

    /// `(class Name (prop default)... (method name (params...) body...)...)`
    fn eval_class(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [Expr::Symbol(name), members @ ..] = args else {
            return Err(form_syntax("class takes a name and member forms"));
        };

        let mut defaults = Vec::new();
        let mut methods = FxHashMap::default();
        for member in members {
            let Expr::List(items) = member else {
                return Err(form_syntax(
                    "class member must be a property pair or a method form",
                ));
            };
            if member.head_symbol() == Some(self.forms_copy().method) {
                let def = self.parse_method(&items[1..])?;
                methods.insert(def.name, Heap::new(def));
                continue;
            }
            let [Expr::Symbol(prop), default_expr] = items.as_slice() else {
                return Err(form_syntax(
                    "class member must be (prop default) or (method name (params) body...)",
                ));
            };
            // Defaults are evaluated once, at definition time, in the
            // class's defining environment.
            let default = self.eval(default_expr, env)?;
            defaults.push((*prop, default));
        }

        env.define(
            *name,
            Value::class(ClassDef {
                name: *name,
                defaults,
                methods,
                env: env.clone(),
            }),
        );
        Ok(Value::Nil)
    }

    fn parse_method(&mut self, args: &[Expr]) -> Result<MethodDef, EvalError> {
        let [Expr::Symbol(name), params_expr, body @ ..] = args else {
            return Err(form_syntax(
                "method takes a name, a parameter list, and a body",
            ));
        };
        if body.is_empty() {
            return Err(form_syntax("method requires at least one body form"));
        }
        Ok(MethodDef {
            name: *name,
            params: self.parse_params(params_expr)?,
            body: body.to_vec(),
        })
    }

    /// `(. target path...)` - context-forced lookup: each path segment
    /// resolves against the value of the previous one, never the ambient
    /// environment.
    fn eval_dot(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [target_expr, segments @ ..] = args else {
            return Err(form_syntax(". takes a target and at least one path segment"));
        };
        if segments.is_empty() {
            return Err(form_syntax(". takes a target and at least one path segment"));
        }
        let mut value = self.eval(target_expr, env)?;
        for segment in segments {
            value = self.resolve_segment(&value, segment, env)?;
        }
        Ok(value)
    }

    fn resolve_segment(&mut self, target: &Value, segment: &Expr, env: &EnvRef) -> EvalResult {
        match target {
            Value::Instance(receiver) => match segment {
                Expr::Symbol(name) => self.instance_member(receiver, *name),
                Expr::List(items) => {
                    let [Expr::Symbol(method_name), arg_exprs @ ..] = items.as_slice() else {
                        return Err(form_syntax(
                            "instance path segment must be a name or (method args...)",
                        ));
                    };
                    // Arguments evaluate in the ambient environment; only
                    // the method name resolves against the instance.
                    let mut args = Vec::with_capacity(arg_exprs.len());
                    for arg_expr in arg_exprs {
                        args.push(self.eval(arg_expr, env)?);
                    }
                    self.call_instance_member(receiver, *method_name, &args)
                }
                _ => Err(form_syntax(
                    "instance path segment must be a name or (method args...)",
                )),
            },
            // A capture is a lookup context: the segment evaluates with the
            // captured environment as the ambient one.
            Value::Env(captured) => self.eval(segment, &captured.clone()),
            other => Err(type_mismatch("an instance or environment", other.type_name())),
        }
    }

    /// Two-level member lookup: instance property frame, then the class's
    /// method table. Lexical scope is never searched.
    fn instance_member(&mut self, receiver: &Heap<Instance>, name: Name) -> EvalResult {
        if let Some(value) = receiver.props.lookup_local(name) {
            return Ok(value);
        }
        if let Some(method) = receiver.class.method(name) {
            return Ok(Value::bound_method(BoundMethod {
                receiver: receiver.clone(),
                method,
            }));
        }
        Err(unbound_symbol(&format!(
            "{}.{}",
            self.interner().lookup(receiver.class.name),
            self.interner().lookup(name)
        )))
    }

    fn call_instance_member(
        &mut self,
        receiver: &Heap<Instance>,
        name: Name,
        args: &[Value],
    ) -> EvalResult {
        if let Some(value) = receiver.props.lookup_local(name) {
            // A per-instance binding is an ordinary procedure value.
            return self.apply(&value, args);
        }
        let Some(method) = receiver.class.method(name) else {
            return Err(unbound_symbol(&format!(
                "{}.{}",
                self.interner().lookup(receiver.class.name),
                self.interner().lookup(name)
            )));
        };
        self.call_method(receiver, &method, args)
    }

    /// `(capture modes...)` - capture the current environment behind a
    /// filtered read-through view.
    fn eval_capture(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let mut filter = CaptureFilter::default();
        let forms = self.forms_copy();
        for mode in args {
            let Expr::Keyword(name) = mode else {
                return Err(form_syntax(
                    "capture modes are :callables, :vars, and :local",
                ));
            };
            if *name == forms.kw_callables || *name == forms.kw_vars {
                if filter.select != BindingSelect::All {
                    return Err(form_syntax(
                        "capture takes at most one of :callables and :vars",
                    ));
                }
                filter.select = if *name == forms.kw_callables {
                    BindingSelect::CallablesOnly
                } else {
                    BindingSelect::VarsOnly
                };
            } else if *name == forms.kw_local {
                filter.parents = false;
            } else {
                return Err(form_syntax(
                    "capture modes are :callables, :vars, and :local",
                ));
            }
        }
        Ok(Value::Env(env.capture(filter)))
    }

    /// `(with env-expr body...)` - evaluate the body with the captured
    /// environment as the lookup context.
    fn eval_with(&mut self, args: &[Expr], env: &EnvRef) -> EvalResult {
        let [env_expr, body @ ..] = args else {
            return Err(form_syntax("with takes an environment and a body"));
        };
        if body.is_empty() {
            return Err(form_syntax("with requires at least one body form"));
        }
        let target = self.eval(env_expr, env)?;
        let Value::Env(captured) = target else {
            return Err(type_mismatch("an environment", target.type_name()));
        };
        let frame = captured.child();
        self.eval_body(body, &frame)
    }

    /// `[(for-in (pat seq) expr)]` list comprehension.
    pub(super) fn eval_list_comprehension(&mut self, form: &Expr, env: &EnvRef) -> EvalResult {
        let (pattern, seq_expr, bodies) = self.parse_for_in(form)?;
        let [body] = bodies else {
            return Err(form_syntax(
                "list comprehension takes exactly one element expression",
            ));
        };
        let seq = self.eval(seq_expr, env)?;
        let mut out = Vec::new();
        for item in ValueIter::new(&seq)? {
            let frame = self.bind_comprehension(&pattern, &item, env)?;
            out.push(self.eval(body, &frame)?);
        }
        Ok(Value::vector(out))
    }

    /// `{(for-in (pat seq) key-expr val-expr)}` dict comprehension.
    ///
    /// One key and one value expression are required; anything else would
    /// break the even-length-pairs guarantee and is a syntax error.
    pub(super) fn eval_dict_comprehension(&mut self, form: &Expr, env: &EnvRef) -> EvalResult {
        let (pattern, seq_expr, bodies) = self.parse_for_in(form)?;
        let [key_body, value_body] = bodies else {
            return Err(form_syntax(
                "dict comprehension takes exactly one key and one value expression",
            ));
        };
        let seq = self.eval(seq_expr, env)?;
        let mut entries = FxHashMap::default();
        for item in ValueIter::new(&seq)? {
            let frame = self.bind_comprehension(&pattern, &item, env)?;
            let key_value = self.eval(key_body, &frame)?;
            let key = MapKey::from_value(&key_value).ok_or_else(|| {
                form_syntax(format!(
                    "map key of type {} is not hashable",
                    key_value.type_name()
                ))
            })?;
            entries.insert(key, self.eval(value_body, &frame)?);
        }
        Ok(Value::map(entries))
    }

    /// Parse `(for-in (pat seq-expr) body...)`, compiling the pattern.
    fn parse_for_in<'e>(
        &mut self,
        form: &'e Expr,
    ) -> Result<(Pattern, &'e Expr, &'e [Expr]), EvalError> {
        let Expr::List(items) = form else {
            return Err(form_syntax("for-in must be (for-in (pat seq) body...)"));
        };
        let [_, binder, bodies @ ..] = items.as_slice() else {
            return Err(form_syntax("for-in must be (for-in (pat seq) body...)"));
        };
        let Expr::List(binder_items) = binder else {
            return Err(form_syntax("for-in binder must be (pattern sequence)"));
        };
        let [pattern_expr, seq_expr] = binder_items.as_slice() else {
            return Err(form_syntax("for-in binder must be (pattern sequence)"));
        };
        let pattern = Pattern::compile(pattern_expr, self.interner())?;
        Ok((pattern, seq_expr, bodies))
    }

    fn bind_comprehension(
        &mut self,
        pattern: &Pattern,
        item: &Value,
        env: &EnvRef,
    ) -> Result<EnvRef, EvalError> {
        let mut bindings = Vec::new();
        if !match_value(pattern, item, &mut bindings) {
            return Err(destructure_mismatch(
                &pattern.describe(self.interner()),
            ));
        }
        let frame = env.child();
        for (name, value) in bindings {
            frame.define(name, value);
        }
        Ok(frame)
    }

    /// Parse a parameter list: plain names, `_` wildcards, and
    /// destructuring patterns.
    fn parse_params(&mut self, expr: &Expr) -> Result<ParamList, EvalError> {
        let Expr::List(items) = expr else {
            return Err(form_syntax("parameter list must be a list"));
        };
        let mut params = ParamList::new();
        for item in items {
            match item {
                Expr::Symbol(name) => {
                    if self.interner().lookup(*name) == "_" {
                        params.push(Param::Pattern(Pattern::Wildcard));
                    } else {
                        params.push(Param::Name(*name));
                    }
                }
                Expr::List(_) | Expr::Vector(_) | Expr::Map(_) => {
                    params.push(Param::Pattern(Pattern::compile(item, self.interner())?));
                }
                _ => return Err(form_syntax("parameter must be a name or a pattern")),
            }
        }
        Ok(params)
    }

    fn parse_constraints(
        &mut self,
        pairs: &[(Expr, Expr)],
        params: &ParamList,
    ) -> Result<TypeMap, EvalError> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (key, spec_expr) in pairs {
            let Expr::Symbol(name) = key else {
                return Err(form_syntax(
                    "type constraint keys must be parameter names",
                ));
            };
            let is_plain_param = params
                .iter()
                .any(|p| matches!(p, Param::Name(n) if n == name));
            if !is_plain_param {
                return Err(form_syntax(format!(
                    "type constraint names unknown parameter {}",
                    self.interner().lookup(*name)
                )));
            }
            entries.push((*name, TypeSpec::parse(spec_expr, self.interner())?));
        }
        Ok(TypeMap::new(entries))
    }

    fn forms_copy(&self) -> FormNames {
        self.forms
    }
}
