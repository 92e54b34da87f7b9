use super::*;
use crate::value::{NativeProcedure, Value};
use rill_ir::SharedInterner;

fn native_stub() -> Value {
    fn stub(
        _interp: &mut crate::Interpreter,
        _args: &[Value],
    ) -> Result<Value, crate::errors::EvalError> {
        Ok(Value::Nil)
    }
    Value::Native(NativeProcedure {
        name: "stub",
        func: stub,
    })
}

#[test]
fn define_then_lookup_returns_the_value() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let env = EnvRef::new();
    env.define(x, Value::Int(42));
    assert_eq!(env.lookup(x), Some(Value::Int(42)));
}

#[test]
fn define_overwrites_in_the_local_frame() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let env = EnvRef::new();
    env.define(x, Value::Int(1));
    env.define(x, Value::Int(2));
    assert_eq!(env.lookup(x), Some(Value::Int(2)));
}

#[test]
fn child_lookup_walks_the_chain() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let parent = EnvRef::new();
    parent.define(x, Value::Int(1));
    let child = parent.child();
    assert_eq!(child.lookup(x), Some(Value::Int(1)));
}

#[test]
fn child_define_shadows_without_touching_parent() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let parent = EnvRef::new();
    parent.define(x, Value::Int(1));
    let child = parent.child();
    child.define(x, Value::Int(2));

    assert_eq!(child.lookup(x), Some(Value::Int(2)));
    assert_eq!(parent.lookup(x), Some(Value::Int(1)));
}

#[test]
fn set_mutates_the_nearest_defining_frame() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let parent = EnvRef::new();
    parent.define(x, Value::Int(1));
    let child = parent.child();

    assert_eq!(child.set(x, Value::Int(5)), Ok(()));
    assert_eq!(parent.lookup(x), Some(Value::Int(5)));
}

#[test]
fn set_on_undefined_symbol_fails() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");

    let env = EnvRef::new();
    assert_eq!(env.set(x, Value::Int(1)), Err(SetError::Undefined));
}

mod captures {
    use super::*;

    #[test]
    fn capture_sees_source_bindings() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        let capture = source.capture(CaptureFilter::default());
        assert_eq!(capture.lookup(x), Some(Value::Int(1)));
    }

    #[test]
    fn set_through_capture_never_writes_back() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        let capture = source.capture(CaptureFilter::default());

        assert_eq!(capture.set(x, Value::Int(99)), Ok(()));
        assert_eq!(capture.lookup(x), Some(Value::Int(99)));
        assert_eq!(source.lookup(x), Some(Value::Int(1)));
    }

    #[test]
    fn capture_is_read_through_not_a_copy() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        let capture = source.capture(CaptureFilter::default());

        // A mutation of the source after capture is visible.
        source.define(x, Value::Int(2));
        assert_eq!(capture.lookup(x), Some(Value::Int(2)));
    }

    #[test]
    fn callables_only_filter_hides_plain_values() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");
        let f = interner.intern("f");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        source.define(f, native_stub());

        let capture = source.capture(CaptureFilter {
            select: BindingSelect::CallablesOnly,
            parents: true,
        });
        assert_eq!(capture.lookup(x), None);
        assert!(capture.lookup(f).is_some());
    }

    #[test]
    fn vars_only_filter_hides_callables() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");
        let f = interner.intern("f");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        source.define(f, native_stub());

        let capture = source.capture(CaptureFilter {
            select: BindingSelect::VarsOnly,
            parents: true,
        });
        assert_eq!(capture.lookup(x), Some(Value::Int(1)));
        assert_eq!(capture.lookup(f), None);
    }

    #[test]
    fn local_only_filter_excludes_outer_frames() {
        let interner = SharedInterner::default();
        let outer = interner.intern("outer");
        let inner = interner.intern("inner");

        let root = EnvRef::new();
        root.define(outer, Value::Int(1));
        let frame = root.child();
        frame.define(inner, Value::Int(2));

        let capture = frame.capture(CaptureFilter {
            select: BindingSelect::All,
            parents: false,
        });
        assert_eq!(capture.lookup(inner), Some(Value::Int(2)));
        assert_eq!(capture.lookup(outer), None);
    }

    #[test]
    fn set_through_filtered_capture_respects_the_filter() {
        let interner = SharedInterner::default();
        let f = interner.intern("f");

        let source = EnvRef::new();
        source.define(f, native_stub());

        let capture = source.capture(CaptureFilter {
            select: BindingSelect::VarsOnly,
            parents: true,
        });
        // f is filtered out, so it does not "exist" for set.
        assert_eq!(capture.set(f, Value::Int(1)), Err(SetError::Undefined));
    }

    #[test]
    fn child_of_capture_sets_shadow_into_the_capture() {
        let interner = SharedInterner::default();
        let x = interner.intern("x");

        let source = EnvRef::new();
        source.define(x, Value::Int(1));
        let capture = source.capture(CaptureFilter::default());
        let inner = capture.child();

        assert_eq!(inner.set(x, Value::Int(7)), Ok(()));
        assert_eq!(inner.lookup(x), Some(Value::Int(7)));
        assert_eq!(source.lookup(x), Some(Value::Int(1)));
    }
}
