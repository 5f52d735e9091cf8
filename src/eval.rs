//! The evaluator.
//!
//! Two things make this evaluator unusual. First, scoping is dynamic: a
//! symbol's value is the head of its own binding stack, pushed by
//! `lambda` application and popped on the way back out — there is no
//! closure environment captured at definition time. Second, the "how many
//! more reductions are we allowed" budget `d` is not a native integer: it
//! is either the sentinel [`Symbols::no_time_limit`] or an ordinary LISP
//! number, decremented with the same digit-list arithmetic every other
//! number in the language uses. This lets `try` bound a sub-evaluation by
//! an arbitrarily large count without the host's integer width ever being
//! part of the language's semantics.

use crate::arena::{Arena, NodeId, Primitive, NIL};
use crate::digits::{self, nmb, Ordering3};
use crate::printer;
use crate::symbols::Symbols;
use crate::tape::{self, TapeStack};

/// Per-run mutable evaluator state: the nested-tape stack `try` pushes
/// onto, the parallel display-capture stacks, and the reference
/// interpreter's `Calls to eval` counter.
pub struct EvalState {
    pub tapes: TapeStack,
    display_enabled: Vec<bool>,
    captured_displays: Vec<Vec<NodeId>>,
    pub eval_calls: u64,
    /// Display/debug output sink — every `display` (when enabled) and
    /// `debug` call writes a trace line here, keeping the evaluator itself
    /// free of any direct dependency on stdout.
    pub sink: Box<dyn FnMut(&str)>,
}

impl EvalState {
    pub fn new(sink: Box<dyn FnMut(&str)>) -> Self {
        EvalState {
            tapes: TapeStack::new(),
            display_enabled: vec![true],
            captured_displays: vec![Vec::new()],
            eval_calls: 0,
            sink,
        }
    }

    fn display_enabled(&self) -> bool {
        *self.display_enabled.last().expect("display stack is never empty")
    }

    fn capture(&mut self, value: NodeId) {
        self.captured_displays
            .last_mut()
            .expect("capture stack is never empty")
            .push(value);
    }
}

/// Top-level entry point: resets the per-run stacks (matching the
/// reference interpreter's `ev`, which reinitializes them before every
/// top-level evaluation) and evaluates `expr` with no time limit.
pub fn eval_top(arena: &mut Arena, symbols: &Symbols, state: &mut EvalState, expr: NodeId) -> Result<NodeId, NodeId> {
    state.tapes = TapeStack::new();
    state.display_enabled = vec![true];
    state.captured_displays = vec![Vec::new()];
    eval(arena, symbols, state, expr, symbols.no_time_limit)
}

/// Evaluates a list of expressions left to right, short-circuiting on the
/// first error.
fn evalst(arena: &mut Arena, symbols: &Symbols, state: &mut EvalState, e: NodeId, d: NodeId) -> Result<NodeId, NodeId> {
    if e == NIL {
        return Ok(NIL);
    }
    let x = eval(arena, symbols, state, arena.head(e), d)?;
    let y = evalst(arena, symbols, state, arena.tail(e), d)?;
    Ok(arena.cons(x, y))
}

fn append(arena: &mut Arena, x: NodeId, y: NodeId) -> NodeId {
    if x == NIL {
        return y;
    }
    let head = arena.head(x);
    let rest = append(arena, arena.tail(x), y);
    arena.cons(head, rest)
}

fn structurally_eq(arena: &Arena, x: NodeId, y: NodeId) -> bool {
    if x == y {
        return true;
    }
    if arena.is_number(x) && arena.is_number(y) {
        return arena.names_equal(arena.print_name(x), arena.print_name(y));
    }
    if arena.is_number(x) || arena.is_number(y) {
        return false;
    }
    if arena.is_atom(x) || arena.is_atom(y) {
        return false;
    }
    structurally_eq(arena, arena.head(x), arena.head(y)) && structurally_eq(arena, arena.tail(x), arena.tail(y))
}

fn list_length(arena: &mut Arena, x: NodeId) -> NodeId {
    if arena.is_atom(x) {
        return NIL;
    }
    let rest = list_length(arena, arena.tail(x));
    digits::add1(arena, rest)
}

/// Binds each formal in `vars` to the corresponding actual in `args`,
/// innermost (rightmost) first — matching the reference interpreter's
/// recursion order, which matters only in that unbinding must walk the
/// list in the opposite direction afterward.
fn bind(arena: &mut Arena, vars: NodeId, args: NodeId) {
    if arena.is_atom(vars) {
        return;
    }
    bind(arena, arena.tail(vars), arena.tail(args));
    let var = arena.head(vars);
    if arena.is_atom(var) {
        let value = arena.head(args);
        arena.push_binding(var, value);
    }
}

fn unbind(arena: &mut Arena, mut vars: NodeId) {
    while !arena.is_atom(vars) {
        let var = arena.head(vars);
        if arena.is_atom(var) {
            arena.pop_binding(var);
        }
        vars = arena.tail(vars);
    }
}

/// Evaluates `e` with reduction budget `d` (either
/// [`Symbols::no_time_limit`] or a digit-list number).
pub fn eval(arena: &mut Arena, symbols: &Symbols, state: &mut EvalState, e: NodeId, d: NodeId) -> Result<NodeId, NodeId> {
    state.eval_calls += 1;

    if arena.is_number(e) {
        return Ok(e);
    }
    if arena.is_atom(e) {
        return Ok(arena.value_of(e));
    }
    if arena.head(e) == symbols.lambda {
        return Ok(e);
    }

    let f = eval(arena, symbols, state, arena.head(e), d)?;
    let rest = arena.tail(e);

    if f == symbols.quote {
        return Ok(arena.head(rest));
    }

    if f == symbols.if_ {
        let v = eval(arena, symbols, state, arena.head(rest), d)?;
        let mut branches = arena.tail(rest);
        if v == symbols.false_ {
            branches = arena.tail(branches);
        }
        return eval(arena, symbols, state, arena.head(branches), d);
    }

    let args = evalst(arena, symbols, state, rest, d)?;
    let x = arena.head(args);
    let y = arena.head(arena.tail(args));
    let z = arena.head(arena.tail(arena.tail(args)));

    if let Some(result) = dispatch_primitive(arena, symbols, state, f, x, y, z)? {
        return Ok(result);
    }

    let mut d = d;
    if d != symbols.no_time_limit {
        if d == NIL {
            return Err(symbols.out_of_time);
        }
        d = digits::sub1(arena, d);
    }

    if f == symbols.eval_ {
        arena.clean_env();
        let v = eval(arena, symbols, state, x, d);
        arena.restore_env();
        return v;
    }

    if f == symbols.try_ {
        return eval_try(arena, symbols, state, x, y, z, d);
    }

    // f is a lambda expression: (lambda vars body)
    if arena.head(f) == symbols.lambda {
        let after_lambda = arena.tail(f);
        let vars = arena.head(after_lambda);
        let body = arena.head(arena.tail(after_lambda));

        bind(arena, vars, args);
        let v = eval(arena, symbols, state, body, d);
        unbind(arena, vars);
        return v;
    }

    // everything else is a function that returns itself
    Ok(f)
}

fn eval_try(
    arena: &mut Arena,
    symbols: &Symbols,
    state: &mut EvalState,
    mut x: NodeId,
    y: NodeId,
    z: NodeId,
    d: NodeId,
) -> Result<NodeId, NodeId> {
    let mut old_try_has_smaller_time_limit = false;
    if x != symbols.no_time_limit {
        x = nmb(arena, x);
    }
    if x == symbols.no_time_limit || (d != symbols.no_time_limit && digits::compare(arena, x, d) != Ordering3::Lt) {
        old_try_has_smaller_time_limit = true;
        x = d;
    }

    state.tapes.push(z);
    state.display_enabled.push(false);
    state.captured_displays.push(Vec::new());

    arena.clean_env();
    let result = eval(arena, symbols, state, y, x);
    arena.restore_env();

    state.tapes.pop();
    state.display_enabled.pop();
    let captured = state.captured_displays.pop().expect("capture stack is never empty");
    let mut captured_list = NIL;
    for value in captured.into_iter().rev() {
        captured_list = arena.cons(value, captured_list);
    }

    match result {
        Err(e) if old_try_has_smaller_time_limit && e == symbols.out_of_time => Err(e),
        Err(e) => {
            let captured_list_nil = arena.cons(captured_list, NIL);
            let e_captured_list_nil = arena.cons(e, captured_list_nil);
            Ok(arena.cons(symbols.failure, e_captured_list_nil))
        }
        Ok(v) => {
            let captured_list_nil = arena.cons(captured_list, NIL);
            let v_captured_list_nil = arena.cons(v, captured_list_nil);
            Ok(arena.cons(symbols.success, v_captured_list_nil))
        }
    }
}

/// Primitive dispatch. Returns `Ok(None)` when `f` is not a primitive, so
/// callers fall through to special-form / lambda / self-returning
/// handling exactly where the reference interpreter's `switch` falls
/// through its `default`.
fn dispatch_primitive(
    arena: &mut Arena,
    symbols: &Symbols,
    state: &mut EvalState,
    f: NodeId,
    x: NodeId,
    y: NodeId,
    z: NodeId,
) -> Result<Option<NodeId>, NodeId> {
    let result = match arena.primitive(f) {
        Primitive::None => return Ok(None),
        Primitive::Car => arena.head(x),
        Primitive::Cdr => arena.tail(x),
        Primitive::Cons => arena.cons(x, y),
        Primitive::Atom => {
            if arena.is_atom(x) {
                symbols.true_
            } else {
                symbols.false_
            }
        }
        Primitive::Eq => {
            if structurally_eq(arena, x, y) {
                symbols.true_
            } else {
                symbols.false_
            }
        }
        Primitive::Display => {
            if state.display_enabled() {
                let line = printer::render_trace_line(arena, "display", x);
                (state.sink)(&line);
            } else {
                state.capture(x);
            }
            x
        }
        Primitive::Debug => {
            let line = printer::render_trace_line(arena, "debug", x);
            (state.sink)(&line);
            x
        }
        Primitive::Append => {
            let x = if arena.is_atom(x) { NIL } else { x };
            let y = if arena.is_atom(y) { NIL } else { y };
            append(arena, x, y)
        }
        Primitive::Length => {
            let len = list_length(arena, x);
            arena.make_number(len)
        }
        Primitive::Lt => bool_atom(symbols, digits::compare(arena, nmb(arena, x), nmb(arena, y)) == Ordering3::Lt),
        Primitive::Gt => bool_atom(symbols, digits::compare(arena, nmb(arena, x), nmb(arena, y)) == Ordering3::Gt),
        Primitive::Leq => bool_atom(symbols, digits::compare(arena, nmb(arena, x), nmb(arena, y)) != Ordering3::Gt),
        Primitive::Geq => bool_atom(symbols, digits::compare(arena, nmb(arena, x), nmb(arena, y)) != Ordering3::Lt),
        Primitive::Plus => {
            let sum = digits::addition(arena, nmb(arena, x), nmb(arena, y), NIL);
            arena.make_number(sum)
        }
        Primitive::Times => {
            let product = digits::multiplication(arena, nmb(arena, x), nmb(arena, y));
            arena.make_number(product)
        }
        Primitive::Pow => {
            let result = digits::exponentiation(arena, nmb(arena, x), nmb(arena, y));
            arena.make_number(result)
        }
        Primitive::Minus => {
            let (xn, yn) = (nmb(arena, x), nmb(arena, y));
            if digits::compare(arena, xn, yn) != Ordering3::Gt {
                arena.make_number(NIL)
            } else {
                let diff = digits::subtraction(arena, xn, yn, NIL);
                let canonical = digits::remove_leading_zeros(arena, diff);
                arena.make_number(canonical)
            }
        }
        Primitive::Base2To10 => {
            let value = digits::base2_to_10(arena, x);
            arena.make_number(value)
        }
        Primitive::Base10To2 => {
            let n = nmb(arena, x);
            digits::base10_to_2_with(arena, symbols.zero, symbols.one, n)
        }
        Primitive::Size => {
            let chars = printer::char_count(arena, x);
            let digits_str = chars.to_string();
            let list = arena.make_string(&digits_str);
            let canonical = digits::remove_leading_zeros(arena, list);
            arena.make_number(canonical)
        }
        Primitive::ReadBit => return tape::TapeStack::read_bit(&mut state.tapes, arena, symbols).map(Some),
        Primitive::Bits => tape::encode_bits(arena, symbols, x),
        Primitive::ReadExp => return tape::read_exp(&mut state.tapes, arena, symbols).map(Some),
    };
    Ok(Some(result))
}

fn bool_atom(symbols: &Symbols, b: bool) -> NodeId {
    if b {
        symbols.true_
    } else {
        symbols.false_
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;

    fn eval_str(text: &str) -> (Arena, Symbols, String) {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let mut reader = Reader::new(text.as_bytes());
        let expr = reader.read(&mut arena, &symbols, true, false).unwrap();
        let mut output = String::new();
        let mut state = EvalState::new(Box::new(|_: &str| {}));
        let result = eval_top(&mut arena, &symbols, &mut state, expr).unwrap();
        output.push_str(&printer::render(&arena, result));
        (arena, symbols, output)
    }

    #[test]
    fn arithmetic_evaluates() {
        let (_, _, out) = eval_str("+ 2 3\n");
        assert_eq!(out, "5");
    }

    #[test]
    fn if_picks_the_true_branch() {
        let (_, _, out) = eval_str("if true 1 2\n");
        assert_eq!(out, "1");
    }

    #[test]
    fn if_picks_the_false_branch() {
        let (_, _, out) = eval_str("if false 1 2\n");
        assert_eq!(out, "2");
    }

    #[test]
    fn quote_returns_unevaluated_data() {
        let (_, _, out) = eval_str("'(a b c)\n");
        assert_eq!(out, "(a b c)");
    }

    #[test]
    fn cadr_reads_second_element() {
        let (_, _, out) = eval_str("cadr '(a b c)\n");
        assert_eq!(out, "b");
    }

    #[test]
    fn try_with_enough_depth_succeeds() {
        let (_, _, out) = eval_str("try 10 + 1 1 nil\n");
        assert_eq!(out, "(success 2 ())");
    }

    #[test]
    fn try_with_a_primitive_body_ignores_the_depth_budget() {
        // `try`'s operands are evaluated eagerly by the caller's own
        // `evalst` before `eval_try` ever runs, so `(+ 1 1)` is already
        // reduced to `2` by the time `eval_try` sees it; a primitive body
        // never touches the depth counter at all (primitives return before
        // the decrement). Zero depth only matters for a body that actually
        // recurses through another application — see
        // `try_with_a_recursive_body_exhausts_depth` below.
        let (_, _, out) = eval_str("try 0 + 1 1 nil\n");
        assert_eq!(out, "(success 2 ())");
    }

    #[test]
    fn try_with_a_recursive_body_exhausts_depth() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let mut state = EvalState::new(Box::new(|_: &str| {}));

        let mut reader = Reader::new("define (F x) if (= x 0) 1 (* x (F (- x 1)))\n".as_bytes());
        let define_expr = reader.read(&mut arena, &symbols, true, false).unwrap();
        crate::repl::bind_define(&mut arena, &symbols, define_expr, &mut |_: &str| {});

        let mut reader = Reader::new("try 1 '(F 5) nil\n".as_bytes());
        let try_expr = reader.read(&mut arena, &symbols, true, false).unwrap();
        let result = eval_top(&mut arena, &symbols, &mut state, try_expr).unwrap();
        assert_eq!(printer::render(&arena, result), "(failure out-of-time ())");
    }

    #[test]
    fn lambda_application_binds_and_unbinds() {
        let (_, _, out) = eval_str("(lambda (x) + x 1) 4\n");
        assert_eq!(out, "5");
    }

    #[test]
    fn eq_is_structural() {
        let (_, _, out) = eval_str("= '(1 2) '(1 2)\n");
        assert_eq!(out, "true");
    }

    #[test]
    fn length_counts_elements() {
        let (_, _, out) = eval_str("length '(a b c)\n");
        assert_eq!(out, "3");
    }

    #[test]
    fn display_is_captured_inside_try_rather_than_printed() {
        let (_, _, out) = eval_str("try no-time-limit display 42 nil\n");
        assert_eq!(out, "(success 42 (42))");
    }
}
