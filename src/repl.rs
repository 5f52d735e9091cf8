//! The top-level read-eval-print loop: the "textual REPL driver" that sits
//! outside the core proper, turning a stream of meta-expressions into trace
//! output. Mirrors the reference interpreter's `main`: blank lines bracket
//! each turn, `define` is special-cased (it binds without evaluating its
//! value), everything else is printed as `expression …` / `value …`, and
//! end-of-input is ordinary termination, not an error.

use crate::arena::{Arena, NIL};
use crate::error::{AitError, AitResult};
use crate::eval::{self, EvalState};
use crate::printer;
use crate::reader::Reader;
use crate::symbols::Symbols;

/// Runs the loop to completion (until the reader reports end-of-input),
/// writing every trace line through `print`. Returns normally on EOF; any
/// other reader failure is propagated.
pub fn run(
    arena: &mut Arena,
    symbols: &Symbols,
    reader: &mut Reader,
    state: &mut EvalState,
    mut print: impl FnMut(&str),
) -> AitResult<()> {
    loop {
        print("\n");
        let e = match reader.read(arena, symbols, true, false) {
            Ok(e) => e,
            Err(AitError::Eof) => {
                print(&format!(
                    "End of LISP Run\n\nCalls to eval = {}\nCalls to cons = {}\n",
                    state.eval_calls,
                    arena.cons_calls
                ));
                return Ok(());
            }
            Err(other) => return Err(other),
        };
        print("\n");

        if arena.head(e) == symbols.define {
            bind_define(arena, symbols, e, &mut print);
            continue;
        }

        print(&printer::render_trace_line(arena, "expression", e));
        print("\n");
        let v = match eval::eval_top(arena, symbols, state, e) {
            Ok(v) => v,
            Err(err) => err,
        };
        print(&printer::render_trace_line(arena, "value", v));
        print("\n");
    }
}

/// `(define x v)` binds `x`'s current value to `v` without evaluating it;
/// `(define (f args…) body)` is first rewritten into the equivalent
/// `(define f (lambda (args…) body))` form.
pub(crate) fn bind_define(arena: &mut Arena, symbols: &Symbols, e: usize, print: &mut impl FnMut(&str)) {
    let rest = arena.tail(e);
    let name = arena.head(rest);
    let def = arena.head(arena.tail(rest));

    let (name, def) = if arena.is_atom(name) {
        (name, def)
    } else {
        let var_list = arena.tail(name);
        let fn_name = arena.head(name);
        let def_nil = arena.cons(def, NIL);
        let var_list_def_nil = arena.cons(var_list, def_nil);
        let lambda_expr = arena.cons(symbols.lambda, var_list_def_nil);
        (fn_name, lambda_expr)
    };

    print(&printer::render_trace_line(arena, "define", name));
    print("\n");
    print(&printer::render_trace_line(arena, "value", def));
    print("\n");

    let older = arena.tail(arena.bindings(name));
    let forced = arena.cons(def, older);
    arena.set_bindings(name, forced);
}
