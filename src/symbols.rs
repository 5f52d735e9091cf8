//! The fixed table of well-known atoms every run starts with: primitives,
//! special forms, sentinel values and the break-character atoms the reader
//! needs to recognize by identity. This is the Rust equivalent of
//! `initialize_atoms()` — the arity column here is exactly the arity table
//! from the reference interpreter, used by the reader to decide how many
//! trailing sub-expressions a bare (unparenthesized) use of the atom
//! consumes.

use crate::arena::{Arena, NodeId, Primitive};

/// Handles to every atom the core needs to refer to by identity rather than
/// by looking its name up again at runtime.
pub struct Symbols {
    /// The text atom `nil`, distinct from the arena's index-0 empty-list
    /// sentinel — this is the symbol a program spells out, forced below to
    /// evaluate to the sentinel rather than to itself.
    pub nil_word: NodeId,
    pub true_: NodeId,
    pub false_: NodeId,
    pub no_time_limit: NodeId,
    pub out_of_time: NodeId,
    pub out_of_data: NodeId,
    pub success: NodeId,
    pub failure: NodeId,

    pub define: NodeId,
    pub let_: NodeId,
    pub lambda: NodeId,
    pub quote: NodeId,
    pub if_: NodeId,
    pub cadr: NodeId,
    pub caddr: NodeId,
    pub run_utm_on: NodeId,
    pub eval_: NodeId,
    pub try_: NodeId,

    pub car: NodeId,
    pub cdr: NodeId,
    pub cons: NodeId,
    pub atom: NodeId,
    pub eq: NodeId,
    pub display: NodeId,
    pub debug: NodeId,
    pub append: NodeId,
    pub length: NodeId,
    pub lt: NodeId,
    pub gt: NodeId,
    pub leq: NodeId,
    pub geq: NodeId,
    pub plus: NodeId,
    pub times: NodeId,
    pub pow: NodeId,
    pub minus: NodeId,
    pub base2_to_10: NodeId,
    pub base10_to_2: NodeId,
    pub size: NodeId,
    pub read_bit: NodeId,
    pub bits: NodeId,
    pub read_exp: NodeId,

    pub left_paren: NodeId,
    pub right_paren: NodeId,
    pub left_bracket: NodeId,
    pub right_bracket: NodeId,
    pub double_quote: NodeId,

    pub zero: NodeId,
    pub one: NodeId,
}

impl Symbols {
    /// Builds the well-known-atom table on a freshly constructed [`Arena`].
    /// Order matters only in that every atom must exist before
    /// [`Arena::clean_env`] is ever called against it; the object list
    /// itself is unordered for lookup purposes.
    pub fn install(arena: &mut Arena) -> Symbols {
        let mk = |arena: &mut Arena, prim: Primitive, name: &str, arity: u8| {
            arena.make_atom(prim, name, arity)
        };

        let nil_word = mk(arena, Primitive::None, "nil", 0);
        // The token `nil` must evaluate to the empty list, not to itself.
        let rest = arena.tail(arena.bindings(nil_word));
        let forced = arena.cons(crate::arena::NIL, rest);
        arena.set_bindings(nil_word, forced);
        arena.nil_word = nil_word;

        let true_ = mk(arena, Primitive::None, "true", 0);
        let false_ = mk(arena, Primitive::None, "false", 0);
        let no_time_limit = mk(arena, Primitive::None, "no-time-limit", 0);
        let out_of_time = mk(arena, Primitive::None, "out-of-time", 0);
        let out_of_data = mk(arena, Primitive::None, "out-of-data", 0);
        let success = mk(arena, Primitive::None, "success", 0);
        let failure = mk(arena, Primitive::None, "failure", 0);

        let define = mk(arena, Primitive::None, "define", 3);
        let let_ = mk(arena, Primitive::None, "let", 4);
        let lambda = mk(arena, Primitive::None, "lambda", 3);
        let quote = mk(arena, Primitive::None, "'", 2);
        let if_ = mk(arena, Primitive::None, "if", 4);
        let cadr = mk(arena, Primitive::None, "cadr", 2);
        let caddr = mk(arena, Primitive::None, "caddr", 2);
        let run_utm_on = mk(arena, Primitive::None, "run-utm-on", 2);
        let eval_ = mk(arena, Primitive::None, "eval", 2);
        let try_ = mk(arena, Primitive::None, "try", 4);

        let car = mk(arena, Primitive::Car, "car", 2);
        let cdr = mk(arena, Primitive::Cdr, "cdr", 2);
        let cons = mk(arena, Primitive::Cons, "cons", 3);
        let atom = mk(arena, Primitive::Atom, "atom", 2);
        let eq = mk(arena, Primitive::Eq, "=", 3);
        let display = mk(arena, Primitive::Display, "display", 2);
        let debug = mk(arena, Primitive::Debug, "debug", 2);
        let append = mk(arena, Primitive::Append, "append", 3);
        let length = mk(arena, Primitive::Length, "length", 2);
        let lt = mk(arena, Primitive::Lt, "<", 3);
        let gt = mk(arena, Primitive::Gt, ">", 3);
        let leq = mk(arena, Primitive::Leq, "<=", 3);
        let geq = mk(arena, Primitive::Geq, ">=", 3);
        let plus = mk(arena, Primitive::Plus, "+", 3);
        let times = mk(arena, Primitive::Times, "*", 3);
        let pow = mk(arena, Primitive::Pow, "^", 3);
        let minus = mk(arena, Primitive::Minus, "-", 3);
        let base2_to_10 = mk(arena, Primitive::Base2To10, "base2-to-10", 2);
        let base10_to_2 = mk(arena, Primitive::Base10To2, "base10-to-2", 2);
        let size = mk(arena, Primitive::Size, "size", 2);
        let read_bit = mk(arena, Primitive::ReadBit, "read-bit", 1);
        let bits = mk(arena, Primitive::Bits, "bits", 2);
        let read_exp = mk(arena, Primitive::ReadExp, "read-exp", 1);

        let left_paren = mk(arena, Primitive::None, "(", 0);
        let right_paren = mk(arena, Primitive::None, ")", 0);
        let left_bracket = mk(arena, Primitive::None, "[", 0);
        let right_bracket = mk(arena, Primitive::None, "]", 0);
        let double_quote = mk(arena, Primitive::None, "\"", 0);

        let zero = arena.make_number(crate::arena::NIL);
        let one_digits = arena.make_string("1");
        let one = arena.make_number(one_digits);

        Symbols {
            nil_word,
            true_,
            false_,
            no_time_limit,
            out_of_time,
            out_of_data,
            success,
            failure,
            define,
            let_,
            lambda,
            quote,
            if_,
            cadr,
            caddr,
            run_utm_on,
            eval_,
            try_,
            car,
            cdr,
            cons,
            atom,
            eq,
            display,
            debug,
            append,
            length,
            lt,
            gt,
            leq,
            geq,
            plus,
            times,
            pow,
            minus,
            base2_to_10,
            base10_to_2,
            size,
            read_bit,
            bits,
            read_exp,
            left_paren,
            right_paren,
            left_bracket,
            right_bracket,
            double_quote,
            zero,
            one,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_prints_as_empty_parens() {
        let arena = Arena::new();
        assert_eq!(crate::printer::render(&arena, crate::arena::NIL), "()");
    }

    #[test]
    fn quote_has_arity_two() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        assert_eq!(arena.arity(symbols.quote), 2);
    }

    #[test]
    fn plus_is_tagged_with_its_primitive() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        assert_eq!(arena.primitive(symbols.plus), Primitive::Plus);
    }

    #[test]
    fn break_char_atoms_have_one_character_names() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        assert_eq!(crate::printer::render(&arena, symbols.left_paren), "(");
        assert_eq!(crate::printer::render(&arena, symbols.right_paren), ")");
    }
}
