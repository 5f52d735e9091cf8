//! Turing-machine tape I/O: the bit-level read side (`read-bit`, `read-exp`)
//! and the encode side (`bits`) that the evaluator's primitives dispatch
//! to. A tape is just an ordinary list of values sitting in the arena —
//! "reading" it means walking it once, left to right, treating anything
//! other than the canonical number zero as a one-bit.

use std::collections::VecDeque;

use crate::arena::{Arena, NodeId, NIL};
use crate::reader::tokenize_line;
use crate::symbols::Symbols;

/// Break characters for tape records: parens only — no bracket comments,
/// no quote sugar. Tape programs are always fully parenthesized, since
/// they were produced by [`encode_bits`]'s own canonical printer.
const TAPE_BREAK_CHARS: &[char] = &['(', ')'];

fn is_truthy_bit(arena: &Arena, x: NodeId) -> bool {
    !(arena.is_number(x) && arena.print_name(x) == NIL)
}

/// The stack of nested tapes `try` pushes and pops. A fresh stack has one
/// frame bound to `NIL`, so a `read-bit` outside of any `try` immediately
/// reports exhaustion, exactly like the reference interpreter's top-level
/// `turing_machine_tapes = cons(nil, nil)`.
pub struct TapeStack {
    frames: Vec<NodeId>,
}

impl TapeStack {
    pub fn new() -> Self {
        TapeStack { frames: vec![NIL] }
    }

    pub fn push(&mut self, tape: NodeId) {
        self.frames.push(tape);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Reads one bit off the current tape, consuming it. `Err` carries the
    /// `out-of-data` atom once the current tape is exhausted.
    pub fn read_bit(&mut self, arena: &Arena, symbols: &Symbols) -> Result<NodeId, NodeId> {
        let top = *self.frames.last().expect("tape stack is never empty");
        if arena.is_atom(top) {
            return Err(symbols.out_of_data);
        }
        let bit_val = arena.head(top);
        let rest = arena.tail(top);
        *self.frames.last_mut().unwrap() = rest;
        Ok(if is_truthy_bit(arena, bit_val) {
            symbols.one
        } else {
            symbols.zero
        })
    }
}

impl Default for TapeStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one 8-bit character off the tape, most-significant bit first.
fn read_char(tape: &mut TapeStack, arena: &Arena, symbols: &Symbols) -> Result<u8, NodeId> {
    let mut c: u32 = 0;
    for _ in 0..8 {
        let bit = tape.read_bit(arena, symbols)?;
        let one = if bit == symbols.one { 1 } else { 0 };
        c = c * 2 + one;
    }
    Ok(c as u8)
}

/// Reads one newline-terminated record off the tape and tokenizes it
/// exactly like a line of script input, using the tape's narrower
/// break-character set.
fn read_record(tape: &mut TapeStack, arena: &Arena, symbols: &Symbols) -> Result<VecDeque<String>, NodeId> {
    let mut line = String::new();
    loop {
        let c = read_char(tape, arena, symbols)?;
        if c == b'\n' {
            break;
        }
        line.push(c as char);
    }
    Ok(tokenize_line(&line, TAPE_BREAK_CHARS).into())
}

fn next_tape_word(buffer: &mut VecDeque<String>, arena: &mut Arena, symbols: &Symbols) -> NodeId {
    match buffer.pop_front() {
        None => symbols.right_paren,
        Some(text) => crate::reader::convert_token(arena, &text),
    }
}

fn read_expr_rec(buffer: &mut VecDeque<String>, arena: &mut Arena, symbols: &Symbols, rparen_ok: bool) -> NodeId {
    let w = next_tape_word(buffer, arena, symbols);
    if w == symbols.right_paren {
        return if rparen_ok { w } else { NIL };
    }
    if w == symbols.left_paren {
        let mut items = Vec::new();
        loop {
            let next = read_expr_rec(buffer, arena, symbols, true);
            if next == symbols.right_paren {
                break;
            }
            items.push(next);
        }
        let mut list = NIL;
        for item in items.into_iter().rev() {
            list = arena.cons(item, list);
        }
        return list;
    }
    w
}

/// `read-exp`: reads one record off the tape and parses it as a fully
/// parenthesized s-expression (no arity sugar). Surfaces the tape's
/// `out-of-data` error if the record itself couldn't be read.
pub fn read_exp(tape: &mut TapeStack, arena: &mut Arena, symbols: &Symbols) -> Result<NodeId, NodeId> {
    let mut buffer = read_record(tape, arena, symbols)?;
    Ok(read_expr_rec(&mut buffer, arena, symbols, false))
}

fn push_char_bits(out: &mut Vec<NodeId>, symbols: &Symbols, c: u8) {
    for shift in (0..8).rev() {
        let bit = if (c >> shift) & 1 == 1 { symbols.one } else { symbols.zero };
        out.push(bit);
    }
}

fn push_atom_name_bits(out: &mut Vec<NodeId>, arena: &Arena, symbols: &Symbols, name: NodeId) {
    if name == NIL {
        return;
    }
    push_atom_name_bits(out, arena, symbols, arena.tail(name));
    push_char_bits(out, symbols, arena.head(name) as u8);
}

fn push_list_bits(out: &mut Vec<NodeId>, arena: &Arena, symbols: &Symbols, x: NodeId) {
    if arena.is_number(x) && arena.print_name(x) == NIL {
        push_char_bits(out, symbols, b'0');
        return;
    }
    if arena.is_atom(x) {
        push_atom_name_bits(out, arena, symbols, arena.print_name(x));
        return;
    }
    push_char_bits(out, symbols, b'(');
    let mut cursor = x;
    while !arena.is_atom(cursor) {
        push_list_bits(out, arena, symbols, arena.head(cursor));
        cursor = arena.tail(cursor);
        if !arena.is_atom(cursor) {
            push_char_bits(out, symbols, b' ');
        }
    }
    push_char_bits(out, symbols, b')');
}

/// `bits`: renders `x` the way the printer would, then encodes each output
/// character as 8 bits, most-significant first, terminated with a
/// newline's worth of bits (matching the reference interpreter's
/// `write_lst` followed by an explicit `write_chr('\n')`).
pub fn encode_bits(arena: &mut Arena, symbols: &Symbols, x: NodeId) -> NodeId {
    let mut out = Vec::new();
    push_list_bits(&mut out, arena, symbols, x);
    push_char_bits(&mut out, symbols, b'\n');
    let mut list = NIL;
    for bit in out.into_iter().rev() {
        list = arena.cons(bit, list);
    }
    list
}

/// Encodes raw bytes straight onto a tape, the same way [`encode_bits`]
/// encodes a rendered value, without rendering anything first. Used by the
/// `tape` CLI command to feed a literal tape file to `read-exp`/`read-bit`
/// instead of requiring the program to build one with `bits`. Appends a
/// trailing newline's worth of bits if `bytes` doesn't already end with one,
/// since `read-exp` reads a newline-terminated record.
pub fn bits_from_bytes(arena: &mut Arena, symbols: &Symbols, bytes: &[u8]) -> NodeId {
    let mut out = Vec::new();
    for &b in bytes {
        push_char_bits(&mut out, symbols, b);
    }
    if bytes.last() != Some(&b'\n') {
        push_char_bits(&mut out, symbols, b'\n');
    }
    let mut list = NIL;
    for bit in out.into_iter().rev() {
        list = arena.cons(bit, list);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::render;

    #[test]
    fn read_bit_reports_out_of_data_on_empty_tape() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let mut tapes = TapeStack::new();
        let err = tapes.read_bit(&arena, &symbols).unwrap_err();
        assert_eq!(err, symbols.out_of_data);
    }

    #[test]
    fn read_bit_consumes_tape_left_to_right() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let zero_nil = arena.cons(symbols.zero, NIL);
        let tape = arena.cons(symbols.one, zero_nil);
        let mut tapes = TapeStack::new();
        tapes.push(tape);
        assert_eq!(tapes.read_bit(&arena, &symbols).unwrap(), symbols.one);
        assert_eq!(tapes.read_bit(&arena, &symbols).unwrap(), symbols.zero);
        assert!(tapes.read_bit(&arena, &symbols).is_err());
    }

    #[test]
    fn encode_then_read_exp_roundtrips_a_number() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let digits = arena.make_string("5");
        let five = arena.make_number(digits);
        let bits = encode_bits(&mut arena, &symbols, five);
        let mut tapes = TapeStack::new();
        tapes.push(bits);
        let parsed = read_exp(&mut tapes, &mut arena, &symbols).unwrap();
        assert_eq!(render(&arena, parsed), "5");
    }

    #[test]
    fn encode_then_read_exp_roundtrips_a_list() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let a = arena.make_atom(crate::arena::Primitive::None, "a", 0);
        let b = arena.make_atom(crate::arena::Primitive::None, "b", 0);
        let b_nil = arena.cons(b, NIL);
        let list = arena.cons(a, b_nil);
        let bits = encode_bits(&mut arena, &symbols, list);
        let mut tapes = TapeStack::new();
        tapes.push(bits);
        let parsed = read_exp(&mut tapes, &mut arena, &symbols).unwrap();
        assert_eq!(render(&arena, parsed), "(a b)");
    }

    #[test]
    fn bits_from_bytes_reads_back_as_the_same_expression() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let bits = bits_from_bytes(&mut arena, &symbols, b"(+ 2 3)");
        let mut tapes = TapeStack::new();
        tapes.push(bits);
        let parsed = read_exp(&mut tapes, &mut arena, &symbols).unwrap();
        assert_eq!(render(&arena, parsed), "(+ 2 3)");
    }

    #[test]
    fn bits_from_bytes_does_not_double_the_trailing_newline() {
        let mut arena = Arena::new();
        let symbols = Symbols::install(&mut arena);
        let with_newline = bits_from_bytes(&mut arena, &symbols, b"a\n");
        let without_newline = bits_from_bytes(&mut arena, &symbols, b"a");
        fn list_len(arena: &Arena, mut l: NodeId) -> usize {
            let mut n = 0;
            while l != NIL {
                n += 1;
                l = arena.tail(l);
            }
            n
        }
        assert_eq!(list_len(&arena, with_newline), list_len(&arena, without_newline));
    }
}
