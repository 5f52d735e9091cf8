//! The arity-directed reader.
//!
//! Tokenizing happens a line at a time: a whole line is split into words at
//! a fixed set of break characters, with bracket comments stripped and
//! nonprintable bytes dropped from word bodies. Parsing ("meta-expression"
//! reading) then consumes that token stream guided by each head atom's
//! declared [arity](crate::arena::Arena::arity) — a bare, unparenthesized
//! use of a primitive or special form pulls in exactly as many trailing
//! sub-expressions as its arity says, without the caller ever writing the
//! enclosing parens.

use std::io::BufRead;

use crate::arena::{Arena, NodeId, NIL};
use crate::digits::remove_leading_zeros;
use crate::error::{AitError, AitResult};
use crate::symbols::Symbols;

/// Break characters for the interactive/script reader: parens, brackets
/// (bracket comments), single quote (quote sugar) and double quote
/// (s-expression escape).
const BREAK_CHARS: &[char] = &['(', ')', '[', ']', '\'', '"'];

/// Splits one line of input into raw token texts at `break_chars`,
/// dropping nonprintable bytes from word bodies (`32 < c < 127`, mirroring
/// the reference interpreter's filter) and emitting every break character
/// except space/newline as its own one-character token.
pub fn tokenize_line(line: &str, break_chars: &[char]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in line.chars() {
        if c == ' ' || c == '\n' || c == '\r' || break_chars.contains(&c) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if c != ' ' && c != '\n' && c != '\r' {
                tokens.push(c.to_string());
            }
        } else if (c as u32) > 32 && (c as u32) < 127 {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Converts one raw token into its arena value: a canonical number if the
/// token is all digits, otherwise an interned atom.
pub(crate) fn convert_token(arena: &mut Arena, text: &str) -> NodeId {
    if is_all_digits(text) {
        let digits = arena.make_string(text);
        let canonical = remove_leading_zeros(arena, digits);
        arena.make_number(canonical)
    } else {
        let chars = arena.make_string(text);
        arena.intern(chars)
    }
}

/// Streams tokens out of an input source one line at a time, buffering the
/// rest of a tokenized line until it is consumed.
pub struct Reader<'a> {
    lines: Box<dyn Iterator<Item = std::io::Result<String>> + 'a>,
    buffer: std::collections::VecDeque<String>,
    break_chars: &'static [char],
}

impl<'a> Reader<'a> {
    pub fn new(input: impl BufRead + 'a) -> Self {
        Reader {
            lines: Box::new(input.lines()),
            buffer: std::collections::VecDeque::new(),
            break_chars: BREAK_CHARS,
        }
    }

    /// Raw next word, reading and tokenizing lines as needed. `None` means
    /// the input stream is exhausted.
    fn next_raw(&mut self, arena: &mut Arena) -> AitResult<Option<NodeId>> {
        while self.buffer.is_empty() {
            match self.lines.next() {
                None => return Ok(None),
                Some(Err(_)) => return Err(AitError::InvalidUtf8),
                Some(Ok(line)) => {
                    let tokens = tokenize_line(&line, self.break_chars);
                    self.buffer.extend(tokens);
                }
            }
        }
        let text = self.buffer.pop_front().unwrap();
        Ok(Some(convert_token(arena, &text)))
    }

    /// Reads the next word, consuming and discarding `[`-delimited
    /// comments (which may nest).
    fn next_word(&mut self, arena: &mut Arena, symbols: &Symbols) -> AitResult<NodeId> {
        loop {
            let w = self.next_raw(arena)?.ok_or(AitError::Eof)?;
            if w != symbols.left_bracket {
                return Ok(w);
            }
            loop {
                if self.next_word(arena, symbols)? == symbols.right_bracket {
                    break;
                }
            }
        }
    }

    /// Reads one meta-expression. `mexp` enables arity-directed sugar;
    /// `rparen_ok` is true only while reading inside an explicit list,
    /// where a bare `)` is the list terminator rather than an error.
    pub fn read(&mut self, arena: &mut Arena, symbols: &Symbols, mexp: bool, rparen_ok: bool) -> AitResult<NodeId> {
        let w = self.next_word(arena, symbols)?;

        if w == symbols.right_paren {
            return if rparen_ok {
                Ok(w)
            } else {
                Ok(NIL)
            };
        }

        if w == symbols.left_paren {
            let mut items = Vec::new();
            loop {
                let next = self.read(arena, symbols, mexp, true)?;
                if next == symbols.right_paren {
                    break;
                }
                items.push(next);
            }
            let mut list = NIL;
            for item in items.into_iter().rev() {
                list = arena.cons(item, list);
            }
            return Ok(list);
        }

        if !mexp {
            return Ok(w);
        }

        if w == symbols.double_quote {
            return self.read(arena, symbols, false, false);
        }

        if w == symbols.cadr {
            let sexp = self.read(arena, symbols, true, false)?;
            let sexp_nil = arena.cons(sexp, NIL);
            let inner = arena.cons(symbols.cdr, sexp_nil);
            let inner_nil = arena.cons(inner, NIL);
            return Ok(arena.cons(symbols.car, inner_nil));
        }

        if w == symbols.caddr {
            let sexp = self.read(arena, symbols, true, false)?;
            let sexp_nil = arena.cons(sexp, NIL);
            let inner1 = arena.cons(symbols.cdr, sexp_nil);
            let inner1_nil = arena.cons(inner1, NIL);
            let inner2 = arena.cons(symbols.cdr, inner1_nil);
            let inner2_nil = arena.cons(inner2, NIL);
            return Ok(arena.cons(symbols.car, inner2_nil));
        }

        if w == symbols.run_utm_on {
            let sexp = self.read(arena, symbols, true, false)?;
            // (cdr (car (try no-time-limit (' (eval (read-exp))) sexp)))
            let read_exp_call = arena.cons(symbols.read_exp, NIL);
            let read_exp_call_nil = arena.cons(read_exp_call, NIL);
            let eval_call = arena.cons(symbols.eval_, read_exp_call_nil);
            let eval_call_nil = arena.cons(eval_call, NIL);
            let quoted = arena.cons(symbols.quote, eval_call_nil);
            let sexp_nil = arena.cons(sexp, NIL);
            let quoted_sexp_nil = arena.cons(quoted, sexp_nil);
            let no_time_limit_args = arena.cons(symbols.no_time_limit, quoted_sexp_nil);
            let try_expr = arena.cons(symbols.try_, no_time_limit_args);
            let try_expr_nil = arena.cons(try_expr, NIL);
            let cdr_expr = arena.cons(symbols.cdr, try_expr_nil);
            let cdr_expr_nil = arena.cons(cdr_expr, NIL);
            return Ok(arena.cons(symbols.car, cdr_expr_nil));
        }

        if w == symbols.let_ {
            let name = self.read(arena, symbols, true, false)?;
            let def = self.read(arena, symbols, true, false)?;
            let body = self.read(arena, symbols, true, false)?;
            let (name, def) = if arena.is_atom(name) {
                (name, def)
            } else {
                let var_list = arena.tail(name);
                let fn_name = arena.head(name);
                let def_nil = arena.cons(def, NIL);
                let var_list_def_nil = arena.cons(var_list, def_nil);
                let lambda_expr = arena.cons(symbols.lambda, var_list_def_nil);
                let lambda_expr_nil = arena.cons(lambda_expr, NIL);
                let quoted_lambda = arena.cons(symbols.quote, lambda_expr_nil);
                (fn_name, quoted_lambda)
            };
            let name_nil = arena.cons(name, NIL);
            let body_nil = arena.cons(body, NIL);
            let name_nil_body_nil = arena.cons(name_nil, body_nil);
            let lambda_wrapper = arena.cons(symbols.lambda, name_nil_body_nil);
            let lambda_wrapper_nil = arena.cons(lambda_wrapper, NIL);
            let quoted_wrapper = arena.cons(symbols.quote, lambda_wrapper_nil);
            let def_nil2 = arena.cons(def, NIL);
            return Ok(arena.cons(quoted_wrapper, def_nil2));
        }

        let arity = arena.arity(w);
        if arity == 0 {
            return Ok(w);
        }
        let mut items = vec![w];
        for _ in 1..arity {
            items.push(self.read(arena, symbols, true, false)?);
        }
        let mut list = NIL;
        for item in items.into_iter().rev() {
            list = arena.cons(item, list);
        }
        Ok(list)
    }
}
