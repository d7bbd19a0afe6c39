use super::{Cursor, Error};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Name resolution for the evaluator.
///
/// The machine implements this: built-in variables first, then the user
/// variable stack, newest entry wins.
pub trait Scope {
    fn value_of(&mut self, name: &str) -> Result<i64>;
}

/// Evaluate one expression parameter.
///
/// Grammar, tightest binding first:
///
/// ```text
/// factor := '+' factor | '-' factor | '(' expr ')' | value
/// value  := identifier | unsigned-integer-literal
/// mult   := factor (('*'|'/'|'%') factor)*
/// add    := mult (('+'|'-') mult)*
/// expr   := add (('>'|'<'|'='|'>='|'<='|'!=') add)?
/// ```
///
/// Leading spaces are skipped; a space inside an expression terminates it.
/// Comparison results are 0 or 1. A `!` not followed by `=` is a comment
/// leader, so the cursor backs up and the expression ends.
pub fn eval(cur: &mut Cursor, scope: &mut dyn Scope) -> Result<i64> {
    cur.skip_spaces();
    let n = add(cur, scope)?;
    match cur.ch() {
        b'>' => {
            cur.bump();
            if cur.ch() == b'=' {
                cur.bump();
                let v = add(cur, scope)?;
                Ok((n >= v) as i64)
            } else {
                let v = add(cur, scope)?;
                Ok((n > v) as i64)
            }
        }
        b'<' => {
            cur.bump();
            if cur.ch() == b'=' {
                cur.bump();
                let v = add(cur, scope)?;
                Ok((n <= v) as i64)
            } else {
                let v = add(cur, scope)?;
                Ok((n < v) as i64)
            }
        }
        b'=' => {
            cur.bump();
            let v = add(cur, scope)?;
            Ok((n == v) as i64)
        }
        b'!' => {
            cur.bump();
            if cur.ch() != b'=' {
                // comment leader, back out
                cur.back();
                Ok(n)
            } else {
                cur.bump();
                let v = add(cur, scope)?;
                Ok((n != v) as i64)
            }
        }
        _ => Ok(n),
    }
}

fn add(cur: &mut Cursor, scope: &mut dyn Scope) -> Result<i64> {
    let mut n = mult(cur, scope)?;
    loop {
        match cur.ch() {
            b'+' => {
                cur.bump();
                n = n.wrapping_add(mult(cur, scope)?);
            }
            b'-' => {
                cur.bump();
                n = n.wrapping_sub(mult(cur, scope)?);
            }
            _ => return Ok(n),
        }
    }
}

fn mult(cur: &mut Cursor, scope: &mut dyn Scope) -> Result<i64> {
    let mut n = fact(cur, scope)?;
    loop {
        match cur.ch() {
            b'*' => {
                cur.bump();
                n = n.wrapping_mul(fact(cur, scope)?);
            }
            b'/' => {
                cur.bump();
                let v = fact(cur, scope)?;
                if v == 0 {
                    return error!(Arithmetic; "Zero divide");
                }
                n = n.wrapping_div(v);
            }
            b'%' => {
                cur.bump();
                let v = fact(cur, scope)?;
                if v == 0 {
                    return error!(Arithmetic; "Zero divide");
                }
                n = n.wrapping_rem(v);
            }
            _ => return Ok(n),
        }
    }
}

fn fact(cur: &mut Cursor, scope: &mut dyn Scope) -> Result<i64> {
    match cur.ch() {
        b'+' => {
            cur.bump();
            fact(cur, scope)
        }
        b'-' => {
            cur.bump();
            Ok(fact(cur, scope)?.wrapping_neg())
        }
        b'(' => {
            cur.bump();
            let n = eval(cur, scope)?;
            cur.skip_spaces();
            if cur.ch() != b')' {
                return error!(Syntax; "')' expected");
            }
            cur.bump();
            Ok(n)
        }
        _ => value(cur, scope),
    }
}

fn value(cur: &mut Cursor, scope: &mut dyn Scope) -> Result<i64> {
    let w = cur.take_word();
    match w.bytes().next() {
        Some(c) if c.is_ascii_alphabetic() => scope.value_of(&w),
        Some(c) if c.is_ascii_digit() => Ok(parse_number(&w)),
        _ => error!(Syntax; "Invalid value"),
    }
}

/// Integer literal with C base prefixes: `0x` hex, leading `0` octal, else
/// decimal. Parses as far as the digits are valid and ignores the rest, the
/// way `strtoul` did.
pub fn parse_number(word: &str) -> i64 {
    let s = word.trim_start();
    let b = s.as_bytes();
    let (digits, radix) = if b.len() > 1 && b[0] == b'0' && (b[1] == b'x' || b[1] == b'X') {
        (&s[2..], 16)
    } else if b.len() > 1 && b[0] == b'0' {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    let mut n: u64 = 0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => n = n.wrapping_mul(radix as u64).wrapping_add(d as u64),
            None => break,
        }
    }
    n as i64
}
