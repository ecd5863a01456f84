//! Pointer expressions relative to a base pointer
//!
//! Used by reference labels such as `{{../name}}`:
//!
//! - `/x/y` is absolute and returned as-is
//! - `../x` drops one base segment per leading `..`, then appends the rest
//! - anything else is appended to the base as an escaped pointer suffix

use crate::pointer::JsonPointer;

/// Resolve `expression` against `base`, returning an escaped pointer
pub fn resolve_expression(base: &str, expression: &str) -> String {
    if expression.starts_with('/') {
        return expression.to_string();
    }

    if expression.starts_with("..") {
        let mut pointer = JsonPointer::from_escaped(base);
        let mut tokens = expression.split('/').peekable();
        while tokens.next_if_eq(&"..").is_some() {
            pointer.pop();
        }
        for token in tokens {
            pointer.push(token);
        }
        return pointer.to_string();
    }

    let mut resolved = String::with_capacity(base.len() + 1 + expression.len());
    resolved.push_str(base);
    resolved.push('/');
    resolved.push_str(expression);
    resolved
}
