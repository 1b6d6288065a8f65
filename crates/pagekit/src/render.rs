//! Markup stripping
//!
//! Deliberately naive: no entities, comments or nesting. Anything between a
//! `<` and the next `>` is dropped, and an unmatched `<` drops the rest.

use std::io::{self, Write};

/// Remove every `<...>` span (delimiters included) from `body`
pub fn strip_tags(body: &str) -> String {
    let mut output = String::with_capacity(body.len());
    let mut in_tag = false;

    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => output.push(c),
            _ => {}
        }
    }

    output
}

/// Write the stripped body to `writer`
pub fn render<W: Write>(body: &str, writer: &mut W) -> io::Result<()> {
    writer.write_all(strip_tags(body).as_bytes())?;
    writer.flush()
}
