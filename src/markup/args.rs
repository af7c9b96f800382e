//! Argument list of an include directive: `('path'[, {json}])`.

use serde_json::{Map, Value};

#[derive(Debug, PartialEq)]
pub struct Directive {
    pub path: String,
    pub context: Option<Map<String, Value>>,
    /// Bytes consumed, up to and including the closing `)`.
    pub len: usize,
}

/// Parse the arguments that follow `include(`.
pub fn parse(input: &str) -> Result<Directive, String> {
    let mut cursor = Cursor { input, pos: 0 };

    cursor.skip_ws();
    let path = cursor.quoted()?;
    if path.trim().is_empty() {
        return Err("empty include path".into());
    }

    cursor.skip_ws();
    let context = if cursor.eat(',') {
        cursor.skip_ws();
        let json = cursor.object()?;
        let map: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| format!("invalid context: {e}"))?;
        cursor.skip_ws();
        Some(map)
    } else {
        None
    };

    if !cursor.eat(')') {
        return Err("expected `)`".into());
    }

    Ok(Directive {
        path: path.to_string(),
        context,
        len: cursor.pos,
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// A `'...'` or `"..."` string, without escapes.
    fn quoted(&mut self) -> Result<&'a str, String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err("expected a quoted path".into()),
        };
        let body = &self.rest()[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| "unterminated path string".to_string())?;
        self.pos += 1 + end + 1;
        Ok(&body[..end])
    }

    /// A balanced `{...}` span, skipping braces inside JSON strings.
    fn object(&mut self) -> Result<&'a str, String> {
        if self.peek() != Some('{') {
            return Err("expected a JSON object after `,`".into());
        }

        let rest = self.rest();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, c) in rest.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += i + 1;
                        return Ok(&rest[..=i]);
                    }
                }
                _ => {}
            }
        }
        Err("unbalanced braces in context".into())
    }
}
