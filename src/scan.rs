//! Quote- and bracket-aware scanning shared by the key, value and line parsers.

/// Tracks whether the scanner currently sits inside a basic (`"`) or literal
/// (`'`) string.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct QuoteState {
    in_basic: bool,
    in_literal: bool,
    escaped: bool,
    literal_escapes: bool,
}

impl QuoteState {
    /// `literal_escapes` makes `\'` inside a literal string keep the string open.
    pub(crate) fn new(literal_escapes: bool) -> Self {
        QuoteState {
            literal_escapes,
            ..Default::default()
        }
    }

    /// Feeds one character; returns `true` if it is structural (outside every string).
    pub(crate) fn advance(&mut self, ch: char) -> bool {
        if self.in_basic {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_basic = false;
            }
            return false;
        }

        if self.in_literal {
            if self.escaped {
                self.escaped = false;
            } else if self.literal_escapes && ch == '\\' {
                self.escaped = true;
            } else if ch == '\'' {
                self.in_literal = false;
            }
            return false;
        }

        match ch {
            '"' => {
                self.in_basic = true;
                false
            }
            '\'' => {
                self.in_literal = true;
                false
            }
            _ => true,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        !self.in_basic && !self.in_literal
    }
}

/// Byte index of the first `target` outside of any quoted string.
pub(crate) fn find_unquoted(s: &str, target: char, literal_escapes: bool) -> Option<usize> {
    let mut state = QuoteState::new(literal_escapes);
    s.char_indices()
        .find(|&(_, ch)| state.advance(ch) && ch == target)
        .map(|(i, _)| i)
}

/// Returns `true` when every quote in `s` is closed.
pub(crate) fn quotes_balanced(s: &str, literal_escapes: bool) -> bool {
    let mut state = QuoteState::new(literal_escapes);
    s.chars().for_each(|ch| {
        state.advance(ch);
    });
    state.is_closed()
}

/// Net bracket depth of `s` (`[`/`{` open, `]`/`}` close), ignoring quoted text.
pub(crate) fn bracket_depth(s: &str, literal_escapes: bool) -> i64 {
    let mut state = QuoteState::new(literal_escapes);
    let mut depth = 0;
    for ch in s.chars() {
        if state.advance(ch) {
            match ch {
                '[' | '{' => depth += 1,
                ']' | '}' => depth -= 1,
                _ => {}
            }
        }
    }
    depth
}

/// Splits `s` at every `sep` that sits outside strings and at bracket depth zero.
pub(crate) fn split_top_level(s: &str, sep: char, literal_escapes: bool) -> Vec<&str> {
    let mut state = QuoteState::new(literal_escapes);
    let mut depth = 0i64;
    let mut start = 0;
    let mut parts = Vec::new();

    for (i, ch) in s.char_indices() {
        if !state.advance(ch) {
            continue;
        }
        match ch {
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
