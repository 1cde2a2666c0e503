//! Blanking of comments and literal contents before rule matching.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    /// `"`, `'` or `` ` `` literal with backslash escapes.
    Literal(char),
    /// C# `@"..."`: backslash is literal, `""` is an escaped quote.
    Verbatim,
    /// C# raw literal, closed by the same number of quotes that opened it.
    Raw(usize),
}

/// Replaces comment text and the contents of string, char and template
/// literals with spaces.
///
/// Quote characters and newlines are kept, so line numbers and the shape of
/// the surrounding code survive. An unterminated `"` or `'` literal ends at
/// its line break; template, verbatim and raw literals and block comments
/// may span lines and run to the end of the input when unterminated.
pub fn mask_literals(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len());
    let mut state = State::Code;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            State::Code => match c {
                '/' if next == Some('/') => {
                    i += 1;
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if next == Some('*') => {
                    i += 1;
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '"' => {
                    let run = quote_run(&chars, i);
                    if run >= 3 {
                        push_quotes(&mut out, run);
                        i += run - 1;
                        state = State::Raw(run);
                    } else {
                        out.push(c);
                        state = if is_verbatim_prefix(&chars[..i]) {
                            State::Verbatim
                        } else {
                            State::Literal(c)
                        };
                    }
                }
                '\'' | '`' => {
                    out.push(c);
                    state = State::Literal(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    i += 1;
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    out.push(blank(c));
                }
            }
            State::Literal(quote) => {
                if c == '\\' {
                    out.push(' ');
                    if let Some(escaped) = next {
                        i += 1;
                        out.push(blank(escaped));
                    }
                } else if c == quote {
                    out.push(c);
                    state = State::Code;
                } else if c == '\n' && quote != '`' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(blank(c));
                }
            }
            State::Verbatim => {
                if c == '"' && next == Some('"') {
                    i += 1;
                    out.push_str("  ");
                } else if c == '"' {
                    out.push(c);
                    state = State::Code;
                } else {
                    out.push(blank(c));
                }
            }
            State::Raw(width) => {
                if c == '"' && quote_run(&chars, i) >= width {
                    push_quotes(&mut out, width);
                    i += width - 1;
                    state = State::Code;
                } else {
                    out.push(blank(c));
                }
            }
        }
        i += 1;
    }

    out
}

/// Number of consecutive `"` starting at `start`.
fn quote_run(chars: &[char], start: usize) -> usize {
    chars[start..].iter().take_while(|&&c| c == '"').count()
}

/// `@"`, `$@"` and `@$"` open verbatim literals.
fn is_verbatim_prefix(before: &[char]) -> bool {
    matches!(before, [.., '@'] | [.., '@', '$'])
}

fn push_quotes(out: &mut String, count: usize) {
    out.extend(std::iter::repeat('"').take(count));
}

fn blank(c: char) -> char {
    if c == '\n' {
        '\n'
    } else {
        ' '
    }
}
