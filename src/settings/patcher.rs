//! Line-oriented patching of generated settings modules
//!
//! This is a heuristic, not a Python parser. It assumes the file came from
//! Django's `startproject` template: assignments start at column zero, list
//! entries sit one per line, and string literals do not span lines within
//! a patched region. Brackets inside single-line strings and comments are
//! ignored when counting.

use thiserror::Error;

const DEFAULT_INDENT: &str = "    ";

/// Why a patch could not be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The `NAME = ...` opening marker never appears
    #[error("Could not find {name} in settings")]
    MissingAssignment { name: String },

    /// The closing bracket or brace never appears
    #[error("Could not locate boundaries of {name} (opened on line {line}, never closed)")]
    UnterminatedBlock { name: String, line: usize },
}

/// A settings file held as lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl SettingsDocument {
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n').map(str::to_string).collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// Whether a line equal to `line` (ignoring surrounding whitespace) exists
    pub fn contains_line(&self, line: &str) -> bool {
        let wanted = line.trim();
        self.lines.iter().any(|l| l.trim() == wanted)
    }

    /// Whether an assignment to `name` exists
    pub fn has_assignment(&self, name: &str) -> bool {
        self.find_assignment(name, None).is_some()
    }

    /// Right-hand side of a single-line `NAME = value` assignment
    pub fn assignment_value(&self, name: &str) -> Option<&str> {
        let idx = self.find_assignment(name, None)?;
        assignment_rhs(&self.lines[idx], name)
    }

    /// Insert entries before the closing bracket of the `NAME = [` list
    ///
    /// Entries already present are skipped. Returns how many were added.
    pub fn insert_list_entries(&mut self, name: &str, entries: &[&str]) -> Result<usize, PatchError> {
        let (start, end) = self.list_span(name)?;
        let (start, end) = self.expand_inline_list(start, end);
        let style = ListStyle::detect(&self.lines[start + 1..end]);

        self.terminate_last_entry(start, end);

        let new_lines = self.missing_entries(start, end, entries, &style);
        let added = new_lines.len();
        self.lines.splice(end..end, new_lines);
        Ok(added)
    }

    /// Insert entries right after the opening line of the `NAME = [` list
    pub fn prepend_list_entries(&mut self, name: &str, entries: &[&str]) -> Result<usize, PatchError> {
        let (start, end) = self.list_span(name)?;
        let (start, end) = self.expand_inline_list(start, end);
        let style = ListStyle::detect(&self.lines[start + 1..end]);

        let new_lines = self.missing_entries(start, end, entries, &style);
        let added = new_lines.len();
        self.lines.splice(start + 1..start + 1, new_lines);
        Ok(added)
    }

    /// Replace the whole `NAME = { ... }` block with `block`
    ///
    /// The end of the block is where a running brace count, started on the
    /// assignment line, returns to zero.
    pub fn replace_dict_block(&mut self, name: &str, block: &str) -> Result<(), PatchError> {
        let start = self
            .find_assignment(name, Some('{'))
            .ok_or_else(|| PatchError::MissingAssignment { name: name.to_string() })?;
        let end = self
            .balanced_end(start, &['{'], &['}'])
            .ok_or_else(|| PatchError::UnterminatedBlock {
                name: name.to_string(),
                line: start + 1,
            })?;

        self.lines
            .splice(start..=end, block.lines().map(str::to_string));
        Ok(())
    }

    /// Replace the `NAME = ...` assignment with a single line
    ///
    /// A value that opens brackets is replaced up to where they close.
    pub fn replace_assignment(&mut self, name: &str, line: &str) -> Result<(), PatchError> {
        let start = self
            .find_assignment(name, None)
            .ok_or_else(|| PatchError::MissingAssignment { name: name.to_string() })?;
        let end = self
            .balanced_end(start, &['(', '[', '{'], &[')', ']', '}'])
            .unwrap_or(start);

        // brackets opened but never closed
        if end == start && bracket_depth(&self.lines[start], &['(', '[', '{'], &[')', ']', '}']) > 0 {
            return Err(PatchError::UnterminatedBlock {
                name: name.to_string(),
                line: start + 1,
            });
        }

        self.lines.splice(start..=end, std::iter::once(line.to_string()));
        Ok(())
    }

    /// Whether a top-level `from <module> import ...` line imports `name`
    pub fn imports_from(&self, module: &str, name: &str) -> bool {
        let prefix = format!("from {} import ", module);
        self.lines.iter().any(|line| {
            let Some(names) = line.strip_prefix(&prefix) else {
                return false;
            };
            let names = &names[..comment_start(names).unwrap_or(names.len())];
            names
                .split(',')
                .map(|item| item.trim().trim_matches(|c| c == '(' || c == ')').trim())
                .any(|item| item == name || item.starts_with(&format!("{} as ", name)))
        })
    }

    /// Add an import line before the first top-level import, unless present
    pub fn ensure_import(&mut self, line: &str) {
        if self.contains_line(line) {
            return;
        }
        let position = self
            .lines
            .iter()
            .position(|l| l.starts_with("import ") || l.starts_with("from "))
            .unwrap_or(0);
        self.lines.insert(position, line.to_string());
    }

    /// Append lines at the end of the document
    pub fn append_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    /// First line holding `NAME = <opener>` (or any `NAME = ...` when `opener` is None)
    fn find_assignment(&self, name: &str, opener: Option<char>) -> Option<usize> {
        self.lines.iter().position(|line| match assignment_rhs(line, name) {
            Some(rhs) => opener.map_or(true, |c| rhs.starts_with(c)),
            None => false,
        })
    }

    /// Opening line of the list and the first line after it holding `]`
    ///
    /// When the opening line closes the list itself both ends are equal.
    fn list_span(&self, name: &str) -> Result<(usize, usize), PatchError> {
        let start = self
            .find_assignment(name, Some('['))
            .ok_or_else(|| PatchError::MissingAssignment { name: name.to_string() })?;

        let opening = &self.lines[start];
        let after_bracket = opening.find('[').map(|i| &opening[i + 1..]).unwrap_or("");
        if after_bracket.contains(']') {
            return Ok((start, start));
        }

        self.lines[start + 1..]
            .iter()
            .position(|line| line.contains(']'))
            .map(|offset| (start, start + 1 + offset))
            .ok_or_else(|| PatchError::UnterminatedBlock {
                name: name.to_string(),
                line: start + 1,
            })
    }

    /// Turn `NAME = [a, b]` into a multi-line list, returning the new span
    fn expand_inline_list(&mut self, start: usize, end: usize) -> (usize, usize) {
        if start != end {
            return (start, end);
        }

        let line = self.lines[start].clone();
        let (Some(open), Some(close)) = (line.find('['), line.rfind(']')) else {
            return (start, end);
        };

        let inner = line[open + 1..close].trim();
        let mut replacement = vec![line[..=open].to_string()];
        if !inner.is_empty() {
            let comma = if inner.ends_with(',') { "" } else { "," };
            replacement.push(format!("{}{}{}", DEFAULT_INDENT, inner, comma));
        }
        replacement.push(line[close..].to_string());

        let new_end = start + replacement.len() - 1;
        self.lines.splice(start..=start, replacement);
        (start, new_end)
    }

    /// Make sure the entry before the closing line ends with a comma
    fn terminate_last_entry(&mut self, start: usize, end: usize) {
        let last = (start + 1..end).rev().find(|&i| {
            let trimmed = self.lines[i].trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });
        if let Some(i) = last {
            let line = &self.lines[i];
            let code = line[..comment_start(line).unwrap_or(line.len())].trim_end();
            if !code.ends_with(',') {
                let at = code.len();
                self.lines[i].insert(at, ',');
            }
        }
    }

    fn missing_entries(&self, start: usize, end: usize, entries: &[&str], style: &ListStyle) -> Vec<String> {
        let body = &self.lines[start..=end];
        let mut seen: Vec<&str> = Vec::new();
        entries
            .iter()
            .copied()
            .filter(|entry| {
                let present = body.iter().any(|line| {
                    line.contains(&format!("'{}'", entry)) || line.contains(&format!("\"{}\"", entry))
                });
                let duplicate = seen.contains(entry);
                seen.push(*entry);
                !present && !duplicate
            })
            .map(|entry| style.format(entry))
            .collect()
    }

    /// Line index where the bracket count started on `start` returns to zero
    fn balanced_end(&self, start: usize, open: &[char], close: &[char]) -> Option<usize> {
        let mut depth: i64 = 0;
        let mut opened = false;
        for (i, line) in self.lines.iter().enumerate().skip(start) {
            scan_code(line, |ch| {
                if open.contains(&ch) {
                    depth += 1;
                    opened = true;
                } else if close.contains(&ch) {
                    depth -= 1;
                }
            });
            if !opened && i == start {
                return Some(start);
            }
            if opened && depth <= 0 {
                return Some(i);
            }
        }
        None
    }
}

/// Indentation and quoting copied from existing list entries
struct ListStyle {
    indent: String,
    quote: char,
}

impl ListStyle {
    fn detect(body: &[String]) -> Self {
        let first = body.iter().find(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });

        match first {
            Some(line) => {
                let trimmed = line.trim_start();
                let indent = line[..line.len() - trimmed.len()].to_string();
                let quote = if trimmed.starts_with('"') { '"' } else { '\'' };
                Self {
                    indent: if indent.is_empty() { DEFAULT_INDENT.to_string() } else { indent },
                    quote,
                }
            }
            None => Self {
                indent: DEFAULT_INDENT.to_string(),
                quote: '\'',
            },
        }
    }

    fn format(&self, entry: &str) -> String {
        format!("{}{q}{}{q},", self.indent, entry, q = self.quote)
    }
}

/// `value` in `NAME = value` when the line assigns `name` at column zero
fn assignment_rhs<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=')?;
    if rest.starts_with('=') {
        return None;
    }
    Some(rest.trim())
}

fn bracket_depth(line: &str, open: &[char], close: &[char]) -> i64 {
    let mut depth = 0;
    scan_code(line, |ch| {
        if open.contains(&ch) {
            depth += 1;
        } else if close.contains(&ch) {
            depth -= 1;
        }
    });
    depth
}

/// Feed `visit` every character outside string literals, stopping at a comment
///
/// Returns the byte offset of the comment's `#`, if any.
fn scan_code(line: &str, mut visit: impl FnMut(char)) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '#' => return Some(i),
                _ => visit(ch),
            },
        }
    }
    None
}

/// Byte offset of a trailing comment outside string literals
fn comment_start(line: &str) -> Option<usize> {
    scan_code(line, |_| {})
}
