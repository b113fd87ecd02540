//! Stylesheet formatting: the beautifier and the newline-folding minifier.
//!
//! The beautifier is a character-level scanner, not an AST pass, so comments
//! and unparsable fragments survive it untouched. The minifier uses the
//! beautified form as its normal form and then folds lines back together.

use regex::Regex;

/// Stand-in marker for newlines the minifier must preserve.
const FOLD_MARKER: &str = "_A_A_";

/// Pretty-print a stylesheet with `indent_size` spaces per block level.
///
/// Line structure is normalized: one declaration per line, block openers stay
/// on the selector line, closers get their own line, comments get their own
/// lines. Token spacing inside a line is left as authored apart from
/// collapsing whitespace runs. Strings and parenthesized values are copied
/// verbatim, so `url(data:...;base64,...)` does not break lines.
#[must_use]
pub fn beautify(css: &str, indent_size: usize) -> String {
    let mut writer = Writer {
        out: String::new(),
        depth: 0,
        indent_size,
        at_line_start: true,
    };
    let mut paren_depth = 0usize;
    let mut i = 0;
    while i < css.len() {
        let rest = &css[i..];
        if rest.starts_with("/*") {
            let end = rest.find("*/").map_or(rest.len(), |p| p + 2);
            writer.newline();
            writer.push_str(&rest[..end]);
            writer.newline();
            i += end;
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        match c {
            '"' | '\'' => {
                let len = string_length(rest, c);
                writer.push_str(&rest[..len]);
                i += len;
                continue;
            }
            '(' => {
                paren_depth += 1;
                writer.push_char('(');
            }
            ')' => {
                paren_depth = paren_depth.saturating_sub(1);
                writer.push_char(')');
            }
            '{' => {
                writer.trim_line_end();
                if !writer.at_line_start {
                    writer.out.push(' ');
                }
                writer.push_char('{');
                writer.depth += 1;
                writer.newline();
            }
            '}' => {
                writer.newline();
                writer.depth = writer.depth.saturating_sub(1);
                writer.push_char('}');
                writer.newline();
            }
            ';' if paren_depth == 0 => {
                writer.trim_line_end();
                writer.push_char(';');
                writer.newline();
            }
            c if c.is_whitespace() => {
                if !writer.at_line_start && !writer.out.ends_with(' ') {
                    writer.out.push(' ');
                }
            }
            c => writer.push_char(c),
        }
        i += c.len_utf8();
    }
    writer.newline();
    writer.out
}

/// Minify a stylesheet.
///
/// Beautifies with a one-space indent as the normal form, then collapses
/// every newline except those immediately following a top-level closing
/// brace, and finally re-inserts a newline after each block comment's closing
/// token so a comment cannot swallow the rule after it onto one line.
#[must_use]
pub fn minify(css: &str) -> String {
    let beautified = beautify(css, 1);
    let close_brace = Regex::new(r"\n\}\r?\n").expect("closing brace pattern");
    let newline = Regex::new(r"\r?\n").expect("newline pattern");
    let marked = close_brace.replace_all(&beautified, FOLD_MARKER);
    let folded = newline.replace_all(&marked, "");
    folded.replace(FOLD_MARKER, "}\n").replace("*/", "*/\n")
}

/// Byte length of the string literal opening `rest`, closing quote included.
/// An unterminated literal runs to the end of the input.
fn string_length(rest: &str, quote: char) -> usize {
    let mut chars = rest[quote.len_utf8()..].char_indices();
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return quote.len_utf8() + offset + c.len_utf8();
        }
    }
    rest.len()
}

struct Writer {
    out: String,
    depth: usize,
    indent_size: usize,
    at_line_start: bool,
}

impl Writer {
    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.depth * self.indent_size {
                self.out.push(' ');
            }
            self.at_line_start = false;
        }
    }

    fn push_char(&mut self, c: char) {
        self.write_indent();
        self.out.push(c);
    }

    fn push_str(&mut self, s: &str) {
        self.write_indent();
        self.out.push_str(s);
    }

    fn trim_line_end(&mut self) {
        while self.out.ends_with(' ') {
            self.out.pop();
        }
    }

    fn newline(&mut self) {
        self.trim_line_end();
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beautify_splits_declarations_onto_lines() {
        assert_eq!(
            beautify("a,b{color:red;background:blue}", 2),
            "a,b {\n  color:red;\n  background:blue\n}\n"
        );
    }

    #[test]
    fn beautify_indents_nested_media_blocks() {
        assert_eq!(
            beautify("@media screen{a{color:red}}", 2),
            "@media screen {\n  a {\n    color:red\n  }\n}\n"
        );
    }

    #[test]
    fn beautify_collapses_whitespace_runs() {
        assert_eq!(
            beautify("a   {  color:   red;  }", 2),
            "a {\n  color: red;\n}\n"
        );
    }

    #[test]
    fn beautify_puts_comments_on_their_own_lines() {
        let out = beautify("/* note */a{color:red}", 2);
        assert_eq!(out, "/* note */\na {\n  color:red\n}\n");
    }

    #[test]
    fn beautify_keeps_semicolons_inside_parens_inline() {
        let out = beautify("a{background:url(data:image/png;base64,xy)}", 2);
        assert_eq!(out, "a {\n  background:url(data:image/png;base64,xy)\n}\n");
    }

    #[test]
    fn beautify_copies_string_literals_verbatim() {
        let out = beautify("a{content:\"{ ; }\"}", 2);
        assert_eq!(out, "a {\n  content:\"{ ; }\"\n}\n");
    }

    #[test]
    fn minify_folds_each_rule_onto_one_line() {
        assert_eq!(
            minify("a {\n  color: red;\n}\n\nb {\n  color: blue;\n}"),
            "a { color: red;}\nb { color: blue;}\n"
        );
    }

    #[test]
    fn minify_keeps_comments_from_swallowing_rules() {
        let out = minify("/* banner */\na { color: red; }");
        assert_eq!(out, "/* banner */\na { color: red;}\n");
    }

    #[test]
    fn minify_collapses_nested_blocks_fully() {
        let out = minify("@media screen { a { color: red } }");
        assert_eq!(out, "@media screen { a {  color: red }}\n");
    }
}
