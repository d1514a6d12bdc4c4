//! Template Compiler
//!
//! A template is a format string containing variable tokens of the form
//! `{identifier}`, where an identifier is one or more ASCII letters, digits,
//! underscores or dots. Anything that does not match this shape (unbalanced
//! braces, empty braces, spaces) is literal text.
//!
//! Compiling a template yields the ordered list of distinct tokens. Each
//! token keeps its literal text, braces included, because rendering works
//! by replacing every literal occurrence of that text in the format.

use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\{[A-Za-z0-9_.]+\}").expect("token pattern is valid"))
}

fn ident_regex() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("identifier pattern is valid"))
}

/// A variable token as it appears in a template, e.g. `{user.name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarToken {
    text: String,
}

impl VarToken {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// The literal token text including braces.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The variable name, without braces.
    pub fn name(&self) -> &str {
        &self.text[1..self.text.len() - 1]
    }
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    format: String,
    tokens: SmallVec<[VarToken; 4]>,
}

impl Template {
    /// Compile a format string.
    ///
    /// Repeated tokens are listed once, in order of first appearance.
    pub fn compile(format: &str) -> Self {
        let mut tokens: SmallVec<[VarToken; 4]> = SmallVec::new();
        for m in token_regex().find_iter(format) {
            if !tokens.iter().any(|t| t.text() == m.as_str()) {
                tokens.push(VarToken::new(m.as_str()));
            }
        }

        Self {
            format: format.to_string(),
            tokens,
        }
    }

    /// The format string as given.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Tokens in order of first appearance.
    pub fn tokens(&self) -> &[VarToken] {
        &self.tokens
    }

    /// Variable names referenced by this template.
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(VarToken::name)
    }

    /// Whether the template references no variables at all.
    pub fn is_static(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Produce the rendered text, resolving each variable through `resolve`.
    ///
    /// Every occurrence of a token is replaced, not just the first.
    pub fn render<F>(&self, mut resolve: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let mut content = self.format.clone();
        for token in &self.tokens {
            let value = resolve(token.name());
            content = content.replace(token.text(), &value);
        }
        content
    }
}

/// The condition of a `@class.<name>` toggle.
///
/// The format names a single variable, either bare (`active`) or as a token
/// (`{active}`), optionally prefixed with `!` to negate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCondition {
    variable: String,
    negated: bool,
}

impl ClassCondition {
    /// Parse a class-toggle format. Returns `None` if no variable can be read.
    pub fn parse(format: &str) -> Option<Self> {
        let (negated, rest) = match format.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, format),
        };

        let name = rest
            .strip_prefix('{')
            .and_then(|r| r.strip_suffix('}'))
            .unwrap_or(rest);

        if !ident_regex().is_match(name) {
            return None;
        }

        Some(Self {
            variable: name.to_string(),
            negated,
        })
    }

    /// The referenced variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Whether the condition is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Evaluate against the truthiness of the variable's value.
    pub fn holds(&self, truthy: bool) -> bool {
        truthy != self.negated
    }
}
