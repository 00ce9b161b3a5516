//! Context windows around a field's first occurrence in the document
//!
//! Text is split into alternating runs of non-whitespace ("word" tokens) and
//! whitespace. A value matches where its own token sequence lines up with the
//! document's, token for token. The only slack is at the two ends of the
//! value: the first and last value tokens may sit inside a document token
//! when the leftover piece is pure punctuation, so `Smith` still matches in
//! `Dear John Smith, your...`. Leftover pieces go into the adjacent window
//! without counting toward its word budget.
//!
//! Repeated values always bind to their leftmost occurrence.

/// Default number of words on each side of a value
pub const DEFAULT_CONTEXT_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    kind: TokenKind,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<TokenKind> = None;

    for (idx, ch) in text.char_indices() {
        let kind = if ch.is_whitespace() {
            TokenKind::Space
        } else {
            TokenKind::Word
        };
        match current {
            Some(k) if k == kind => {}
            Some(k) => {
                tokens.push(Token {
                    text: &text[start..idx],
                    kind: k,
                });
                start = idx;
                current = Some(kind);
            }
            None => current = Some(kind),
        }
    }
    if let Some(kind) = current {
        tokens.push(Token {
            text: &text[start..],
            kind,
        });
    }

    tokens
}

fn is_detached(piece: &str) -> bool {
    !piece.chars().any(char::is_alphanumeric)
}

/// A located value: inclusive token span plus the punctuation left over in
/// the first and last tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span<'a> {
    start: usize,
    end: usize,
    lead: &'a str,
    trail: &'a str,
}

/// Raw words surrounding a value
///
/// Windows keep the document's own spacing, including the whitespace at their
/// outer edge; callers trim for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextWindow {
    /// Text immediately preceding the value
    pub before: String,
    /// Text immediately following the value
    pub after: String,
}

impl ContextWindow {
    /// Whether the value was not found (or had nothing around it)
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Finds values in one document and cuts word windows around them
///
/// The document is tokenized once; each [`resolve`](Self::resolve) call
/// tokenizes only the value.
#[derive(Debug, Clone)]
pub struct ContextWindowResolver<'a> {
    tokens: Vec<Token<'a>>,
    words: usize,
}

impl<'a> ContextWindowResolver<'a> {
    /// Prepare a resolver collecting up to `words` words on each side
    pub fn new(document: &'a str, words: usize) -> Self {
        Self {
            tokens: tokenize(document),
            words,
        }
    }

    /// Context around the first occurrence of `value`
    ///
    /// A value that does not occur token-aligned in the document yields an
    /// empty window rather than an error: model output is not guaranteed to
    /// quote the document verbatim.
    pub fn resolve(&self, value: &str) -> ContextWindow {
        match self.locate(value) {
            Some(span) => ContextWindow {
                before: self.before(&span),
                after: self.after(&span),
            },
            None => ContextWindow::default(),
        }
    }

    fn locate(&self, value: &str) -> Option<Span<'a>> {
        let needle = tokenize(value.trim());
        let n = needle.len();
        if n == 0 || n > self.tokens.len() {
            return None;
        }

        (0..=self.tokens.len() - n).find_map(|i| self.match_at(i, &needle))
    }

    fn match_at(&self, i: usize, needle: &[Token<'_>]) -> Option<Span<'a>> {
        let n = needle.len();
        let first = self.tokens[i];
        let last = self.tokens[i + n - 1];
        if first.kind != TokenKind::Word {
            return None;
        }

        if n == 1 {
            let value = needle[0].text;
            return first.text.match_indices(value).find_map(|(pos, _)| {
                let lead = &first.text[..pos];
                let trail = &first.text[pos + value.len()..];
                (is_detached(lead) && is_detached(trail)).then_some(Span {
                    start: i,
                    end: i,
                    lead,
                    trail,
                })
            });
        }

        let lead = first.text.strip_suffix(needle[0].text)?;
        let trail = last.text.strip_prefix(needle[n - 1].text)?;
        if !is_detached(lead) || !is_detached(trail) {
            return None;
        }
        let interior_matches = self.tokens[i + 1..i + n - 1]
            .iter()
            .zip(&needle[1..n - 1])
            .all(|(doc, val)| doc.kind == val.kind && doc.text == val.text);
        if !interior_matches {
            return None;
        }

        Some(Span {
            start: i,
            end: i + n - 1,
            lead,
            trail,
        })
    }

    fn before(&self, span: &Span<'a>) -> String {
        let mut pieces: Vec<&str> = Vec::new();
        let mut counted = 0;
        let mut k = span.start;

        while counted < self.words && k > 0 {
            k -= 1;
            let token = self.tokens[k];
            pieces.push(token.text);
            if token.kind == TokenKind::Word {
                counted += 1;
            }
        }
        if counted == self.words && k > 0 && self.tokens[k - 1].kind == TokenKind::Space {
            pieces.push(self.tokens[k - 1].text);
        }

        pieces.reverse();
        pieces.push(span.lead);
        pieces.concat()
    }

    fn after(&self, span: &Span<'a>) -> String {
        let mut pieces: Vec<&str> = vec![span.trail];
        let mut counted = 0;
        let mut k = span.end + 1;

        while counted < self.words && k < self.tokens.len() {
            let token = self.tokens[k];
            pieces.push(token.text);
            if token.kind == TokenKind::Word {
                counted += 1;
            }
            k += 1;
        }
        if counted == self.words && k < self.tokens.len() && self.tokens[k].kind == TokenKind::Space
        {
            pieces.push(self.tokens[k].text);
        }

        pieces.concat()
    }
}

/// One-shot resolve with the default window size
pub fn resolve_context(document: &str, value: &str) -> ContextWindow {
    ContextWindowResolver::new(document, DEFAULT_CONTEXT_WORDS).resolve(value)
}
