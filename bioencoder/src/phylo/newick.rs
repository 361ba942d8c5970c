//! Newick (bracket-notation) phylogenetic tree parser.
//!
//! Parses the standard `(child,child,...)label:length;` format, including
//! quoted labels and square-bracket comments. The parse result is always
//! treated as a rooted tree regardless of any metadata in the file.

use std::path::Path;

use crate::error::{BioEncoderError, BioEncoderResult};

/// A node of a parsed Newick tree.
///
/// The tree is built bottom-up: each node owns its children by value and
/// there are no parent back-references. A leaf is a node with no children.
#[derive(Debug, Clone, PartialEq)]
pub struct NewickNode {
    /// Taxon label, if present. Leaves of a well-formed input always carry one.
    pub label: Option<String>,
    /// Length of the branch connecting this node to its parent. Zero for the
    /// root and for branches whose length is omitted in the file.
    pub length: f64,
    /// Child nodes, empty for leaves.
    pub children: Vec<NewickNode>,
}

impl NewickNode {
    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parse a single rooted tree from Newick text.
///
/// # Errors
///
/// Returns `Err(BioEncoderError::TreeParse)` if the input is empty,
/// unbalanced, missing its terminating `;`, followed by trailing content, or
/// contains an invalid branch length.
pub fn parse(text: &str) -> BioEncoderResult<NewickNode> {
    let mut parser = Parser {
        input: text.as_bytes(),
        pos: 0,
    };
    parser.parse_tree()
}

/// Read and parse a Newick tree file.
///
/// # Errors
///
/// Returns `Err(BioEncoderError::TreeFileRead)` if the file cannot be read,
/// or any error of [`parse`] for malformed content.
pub fn parse_file(path: &Path) -> BioEncoderResult<NewickNode> {
    let text = std::fs::read_to_string(path).map_err(|err| BioEncoderError::TreeFileRead {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse(&text)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn parse_tree(&mut self) -> BioEncoderResult<NewickNode> {
        self.skip_ignored()?;
        if self.pos >= self.input.len() {
            return Err(self.fail("empty input"));
        }
        let root = self.parse_node()?;
        if !self.eat(b';')? {
            return Err(self.fail("missing terminating `;`"));
        }
        self.skip_ignored()?;
        if self.pos < self.input.len() {
            return Err(self.fail("trailing content after `;`"));
        }
        Ok(root)
    }

    fn parse_node(&mut self) -> BioEncoderResult<NewickNode> {
        let children = if self.eat(b'(')? {
            let mut children = vec![self.parse_node()?];
            while self.eat(b',')? {
                children.push(self.parse_node()?);
            }
            if !self.eat(b')')? {
                return Err(self.fail("unbalanced parentheses"));
            }
            children
        } else {
            Vec::new()
        };

        let label = self.parse_label()?;
        let length = if self.eat(b':')? {
            self.parse_length()?
        } else {
            0.0
        };

        Ok(NewickNode {
            label,
            length,
            children,
        })
    }

    fn parse_label(&mut self) -> BioEncoderResult<Option<String>> {
        self.skip_ignored()?;
        if self.peek() == Some(b'\'') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c != b'\'') {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Err(self.fail("unterminated quoted label"));
            }
            let label = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
            self.pos += 1;
            return Ok(Some(label));
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, b'(' | b')' | b',' | b':' | b';' | b'[') && !c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if self.pos == start {
            Ok(None)
        } else {
            Ok(Some(
                String::from_utf8_lossy(&self.input[start..self.pos]).into_owned(),
            ))
        }
    }

    fn parse_length(&mut self) -> BioEncoderResult<f64> {
        self.skip_ignored()?;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, b'.' | b'-' | b'+' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or("");
        text.parse::<f64>()
            .map_err(|_| self.fail(&format!("invalid branch length `{text}`")))
    }

    /// Consume `expected` if it is the next significant byte.
    fn eat(&mut self, expected: u8) -> BioEncoderResult<bool> {
        self.skip_ignored()?;
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Skip whitespace and `[...]` comments.
    fn skip_ignored(&mut self) -> BioEncoderResult<()> {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'[') {
                while self.peek().is_some_and(|c| c != b']') {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.fail("unterminated `[` comment"));
                }
                self.pos += 1;
            } else {
                return Ok(());
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn fail(&self, reason: &str) -> BioEncoderError {
        BioEncoderError::TreeParse {
            reason: format!("{reason} (at byte {})", self.pos),
        }
    }
}
