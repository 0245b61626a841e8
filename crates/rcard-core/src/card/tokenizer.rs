//! Splits raw OCR text into trimmed, non-empty lines.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Ordered, non-empty, trimmed lines in the order the OCR engine emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineSequence(Vec<String>);

impl LineSequence {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Line at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for LineSequence {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LineSequence {
    /// Collects lines through the same trimming and filtering as [`tokenize`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }
}

/// Split `text` into lines, trimming each and dropping empty ones.
///
/// `\n`, `\r\n` and lone `\r` all end a line; trimming covers full-width
/// spaces as well.
pub fn tokenize(text: &str) -> LineSequence {
    text.split(['\n', '\r']).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_trims_and_drops_empty() {
        let lines = tokenize("  氏名 \n\n　田中太郎　\r\n\t\n住所\r沖縄県");
        assert_eq!(&*lines, ["氏名", "田中太郎", "住所", "沖縄県"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n　\n").is_empty());
    }

    #[test]
    fn test_preserves_order_and_inner_spaces() {
        let lines = tokenize("b a\na  b");
        assert_eq!(lines.get(0), Some("b a"));
        assert_eq!(lines.get(1), Some("a  b"));
        assert_eq!(lines.get(2), None);
    }
}
