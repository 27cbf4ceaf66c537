//! # Greedy Longest-Match Segmenter
//!
//! Tokenization of new text against a trained vocabulary. The token list
//! is kept sorted by descending length, so a linear scan's first prefix
//! hit is the longest match.

use crate::training::{EOW, TrainedVocab, is_bpe_word, sort_for_matching};

/// Greedy longest-prefix tokenizer over a trained vocabulary.
///
/// Output is deterministic: the same vocabulary and input produce
/// byte-identical token sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmenter {
    tokens: Vec<String>,
}

impl Segmenter {
    /// Build a segmenter from a bare token list; re-sorts for matching.
    pub fn new(mut tokens: Vec<String>) -> Self {
        sort_for_matching(&mut tokens);
        Self { tokens }
    }

    /// Build a segmenter from a trained vocabulary.
    pub fn from_vocab(vocab: &TrainedVocab) -> Self {
        Self {
            tokens: vocab.tokens().to_vec(),
        }
    }

    /// The tokens, sorted by descending length.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Segment a single word; the end-of-word marker is appended before
    /// matching.
    pub fn split_word(
        &self,
        word: &str,
    ) -> Vec<String> {
        let mut out = Vec::new();
        self.split_word_into(word, &mut out);
        out
    }

    fn split_word_into(
        &self,
        word: &str,
        out: &mut Vec<String>,
    ) {
        if word.is_empty() {
            return;
        }

        let buf = format!("{word}{EOW}");
        let mut cur: &str = &buf;

        'scan: while !cur.is_empty() {
            for token in &self.tokens {
                if let Some(rest) = cur.strip_prefix(token.as_str()) {
                    out.push(token.clone());
                    cur = rest;
                    continue 'scan;
                }
            }

            // No vocabulary hit. Cannot happen after training on a corpus
            // containing this character; pass one character through so the
            // scan always advances.
            let Some(ch) = cur.chars().next() else {
                break;
            };
            out.push(cur[..ch.len_utf8()].to_owned());
            cur = &cur[ch.len_utf8()..];
        }
    }

    /// Segment a sentence.
    ///
    /// Maximal ASCII-letter runs are lowercased and segmented as words;
    /// every other non-whitespace character is emitted verbatim as one
    /// symbol; whitespace is discarded.
    pub fn split_sentence(
        &self,
        sentence: &str,
    ) -> Vec<String> {
        let mut out = Vec::new();
        let bytes = sentence.as_bytes();

        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i];
            if byte.is_ascii_alphabetic() {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word = sentence[start..i].to_ascii_lowercase();
                self.split_word_into(&word, &mut out);
            } else if byte.is_ascii_whitespace() {
                i += 1;
            } else {
                let Some(ch) = sentence[i..].chars().next() else {
                    break;
                };
                let end = i + ch.len_utf8();
                out.push(sentence[i..end].to_owned());
                i = end;
            }
        }
        out
    }

    /// Segment every line of a text, flattened into one token stream.
    pub fn split_lines<I>(
        &self,
        lines: I,
    ) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut out = Vec::new();
        for line in lines {
            out.extend(self.split_sentence(line.as_ref()));
        }
        out
    }

    /// Whether `word` would be segmented by BPE rather than emitted whole.
    pub fn is_splittable(word: &str) -> bool {
        is_bpe_word(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A hand-built vocabulary mimicking a few merges over the walkthrough
    /// corpus.
    fn segmenter() -> Segmenter {
        Segmenter::new(
            [
                "low</w>", "est</w>", "es", "low", "l", "o", "w", "e", "r", "n", "s", "t", "i",
                "d", "</w>", ",", "!",
            ]
            .map(str::to_owned)
            .to_vec(),
        )
    }

    #[test]
    fn test_tokens_sorted_for_matching() {
        let seg = segmenter();
        for window in seg.tokens().windows(2) {
            assert!(window[0].len() >= window[1].len());
        }
    }

    #[test]
    fn test_split_word_longest_match() {
        let seg = segmenter();

        assert_eq!(seg.split_word("low"), vec!["low</w>"]);
        assert_eq!(seg.split_word("lowest"), vec!["low", "est</w>"]);
        assert_eq!(seg.split_word("lower"), vec!["low", "e", "r", "</w>"]);
    }

    #[test]
    fn test_split_word_empty() {
        let seg = segmenter();
        assert!(seg.split_word("").is_empty());
    }

    #[test]
    fn test_split_single_characters() {
        let seg = segmenter();

        // A letter gets the marker; punctuation passes through whole.
        assert_eq!(seg.split_word("l"), vec!["l", "</w>"]);
        assert_eq!(seg.split_sentence("!"), vec!["!"]);
    }

    #[test]
    fn test_unknown_characters_pass_through() {
        let seg = segmenter();
        // "x" is not in the vocabulary; the fallback emits it verbatim.
        assert_eq!(seg.split_word("lox"), vec!["l", "o", "x", "</w>"]);
    }

    #[test]
    fn test_split_sentence() {
        let seg = segmenter();

        assert_eq!(
            seg.split_sentence("Low, lower!"),
            vec!["low</w>", ",", "low", "e", "r", "</w>", "!"]
        );
    }

    #[test]
    fn test_split_sentence_discards_whitespace() {
        let seg = segmenter();
        assert_eq!(
            seg.split_sentence("  low \t low  "),
            vec!["low</w>", "low</w>"]
        );
    }

    #[test]
    fn test_split_lines() {
        let seg = segmenter();
        assert_eq!(
            seg.split_lines(["low", "low!"]),
            vec!["low</w>", "low</w>", "!"]
        );
    }

    #[test]
    fn test_determinism() {
        let seg = segmenter();
        let first = seg.split_sentence("low lower lowest!");
        let second = seg.split_sentence("low lower lowest!");
        assert_eq!(first, second);
    }
}
