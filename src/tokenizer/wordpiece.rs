//! Greedy longest-match WordPiece tokenizer.

use super::error::{Result, TokenizerError};
use super::{TokenId, Tokenizer};
use std::collections::HashMap;
use std::path::Path;

/// Words longer than this many characters map straight to [UNK].
const MAX_WORD_CHARS: usize = 100;

/// Uncased WordPiece tokenizer over a pretrained vocabulary.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: HashMap<String, TokenId>,
    tokens: Vec<String>,
    unk_id: TokenId,
    cls_id: TokenId,
    sep_id: TokenId,
    pad_id: TokenId,
}

impl WordPieceTokenizer {
    /// Load from a `vocab.txt` file where the token ID is the line number.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let tokens: Vec<String> = content.lines().map(str::to_string).collect();
        Self::from_tokens(tokens)
    }

    /// Build from an ordered token list.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.is_empty() {
            return Err(TokenizerError::EmptyVocab(
                "vocabulary contains no tokens".to_string(),
            ));
        }

        let vocab: HashMap<String, TokenId> = tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as TokenId))
            .collect();

        let special = |name: &str| -> Result<TokenId> {
            vocab
                .get(name)
                .copied()
                .ok_or_else(|| TokenizerError::MissingSpecialToken(name.to_string()))
        };

        let unk_id = special("[UNK]")?;
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;
        let pad_id = special("[PAD]")?;

        Ok(Self {
            vocab,
            tokens,
            unk_id,
            cls_id,
            sep_id,
            pad_id,
        })
    }

    /// [UNK] token ID.
    #[must_use]
    pub fn unk_id(&self) -> TokenId {
        self.unk_id
    }

    /// [CLS] token ID.
    #[must_use]
    pub fn cls_id(&self) -> TokenId {
        self.cls_id
    }

    /// [SEP] token ID.
    #[must_use]
    pub fn sep_id(&self) -> TokenId {
        self.sep_id
    }

    /// [PAD] token ID.
    #[must_use]
    pub fn pad_id(&self) -> TokenId {
        self.pad_id
    }

    /// Lowercase and split into words, treating each punctuation character
    /// as its own word.
    fn basic_tokenize(text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();

        for ch in text.chars().flat_map(char::to_lowercase) {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if is_punctuation(ch) {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(ch.to_string());
            } else if !ch.is_control() {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Greedy longest-match split of one word into pieces.
    fn wordpiece(&self, word: &str) -> Vec<TokenId> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_CHARS {
            return vec![self.unk_id];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;
            while start < end {
                let mut piece: String = chars[start..end].iter().collect();
                if start > 0 {
                    piece.insert_str(0, "##");
                }
                if let Some(&id) = self.vocab.get(&piece) {
                    matched = Some(id);
                    break;
                }
                end -= 1;
            }
            match matched {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                // Any unmatchable span sinks the whole word
                None => return vec![self.unk_id],
            }
        }
        pieces
    }
}

impl Tokenizer for WordPieceTokenizer {
    fn encode(&self, text: &str) -> Vec<TokenId> {
        Self::basic_tokenize(text)
            .iter()
            .flat_map(|word| self.wordpiece(word))
            .collect()
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String> {
        let mut out = String::new();
        for &id in ids {
            let token = self
                .tokens
                .get(id as usize)
                .ok_or(TokenizerError::InvalidTokenId(id))?;
            if let Some(cont) = token.strip_prefix("##") {
                out.push_str(cont);
            } else {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(token);
            }
        }
        Ok(out)
    }

    fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    fn id_to_token(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.vocab.get(token).copied()
    }
}

fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || matches!(ch, '\u{2018}'..='\u{201F}' | '\u{2013}' | '\u{2014}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tokenizer() -> WordPieceTokenizer {
        let tokens = [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "the", "news", "is", "fake", "##st", "satire",
            "un", "##believ", "##able", ".", ",",
        ];
        WordPieceTokenizer::from_tokens(tokens.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_missing_special_token_errors() {
        let result = WordPieceTokenizer::from_tokens(vec!["the".to_string()]);
        assert!(matches!(
            result,
            Err(TokenizerError::MissingSpecialToken(_))
        ));
    }

    #[test]
    fn test_lowercase_and_whole_words() {
        let tok = test_tokenizer();
        assert_eq!(tok.encode("The NEWS is FAKE"), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_punctuation_splits() {
        let tok = test_tokenizer();
        assert_eq!(tok.encode("the news, is fake."), vec![4, 5, 14, 6, 7, 13]);
    }

    #[test]
    fn test_greedy_longest_match_with_continuations() {
        let tok = test_tokenizer();
        // "unbelievable" -> "un" + "##believ" + "##able"
        assert_eq!(tok.encode("unbelievable"), vec![10, 11, 12]);
        // "fakest" -> "fake" + "##st"
        assert_eq!(tok.encode("fakest"), vec![7, 8]);
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let tok = test_tokenizer();
        assert_eq!(tok.encode("zzz"), vec![tok.unk_id()]);
    }

    #[test]
    fn test_decode_rejoins_pieces() {
        let tok = test_tokenizer();
        let ids = tok.encode("unbelievable news");
        assert_eq!(tok.decode(&ids).unwrap(), "unbelievable news");
    }

    #[test]
    fn test_decode_invalid_id_errors() {
        let tok = test_tokenizer();
        assert!(matches!(
            tok.decode(&[999]),
            Err(TokenizerError::InvalidTokenId(999))
        ));
    }
}
