//! Groups transcript tokens into display entries by the second they start in.

use crate::error::{internal_error, Error, InternalErrorKind};
use meeting_ai::types::transcription::{Entry, Token, TokenKind};

/// Segment a time-ordered token sequence into one entry per run of tokens that start
/// within the same integer second.
///
/// Punctuation carries no timing and stays with the entry it follows; when it comes
/// before any timed token it joins the first entry. The trailing run is always emitted.
/// A sequence with no timed tokens at all becomes a single entry at second 0.
pub fn segment_entries(tokens: &[Token]) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    let mut buffer = String::new();
    let mut bucket: Option<u64> = None;

    for (index, token) in tokens.iter().enumerate() {
        let second = match token.kind {
            TokenKind::Punctuation => bucket,
            TokenKind::Pronunciation => Some(start_second(index, token)?),
        };

        match (bucket, second) {
            (None, Some(second)) => bucket = Some(second),
            (Some(current), Some(second)) if second < current => {
                return Err(internal_error(
                    InternalErrorKind::MalformedTranscript,
                    &format!("Token {index} starts at second {second}, before second {current}"),
                ));
            }
            (Some(current), Some(second)) if second != current => {
                entries.push(Entry {
                    text: std::mem::take(&mut buffer),
                    appears_at_second: current,
                });
                bucket = Some(second);
            }
            _ => {}
        }

        buffer.push_str(&token.content);
        buffer.push(' ');
    }

    if !buffer.is_empty() {
        entries.push(Entry {
            text: buffer,
            appears_at_second: bucket.unwrap_or(0),
        });
    }

    Ok(entries)
}

fn start_second(index: usize, token: &Token) -> Result<u64, Error> {
    match token.start_time {
        Some(start) if start.is_finite() && start >= 0.0 => Ok(start.floor() as u64),
        Some(start) => Err(internal_error(
            InternalErrorKind::MalformedTranscript,
            &format!("Token {index} has invalid start time {start}"),
        )),
        None => Err(internal_error(
            InternalErrorKind::MalformedTranscript,
            &format!("Token {index} ({}) has no start time", token.content),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;

    fn entry(text: &str, appears_at_second: u64) -> Entry {
        Entry {
            text: text.to_string(),
            appears_at_second,
        }
    }

    fn meeting_tokens() -> Vec<Token> {
        vec![
            Token::pronunciation(0.0, 0.4, "Hello"),
            Token::pronunciation(0.5, 0.9, "team"),
            Token::punctuation("."),
            Token::pronunciation(5.1, 5.5, "Next"),
            Token::pronunciation(5.6, 6.0, "item"),
        ]
    }

    #[test]
    fn test_segments_by_start_second() {
        let entries = segment_entries(&meeting_tokens()).unwrap();
        assert_eq!(
            entries,
            vec![entry("Hello team . ", 0), entry("Next item ", 5)]
        );
    }

    #[test]
    fn test_trailing_entry_is_emitted() {
        let tokens = vec![
            Token::pronunciation(1.2, 1.5, "only"),
            Token::pronunciation(1.6, 1.9, "one"),
        ];
        assert_eq!(
            segment_entries(&tokens).unwrap(),
            vec![entry("only one ", 1)]
        );
    }

    #[test]
    fn test_empty_sequence_has_no_entries() {
        assert!(segment_entries(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_punctuation_never_starts_an_entry() {
        let tokens = vec![
            Token::pronunciation(2.0, 2.3, "Right"),
            Token::punctuation(","),
            Token::punctuation("?"),
            Token::pronunciation(3.0, 3.3, "Yes"),
            Token::punctuation("."),
        ];
        let entries = segment_entries(&tokens).unwrap();
        assert_eq!(entries, vec![entry("Right , ? ", 2), entry("Yes . ", 3)]);
    }

    #[test]
    fn test_leading_punctuation_joins_first_entry() {
        let tokens = vec![
            Token::punctuation("\""),
            Token::pronunciation(4.2, 4.6, "Quote"),
        ];
        assert_eq!(
            segment_entries(&tokens).unwrap(),
            vec![entry("\" Quote ", 4)]
        );
    }

    #[test]
    fn test_punctuation_only_is_flushed_at_zero() {
        let tokens = vec![Token::punctuation("."), Token::punctuation(".")];
        assert_eq!(segment_entries(&tokens).unwrap(), vec![entry(". . ", 0)]);
    }

    #[test]
    fn test_entries_preserve_text_and_order() {
        let tokens = vec![
            Token::pronunciation(0.1, 0.2, "a"),
            Token::pronunciation(1.1, 1.2, "b"),
            Token::punctuation("."),
            Token::pronunciation(1.5, 1.6, "c"),
            Token::pronunciation(7.0, 7.2, "d"),
            Token::pronunciation(7.9, 8.1, "e"),
            Token::pronunciation(12.4, 12.5, "f"),
        ];
        let entries = segment_entries(&tokens).unwrap();

        let seconds: Vec<u64> = entries.iter().map(|e| e.appears_at_second).collect();
        assert!(seconds.windows(2).all(|w| w[0] <= w[1]));

        let rebuilt: String = entries.iter().map(|e| e.text.as_str()).collect();
        let expected: String = tokens.iter().map(|t| format!("{} ", t.content)).collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_timed_token_without_start_is_malformed() {
        let mut tokens = meeting_tokens();
        tokens[3].start_time = None;
        let err = segment_entries(&tokens).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::MalformedTranscript)
        );
    }

    #[test]
    fn test_backwards_token_is_malformed() {
        let tokens = vec![
            Token::pronunciation(5.0, 5.2, "late"),
            Token::pronunciation(1.0, 1.2, "early"),
        ];
        assert!(segment_entries(&tokens).is_err());
    }
}
