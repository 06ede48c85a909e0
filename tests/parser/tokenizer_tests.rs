//! Tokenizer tests.
//!
//! Quoting rules, the remainder cursor and tokenizer properties.

use proptest::prelude::*;
use switchboard_parser::{QuotePair, TokenKind, Tokenizer};

fn texts(tokenizer: &Tokenizer, raw: &str) -> Vec<String> {
    tokenizer.tokenize(raw).into_iter().map(|t| t.text).collect()
}

#[test]
fn tokenize_words_and_quotes() {
    let tokenizer = Tokenizer::new();
    assert_eq!(
        texts(&tokenizer, r#"say "hello world" «bonjour» end"#),
        vec!["say", "hello world", "bonjour", "end"]
    );
}

#[test]
fn quote_inside_word_is_literal() {
    let tokenizer = Tokenizer::new();
    assert_eq!(texts(&tokenizer, "don't stop"), vec!["don't", "stop"]);
}

#[test]
fn closing_quote_needs_whitespace_after() {
    let tokenizer = Tokenizer::new();
    assert_eq!(texts(&tokenizer, r#""a"b c" d"#), vec![r#"a"b c"#, "d"]);
}

#[test]
fn escapes_inside_quotes() {
    let tokenizer = Tokenizer::new();
    assert_eq!(
        texts(&tokenizer, r#""say \"hi\" \\ now""#),
        vec![r#"say "hi" \ now"#]
    );
}

#[test]
fn unterminated_quote_runs_to_end() {
    let tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize("'open ended");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Quoted);
    assert_eq!(tokens[0].text, "open ended");
}

#[test]
fn custom_quotes_replace_defaults() {
    let tokenizer = Tokenizer::with_quotes([QuotePair::new('[', ']')]);
    assert_eq!(texts(&tokenizer, "[a b] \"c d\""), vec!["a b", "\"c", "d\""]);
}

#[test]
fn remainder_exposes_unconsumed_text() {
    let tokenizer = Tokenizer::new();
    let raw = "first   second third";
    let mut rest = tokenizer.cursor(raw);
    let first = rest.next_token().unwrap();
    assert_eq!(first.text, "first");
    assert_eq!(rest.as_str(), "second third");
    assert_eq!(tokenizer.remainder_from(raw, first.span.end).as_str(), "second third");
}

#[test]
fn peek_tokens_pads_with_none() {
    let tokenizer = Tokenizer::new();
    let rest = tokenizer.cursor("a b");
    let ahead: Vec<Option<String>> = rest
        .peek_tokens(3)
        .into_iter()
        .map(|t| t.map(|t| t.text))
        .collect();
    assert_eq!(ahead, vec![Some("a".into()), Some("b".into()), None]);
    assert_eq!(rest.as_str(), "a b");
}

#[test]
fn remainder_from_clamps_inside_a_character() {
    let tokenizer = Tokenizer::new();
    let raw = "é tail";
    assert_eq!(tokenizer.remainder_from(raw, 1).as_str(), "é tail");
    assert_eq!(tokenizer.remainder_from(raw, 100).as_str(), "");
}

proptest! {
    #[test]
    fn bare_words_tokenize_to_whitespace_split(words in prop::collection::vec("[a-z0-9]{1,8}", 0..8)) {
        let tokenizer = Tokenizer::new();
        let raw = words.join("  ");
        prop_assert_eq!(texts(&tokenizer, &raw), words);
    }

    #[test]
    fn token_spans_are_ordered_and_in_bounds(raw in "[a-z \"'«»\\\\]{0,40}") {
        let tokenizer = Tokenizer::new();
        let mut last_end = 0;
        for token in tokenizer.tokenize(&raw) {
            prop_assert!(token.span.start >= last_end);
            prop_assert!(token.span.end <= raw.len());
            prop_assert!(token.span.start < token.span.end);
            last_end = token.span.end;
        }
    }

    #[test]
    fn cursor_yields_the_same_tokens(raw in "[a-z \"']{0,40}") {
        let tokenizer = Tokenizer::new();
        let mut rest = tokenizer.cursor(&raw);
        let mut streamed = Vec::new();
        while let Some(token) = rest.next_token() {
            streamed.push(token);
        }
        prop_assert_eq!(streamed, tokenizer.tokenize(&raw));
        prop_assert!(rest.is_empty());
    }
}
