//! # Tokenizador
//!
//! Divide o texto bruto em tokens (palavras, números, pontuações) preservando
//! a posição original de cada um. As fronteiras de palavra seguem o padrão
//! Unicode UAX #29 (`unicode-segmentation`), o que já mantém juntos números
//! como `1.234` e contrações como `don't`.
//!
//! Sobre essa segmentação aplicamos uma única exceção dependente do idioma:
//! o ponto que segue uma abreviação conhecida (ex: "Dr", "z.B") é colado ao
//! token, em vez de virar um token de pontuação separado.
//!
//! ```text
//! "Dr. Müller ist 100 Jahre alt."
//!  -> "Dr." "Müller" "ist" "100" "Jahre" "alt" "."
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::language::LanguageSpec;

/// Um token extraído do texto original.
///
/// Os offsets são índices de byte no texto original, o que permite recortar
/// `&text[token.start..token.end]` sem copiar nada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Jahre", ".", "Dr.").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusivo).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token no documento.
    pub index: usize,
    /// `true` se o token abre uma sentença. O tokenizador marca apenas o
    /// primeiro token; o estágio `sentencizer` marca os demais.
    pub is_sent_start: bool,
}

/// Tokeniza `text` usando as exceções do idioma `lang`.
pub fn tokenize(text: &str, lang: &LanguageSpec) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for (start, word) in text.split_word_bound_indices() {
        if word.chars().all(char::is_whitespace) {
            continue;
        }

        if word == "." {
            if let Some(prev) = tokens.last_mut() {
                if prev.end == start && lang.is_abbreviation(&prev.text) {
                    prev.text.push('.');
                    prev.end = start + word.len();
                    continue;
                }
            }
        }

        tokens.push(Token {
            text: word.to_string(),
            start,
            end: start + word.len(),
            index: 0, // atribuído abaixo
            is_sent_start: false,
        });
    }

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
        token.is_sent_start = i == 0;
    }
    tokens
}

/// Apenas os textos dos tokens; usado para indexar frases de padrões.
pub fn token_texts(text: &str, lang: &LanguageSpec) -> Vec<String> {
    tokenize(text, lang).into_iter().map(|t| t.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lookup;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_basic() {
        let de = lookup("de").unwrap();
        let tokens = tokenize("Ich bin 100 Jahre alt.", de);
        assert_eq!(texts(&tokens), vec!["Ich", "bin", "100", "Jahre", "alt", "."]);
        assert!(tokens[0].is_sent_start);
        assert!(!tokens[1].is_sent_start);
        assert_eq!(tokens[2].index, 2);
    }

    #[test]
    fn test_tokenize_abbreviation_keeps_dot() {
        let de = lookup("de").unwrap();
        let tokens = tokenize("Dr. Müller kommt.", de);
        assert_eq!(texts(&tokens), vec!["Dr.", "Müller", "kommt", "."]);
        assert_eq!(tokens[0].end, 3);
    }

    #[test]
    fn test_tokenize_unknown_abbreviation_splits_dot() {
        let xx = lookup("xx").unwrap();
        let tokens = tokenize("Dr. Who", xx);
        assert_eq!(texts(&tokens), vec!["Dr", ".", "Who"]);
    }

    #[test]
    fn test_offsets_point_into_original_text() {
        let de = lookup("de").unwrap();
        let text = "AI aus Österreich.";
        for token in tokenize(text, de) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_tokenize_empty() {
        let en = lookup("en").unwrap();
        assert!(tokenize("", en).is_empty());
        assert!(tokenize("   \n", en).is_empty());
    }
}
