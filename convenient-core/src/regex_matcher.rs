//! # Matcher de Entidades por Expressão Regular
//!
//! Varre o texto bruto do documento com uma regex e marca cada ocorrência
//! como entidade com um rótulo fixo, desde que o comprimento do trecho
//! (em caracteres) esteja dentro de `[minimum_length, maximum_length]`.
//!
//! ## Semântica
//!
//! - As ocorrências são as que o motor `regex` devolve da esquerda para a
//!   direita, sem sobreposição (semântica *leftmost-first*).
//! - Ocorrências fora dos limites são descartadas em silêncio: é filtro, não
//!   erro. Ocorrências vazias também (uma entidade sem texto não existe).
//! - Regex malformada ou limites invertidos falham na construção, antes de
//!   qualquer texto ser varrido.
//!
//! ```text
//! pattern = "[0-9]+", min = 2, max = 5
//! "Ich bin 100 Jahre alt."  ->  ["100"]
//! "Ich bin 7 Jahre alt."    ->  []
//! ```

use std::any::Any;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{read_json, write_json};
use crate::doc::{Document, EntitySpan};
use crate::error::{ConvenientError, Result};
use crate::stage::PipelineStage;

const MATCHER_FILE: &str = "matcher.json";

/// Configuração do matcher. Os limites não têm valor padrão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Expressão regular (sintaxe do crate `regex`).
    pub pattern: String,
    /// Rótulo atribuído a cada entidade encontrada.
    pub label: String,
    /// Comprimento mínimo aceito, em caracteres (inclusivo).
    pub minimum_length: usize,
    /// Comprimento máximo aceito, em caracteres (inclusivo).
    pub maximum_length: usize,
}

/// Estágio que transforma ocorrências de uma regex em entidades.
#[derive(Debug, Clone)]
pub struct RegexEntityMatcher {
    name: String,
    config: MatcherConfig,
    regex: Regex,
}

impl RegexEntityMatcher {
    /// Valida a configuração e compila a regex.
    pub fn new(name: impl Into<String>, config: MatcherConfig) -> Result<Self> {
        let regex = compile(&config)?;
        Ok(Self {
            name: name.into(),
            config,
            regex,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Encontra as entidades em `text`, sem depender de um documento.
    pub fn find_spans(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        // Contagem incremental de caracteres: evita recontar o prefixo a cada match.
        let mut char_pos = 0;
        let mut byte_pos = 0;

        for m in self.regex.find_iter(text) {
            let len = m.as_str().chars().count();
            if len == 0 || len < self.config.minimum_length || len > self.config.maximum_length {
                trace!(matcher = %self.name, text = m.as_str(), len, "match outside length bounds");
                continue;
            }
            char_pos += text[byte_pos..m.start()].chars().count();
            byte_pos = m.start();
            spans.push(EntitySpan {
                text: m.as_str().to_string(),
                label: self.config.label.clone(),
                start: m.start(),
                end: m.end(),
                start_char: char_pos,
                end_char: char_pos + len,
                source: self.name.clone(),
                ent_id: None,
            });
        }
        spans
    }
}

fn compile(config: &MatcherConfig) -> Result<Regex> {
    if config.minimum_length > config.maximum_length {
        return Err(ConvenientError::config(format!(
            "minimum_length ({}) is greater than maximum_length ({})",
            config.minimum_length, config.maximum_length
        )));
    }
    Regex::new(&config.pattern).map_err(|e| {
        ConvenientError::config(format!("invalid pattern '{}': {e}", config.pattern))
    })
}

impl PipelineStage for RegexEntityMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, mut doc: Document) -> Document {
        for span in self.find_spans(doc.text()) {
            doc.add_entity(span);
        }
        doc
    }

    fn to_disk(&self, dir: &Path) -> Result<()> {
        write_json(dir, MATCHER_FILE, &self.config)
    }

    fn from_disk(&mut self, dir: &Path) -> Result<()> {
        let config: MatcherConfig = read_json(dir, MATCHER_FILE)?;
        self.regex = compile(&config)?;
        self.config = config;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lookup;

    fn matcher(pattern: &str, min: usize, max: usize) -> RegexEntityMatcher {
        RegexEntityMatcher::new(
            "regex_matcher",
            MatcherConfig {
                pattern: pattern.into(),
                label: "NUM".into(),
                minimum_length: min,
                maximum_length: max,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_number_within_bounds() {
        let spans = matcher("[0-9]+", 2, 5).find_spans("Ich bin 100 Jahre alt.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "100");
        assert_eq!(spans[0].label, "NUM");
        assert_eq!((spans[0].start, spans[0].end), (8, 11));
    }

    #[test]
    fn test_star_pattern_skips_empty_matches() {
        // "[0-9]*" casa vazio em toda posição sem dígito
        let spans = matcher("[0-9]*", 2, 5).find_spans("Ich bin 100 Jahre alt.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "100");
    }

    #[test]
    fn test_too_short_and_too_long_dropped() {
        let m = matcher("[0-9]+", 2, 5);
        assert!(m.find_spans("7").is_empty());
        assert!(m.find_spans("Nummer 123456").is_empty());
        let texts: Vec<String> = m
            .find_spans("1 22 333 4444 55555 666666")
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, vec!["22", "333", "4444", "55555"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let m = matcher("[a-z]+", 3, 3);
        let spans = m.find_spans("ab abc abcd");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "abc");
    }

    #[test]
    fn test_length_counts_characters() {
        let m = matcher(r"\w+", 5, 5);
        let spans = m.find_spans("aus Öster Wien");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Öster");
        assert_eq!(spans[0].start_char, 4);
        assert_eq!(spans[0].end_char, 9);
        assert_eq!(spans[0].start, 4);
        assert_eq!(spans[0].end, 10);
    }

    #[test]
    fn test_inverted_bounds_fail_at_construction() {
        let err = RegexEntityMatcher::new(
            "m",
            MatcherConfig {
                pattern: "[0-9]+".into(),
                label: "NUM".into(),
                minimum_length: 5,
                maximum_length: 2,
            },
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_pattern_fails_at_construction() {
        let err = RegexEntityMatcher::new(
            "m",
            MatcherConfig {
                pattern: "[0-9".into(),
                label: "NUM".into(),
                minimum_length: 1,
                maximum_length: 2,
            },
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_process_adds_entities_to_document() {
        let doc = Document::new("Zimmer 12 und 345", lookup("de").unwrap());
        let doc = matcher("[0-9]+", 2, 5).process(doc);
        let texts: Vec<&str> = doc.ents().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["12", "345"]);
        assert!(doc.ents().iter().all(|e| e.source == "regex_matcher"));
    }

    #[test]
    fn test_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let original = matcher("[0-9]+", 2, 5);
        original.to_disk(dir.path()).unwrap();

        let mut restored = matcher("x", 0, 1);
        restored.from_disk(dir.path()).unwrap();
        assert_eq!(restored.config(), original.config());
        assert_eq!(restored.find_spans("a 42").len(), 1);
    }
}
