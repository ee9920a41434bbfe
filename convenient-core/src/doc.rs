//! # Documento e Spans de Entidade
//!
//! O [`Document`] é o que percorre o pipeline: cada estágio recebe um
//! documento e devolve o mesmo documento enriquecido (sentenças marcadas,
//! entidades adicionadas).
//!
//! ## Conjunto de entidades
//!
//! As entidades ficam ordenadas pela posição inicial e nunca se sobrepõem.
//! Quando dois estágios reivindicam o mesmo trecho, vence quem chegou
//! primeiro: [`Document::add_entity`] recusa spans que colidem com uma
//! entidade já presente. Por isso a *posição* de um estágio no pipeline
//! decide a prioridade das suas entidades.

use serde::{Deserialize, Serialize};

use crate::language::LanguageSpec;
use crate::tokenizer::{tokenize, Token};

/// Uma entidade identificada no texto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade (ex: "100", "Österreich").
    pub text: String,
    /// Rótulo da entidade (ex: "NUM", "LOC").
    pub label: String,
    /// Posição de byte inicial no texto original.
    pub start: usize,
    /// Posição de byte final no texto original (exclusiva).
    pub end: usize,
    /// Posição inicial em caracteres.
    pub start_char: usize,
    /// Posição final em caracteres (exclusiva).
    pub end_char: usize,
    /// Nome do estágio que produziu a entidade.
    pub source: String,
    /// Id da regra que gerou a entidade, quando houver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ent_id: Option<String>,
}

impl EntitySpan {
    /// Dois spans se sobrepõem se compartilham ao menos um byte.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }

    /// Comprimento em caracteres.
    pub fn char_len(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Um documento processado (ou em processamento) pelo pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    lang: String,
    text: String,
    tokens: Vec<Token>,
    ents: Vec<EntitySpan>,
}

impl Document {
    /// Cria o documento já tokenizado, sem entidades.
    pub fn new(text: impl Into<String>, lang: &LanguageSpec) -> Self {
        let text = text.into();
        let tokens = tokenize(&text, lang);
        Self {
            lang: lang.code.to_string(),
            text,
            tokens,
            ents: Vec::new(),
        }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Entidades ordenadas pela posição inicial.
    pub fn ents(&self) -> &[EntitySpan] {
        &self.ents
    }

    pub fn into_ents(self) -> Vec<EntitySpan> {
        self.ents
    }

    /// Constrói um span sobre `text[start..end]`.
    ///
    /// Retorna `None` se os offsets estiverem fora do texto ou não caírem em
    /// fronteiras de caractere.
    pub fn make_span(
        &self,
        start: usize,
        end: usize,
        label: &str,
        source: &str,
    ) -> Option<EntitySpan> {
        if start > end {
            return None;
        }
        let text = self.text.get(start..end)?;
        let start_char = self.text[..start].chars().count();
        Some(EntitySpan {
            text: text.to_string(),
            label: label.to_string(),
            start,
            end,
            start_char,
            end_char: start_char + text.chars().count(),
            source: source.to_string(),
            ent_id: None,
        })
    }

    /// `true` se algum byte de `start..end` já pertence a uma entidade.
    pub fn overlaps_entity(&self, start: usize, end: usize) -> bool {
        self.ents.iter().any(|e| e.overlaps(start, end))
    }

    /// Adiciona uma entidade mantendo a ordem.
    ///
    /// Retorna `false` (e descarta o span) se ele colidir com uma entidade
    /// existente ou for vazio.
    pub fn add_entity(&mut self, span: EntitySpan) -> bool {
        if span.start >= span.end || self.overlaps_entity(span.start, span.end) {
            return false;
        }
        let pos = self.ents.partition_point(|e| e.start < span.start);
        self.ents.insert(pos, span);
        true
    }

    /// Sentenças do documento, segundo as marcas `is_sent_start` dos tokens.
    ///
    /// Sem o estágio `sentencizer` o documento inteiro é uma única sentença.
    pub fn sents(&self) -> Vec<&[Token]> {
        let mut sents = Vec::new();
        let mut begin = 0;
        for (i, token) in self.tokens.iter().enumerate().skip(1) {
            if token.is_sent_start {
                sents.push(&self.tokens[begin..i]);
                begin = i;
            }
        }
        if begin < self.tokens.len() {
            sents.push(&self.tokens[begin..]);
        }
        sents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lookup;

    fn doc(text: &str) -> Document {
        Document::new(text, lookup("de").unwrap())
    }

    #[test]
    fn test_make_span_char_offsets() {
        let d = doc("Grüße aus Wien");
        let span = d.make_span(12, 16, "LOC", "test").unwrap();
        assert_eq!(span.text, "Wien");
        assert_eq!(span.start_char, 10);
        assert_eq!(span.end_char, 14);
        assert_eq!(span.char_len(), 4);
    }

    #[test]
    fn test_make_span_rejects_bad_offsets() {
        let d = doc("Grüße");
        assert!(d.make_span(0, 100, "X", "test").is_none());
        // byte 3 está no meio do 'ü'
        assert!(d.make_span(0, 3, "X", "test").is_none());
    }

    #[test]
    fn test_add_entity_first_writer_wins() {
        let mut d = doc("Hans wohnt in Berlin Mitte");
        let berlin = d.make_span(14, 20, "LOC", "a").unwrap();
        let berlin_mitte = d.make_span(14, 26, "LOC", "b").unwrap();
        let hans = d.make_span(0, 4, "PER", "a").unwrap();

        assert!(d.add_entity(berlin));
        assert!(!d.add_entity(berlin_mitte));
        assert!(d.add_entity(hans));

        let texts: Vec<&str> = d.ents().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Hans", "Berlin"]);
    }

    #[test]
    fn test_sents_without_sentencizer() {
        let d = doc("Eins. Zwei.");
        assert_eq!(d.sents().len(), 1);
        assert!(doc("").sents().is_empty());
    }
}
