//! # Reconhecedor por Léxico (`ner`)
//!
//! Estágio embutido registrado como `ner`. Guarda um léxico de entidades
//! conhecidas, insensível a maiúsculas, em que cada frase acumula contagens
//! por rótulo. O léxico pode ser alimentado diretamente ([`LexiconRecognizer::add_entry`])
//! ou aprendido de documentos já anotados ([`LexiconRecognizer::learn`]).
//!
//! Ao processar, cada frase encontrada recebe o rótulo mais frequente;
//! empates são resolvidos em ordem alfabética para manter o resultado
//! determinístico. O léxico é o "peso" do estágio: é ele que vai para o
//! disco em `lexicon.json`.

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{read_json, write_json};
use crate::doc::Document;
use crate::error::Result;
use crate::language::LanguageSpec;
use crate::phrase::PhraseIndex;
use crate::stage::PipelineStage;
use crate::tokenizer::token_texts;

/// Nome do tipo de estágio.
pub const NER: &str = "ner";

const LEXICON_FILE: &str = "lexicon.json";

type LabelCounts = BTreeMap<String, u32>;

#[derive(Debug, Serialize, Deserialize)]
struct LexiconEntry {
    phrase: Vec<String>,
    labels: LabelCounts,
}

#[derive(Debug, Clone)]
pub struct LexiconRecognizer {
    name: String,
    lang: &'static LanguageSpec,
    index: PhraseIndex<LabelCounts>,
}

impl LexiconRecognizer {
    pub fn new(name: impl Into<String>, lang: &'static LanguageSpec) -> Self {
        Self {
            name: name.into(),
            lang,
            index: PhraseIndex::new(true),
        }
    }

    /// Registra uma ocorrência de `phrase` com o rótulo `label`.
    pub fn add_entry(&mut self, phrase: &str, label: &str) {
        let words = token_texts(phrase, self.lang);
        self.count(&words, label, 1);
    }

    fn count(&mut self, words: &[String], label: &str, n: u32) {
        if let Some(counts) = self.index.entry_or_insert_with(words, LabelCounts::new) {
            *counts.entry(label.to_string()).or_insert(0) += n;
        }
    }

    /// Aprende as entidades de um documento anotado. Retorna quantas foram lidas.
    pub fn learn(&mut self, doc: &Document) -> usize {
        for ent in doc.ents() {
            self.add_entry(&ent.text, &ent.label);
        }
        doc.ents().len()
    }

    /// Rótulo que `phrase` receberia, se estiver no léxico.
    pub fn label_of(&self, phrase: &str) -> Option<String> {
        let doc = Document::new(phrase, self.lang);
        let total = doc.tokens().len();
        let mut label = None;
        self.index.scan(doc.tokens(), |first, last, counts| {
            if first == 0 && last == total {
                label = best_label(counts).map(str::to_string);
            }
            true
        });
        label
    }

    /// Número de frases distintas no léxico.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn best_label(counts: &LabelCounts) -> Option<&str> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(label, _)| label.as_str())
}

impl PipelineStage for LexiconRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, mut doc: Document) -> Document {
        let mut found = Vec::new();
        self.index.scan(doc.tokens(), |first, last, counts| {
            let start = doc.tokens()[first].start;
            let end = doc.tokens()[last - 1].end;
            if doc.overlaps_entity(start, end) {
                return false;
            }
            let span = best_label(counts).and_then(|label| doc.make_span(start, end, label, &self.name));
            match span {
                Some(span) => {
                    found.push(span);
                    true
                }
                None => false,
            }
        });
        for span in found {
            doc.add_entity(span);
        }
        doc
    }

    fn to_disk(&self, dir: &Path) -> Result<()> {
        let mut entries: Vec<LexiconEntry> = self
            .index
            .iter()
            .map(|(phrase, labels)| LexiconEntry {
                phrase: phrase.clone(),
                labels: labels.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.phrase.cmp(&b.phrase));
        write_json(dir, LEXICON_FILE, &entries)
    }

    fn from_disk(&mut self, dir: &Path) -> Result<()> {
        let entries: Vec<LexiconEntry> = read_json(dir, LEXICON_FILE)?;
        self.index = PhraseIndex::new(true);
        for entry in entries {
            for (label, n) in &entry.labels {
                self.count(&entry.phrase, label, *n);
            }
        }
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

    fn recognizer() -> LexiconRecognizer {
        LexiconRecognizer::new(NER, lookup("de").unwrap())
    }

    fn doc(text: &str) -> Document {
        Document::new(text, lookup("de").unwrap())
    }

    #[test]
    fn test_entry_matches_case_insensitively() {
        let mut ner = recognizer();
        ner.add_entry("Österreich", "LOC");
        let d = ner.process(doc("AI aus ÖSTERREICH."));
        assert_eq!(d.ents().len(), 1);
        assert_eq!(d.ents()[0].text, "ÖSTERREICH");
        assert_eq!(d.ents()[0].label, "LOC");
        assert_eq!(d.ents()[0].source, NER);
    }

    #[test]
    fn test_majority_label_wins() {
        let mut ner = recognizer();
        ner.add_entry("Paris", "PER");
        ner.add_entry("Paris", "LOC");
        ner.add_entry("Paris", "LOC");
        assert_eq!(ner.label_of("Paris").as_deref(), Some("LOC"));
    }

    #[test]
    fn test_tie_broken_alphabetically() {
        let mut ner = recognizer();
        ner.add_entry("Jordan", "PER");
        ner.add_entry("Jordan", "LOC");
        assert_eq!(ner.label_of("Jordan").as_deref(), Some("LOC"));
    }

    #[test]
    fn test_learn_from_annotated_document() {
        let mut annotated = doc("Hans wohnt in Berlin");
        let hans = annotated.make_span(0, 4, "PER", "manual").unwrap();
        let berlin = annotated.make_span(14, 20, "LOC", "manual").unwrap();
        annotated.add_entity(hans);
        annotated.add_entity(berlin);

        let mut ner = recognizer();
        assert_eq!(ner.learn(&annotated), 2);
        assert_eq!(ner.len(), 2);

        let d = ner.process(doc("Berlin ist groß, sagt Hans."));
        let labels: Vec<&str> = d.ents().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["LOC", "PER"]);
    }

    #[test]
    fn test_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut ner = recognizer();
        ner.add_entry("Wien", "LOC");
        ner.add_entry("Wien", "LOC");
        ner.add_entry("Wien", "ORG");
        ner.to_disk(dir.path()).unwrap();

        let mut restored = recognizer();
        restored.from_disk(dir.path()).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.label_of("wien").as_deref(), Some("LOC"));
    }
}
