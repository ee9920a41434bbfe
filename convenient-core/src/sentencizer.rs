//! # Sentencizer
//!
//! Marca o início de sentença no token que segue uma pontuação final
//! (`.`, `!`, `?`, ...). Não usa modelo nenhum, só a lista de pontuações.

use std::any::Any;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{read_json, write_json};
use crate::doc::Document;
use crate::error::Result;
use crate::stage::PipelineStage;

pub const SENTENCIZER: &str = "sentencizer";

const SENTENCIZER_FILE: &str = "sentencizer.json";

const DEFAULT_PUNCT: &[&str] = &[".", "!", "?", "…", "。", "！", "？"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SentencizerConfig {
    punct_chars: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Sentencizer {
    config: SentencizerConfig,
}

impl Sentencizer {
    pub fn new() -> Self {
        Self::with_punct(DEFAULT_PUNCT.iter().copied())
    }

    /// Sentencizer com uma lista própria de pontuações finais.
    pub fn with_punct<I, S>(punct: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: SentencizerConfig {
                punct_chars: punct.into_iter().map(Into::into).collect(),
            },
        }
    }

    fn is_final(&self, text: &str) -> bool {
        self.config.punct_chars.iter().any(|p| p == text)
    }
}

impl Default for Sentencizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for Sentencizer {
    fn name(&self) -> &str {
        SENTENCIZER
    }

    fn process(&self, mut doc: Document) -> Document {
        let mut after_final = true;
        for token in doc.tokens_mut() {
            token.is_sent_start = after_final;
            after_final = self.is_final(&token.text);
        }
        doc
    }

    fn to_disk(&self, dir: &Path) -> Result<()> {
        write_json(dir, SENTENCIZER_FILE, &self.config)
    }

    fn from_disk(&mut self, dir: &Path) -> Result<()> {
        self.config = read_json(dir, SENTENCIZER_FILE)?;
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

    #[test]
    fn test_split_sentences() {
        let doc = Document::new("Hallo Welt. Wie geht's? Gut!", lookup("de").unwrap());
        let doc = Sentencizer::new().process(doc);
        let sents: Vec<String> = doc
            .sents()
            .iter()
            .map(|s| s.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
            .collect();
        assert_eq!(sents, vec!["Hallo Welt .", "Wie geht's ?", "Gut !"]);
    }

    #[test]
    fn test_custom_punct() {
        let doc = Document::new("eins; zwei", lookup("xx").unwrap());
        let doc = Sentencizer::with_punct([";"]).process(doc);
        assert_eq!(doc.sents().len(), 2);
    }

    #[test]
    fn test_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        Sentencizer::with_punct(["|"]).to_disk(dir.path()).unwrap();

        let mut restored = Sentencizer::new();
        restored.from_disk(dir.path()).unwrap();
        let doc = restored.process(Document::new("a | b", lookup("xx").unwrap()));
        assert_eq!(doc.sents().len(), 2);
    }
}
