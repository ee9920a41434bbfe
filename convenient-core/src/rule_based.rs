//! # Entity Ruler — Padrões de Frase
//!
//! O ruler complementa estágios estatísticos ou de léxico com conhecimento
//! explícito: cada [`Pattern`] associa uma frase literal a um rótulo.
//! A frase é tokenizada com o mesmo tokenizador do documento e procurada
//! token a token, sempre preferindo a ocorrência mais longa.
//!
//! ## Por que inserir o ruler antes do `ner`?
//!
//! O documento mantém a primeira entidade que reivindica um trecho. Com o
//! ruler antes do `ner`, as regras têm prioridade e o `ner` só preenche o
//! que sobrou.

use std::any::Any;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::doc::Document;
use crate::error::{ConvenientError, Result};
use crate::language::LanguageSpec;
use crate::phrase::PhraseIndex;
use crate::stage::PipelineStage;
use crate::tokenizer::token_texts;

/// Nome do tipo de estágio (e nome padrão da instância).
pub const ENTITY_RULER: &str = "entity_ruler";

const PATTERNS_FILE: &str = "patterns.jsonl";

/// Uma regra nomeada: frase literal → rótulo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub label: String,
    pub pattern: String,
}

impl Pattern {
    pub fn new(id: impl Into<String>, label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            pattern: pattern.into(),
        }
    }

    /// Representação chave/valor da regra (`id`, `label`, `pattern`).
    pub fn as_map(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ConvenientError::config(format!(
                "pattern '{}' did not serialize to an object: {other}",
                self.id
            ))),
        }
    }
}

/// Estágio que marca as frases dos padrões como entidades.
#[derive(Debug, Clone)]
pub struct EntityRuler {
    name: String,
    lang: &'static LanguageSpec,
    patterns: Vec<Pattern>,
    /// Índice por frase tokenizada → posição em `patterns`.
    index: PhraseIndex<usize>,
}

impl EntityRuler {
    pub fn new(name: impl Into<String>, lang: &'static LanguageSpec, patterns: Vec<Pattern>) -> Self {
        let mut ruler = Self {
            name: name.into(),
            lang,
            patterns: Vec::new(),
            index: PhraseIndex::new(false),
        };
        ruler.add_patterns(patterns);
        ruler
    }

    /// Adiciona padrões. Para frases repetidas vale o primeiro padrão.
    pub fn add_patterns<I>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = Pattern>,
    {
        for pattern in patterns {
            let words = token_texts(&pattern.pattern, self.lang);
            let next = self.patterns.len();
            match self.index.entry_or_insert_with(&words, || next) {
                Some(slot) if *slot == next => self.patterns.push(pattern),
                Some(_) => debug!(ruler = %self.name, id = %pattern.id, "duplicate phrase ignored"),
                None => debug!(ruler = %self.name, id = %pattern.id, "empty pattern ignored"),
            }
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.patterns.iter().map(|p| p.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

impl PipelineStage for EntityRuler {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, mut doc: Document) -> Document {
        let mut found = Vec::new();
        self.index.scan(doc.tokens(), |first, last, &idx| {
            let start = doc.tokens()[first].start;
            let end = doc.tokens()[last - 1].end;
            if doc.overlaps_entity(start, end) {
                return false;
            }
            let pattern = &self.patterns[idx];
            match doc.make_span(start, end, &pattern.label, &self.name) {
                Some(mut span) => {
                    span.ent_id = Some(pattern.id.clone());
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
        let path = dir.join(PATTERNS_FILE);
        let mut file = fs::File::create(&path).map_err(|e| ConvenientError::io(&path, e))?;
        for pattern in &self.patterns {
            let line = serde_json::to_string(pattern)?;
            writeln!(file, "{line}").map_err(|e| ConvenientError::io(&path, e))?;
        }
        Ok(())
    }

    fn from_disk(&mut self, dir: &Path) -> Result<()> {
        let path = dir.join(PATTERNS_FILE);
        let file = fs::File::open(&path).map_err(|e| ConvenientError::io(&path, e))?;
        let mut patterns = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| ConvenientError::io(&path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let pattern: Pattern = serde_json::from_str(&line).map_err(|e| {
                ConvenientError::config(format!("{}:{}: {e}", path.display(), n + 1))
            })?;
            patterns.push(pattern);
        }

        self.patterns.clear();
        self.index = PhraseIndex::new(false);
        self.add_patterns(patterns);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
