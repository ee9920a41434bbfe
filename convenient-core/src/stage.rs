//! # Estágios do Pipeline
//!
//! Um estágio é um passo nomeado aplicado ao documento em sequência. Todo
//! estágio implementa [`PipelineStage`], cuja única capacidade obrigatória é
//! `process(documento) -> documento`. Persistência é opcional: estágios sem
//! estado simplesmente herdam `to_disk`/`from_disk` vazios.
//!
//! ## Registro local de fábricas
//!
//! Para recriar um pipeline a partir do disco precisamos saber construir cada
//! estágio pelo nome. Em vez de um registro global do processo, cada pipeline
//! carrega o seu próprio [`StageRegistry`], que mapeia o nome do tipo de
//! estágio para uma fábrica.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::doc::Document;
use crate::error::{ConvenientError, Result};
use crate::language::LanguageSpec;
use crate::lexicon::{LexiconRecognizer, NER};
use crate::rule_based::{EntityRuler, ENTITY_RULER};
use crate::sentencizer::{Sentencizer, SENTENCIZER};

/// Um passo nomeado do pipeline.
///
/// `process` recebe `&self`: estágios não mudam durante o processamento, o que
/// permite compartilhá-los entre threads em [`crate::PipelineFacade::pipe_parallel`].
pub trait PipelineStage: Send + Sync {
    /// Nome único do estágio dentro do pipeline.
    fn name(&self) -> &str;

    /// Processa o documento e o devolve.
    fn process(&self, doc: Document) -> Document;

    /// Grava os artefatos do estágio em `dir` (já criado pelo chamador).
    fn to_disk(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    /// Recarrega os artefatos gravados por `to_disk`.
    fn from_disk(&mut self, _dir: &Path) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Onde inserir um estágio novo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Position {
    First,
    #[default]
    Last,
    /// Imediatamente antes do estágio com este nome.
    Before(String),
    /// Imediatamente depois do estágio com este nome.
    After(String),
}

impl Position {
    pub fn before(name: impl Into<String>) -> Self {
        Position::Before(name.into())
    }

    pub fn after(name: impl Into<String>) -> Self {
        Position::After(name.into())
    }

    /// Converte a posição em índice de inserção dentro de `names`.
    pub(crate) fn resolve(&self, names: &[&str]) -> Result<usize> {
        let find = |anchor: &str| {
            names.iter().position(|n| *n == anchor).ok_or_else(|| {
                ConvenientError::config(format!(
                    "stage '{anchor}' not found in pipeline {names:?}"
                ))
            })
        };
        match self {
            Position::First => Ok(0),
            Position::Last => Ok(names.len()),
            Position::Before(anchor) => find(anchor),
            Position::After(anchor) => find(anchor).map(|i| i + 1),
        }
    }
}

/// Nomes de estágio viram nomes de diretório em `store`: nada de vazio,
/// separadores de caminho, `.`/`..` ou o nome do sidecar.
pub(crate) fn validate_stage_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name == crate::config::CONFIG_FILE;
    if bad {
        return Err(ConvenientError::config(format!("invalid stage name '{name}'")));
    }
    Ok(())
}

/// O que uma fábrica recebe para construir um estágio.
pub struct StageContext<'a> {
    pub name: &'a str,
    pub lang: &'static LanguageSpec,
}

/// Constrói um estágio novo (ainda sem artefatos carregados do disco).
pub type StageFactory =
    Arc<dyn Fn(&StageContext<'_>) -> Result<Box<dyn PipelineStage>> + Send + Sync>;

/// Mapa local "nome do tipo de estágio" → fábrica.
#[derive(Clone)]
pub struct StageRegistry {
    factories: HashMap<String, StageFactory>,
}

impl StageRegistry {
    /// Registro sem nenhuma fábrica.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registro com os estágios embutidos: `sentencizer`, `entity_ruler`, `ner`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.insert(SENTENCIZER, |_| Ok(Box::new(Sentencizer::new())));
        registry.insert(ENTITY_RULER, |ctx| {
            Ok(Box::new(EntityRuler::new(ctx.name, ctx.lang, Vec::new())))
        });
        registry.insert(NER, |ctx| Ok(Box::new(LexiconRecognizer::new(ctx.name, ctx.lang))));
        registry
    }

    fn insert<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&StageContext<'_>) -> Result<Box<dyn PipelineStage>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Registra uma fábrica nova. Nomes inválidos ou já registrados são erro.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&StageContext<'_>) -> Result<Box<dyn PipelineStage>> + Send + Sync + 'static,
    {
        validate_stage_name(name)?;
        if self.contains(name) {
            return Err(ConvenientError::config(format!(
                "a stage factory named '{name}' is already registered"
            )));
        }
        self.insert(name, factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Nomes registrados, em ordem alfabética.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instancia o estágio `ctx.name`.
    pub fn create(&self, ctx: &StageContext<'_>) -> Result<Box<dyn PipelineStage>> {
        let factory = self.factories.get(ctx.name).ok_or_else(|| {
            ConvenientError::config(format!(
                "unknown stage type '{}' (known: {})",
                ctx.name,
                self.names().join(", ")
            ))
        })?;
        factory(ctx)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("factories", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::lookup;

    #[test]
    fn test_position_resolve() {
        let names = ["sentencizer", "ner"];
        assert_eq!(Position::First.resolve(&names).unwrap(), 0);
        assert_eq!(Position::Last.resolve(&names).unwrap(), 2);
        assert_eq!(Position::before("ner").resolve(&names).unwrap(), 1);
        assert_eq!(Position::after("ner").resolve(&names).unwrap(), 2);
        assert!(Position::before("parser")
            .resolve(&names)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_builtin_registry() {
        let registry = StageRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["entity_ruler", "ner", "sentencizer"]);

        let ctx = StageContext {
            name: "ner",
            lang: lookup("de").unwrap(),
        };
        let stage = registry.create(&ctx).unwrap();
        assert_eq!(stage.name(), "ner");
    }

    #[test]
    fn test_unknown_stage_type() {
        let registry = StageRegistry::with_builtins();
        let ctx = StageContext {
            name: "tagger",
            lang: lookup("de").unwrap(),
        };
        assert!(registry.create(&ctx).err().unwrap().is_configuration());
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registry = StageRegistry::with_builtins();
        let err = registry
            .register("sentencizer", |_| Ok(Box::new(Sentencizer::new())))
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_register_rejects_path_like_names() {
        let mut registry = StageRegistry::empty();
        for name in ["", ".", "..", "../x", "a/b", "a\\b", "config.json"] {
            let err = registry
                .register(name, |_| Ok(Box::new(Sentencizer::new())))
                .unwrap_err();
            assert!(err.is_configuration(), "{name:?} should be rejected");
        }
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_position_default_is_last() {
        assert_eq!(Position::default(), Position::Last);
    }
}
