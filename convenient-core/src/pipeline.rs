//! # Fachada do Pipeline
//!
//! [`PipelineFacade`] concentra a montagem, a execução e a persistência de um
//! pipeline: um idioma, uma sequência ordenada de estágios e o registro
//! local de fábricas usado para recriar esses estágios a partir do disco.
//!
//! ## Ciclo de vida
//!
//! ```text
//! from_blank / from_model / restore
//!   -> create_pipeline / add_ruler / add_component   (em qualquer ordem)
//!   -> pipe / process / pipe_parallel
//!   -> store                                          (opcional)
//! ```
//!
//! Os métodos de montagem consomem `self` e devolvem `Result<Self>`, o que
//! permite encadear as chamadas com `?`. Cada um é "tudo ou nada": valida
//! tudo antes de mexer no pipeline.
//!
//! ## Persistência
//!
//! `store(path)` grava os artefatos de cada estágio em `path/<nome>/` e,
//! por último, o sidecar `path/config.json` com o idioma e os nomes dos
//! estágios. `restore(path)` faz o caminho inverso: lê o sidecar, recria os
//! estágios pelo nome, na mesma ordem, e só então carrega os artefatos.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::config::{LoadOptions, PipelineConfig};
use crate::doc::Document;
use crate::error::{ConvenientError, Result};
use crate::language::{self, LanguageSpec};
use crate::rule_based::{EntityRuler, Pattern, ENTITY_RULER};
use crate::stage::{validate_stage_name, PipelineStage, Position, StageContext, StageRegistry};

/// Pipeline de um idioma com seus estágios nomeados.
pub struct PipelineFacade {
    lang: &'static LanguageSpec,
    stages: Vec<Box<dyn PipelineStage>>,
    disabled: HashSet<String>,
    registry: StageRegistry,
}

impl PipelineFacade {
    /// Pipeline vazio para o idioma `lang`, com as fábricas embutidas.
    pub fn from_blank(lang: &str) -> Result<Self> {
        Self::with_registry(lang, StageRegistry::with_builtins())
    }

    /// Pipeline vazio usando um registro de fábricas próprio.
    pub fn with_registry(lang: &str, registry: StageRegistry) -> Result<Self> {
        Ok(Self {
            lang: language::lookup(lang)?,
            stages: Vec::new(),
            disabled: HashSet::new(),
            registry,
        })
    }

    /// Carrega um modelo salvo, procurado pelo nome (ver [`LoadOptions::resolve_model`]).
    pub fn from_model(name: &str, options: LoadOptions) -> Result<Self> {
        Self::from_model_with(name, options, StageRegistry::with_builtins())
    }

    /// Como [`from_model`](Self::from_model), com fábricas para estágios próprios.
    pub fn from_model_with(name: &str, options: LoadOptions, registry: StageRegistry) -> Result<Self> {
        let dir = options.resolve_model(name)?;
        info!(model = name, path = %dir.display(), "loading model");
        Self::load(&dir, registry, &options)
    }

    /// Recria um pipeline gravado por [`store`](Self::store).
    pub fn restore(path: impl AsRef<Path>) -> Result<Self> {
        Self::restore_with(path, StageRegistry::with_builtins())
    }

    /// Como [`restore`](Self::restore), com fábricas para estágios próprios.
    pub fn restore_with(path: impl AsRef<Path>, registry: StageRegistry) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "restoring pipeline");
        Self::load(path, registry, &LoadOptions::default())
    }

    fn load(dir: &Path, registry: StageRegistry, options: &LoadOptions) -> Result<Self> {
        let config = PipelineConfig::read(dir)?;
        let names = config
            .pipeline
            .iter()
            .filter(|name| !options.exclude.contains(*name));

        let mut facade = Self::with_registry(&config.lang, registry)?.create_pipeline(names)?;

        for stage in facade.stages.iter_mut() {
            let stage_dir = dir.join(stage.name());
            if !stage_dir.is_dir() {
                return Err(ConvenientError::ResourceNotFound(format!(
                    "no artifacts for stage '{}' in {}",
                    stage.name(),
                    dir.display()
                )));
            }
            stage.from_disk(&stage_dir)?;
        }

        for name in &options.disable {
            if facade.has_stage(name) {
                facade.disabled.insert(name.clone());
            } else {
                debug!(stage = %name, "cannot disable missing stage");
            }
        }
        Ok(facade)
    }

    /// Código ISO do idioma.
    pub fn lang(&self) -> &str {
        self.lang.code
    }

    /// Nomes dos estágios, na ordem em que são executados.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn has_stage(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name() == name)
    }

    pub fn stage(&self, name: &str) -> Option<&dyn PipelineStage> {
        self.stages
            .iter()
            .find(|s| s.name() == name)
            .map(|s| &**s)
    }

    /// Acesso mutável ao estágio `name`, se ele for do tipo `T`.
    pub fn stage_mut<T: PipelineStage + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.stages
            .iter_mut()
            .find(|s| s.name() == name)
            .and_then(|s| s.as_any_mut().downcast_mut::<T>())
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Mantém o estágio no pipeline, mas deixa de executá-lo.
    pub fn disable_stage(&mut self, name: &str) -> Result<()> {
        self.require_stage(name)?;
        self.disabled.insert(name.to_string());
        Ok(())
    }

    pub fn enable_stage(&mut self, name: &str) -> Result<()> {
        self.require_stage(name)?;
        self.disabled.remove(name);
        Ok(())
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.has_stage(name) && !self.disabled.contains(name)
    }

    fn require_stage(&self, name: &str) -> Result<()> {
        if self.has_stage(name) {
            Ok(())
        } else {
            Err(ConvenientError::config(format!("no stage named '{name}' in pipeline")))
        }
    }

    /// Processa um único texto por todos os estágios habilitados.
    pub fn process(&self, text: &str) -> Document {
        let mut doc = Document::new(text, self.lang);
        for stage in &self.stages {
            if self.disabled.contains(stage.name()) {
                continue;
            }
            doc = stage.process(doc);
            trace!(stage = stage.name(), ents = doc.ents().len(), "stage done");
        }
        doc
    }

    /// Processa os textos sob demanda, um documento por texto, na mesma ordem.
    ///
    /// O iterador devolvido é de passada única. Para um texto só, basta
    /// passar `[texto]`.
    pub fn pipe<I, S>(&self, texts: I) -> Docs<'_, I::IntoIter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Docs {
            facade: self,
            texts: texts.into_iter(),
        }
    }

    /// Processa um lote em paralelo (rayon). A ordem do resultado é a da entrada.
    pub fn pipe_parallel<S>(&self, texts: &[S]) -> Vec<Document>
    where
        S: AsRef<str> + Sync,
    {
        texts.par_iter().map(|t| self.process(t.as_ref())).collect()
    }

    /// Insere um `entity_ruler` com `patterns` imediatamente antes de `before`.
    pub fn add_ruler<I>(mut self, patterns: I, before: &str) -> Result<Self>
    where
        I: IntoIterator<Item = Pattern>,
    {
        let ruler = EntityRuler::new(ENTITY_RULER, self.lang, patterns.into_iter().collect());
        self.insert_stage(Box::new(ruler), &Position::before(before))?;
        Ok(self)
    }

    /// Insere um estágio próprio na posição indicada.
    ///
    /// O nome do componente também passa a ser um tipo de estágio no registro
    /// local (a fábrica clona o componente), para que `create_pipeline` e
    /// `restore_with(path, facade.registry().clone())` saibam recriá-lo.
    pub fn add_component<C>(mut self, component: C, position: Position) -> Result<Self>
    where
        C: PipelineStage + Clone + 'static,
    {
        let name = component.name().to_string();
        validate_stage_name(&name)?;
        if self.has_stage(&name) {
            return Err(ConvenientError::config(format!(
                "a stage named '{name}' is already in the pipeline"
            )));
        }
        if self.registry.contains(&name) {
            return Err(ConvenientError::config(format!(
                "'{name}' is already a registered stage type"
            )));
        }
        position.resolve(&self.stage_names())?;

        let prototype = component.clone();
        self.registry
            .register(&name, move |_| Ok(Box::new(prototype.clone())))?;
        self.insert_stage(Box::new(component), &position)?;
        Ok(self)
    }

    /// Cria e anexa, no fim do pipeline e na ordem dada, os estágios `names`.
    ///
    /// Todos os nomes são validados antes de qualquer estágio ser anexado.
    pub fn create_pipeline<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();

        let mut seen = HashSet::new();
        for name in &names {
            if !self.registry.contains(name) {
                return Err(ConvenientError::config(format!(
                    "unknown stage type '{name}' (known: {})",
                    self.registry.names().join(", ")
                )));
            }
            if self.has_stage(name) || !seen.insert(name.as_str()) {
                return Err(ConvenientError::config(format!(
                    "stage '{name}' would be attached twice"
                )));
            }
        }

        let mut created = Vec::with_capacity(names.len());
        for name in &names {
            let ctx = StageContext {
                name,
                lang: self.lang,
            };
            created.push(self.registry.create(&ctx)?);
        }
        for stage in created {
            self.insert_stage(stage, &Position::Last)?;
        }
        Ok(self)
    }

    fn insert_stage(&mut self, stage: Box<dyn PipelineStage>, position: &Position) -> Result<()> {
        if self.has_stage(stage.name()) {
            return Err(ConvenientError::config(format!(
                "a stage named '{}' is already in the pipeline",
                stage.name()
            )));
        }
        let at = position.resolve(&self.stage_names())?;
        debug!(stage = stage.name(), at, "attaching stage");
        self.stages.insert(at, stage);
        Ok(())
    }

    /// Grava os artefatos dos estágios e o sidecar `config.json` em `path`.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<&Self> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|e| ConvenientError::io(path, e))?;

        for stage in &self.stages {
            let stage_dir = path.join(stage.name());
            fs::create_dir_all(&stage_dir).map_err(|e| ConvenientError::io(&stage_dir, e))?;
            stage.to_disk(&stage_dir)?;
        }

        let config = PipelineConfig {
            lang: self.lang.code.to_string(),
            pipeline: self.stage_names().into_iter().map(String::from).collect(),
        };
        config.write(path)?;
        info!(path = %path.display(), stages = config.pipeline.len(), "pipeline stored");
        Ok(self)
    }
}

impl std::fmt::Debug for PipelineFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineFacade")
            .field("lang", &self.lang.code)
            .field("stages", &self.stage_names())
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Iterador preguiçoso devolvido por [`PipelineFacade::pipe`].
pub struct Docs<'a, I> {
    facade: &'a PipelineFacade,
    texts: I,
}

impl<'a, I, S> Iterator for Docs<'a, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        let text = self.texts.next()?;
        Some(self.facade.process(text.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.texts.size_hint()
    }
}
