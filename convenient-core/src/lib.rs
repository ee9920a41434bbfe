//! # convenient-core — Fachada Conveniente para Pipelines de NLP
//!
//! Este crate embrulha a montagem, execução e persistência de um pipeline de
//! processamento de texto atrás de um builder fluente, com um estágio de
//! reconhecimento de entidades por expressão regular.
//!
//! ## Arquitetura
//!
//! O texto percorre uma sequência linear de estágios nomeados:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Tokenização** ([`tokenizer`]): feita ao criar o [`Document`], com as exceções do idioma ([`language`]).
//! 3.  **Estágios** ([`stage`]), na ordem em que foram anexados:
//!     *   **Sentencizer** ([`sentencizer`]): fronteiras de sentença por pontuação.
//!     *   **Entity Ruler** ([`rule_based`]): frases literais → rótulo.
//!     *   **Léxico** ([`lexicon`], registrado como `ner`): entidades conhecidas, aprendidas de exemplos.
//!     *   **Regex** ([`regex_matcher`]): ocorrências de uma regex filtradas por comprimento.
//! 4.  **Saída**: [`Document`] com a lista de [`EntitySpan`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use convenient_core::{MatcherConfig, PipelineFacade, Position, RegexEntityMatcher};
//!
//! # fn main() -> convenient_core::Result<()> {
//! let matcher = RegexEntityMatcher::new(
//!     "regExMatcher",
//!     MatcherConfig {
//!         pattern: "[0-9]+".into(),
//!         label: "NUM".into(),
//!         minimum_length: 2,
//!         maximum_length: 5,
//!     },
//! )?;
//!
//! let nlp = PipelineFacade::from_blank("de")?
//!     .create_pipeline(["sentencizer"])?
//!     .add_component(matcher, Position::First)?;
//!
//! for doc in nlp.pipe(["Ich bin 100 Jahre alt."]) {
//!     for ent in doc.ents() {
//!         println!("{} ({})", ent.text, ent.label);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistência
//!
//! [`PipelineFacade::store`] grava os artefatos dos estágios e um
//! `config.json` com `{"lang", "pipeline"}`; [`PipelineFacade::restore`]
//! recria o pipeline a partir desse diretório.

pub mod config;
pub mod doc;
pub mod error;
pub mod language;
pub mod lexicon;
pub mod phrase;
pub mod pipeline;
pub mod regex_matcher;
pub mod rule_based;
pub mod sentencizer;
pub mod stage;
pub mod tokenizer;

pub use config::{LoadOptions, PipelineConfig};
pub use doc::{Document, EntitySpan};
pub use error::{ConvenientError, Result};
pub use lexicon::LexiconRecognizer;
pub use pipeline::{Docs, PipelineFacade};
pub use regex_matcher::{MatcherConfig, RegexEntityMatcher};
pub use rule_based::{EntityRuler, Pattern};
pub use sentencizer::Sentencizer;
pub use stage::{PipelineStage, Position, StageRegistry};
pub use tokenizer::Token;
