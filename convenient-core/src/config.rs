//! # Configuração e Sidecar
//!
//! - [`PipelineConfig`]: o arquivo `config.json` gravado ao lado dos
//!   artefatos do pipeline. Contém exatamente duas chaves, `lang` e
//!   `pipeline`, suficientes para recriar a estrutura antes de carregar os
//!   artefatos de cada estágio.
//! - [`LoadOptions`]: ajustes aplicados ao carregar um modelo salvo.
//!
//! Também ficam aqui os utilitários de leitura/escrita JSON usados pelos
//! estágios para persistir seus próprios arquivos.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConvenientError, Result};

/// Nome do arquivo sidecar.
pub const CONFIG_FILE: &str = "config.json";

/// Conteúdo de `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Código ISO do idioma.
    pub lang: String,
    /// Nomes dos estágios, na ordem do pipeline.
    pub pipeline: Vec<String>,
}

impl PipelineConfig {
    /// Lê `dir/config.json`.
    ///
    /// Arquivo ausente é `ResourceNotFound`; JSON inválido ou chaves
    /// diferentes de `lang`/`pipeline` são erro de configuração.
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(ConvenientError::ResourceNotFound(format!(
                "no {CONFIG_FILE} in {}",
                dir.display()
            )));
        }
        let raw = fs::read_to_string(&path).map_err(|e| ConvenientError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            ConvenientError::config(format!("malformed {}: {e}", path.display()))
        })
    }

    /// Grava `dir/config.json`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        write_json(dir, CONFIG_FILE, self)
    }
}

/// Ajustes aplicados por [`crate::PipelineFacade::from_model`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Estágios criados e carregados, mas pulados ao processar.
    pub disable: Vec<String>,
    /// Estágios que nem são criados.
    pub exclude: Vec<String>,
    /// Diretórios onde procurar modelos pelo nome.
    pub search_paths: Vec<PathBuf>,
}

impl LoadOptions {
    pub fn disable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Resolve o nome de um modelo para um diretório com `config.json`.
    ///
    /// Primeiro tenta `name` como caminho; depois `search_path/name` para
    /// cada diretório configurado, na ordem.
    pub fn resolve_model(&self, name: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(name);
        std::iter::once(direct)
            .chain(self.search_paths.iter().map(|dir| dir.join(name)))
            .find(|candidate| candidate.join(CONFIG_FILE).is_file())
            .ok_or_else(|| {
                ConvenientError::ResourceNotFound(format!(
                    "model '{name}' not found (searched {} location(s))",
                    self.search_paths.len() + 1
                ))
            })
    }
}

/// Serializa `value` como JSON legível em `dir/file`.
pub fn write_json<T: Serialize + ?Sized>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(&path, raw).map_err(|e| ConvenientError::io(&path, e))
}

/// Lê `dir/file` como JSON. Conteúdo inválido é erro de configuração.
pub fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let raw = fs::read_to_string(&path).map_err(|e| ConvenientError::io(&path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| ConvenientError::config(format!("malformed {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_round_trip() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig {
            lang: "de".into(),
            pipeline: vec!["sentencizer".into(), "ner".into()],
        };
        config.write(dir.path()).unwrap();
        assert_eq!(PipelineConfig::read(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_sidecar_exact_format() {
        let dir = tempdir().unwrap();
        PipelineConfig {
            lang: "en".into(),
            pipeline: vec!["ner".into()],
        }
        .write(dir.path())
        .unwrap();

        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"lang": "en", "pipeline": ["ner"]}));
    }

    #[test]
    fn test_sidecar_missing_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(PipelineConfig::read(dir.path()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_sidecar_extra_key_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"lang": "de", "pipeline": [], "version": 2}"#,
        )
        .unwrap();
        assert!(PipelineConfig::read(dir.path()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_sidecar_missing_key_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{"lang": "de"}"#).unwrap();
        assert!(PipelineConfig::read(dir.path()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_sidecar_not_json_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(PipelineConfig::read(dir.path()).unwrap_err().is_configuration());
    }

    #[test]
    fn test_resolve_model_in_search_path() {
        let root = tempdir().unwrap();
        let model_dir = root.path().join("de_demo");
        fs::create_dir(&model_dir).unwrap();
        PipelineConfig {
            lang: "de".into(),
            pipeline: vec![],
        }
        .write(&model_dir)
        .unwrap();

        let options = LoadOptions::default().search_path(root.path());
        assert_eq!(options.resolve_model("de_demo").unwrap(), model_dir);
        assert!(options.resolve_model("fr_demo").unwrap_err().is_not_found());
    }
}
