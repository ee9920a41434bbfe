//! # Erros do pipeline
//!
//! Toda operação da fachada é "tudo ou nada": ou retorna o valor pedido,
//! ou um [`ConvenientError`] descrevendo o motivo. Nada é tentado de novo.

use std::path::PathBuf;

use thiserror::Error;

/// Erros retornados pelo crate.
#[derive(Error, Debug)]
pub enum ConvenientError {
    /// Configuração inválida: regex malformada, limites invertidos, idioma ou
    /// estágio desconhecido, nome duplicado, sidecar malformado.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Modelo ou sidecar inexistente no disco.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvenientError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ConvenientError::Configuration(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvenientError::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` para erros de configuração (útil em testes e chamadores).
    pub fn is_configuration(&self) -> bool {
        matches!(self, ConvenientError::Configuration(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConvenientError::ResourceNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvenientError>;
