//! # Índice de Frases
//!
//! Estrutura compartilhada pelo `entity_ruler` e pelo `ner`: um mapa de
//! sequências de tokens (n-gramas) para um valor qualquer, com busca
//! *leftmost-longest* sobre os tokens de um documento.

use std::collections::HashMap;

use crate::tokenizer::Token;

/// Mapa `[token, token, ...] -> V`.
#[derive(Debug, Clone)]
pub struct PhraseIndex<V> {
    entries: HashMap<Vec<String>, V>,
    max_len: usize,
    lowercase: bool,
}

impl<V> PhraseIndex<V> {
    /// `lowercase = true` torna a busca insensível a maiúsculas.
    pub fn new(lowercase: bool) -> Self {
        Self {
            entries: HashMap::new(),
            max_len: 0,
            lowercase,
        }
    }

    fn normalize(&self, word: &str) -> String {
        if self.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        }
    }

    fn key<'a, I>(&self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        words.into_iter().map(|w| self.normalize(w)).collect()
    }

    /// Acesso mutável à entrada de `words`, criando-a com `default` se preciso.
    ///
    /// Retorna `None` para uma frase vazia, que nunca é indexada.
    pub fn entry_or_insert_with<F>(&mut self, words: &[String], default: F) -> Option<&mut V>
    where
        F: FnOnce() -> V,
    {
        if words.is_empty() {
            return None;
        }
        let key = self.key(words.iter().map(String::as_str));
        self.max_len = self.max_len.max(key.len());
        Some(self.entries.entry(key).or_insert_with(default))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<String>, &V)> {
        self.entries.iter()
    }

    /// Percorre `tokens` da esquerda para a direita procurando frases.
    ///
    /// Em cada posição tenta a frase mais longa primeiro. `accept(início,
    /// fim_exclusivo, valor)` decide se a ocorrência é usada; se for, a busca
    /// continua depois dela, senão tenta a próxima frase mais curta.
    pub fn scan<F>(&self, tokens: &[Token], mut accept: F)
    where
        F: FnMut(usize, usize, &V) -> bool,
    {
        if self.entries.is_empty() {
            return;
        }
        let normalized: Vec<String> = tokens.iter().map(|t| self.normalize(&t.text)).collect();
        let mut i = 0;

        'outer: while i < normalized.len() {
            let longest = self.max_len.min(normalized.len() - i);
            for len in (1..=longest).rev() {
                if let Some(value) = self.entries.get(&normalized[i..i + len]) {
                    if accept(i, i + len, value) {
                        i += len;
                        continue 'outer;
                    }
                }
            }
            i += 1;
        }
    }
}
