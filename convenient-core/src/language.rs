//! # Tabela de Idiomas
//!
//! Cada pipeline pertence a um idioma identificado pelo código ISO 639-1
//! (ex: `"de"`, `"pt"`). O idioma define apenas as exceções do tokenizador:
//! abreviações cujo ponto final faz parte do token (ex: "Dr.", "z.B.").
//!
//! O código `"xx"` é o idioma "multi-língua": sem exceções específicas.

use crate::error::{ConvenientError, Result};

/// Descrição estática de um idioma suportado.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Código ISO (ex: "de").
    pub code: &'static str,
    /// Nome legível (ex: "German").
    pub name: &'static str,
    /// Abreviações (sem o ponto) que mantêm o ponto colado ao token.
    pub abbreviations: &'static [&'static str],
}

impl LanguageSpec {
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word)
    }
}

const GERMAN: LanguageSpec = LanguageSpec {
    code: "de",
    name: "German",
    abbreviations: &[
        "Dr", "Prof", "Hr", "Fr", "Nr", "Str", "bzw", "ca", "usw", "vgl", "evtl", "ggf",
        "inkl", "z.B", "d.h", "u.a", "u.U", "o.ä", "Jh", "Mio", "Mrd", "Tel", "St",
    ],
};

const ENGLISH: LanguageSpec = LanguageSpec {
    code: "en",
    name: "English",
    abbreviations: &[
        "Mr", "Mrs", "Ms", "Dr", "Prof", "Jr", "Sr", "St", "vs", "etc", "Inc", "Ltd", "Co",
        "Corp", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov",
        "Dec",
    ],
};

const SPANISH: LanguageSpec = LanguageSpec {
    code: "es",
    name: "Spanish",
    abbreviations: &["Sr", "Sra", "Srta", "Dr", "Dra", "Ud", "Uds", "etc", "pág", "núm"],
};

const FRENCH: LanguageSpec = LanguageSpec {
    code: "fr",
    name: "French",
    abbreviations: &["M", "Mme", "Mlle", "Dr", "Pr", "etc", "cf", "av", "apr", "env"],
};

const ITALIAN: LanguageSpec = LanguageSpec {
    code: "it",
    name: "Italian",
    abbreviations: &["Sig", "Sigg", "Dott", "Prof", "ecc", "pag", "es"],
};

const DUTCH: LanguageSpec = LanguageSpec {
    code: "nl",
    name: "Dutch",
    abbreviations: &["dhr", "mevr", "dr", "prof", "bijv", "enz", "nl", "ca"],
};

const PORTUGUESE: LanguageSpec = LanguageSpec {
    code: "pt",
    name: "Portuguese",
    abbreviations: &[
        "Dr", "Dra", "Sr", "Sra", "Prof", "Profa", "Gov", "Dep", "Sen", "Min", "Gen", "Cap",
        "Eng", "etc", "pág", "pag", "art", "tel", "av",
    ],
};

const MULTI: LanguageSpec = LanguageSpec {
    code: "xx",
    name: "Multi-language",
    abbreviations: &[],
};

static LANGUAGES: &[&LanguageSpec] = &[
    &GERMAN,
    &ENGLISH,
    &SPANISH,
    &FRENCH,
    &ITALIAN,
    &DUTCH,
    &PORTUGUESE,
    &MULTI,
];

/// Procura um idioma pelo código ISO.
///
/// Códigos desconhecidos são erro de configuração, nunca um idioma "vazio".
pub fn lookup(code: &str) -> Result<&'static LanguageSpec> {
    LANGUAGES
        .iter()
        .copied()
        .find(|lang| lang.code == code)
        .ok_or_else(|| {
            ConvenientError::config(format!(
                "unknown language code '{code}' (known: {})",
                supported_codes().join(", ")
            ))
        })
}

/// Códigos ISO suportados, na ordem da tabela.
pub fn supported_codes() -> Vec<&'static str> {
    LANGUAGES.iter().map(|lang| lang.code).collect()
}
