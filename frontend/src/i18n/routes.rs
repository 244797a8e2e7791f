use crate::consent::storage::{ConsentStorage, StorageError};

pub const LANGUAGE_STORAGE_KEY: &str = "henq-language";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "de" => Some(Language::De),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::De => "Deutsch",
            Language::En => "English",
        }
    }
}

/// (german slug, english slug) per page.
const PAGE_SLUGS: [(&str, &str); 8] = [
    ("", ""),
    ("unternehmen", "company"),
    ("produkte", "products"),
    ("gruender", "founders"),
    ("news", "news"),
    ("kontakt", "contact"),
    ("impressum", "imprint"),
    ("datenschutz", "privacy"),
];

fn translate_slug(slug: &str, to: Language) -> &str {
    let mapped = match to {
        Language::En => PAGE_SLUGS.iter().find(|(de, _)| *de == slug).map(|(_, en)| *en),
        Language::De => PAGE_SLUGS.iter().find(|(_, en)| *en == slug).map(|(de, _)| *de),
    };
    mapped.unwrap_or(slug)
}

/// The equivalent page in the other language, e.g. `/de/kontakt` -> `/en/contact`.
/// Unknown slugs are carried over unchanged.
pub fn switch_language_path(path: &str, to: Language) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let rest = segments.get(1..).map(|s| s.join("/")).unwrap_or_default();
    let slug = translate_slug(&rest, to);
    if slug.is_empty() {
        format!("/{}", to.code())
    } else {
        format!("/{}/{}", to.code(), slug)
    }
}

pub fn localized_path(path: &str, language: Language) -> String {
    if path.starts_with('/') {
        format!("/{}{}", language.code(), path)
    } else {
        format!("/{}/{}", language.code(), path)
    }
}

/// Language for a visitor landing on `/`. An empty saved value counts as unset.
pub fn detect_language(saved: Option<&str>, browser_language: &str) -> Language {
    match saved.filter(|s| !s.is_empty()) {
        Some(code) => Language::from_code(code).unwrap_or_default(),
        None if browser_language.to_lowercase().starts_with("de") => Language::De,
        None => Language::En,
    }
}

/// Resolves the landing language and remembers it for next time.
pub fn resolve_landing_language<S: ConsentStorage>(
    storage: &S,
    browser_language: &str,
) -> Language {
    let saved = storage.get_item(LANGUAGE_STORAGE_KEY).unwrap_or_else(|e| {
        log::warn!("Could not read language preference: {}", e);
        None
    });
    let language = detect_language(saved.as_deref(), browser_language);
    if let Err(e) = remember_language(storage, language) {
        log::warn!("Could not store language preference: {}", e);
    }
    language
}

pub fn remember_language<S: ConsentStorage>(
    storage: &S,
    language: Language,
) -> Result<(), StorageError> {
    storage.set_item(LANGUAGE_STORAGE_KEY, language.code())
}
