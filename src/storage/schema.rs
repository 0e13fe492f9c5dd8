//! Tantivy schema for file documents and watched-root markers.
//!
//! Text fields are partitioned by language: a document classified as English
//! only ever populates `body_en`/`name_en`, a Polish one `body_pl`/`name_pl`.
//! Each partition is analyzed with its own tokenizer (see `analyzers`).

use tantivy::TantivyError;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};

use super::analyzers;
use crate::language::Language;

/// `doc_kind` value of per-file documents.
pub const KIND_FILE: &str = "file";
/// `doc_kind` value of watched-root markers.
pub const KIND_ROOT: &str = "root";

/// Resolved field handles of the index schema.
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    /// Record discriminator, `file` or `root`.
    pub doc_kind: Field,

    /// Canonical absolute path of an indexed file. Unique key.
    pub full_path: Field,

    /// Canonical path of a watched root (marker records only).
    pub root_path: Field,

    /// Detected language code.
    pub language: Field,

    pub body_en: Field,
    pub name_en: Field,
    pub body_pl: Field,
    pub name_pl: Field,

    /// Timestamp when indexed (UTC seconds).
    pub indexed_at: Field,
}

impl DocumentSchema {
    /// Build the schema for a fresh index.
    pub fn build() -> (Schema, Self) {
        let mut builder = SchemaBuilder::default();

        let doc_kind = builder.add_text_field("doc_kind", STRING | STORED);

        // Keys are untokenized so exact-term and prefix deletes work
        let full_path = builder.add_text_field("full_path", STRING | STORED);
        let root_path = builder.add_text_field("root_path", STRING | STORED);
        let language = builder.add_text_field("language", STRING | STORED);

        let en = Self::text_options(Language::English);
        let body_en = builder.add_text_field(&body_field_name(Language::English), en.clone());
        let name_en = builder.add_text_field(&name_field_name(Language::English), en);

        let pl = Self::text_options(Language::Polish);
        let body_pl = builder.add_text_field(&body_field_name(Language::Polish), pl.clone());
        let name_pl = builder.add_text_field(&name_field_name(Language::Polish), pl);

        let indexed_at = builder.add_u64_field("indexed_at", STORED);

        let schema = builder.build();
        let fields = Self {
            doc_kind,
            full_path,
            root_path,
            language,
            body_en,
            name_en,
            body_pl,
            name_pl,
            indexed_at,
        };
        (schema, fields)
    }

    /// Look up every field by name in an existing schema.
    pub fn resolve(schema: &Schema) -> Result<Self, TantivyError> {
        Ok(Self {
            doc_kind: schema.get_field("doc_kind")?,
            full_path: schema.get_field("full_path")?,
            root_path: schema.get_field("root_path")?,
            language: schema.get_field("language")?,
            body_en: schema.get_field(&body_field_name(Language::English))?,
            name_en: schema.get_field(&name_field_name(Language::English))?,
            body_pl: schema.get_field(&body_field_name(Language::Polish))?,
            name_pl: schema.get_field(&name_field_name(Language::Polish))?,
            indexed_at: schema.get_field("indexed_at")?,
        })
    }

    /// Body field for the given language.
    pub fn body(&self, language: Language) -> Field {
        match language {
            Language::English => self.body_en,
            Language::Polish => self.body_pl,
        }
    }

    /// File-name field for the given language.
    pub fn name(&self, language: Language) -> Field {
        match language {
            Language::English => self.name_en,
            Language::Polish => self.name_pl,
        }
    }

    fn text_options(language: Language) -> TextOptions {
        TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(analyzers::tokenizer_name(language))
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored()
    }
}

pub fn body_field_name(language: Language) -> String {
    format!("body_{}", language.code())
}

pub fn name_field_name(language: Language) -> String {
    format!("name_{}", language.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_build() {
        let (schema, _fields) = DocumentSchema::build();

        assert!(schema.get_field("doc_kind").is_ok());
        assert!(schema.get_field("full_path").is_ok());
        assert!(schema.get_field("root_path").is_ok());
        assert!(schema.get_field("body_en").is_ok());
        assert!(schema.get_field("name_en").is_ok());
        assert!(schema.get_field("body_pl").is_ok());
        assert!(schema.get_field("name_pl").is_ok());

        assert_eq!(schema.fields().count(), 9);
    }

    #[test]
    fn test_language_fields_are_disjoint() {
        let (_schema, fields) = DocumentSchema::build();

        assert_ne!(
            fields.body(Language::English),
            fields.body(Language::Polish)
        );
        assert_ne!(
            fields.name(Language::English),
            fields.name(Language::Polish)
        );
        assert_ne!(
            fields.body(Language::English),
            fields.name(Language::English)
        );
    }

    #[test]
    fn test_text_fields_use_language_tokenizer() {
        let (schema, fields) = DocumentSchema::build();

        for language in Language::ALL {
            let entry = schema.get_field_entry(fields.body(language));
            let tokenizer = match entry.field_type() {
                tantivy::schema::FieldType::Str(options) => options
                    .get_indexing_options()
                    .map(|indexing| indexing.tokenizer().to_string()),
                _ => None,
            };
            assert_eq!(tokenizer.as_deref(), Some(analyzers::tokenizer_name(language)));
        }
    }

    #[test]
    fn test_resolve_rejects_foreign_schema() {
        let mut builder = SchemaBuilder::default();
        builder.add_text_field("content", STRING);
        let foreign = builder.build();

        assert!(DocumentSchema::resolve(&foreign).is_err());
    }
}
