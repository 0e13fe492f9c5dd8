//! On-disk index handle and per-call write sessions.

use std::collections::BTreeSet;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use tantivy::collector::{Count, DocSetCollector};
use tantivy::directory::MmapDirectory;
use tantivy::query::{RegexQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{
    Index, IndexReader, IndexSettings, IndexWriter, ReloadPolicy, Searcher, TantivyDocument,
    Term,
};

use super::analyzers;
use super::error::{StorageError, StorageResult};
use super::schema::{DocumentSchema, KIND_FILE, KIND_ROOT};
use crate::language::Language;

/// Writer threads per session. Mutations are small and sequential.
const WRITER_THREADS: usize = 1;

/// A file document ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct FileRecord<'a> {
    /// Canonical absolute path, the document key.
    pub path: &'a str,
    /// File name, indexed alongside the body.
    pub name: &'a str,
    pub body: &'a str,
    pub language: Language,
}

/// Opened tantivy index with registered analyzers and a manual-reload reader.
pub struct IndexStore {
    index: Index,
    reader: IndexReader,
    schema: DocumentSchema,
    path: PathBuf,
    heap_size: usize,
}

impl IndexStore {
    /// Open the index at `path`, creating it when absent.
    pub fn open(path: impl AsRef<Path>, heap_size: usize) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|source| StorageError::CreateDir {
            path: path.clone(),
            source,
        })?;

        let exists = path.join("meta.json").exists();
        let index = if exists {
            Index::open_in_dir(&path)?
        } else {
            let (tantivy_schema, _) = DocumentSchema::build();
            let dir = MmapDirectory::open(&path)?;
            Index::create(dir, tantivy_schema, IndexSettings::default())?
        };

        let schema =
            DocumentSchema::resolve(&index.schema()).map_err(|e| StorageError::SchemaMismatch {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        analyzers::register(&index);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        if exists {
            reader.reload()?;
        }

        crate::debug_event!("storage", "opened", "{}", path.display());

        Ok(Self {
            index,
            reader,
            schema,
            path,
            heap_size,
        })
    }

    pub fn schema(&self) -> &DocumentSchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot searcher as of the last reload.
    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Pick up commits made since the last reload, including other processes'.
    pub fn reload(&self) -> StorageResult<()> {
        self.reader.reload()?;
        Ok(())
    }

    /// Start a write session. Holds the index writer lock until committed or dropped.
    pub fn write_session(&self) -> StorageResult<WriteSession<'_>> {
        let writer = self
            .index
            .writer_with_num_threads(WRITER_THREADS, self.heap_size)?;
        Ok(WriteSession {
            store: self,
            writer,
        })
    }

    /// Paths of every stored root marker.
    pub fn stored_roots(&self) -> StorageResult<BTreeSet<String>> {
        let searcher = self.searcher();
        let query = RegexQuery::from_pattern(".+", self.schema.root_path)?;
        let addresses = searcher.search(&query, &DocSetCollector)?;

        let mut roots = BTreeSet::new();
        for address in addresses {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(root) = doc.get_first(self.schema.root_path).and_then(|v| v.as_str()) {
                roots.insert(root.to_string());
            }
        }
        Ok(roots)
    }

    /// Number of stored file documents.
    pub fn file_count(&self) -> StorageResult<usize> {
        let term = Term::from_field_text(self.schema.doc_kind, KIND_FILE);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        Ok(self.searcher().search(&query, &Count)?)
    }
}

/// One writer, used for a single logical mutation and then committed.
pub struct WriteSession<'a> {
    store: &'a IndexStore,
    writer: IndexWriter<TantivyDocument>,
}

impl WriteSession<'_> {
    /// Replace the document stored under `record.path`.
    pub fn put_file(&mut self, record: &FileRecord<'_>) -> StorageResult<()> {
        let schema = &self.store.schema;
        let key = Term::from_field_text(schema.full_path, record.path);
        self.writer.delete_term(key);

        let mut doc = TantivyDocument::new();
        doc.add_text(schema.doc_kind, KIND_FILE);
        doc.add_text(schema.full_path, record.path);
        doc.add_text(schema.language, record.language.code());
        doc.add_text(schema.body(record.language), record.body);
        doc.add_text(schema.name(record.language), record.name);
        doc.add_u64(schema.indexed_at, utc_timestamp());

        self.writer.add_document(doc)?;
        Ok(())
    }

    /// Write the marker for `root`, replacing any existing one.
    pub fn put_root(&mut self, root: &str) -> StorageResult<()> {
        let schema = &self.store.schema;
        let key = Term::from_field_text(schema.root_path, root);
        self.writer.delete_term(key);

        let mut doc = TantivyDocument::new();
        doc.add_text(schema.doc_kind, KIND_ROOT);
        doc.add_text(schema.root_path, root);
        doc.add_u64(schema.indexed_at, utc_timestamp());

        self.writer.add_document(doc)?;
        Ok(())
    }

    pub fn delete_root(&self, root: &str) {
        let term = Term::from_field_text(self.store.schema.root_path, root);
        self.writer.delete_term(term);
    }

    pub fn delete_file(&self, path: &str) {
        let term = Term::from_field_text(self.store.schema.full_path, path);
        self.writer.delete_term(term);
    }

    /// Delete the file stored under `prefix` and every file beneath it.
    pub fn delete_prefix(&mut self, prefix: &str) -> StorageResult<()> {
        let query = RegexQuery::from_pattern(&prefix_pattern(prefix), self.store.schema.full_path)?;
        self.writer.delete_query(Box::new(query))?;
        Ok(())
    }

    pub fn delete_all(&mut self) -> StorageResult<()> {
        self.writer.delete_all_documents()?;
        Ok(())
    }

    /// Commit and make the changes visible to the store's reader.
    pub fn commit(mut self) -> StorageResult<()> {
        self.writer.commit()?;
        self.store.reload()
    }
}

/// Anchored pattern matching `prefix` itself or any path beneath it.
///
/// A plain wildcard would also match siblings sharing the prefix
/// (`/a/bc` for `/a/b`), so the continuation must start with a separator.
fn prefix_pattern(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches(MAIN_SEPARATOR);
    let separator = regex::escape(&MAIN_SEPARATOR.to_string());
    format!("{}({separator}.*)?", regex::escape(trimmed))
}

fn utc_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEAP: usize = 20_000_000;

    fn matches(prefix: &str, path: &str) -> bool {
        let anchored = format!("^(?:{})$", prefix_pattern(prefix));
        regex::Regex::new(&anchored).unwrap().is_match(path)
    }

    fn file(path: &str, body: &str) -> (String, String) {
        (path.to_string(), body.to_string())
    }

    fn put(store: &IndexStore, files: &[(String, String)]) {
        let mut session = store.write_session().unwrap();
        for (path, body) in files {
            session
                .put_file(&FileRecord {
                    path,
                    name: path.rsplit('/').next().unwrap(),
                    body,
                    language: Language::English,
                })
                .unwrap();
        }
        session.commit().unwrap();
    }

    #[test]
    fn test_prefix_pattern_respects_separator() {
        assert!(matches("/a/b", "/a/b"));
        assert!(matches("/a/b", "/a/b/c.txt"));
        assert!(matches("/a/b/", "/a/b/c/d.txt"));
        assert!(!matches("/a/b", "/a/bc"));
        assert!(!matches("/a/b", "/a/bc/d.txt"));
    }

    #[test]
    fn test_prefix_pattern_escapes_metacharacters() {
        assert!(matches("/tmp/a+b (1)", "/tmp/a+b (1)/x"));
        assert!(!matches("/tmp/a.b", "/tmp/axb"));
    }

    #[test]
    fn test_open_creates_and_reopens() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();
            put(&store, &[file("/a/one.txt", "first document")]);
        }

        let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();
        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_put_file_replaces_by_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();

        put(&store, &[file("/a/one.txt", "first")]);
        put(&store, &[file("/a/one.txt", "second")]);

        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_roots_upsert_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();

        let mut session = store.write_session().unwrap();
        session.put_root("/data/docs").unwrap();
        session.put_root("/data/docs").unwrap();
        session.put_root("/data/notes").unwrap();
        session.commit().unwrap();

        let roots: Vec<_> = store.stored_roots().unwrap().into_iter().collect();
        assert_eq!(roots, vec!["/data/docs", "/data/notes"]);
        assert_eq!(store.file_count().unwrap(), 0);

        let mut session = store.write_session().unwrap();
        session.delete_root("/data/docs");
        session.commit().unwrap();

        let roots: Vec<_> = store.stored_roots().unwrap().into_iter().collect();
        assert_eq!(roots, vec!["/data/notes"]);
    }

    #[test]
    fn test_delete_prefix_keeps_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();

        put(
            &store,
            &[
                file("/a/b/x.txt", "inside"),
                file("/a/b/deep/y.txt", "nested"),
                file("/a/bc/z.txt", "sibling"),
            ],
        );

        let mut session = store.write_session().unwrap();
        session.delete_prefix("/a/b").unwrap();
        session.commit().unwrap();

        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_delete_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::open(temp_dir.path(), HEAP).unwrap();

        put(&store, &[file("/a/x.txt", "one"), file("/a/y.txt", "two")]);
        let mut session = store.write_session().unwrap();
        session.put_root("/a").unwrap();
        session.commit().unwrap();

        let mut session = store.write_session().unwrap();
        session.delete_all().unwrap();
        session.commit().unwrap();

        assert_eq!(store.file_count().unwrap(), 0);
        assert!(store.stored_roots().unwrap().is_empty());
    }
}
