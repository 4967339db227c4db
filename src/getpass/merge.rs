//! Packaging of several generated files into one: PDF page concatenation and
//! ZIP archives.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("nothing to merge")]
    NoInput,
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Copies objects from one document into another, following references.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            id_map: HashMap::new(),
        }
    }

    /// Copies `source_id` and everything it references; each object once.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the id before recursing so reference cycles terminate.
        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let object = self.source.get_object(source_id)?.clone();
        let remapped = self.remap(object)?;
        self.target.objects.insert(new_id, remapped);
        Ok(new_id)
    }

    /// Copies a page dictionary without its `Parent`, folding in inherited
    /// attributes so the page renders the same under a new parent.
    ///
    /// A page already reached through a reference (a link annotation on an
    /// earlier page) keeps its id and is rewritten in place.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source.get_dictionary(page_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = self.inherited(&page, key) {
                    page.set(key, value);
                }
            }
        }
        page.remove(b"Parent");

        let new_id = match self.id_map.get(&page_id) {
            Some(existing) => *existing,
            None => {
                let id = self.target.add_object(Object::Null);
                self.id_map.insert(page_id, id);
                id
            }
        };
        let remapped = self.remap(Object::Dictionary(page))?;
        self.target.objects.insert(new_id, remapped);
        Ok(new_id)
    }

    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        // Bounded walk; malformed trees can loop.
        for _ in 0..64 {
            let node = self.source.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    fn remap(&mut self, object: Object) -> Result<Object, lopdf::Error> {
        match object {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(items) => Ok(Object::Array(
                items
                    .into_iter()
                    .map(|item| self.remap(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }
}

/// Appends every page of `source` to the end of `target`, in page order.
pub fn append_document(target: &mut Document, source: &Document) -> Result<(), MergeError> {
    let source_pages = source.get_pages();
    if source_pages.is_empty() {
        return Ok(());
    }

    let mut copier = ObjectCopier::new(source, target);
    let mut new_pages = Vec::with_capacity(source_pages.len());
    for page_id in source_pages.values() {
        new_pages.push(copier.copy_page(*page_id)?);
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;

    for page_id in &new_pages {
        if let Ok(page) = target.get_dictionary_mut(*page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let pages = target.get_dictionary_mut(pages_id)?;
    let mut kids = pages.get(b"Kids")?.as_array()?.clone();
    let count = pages.get(b"Count")?.as_i64()?;
    kids.extend(new_pages.iter().map(|id| Object::Reference(*id)));
    pages.set("Kids", Object::Array(kids));
    pages.set("Count", count + new_pages.len() as i64);
    Ok(())
}

/// Concatenates the PDF files in order into `output`.
pub fn merge_pdf_files(inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
    let (first, rest) = inputs.split_first().ok_or(MergeError::NoInput)?;
    let mut merged = Document::load(first)?;
    for path in rest {
        let source = Document::load(path)?;
        append_document(&mut merged, &source)?;
    }
    merged.save(output)?;
    Ok(())
}

/// Writes a deflated ZIP archive of `(entry name, file)` pairs, in order.
pub fn zip_files(entries: &[(String, PathBuf)], output: &Path) -> Result<(), MergeError> {
    if entries.is_empty() {
        return Err(MergeError::NoInput);
    }
    let mut zip = ZipWriter::new(BufWriter::new(File::create(output)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, path) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }
    zip.finish()?.flush()?;
    Ok(())
}
