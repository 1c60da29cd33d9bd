//! PDF decoding and order-preserving concatenation (lopdf).

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{AssemblyError, PdfError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Node types rebuilt (or dropped) when documents are concatenated.
const STRUCTURAL_TYPES: [&[u8]; 5] = [b"Catalog", b"Pages", b"Page", b"Outlines", b"Outline"];

/// Guards against cyclic `Parent` chains in damaged files.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Header version when every part declares something older or unreadable.
const MIN_OUTPUT_VERSION: &str = "1.4";

/// A parsed, non-empty, unencrypted PDF ready to be appended.
#[derive(Debug, Clone)]
pub struct PdfPart(Document);

impl PdfPart {
    pub fn page_count(&self) -> usize {
        self.0.get_pages().len()
    }

    pub(crate) fn from_document(document: Document) -> Result<Self, PdfError> {
        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(PdfError::Encrypted);
        }
        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }
        Ok(Self(document))
    }
}

/// Parse a PDF payload.
pub fn decode(bytes: &[u8]) -> Result<PdfPart, PdfError> {
    let document = Document::load_mem(bytes)?;
    PdfPart::from_document(document)
}

/// Number of pages in a PDF payload.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfError> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

/// Accumulator for one merge: the base document first, then each part in push
/// order.
///
/// The base is kept as raw bytes and only parsed in [`Assembly::finish`], so a
/// request whose attachments were all skipped never touches it.
#[derive(Debug)]
pub struct Assembly<'a> {
    base: &'a [u8],
    parts: Vec<PdfPart>,
}

impl<'a> Assembly<'a> {
    pub fn seeded(base: &'a [u8]) -> Self {
        Self {
            base,
            parts: Vec::new(),
        }
    }

    pub fn push(&mut self, part: PdfPart) {
        self.parts.push(part);
    }

    /// Number of entries after the base.
    pub fn appended(&self) -> usize {
        self.parts.len()
    }

    pub fn finish(self) -> Result<Vec<u8>, AssemblyError> {
        let base = decode(self.base).map_err(AssemblyError::BaseDocument)?;
        concatenate(std::iter::once(base).chain(self.parts))
    }
}

/// Concatenate documents into one, pages in iteration order and, within a
/// document, in page order.
///
/// The output declares the highest header version among the parts.
pub fn concatenate(parts: impl IntoIterator<Item = PdfPart>) -> Result<Vec<u8>, AssemblyError> {
    let mut output = Document::with_version(MIN_OUTPUT_VERSION);
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut next_id: u32 = 1;

    for PdfPart(mut doc) in parts {
        if version_key(&doc.version) > version_key(&output.version) {
            output.version = doc.version.clone();
        }
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, flatten_page(&doc, page_id)?));
        }

        for (object_id, object) in doc.objects {
            if !is_structural(&object) {
                output.objects.insert(object_id, object);
            }
        }
    }

    if pages.is_empty() {
        return Err(AssemblyError::NoPages);
    }

    output.max_id = next_id - 1;
    let pages_id = output.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_id));
        output.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    let pages_dict = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    output.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", Object::Reference(catalog_id));
    output.compress();

    let mut bytes = Vec::new();
    output
        .save_to(&mut bytes)
        .map_err(|e| AssemblyError::Write(e.to_string()))?;
    Ok(bytes)
}

/// Copy a page dictionary with every inheritable attribute made explicit.
fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, AssemblyError> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|_| AssemblyError::MalformedPage { page_id })?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_PAGE_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_PAGE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

/// `(major, minor)` of a header version; unreadable components count as 0.
fn version_key(version: &str) -> (u32, u32) {
    let mut components = version.trim().splitn(2, '.');
    let mut next = || {
        components
            .next()
            .and_then(|component| component.trim().parse::<u32>().ok())
            .unwrap_or(0)
    };
    let major = next();
    (major, next())
}

fn is_structural(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    dict.get(b"Type")
        .and_then(Object::as_name)
        .is_ok_and(|name| STRUCTURAL_TYPES.iter().any(|t| *t == name))
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built PDFs whose page widths double as page labels.

    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream};

    /// One PDF with a page per width; MediaBox is `[0 0 width 792]`.
    pub fn pdf_with_page_widths(widths: &[i64]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        // Resources live on the page tree root so merging must carry them down.
        let resources = Dictionary::from_iter([(
            "Font",
            Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
        )]);

        let mut kids = Vec::new();
        for width in widths {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![10.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("w{width}"))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().unwrap_or_default(),
            ));
            let page_id = doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), Object::Integer(*width), 792.into()]),
                ),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
                ("Resources", Object::Dictionary(resources)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// MediaBox width of every page, in page order.
    pub fn page_widths(bytes: &[u8]) -> Vec<f64> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .into_values()
            .map(|page_id| {
                let page = doc.get_dictionary(page_id).unwrap();
                let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
                match &media_box[2] {
                    Object::Integer(v) => *v as f64,
                    Object::Real(v) => f64::from(*v),
                    other => panic!("unexpected MediaBox entry {other:?}"),
                }
            })
            .collect()
    }
}
