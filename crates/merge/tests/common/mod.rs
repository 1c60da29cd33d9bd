//! Fixture payloads for the end-to-end merge tests.

#![allow(dead_code)]

use std::io::Cursor;

use billpack_attachments::AttachmentDescriptor;
use billpack_core::AttachmentId;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

/// A PDF with one page per entry; each page's MediaBox width is the entry.
pub fn pdf(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for width in widths {
        let content = Content {
            operations: vec![
                Operation::new("rg", vec![0.into(), 0.into(), 1.into()]),
                Operation::new("re", vec![0.into(), 0.into(), 10.into(), 10.into()]),
                Operation::new("f", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), Object::Integer(*width), 792.into()]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
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

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let raster = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    encode(DynamicImage::ImageRgb8(raster), ImageFormat::Jpeg)
}

/// Half transparent, half opaque green.
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let raster = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([0, 200, 0, 255])
        }
    });
    encode(DynamicImage::ImageRgba8(raster), ImageFormat::Png)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn attachment(id: u64, name: &str, mime_type: &str, payload: Vec<u8>) -> AttachmentDescriptor {
    AttachmentDescriptor::new(AttachmentId::new(id), name)
        .with_mime_type(mime_type)
        .with_payload(payload)
}

pub fn pdf_attachment(id: u64, widths: &[i64]) -> AttachmentDescriptor {
    attachment(id, &format!("doc-{id}.pdf"), "application/pdf", pdf(widths))
}
