//! Raster image to single-page PDF conversion.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

use crate::config::ImageOptions;
use crate::error::ImageError;
use crate::pdf::PdfPart;

/// Convert an image payload into the bytes of a one-page PDF.
///
/// Steps: decode, flatten transparency onto white, shrink so neither side
/// exceeds `options.max_dimension` (aspect kept, Lanczos3), then place the
/// raster on a page sized for `options.dpi`.
///
/// # Errors
///
/// [`ImageError::Decode`] for unreadable input, [`ImageError::Encode`] when the
/// page cannot be written. Never panics on bad input.
pub fn normalize_image(payload: &[u8], options: &ImageOptions) -> Result<Vec<u8>, ImageError> {
    let mut document = normalize_to_document(payload, options)?;
    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Same as [`normalize_image`] but hands back the parsed page for assembly.
pub(crate) fn normalize_to_part(payload: &[u8], options: &ImageOptions) -> Result<PdfPart, ImageError> {
    let document = normalize_to_document(payload, options)?;
    PdfPart::from_document(document).map_err(|e| ImageError::Encode(e.to_string()))
}

fn normalize_to_document(payload: &[u8], options: &ImageOptions) -> Result<Document, ImageError> {
    let decoded = image::load_from_memory(payload).map_err(|e| ImageError::Decode(e.to_string()))?;
    let flattened = flatten_onto_white(&decoded);
    let scaled = downscale(flattened, options.max_dimension);
    single_page_document(&scaled, options.points_per_pixel())
}

/// Opaque RGB copy of `image`.
///
/// Palette images reach this point already expanded; one with a transparent
/// index decodes as RGBA and is composited like any other alpha image.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

/// `channel` composited over white with coverage `alpha`, rounded.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let c = u32::from(channel);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

fn downscale(raster: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = raster.dimensions();
    let (target_w, target_h) = fit_within(width, height, max_dimension);
    if (target_w, target_h) == (width, height) {
        return raster;
    }
    imageops::resize(&raster, target_w, target_h, FilterType::Lanczos3)
}

/// Largest size with the same aspect ratio whose sides are at most `max`.
/// Never enlarges.
pub(crate) fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = f64::from(max) / f64::from(width.max(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max);
    (scaled(width), scaled(height))
}

fn single_page_document(raster: &RgbImage, points_per_pixel: f32) -> Result<Document, ImageError> {
    let (width, height) = raster.dimensions();
    let page_w = width as f32 * points_per_pixel;
    let page_h = height as f32 * points_per_pixel;

    let data = deflate(raster.as_raw())?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(width))),
            ("Height", Object::Integer(i64::from(height))),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"FlateDecode".to_vec())),
        ]),
        data,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

    let resources = Dictionary::from_iter([(
        "XObject",
        Object::Dictionary(Dictionary::from_iter([("Im0", Object::Reference(image_id))])),
    )]);

    let page_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]));

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    Ok(doc)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    encoder.finish().map_err(|e| ImageError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, format).unwrap();
        cursor.into_inner()
    }

    fn only_image_stream(doc: &Document) -> &Stream {
        doc.objects
            .values()
            .find_map(|object| match object {
                Object::Stream(stream)
                    if stream
                        .dict
                        .get(b"Subtype")
                        .and_then(Object::as_name)
                        .is_ok_and(|name| name == b"Image") =>
                {
                    Some(stream)
                }
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn fit_within_never_enlarges() {
        assert_eq!(fit_within(640, 480, 2000), (640, 480));
        assert_eq!(fit_within(2000, 2000, 2000), (2000, 2000));
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(4000, 3000, 2000), (2000, 1500));
        assert_eq!(fit_within(600, 2400, 2000), (500, 2000));
        assert_eq!(fit_within(10_000, 1, 2000), (2000, 1));
    }

    #[test]
    fn over_white_blends_towards_white() {
        assert_eq!(over_white(0, 0), 255);
        assert_eq!(over_white(0, 255), 0);
        assert_eq!(over_white(100, 255), 100);
        assert_eq!(over_white(0, 128), 127);
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = normalize_image(b"definitely not an image", &ImageOptions::default()).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn transparent_image_becomes_opaque_bounded_page() {
        // Left half fully transparent, right half opaque red.
        let rgba = RgbaImage::from_fn(2400, 600, |x, _| {
            if x < 1200 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 0, 0, 255])
            }
        });
        let png = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);

        let bytes = normalize_image(&png, &ImageOptions::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let stream = only_image_stream(&doc);
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 2000);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 500);
        assert!(!stream.dict.has(b"SMask"));
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );

        let pixels = stream.decompressed_content().unwrap();
        assert_eq!(pixels.len(), 2000 * 500 * 3);
        // Former transparent corner is now white.
        assert_eq!(&pixels[0..3], &[255u8, 255, 255]);
    }

    #[test]
    fn palette_transparency_is_flattened_onto_white() {
        // GIF is palette-only; the left half is written with the transparent index.
        let rgba = RgbaImage::from_fn(3000, 40, |x, _| {
            if x < 1500 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let gif = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Gif);
        assert_eq!(image::guess_format(&gif).unwrap(), ImageFormat::Gif);

        let bytes = normalize_image(&gif, &ImageOptions::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let stream = only_image_stream(&doc);
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 2000);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 27);
        assert!(!stream.dict.has(b"SMask"));
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );

        let pixels = stream.decompressed_content().unwrap();
        assert_eq!(pixels.len(), 2000 * 27 * 3);
        assert_eq!(&pixels[0..3], &[255u8, 255, 255]);
        let last = &pixels[pixels.len() - 3..];
        assert!(last[0] < 32 && last[2] > 224, "opaque half stays blue: {last:?}");
    }

    #[test]
    fn page_size_follows_dpi() {
        let rgb = RgbImage::from_pixel(200, 100, Rgb([10, 20, 30]));
        let jpeg = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Jpeg);

        let part = normalize_to_part(&jpeg, &ImageOptions::default()).unwrap();
        assert_eq!(part.page_count(), 1);

        let bytes = normalize_image(&jpeg, &ImageOptions::default()).unwrap();
        let widths = crate::pdf::fixtures::page_widths(&bytes);
        // 200 px at 100 DPI = 2 in = 144 pt.
        assert!((widths[0] - 144.0).abs() < 0.01);
    }
}
