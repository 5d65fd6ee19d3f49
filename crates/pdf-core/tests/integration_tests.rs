//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use lopdf::dictionary;
use pdf_core::{Align, PdfDocument, PdfError, StandardFont};
use pretty_assertions::assert_eq;

/// Create a minimal valid PDF with multiple pages for testing
///
/// Every page carries a small existing content stream and, when
/// `shared_resources` is set, a Resources dictionary stored behind a
/// reference the way many producers write it.
fn create_test_pdf_with_pages(page_count: usize, shared_resources: bool) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let existing_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => existing_font },
    });

    let mut page_ids = Vec::new();
    for _ in 0..page_count {
        let contents_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            b"BT /F1 10 Tf 10 10 Td (Template body) Tj ET".to_vec(),
        ));

        let resources: lopdf::Object = if shared_resources {
            resources_id.into()
        } else {
            lopdf::Dictionary::new().into()
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources,
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i32,
            "Kids" => page_ids.into_iter().map(lopdf::Object::from).collect::<Vec<_>>(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = lopdf::Document::load_mem(bytes).expect("Failed to re-open PDF");
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).expect("Missing page content");
    String::from_utf8_lossy(&content).into_owned()
}

fn page_font_base_names(bytes: &[u8], page: u32) -> Vec<(String, String)> {
    let doc = lopdf::Document::load_mem(bytes).expect("Failed to re-open PDF");
    let page_id = doc.get_pages()[&page];
    let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();

    let resources = match page_dict.get(b"Resources").unwrap() {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        obj => obj.as_dict().unwrap(),
    };
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();

    let mut names: Vec<(String, String)> = fonts
        .iter()
        .map(|(name, obj)| {
            let font = doc
                .get_object(obj.as_reference().unwrap())
                .unwrap()
                .as_dict()
                .unwrap();
            let base = font.get(b"BaseFont").unwrap().as_name_str().unwrap();
            (String::from_utf8_lossy(name).into_owned(), base.to_string())
        })
        .collect();
    names.sort();
    names
}

#[test]
fn test_open_save_roundtrip() {
    let pdf_data = create_test_pdf_with_pages(1, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");
    assert_eq!(doc.page_count(), 1);

    let saved_data = doc.to_bytes().expect("Failed to save PDF");

    let doc2 = PdfDocument::open_from_bytes(&saved_data).expect("Failed to re-open PDF");
    assert_eq!(doc2.page_count(), 1);
}

#[test]
fn test_open_invalid_bytes() {
    let result = PdfDocument::open_from_bytes(b"not a pdf at all");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_insert_text_basic() {
    let pdf_data = create_test_pdf_with_pages(1, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).expect("Failed to open PDF");
    doc.set_font(StandardFont::Helvetica, 12.0);
    doc.insert_text("Hello", 1, 100.0, 92.0, Align::Left)
        .expect("Failed to insert text");

    let saved_data = doc.to_bytes().expect("Failed to save PDF");
    let content = page_content(&saved_data, 1);

    // y is measured from the top of a 792pt page
    assert!(content.contains("100.00 700.00 Td"));
    assert!(content.contains("(Hello) Tj"));
    assert!(content.contains("(Template body) Tj"));
}

#[test]
fn test_existing_content_is_isolated() {
    let pdf_data = create_test_pdf_with_pages(1, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    doc.insert_text("Added", 1, 10.0, 10.0, Align::Left).unwrap();
    let content = page_content(&doc.to_bytes().unwrap(), 1);

    let template_pos = content.find("(Template body)").unwrap();
    let restore_pos = content.find("\nQ\n").unwrap();
    let added_pos = content.find("(Added)").unwrap();
    assert!(content.starts_with("q\n"));
    assert!(template_pos < restore_pos && restore_pos < added_pos);
}

#[test]
fn test_fonts_added_to_page_resources() {
    let pdf_data = create_test_pdf_with_pages(1, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    doc.set_font(StandardFont::HelveticaBold, 16.0);
    doc.insert_text("Title", 1, 50.0, 50.0, Align::Left).unwrap();
    doc.set_font(StandardFont::Helvetica, 11.0);
    doc.insert_text("Body", 1, 50.0, 80.0, Align::Left).unwrap();

    let saved = doc.to_bytes().unwrap();
    assert_eq!(
        page_font_base_names(&saved, 1),
        vec![
            ("CF1".to_string(), "Helvetica-Bold".to_string()),
            ("CF2".to_string(), "Helvetica".to_string()),
        ]
    );
}

#[test]
fn test_referenced_resources_are_kept() {
    let pdf_data = create_test_pdf_with_pages(1, true);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    doc.insert_text("Hello", 1, 50.0, 50.0, Align::Left).unwrap();
    let saved = doc.to_bytes().unwrap();

    assert_eq!(
        page_font_base_names(&saved, 1),
        vec![
            ("CF1".to_string(), "Helvetica".to_string()),
            ("F1".to_string(), "Times-Roman".to_string()),
        ]
    );
}

/// Single page whose fonts live on the parent Pages node
fn create_test_pdf_with_inherited_resources() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let existing_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let contents_id = doc.add_object(lopdf::Stream::new(
        dictionary! {},
        b"BT /F1 10 Tf 10 10 Td (Template body) Tj ET".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => contents_id,
    });

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![lopdf::Object::from(page_id)],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => existing_font },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_inherited_resources_are_kept() {
    let pdf_data = create_test_pdf_with_inherited_resources();

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    doc.insert_text("Hello", 1, 50.0, 50.0, Align::Left).unwrap();
    let saved = doc.to_bytes().unwrap();

    assert_eq!(
        page_font_base_names(&saved, 1),
        vec![
            ("CF1".to_string(), "Helvetica".to_string()),
            ("F1".to_string(), "Times-Roman".to_string()),
        ]
    );
    assert!(page_content(&saved, 1).contains("(Template body) Tj"));
}

#[test]
fn test_insert_text_on_later_page() {
    let pdf_data = create_test_pdf_with_pages(3, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    assert_eq!(doc.page_count(), 3);
    doc.insert_text("Page three", 3, 20.0, 20.0, Align::Left)
        .unwrap();
    let saved = doc.to_bytes().unwrap();

    assert!(page_content(&saved, 3).contains("(Page three) Tj"));
    assert!(!page_content(&saved, 1).contains("(Page three)"));
}

#[test]
fn test_insert_text_invalid_page() {
    let pdf_data = create_test_pdf_with_pages(1, false);

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    let result = doc.insert_text("x", 0, 0.0, 0.0, Align::Left);
    assert!(matches!(result, Err(PdfError::InvalidPage(0, 1))));
}

#[test]
fn test_blank_document_roundtrip() {
    let mut doc = PdfDocument::blank_a4();
    doc.insert_text("Société Générale", 1, 50.0, 50.0, Align::Left)
        .unwrap();
    let saved = doc.to_bytes().unwrap();

    let reopened = PdfDocument::open_from_bytes(&saved).unwrap();
    assert_eq!(reopened.page_count(), 1);
    assert!(page_content(&saved, 1).contains("(Soci\\351t\\351 G\\351n\\351rale) Tj"));
}

#[test]
fn test_empty_text_is_skipped() {
    let mut doc = PdfDocument::blank_a4();
    doc.insert_text("", 1, 50.0, 50.0, Align::Left).unwrap();
    let saved = doc.to_bytes().unwrap();

    assert!(!page_content(&saved, 1).contains("Tj"));
}
