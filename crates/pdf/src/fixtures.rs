//! In-memory PDFs for tests.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// Password padding from the standard security handler.
const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// One positioned string drawn with the font at `F1`.
pub fn text_at(x: i64, y: i64, size: i64, text: impl Into<Vec<u8>>) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), size.into()]),
        Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// A row of cells on one baseline, one string per column.
pub fn row_at(y: i64, size: i64, cells: &[(i64, &str)]) -> Vec<Operation> {
    cells
        .iter()
        .flat_map(|(x, text)| text_at(*x, y, size, *text))
        .collect()
}

/// Build a PDF whose pages carry the given content streams, with plain
/// Helvetica as `F1`.
pub fn pdf_with_pages(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    pdf_with_font(
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        },
        pages,
    )
}

/// Same as [`pdf_with_pages`] with a caller-supplied `F1` font dictionary.
pub fn pdf_with_font(font: Dictionary, pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode content")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save pdf");
    buf
}

/// Re-save `pdf` under the standard security handler (40-bit RC4,
/// revision 2) so that it opens with `user_password`.
pub fn encrypt_with_password(pdf: &[u8], user_password: &[u8]) -> Vec<u8> {
    let mut doc = Document::load_mem(pdf).expect("load pdf");
    let file_id = Object::String(b"docsift-fixture!".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let key = get_encryption_key(&doc, user_password, false).expect("file key");
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .expect("encrypt dictionary")
        .set("U", Object::String(rc4(&key, &PAD_BYTES), StringFormat::Hexadecimal));

    // RC4 is symmetric, so the per-object decryption step also seals.
    for (&id, obj) in doc.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        let Ok(sealed) = decrypt_object(&key, id, &*obj) else {
            continue;
        };
        match obj {
            Object::Stream(stream) => stream.set_content(sealed),
            Object::String(content, _) => *content = sealed,
            _ => {}
        }
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save encrypted pdf");
    buf
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, usize::from(j));
    }
    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|&byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[usize::from(i)]);
            s.swap(usize::from(i), usize::from(j));
            byte ^ s[usize::from(s[usize::from(i)].wrapping_add(s[usize::from(j)]))]
        })
        .collect()
}
