//! AcroForm field filling using lopdf
//!
//! This module loads a form template, walks the AcroForm field tree and
//! writes `/V` for every field whose name matches the supplied values. The
//! output keeps `NeedAppearances` set so viewers regenerate appearances and
//! the documents can still be edited before printing.
//!
//! Field names may be stored either as raw bytes or as UTF-16BE byte
//! strings with a leading byte-order mark; both spellings of the same name
//! match the same field.

use crate::fields::FieldValues;
use crate::FormError;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::path::Path;
use tracing::debug;

/// Kind of fillable field, from the `/FT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
    Choice,
    Signature,
    Other,
}

/// One fillable field discovered in a template.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Decoded field name.
    pub name: String,
    pub kind: FieldKind,
    /// Current `/V` value, if any.
    pub value: Option<String>,
}

/// A terminal field resolved during the collection pass.
struct FieldSlot {
    id: ObjectId,
    name: String,
    kind: FieldKind,
    /// The "on" appearance state of a checkbox, from `/AP /N`.
    on_state: Option<Vec<u8>>,
}

/// Fills a form template and writes the result to `output`.
///
/// Returns the number of fields that received a value. Names in `values`
/// that do not exist in the template are skipped silently, matching how the
/// original form tooling behaves.
pub fn fill_form<P: AsRef<Path>, Q: AsRef<Path>>(
    template: P,
    output: Q,
    values: &FieldValues,
) -> Result<usize, FormError> {
    let mut doc = Document::load(template)?;
    let slots = collect_fields(&doc)?;

    let wanted: Vec<(String, &str)> = values
        .iter()
        .map(|(name, value)| (normalized(name), value))
        .collect();

    for (name, _) in &wanted {
        if !slots.iter().any(|s| &s.name == name) {
            debug!("template has no field named {name:?}");
        }
    }

    let mut filled = 0;
    for slot in &slots {
        let Some((_, value)) = wanted.iter().find(|(name, _)| name == &slot.name) else {
            continue;
        };
        let dict = doc.get_object_mut(slot.id).and_then(|o| o.as_dict_mut())?;
        match slot.kind {
            FieldKind::Checkbox => {
                let state = if *value == "Off" {
                    b"Off".to_vec()
                } else {
                    slot.on_state
                        .clone()
                        .unwrap_or_else(|| value.as_bytes().to_vec())
                };
                dict.set("V", Object::Name(state.clone()));
                dict.set("AS", Object::Name(state));
            }
            _ => {
                dict.set("V", Object::String(encode_text(value), StringFormat::Literal));
                dict.remove(b"AP");
            }
        }
        filled += 1;
    }

    set_need_appearances(&mut doc)?;
    doc.save(output)?;
    Ok(filled)
}

/// Lists every fillable field of a template with its decoded name, kind and
/// current value.
pub fn list_form_fields<P: AsRef<Path>>(template: P) -> Result<Vec<FormField>, FormError> {
    let doc = Document::load(template)?;
    let slots = collect_fields(&doc)?;

    let mut fields = Vec::with_capacity(slots.len());
    for slot in slots {
        let dict = doc.get_dictionary(slot.id)?;
        let value = match dict.get(b"V") {
            Ok(Object::String(bytes, _)) => Some(decode_string(bytes)),
            Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).to_string()),
            _ => None,
        };
        fields.push(FormField {
            name: slot.name,
            kind: slot.kind,
            value,
        });
    }
    Ok(fields)
}

/// Resolves the AcroForm field array and collects all terminal fields.
fn collect_fields(doc: &Document) -> Result<Vec<FieldSlot>, FormError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(root_id)?;

    let acro_dict = match catalog.get(b"AcroForm") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?,
        Ok(Object::Dictionary(dict)) => dict,
        _ => return Err(FormError::MissingForm),
    };

    let fields = acro_dict
        .get(b"Fields")
        .and_then(|o| o.as_array())
        .map_err(|_| FormError::MissingForm)?;

    let mut slots = Vec::new();
    for field in fields {
        walk_field(doc, field, None, &mut slots);
    }
    Ok(slots)
}

/// Walks one node of the field tree. `/FT` is inheritable, so the resolved
/// kind is threaded down into `Kids`.
fn walk_field(
    doc: &Document,
    field: &Object,
    inherited: Option<FieldKind>,
    slots: &mut Vec<FieldSlot>,
) {
    let Ok(id) = field.as_reference() else {
        return;
    };
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let kind = field_kind(dict).or(inherited);

    if let Ok(kids) = dict.get(b"Kids").and_then(|o| o.as_array()) {
        for kid in kids {
            walk_field(doc, kid, kind, slots);
        }
        return;
    }

    let Ok(name_bytes) = dict.get(b"T").and_then(|o| o.as_str()) else {
        return;
    };
    let kind = kind.unwrap_or(FieldKind::Other);
    let on_state = if kind == FieldKind::Checkbox {
        checkbox_on_state(doc, dict)
    } else {
        None
    };
    slots.push(FieldSlot {
        id,
        name: decode_string(name_bytes),
        kind,
        on_state,
    });
}

fn field_kind(dict: &Dictionary) -> Option<FieldKind> {
    let ft = dict.get(b"FT").and_then(|o| o.as_name()).ok()?;
    Some(if ft == b"Tx" {
        FieldKind::Text
    } else if ft == b"Btn" {
        FieldKind::Checkbox
    } else if ft == b"Ch" {
        FieldKind::Choice
    } else if ft == b"Sig" {
        FieldKind::Signature
    } else {
        FieldKind::Other
    })
}

/// Finds the "on" appearance state of a checkbox: the `/AP /N` key that is
/// not `Off`.
fn checkbox_on_state(doc: &Document, dict: &Dictionary) -> Option<Vec<u8>> {
    let ap = match dict.get(b"AP").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(d) => d,
        _ => return None,
    };
    let normal = match ap.get(b"N").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(d) => d,
        _ => return None,
    };
    normal
        .iter()
        .map(|(key, _)| key)
        .find(|key| key.as_slice() != b"Off")
        .cloned()
}

/// Where the catalog stores its AcroForm dictionary.
enum AcroFormLocation {
    Referenced(ObjectId),
    Inline(ObjectId),
}

fn set_need_appearances(doc: &mut Document) -> Result<(), FormError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let location = {
        let catalog = doc.get_dictionary(root_id)?;
        match catalog.get(b"AcroForm") {
            Ok(Object::Reference(id)) => AcroFormLocation::Referenced(*id),
            Ok(Object::Dictionary(_)) => AcroFormLocation::Inline(root_id),
            _ => return Err(FormError::MissingForm),
        }
    };

    match location {
        AcroFormLocation::Referenced(id) => {
            let acro = doc.get_object_mut(id).and_then(|o| o.as_dict_mut())?;
            acro.set("NeedAppearances", Object::Boolean(true));
        }
        AcroFormLocation::Inline(root_id) => {
            let catalog = doc.get_object_mut(root_id).and_then(|o| o.as_dict_mut())?;
            if let Ok(Object::Dictionary(acro)) = catalog.get_mut(b"AcroForm") {
                acro.set("NeedAppearances", Object::Boolean(true));
            }
        }
    }
    Ok(())
}

/// Decodes a PDF byte string: UTF-16BE when it carries the BOM, UTF-8 when
/// valid, single-byte Latin-1 otherwise.
fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Normalizes a caller-supplied field name for comparison. A name carrying
/// the template's UTF-16 BOM artifact normalizes to the same string as the
/// raw bytes stored in the PDF; plain names pass through unchanged.
pub(crate) fn normalized(name: &str) -> String {
    decode_string(&encode_latin1(name))
}

/// Maps each char to a single byte where the whole string is below U+0100,
/// falling back to UTF-8.
pub(crate) fn encode_latin1(name: &str) -> Vec<u8> {
    if name.chars().all(|c| (c as u32) < 0x100) {
        name.chars().map(|c| c as u8).collect()
    } else {
        name.as_bytes().to_vec()
    }
}

/// Encodes a field value as a PDF text string: single-byte when
/// representable, UTF-16BE with BOM otherwise.
fn encode_text(value: &str) -> Vec<u8> {
    if value.chars().all(|c| (c as u32) < 0x100) {
        value.chars().map(|c| c as u8).collect()
    } else {
        let mut out = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            out.extend_from_slice(&unit.to_be_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldValues, CASILLA_6};
    use lopdf::dictionary;
    use std::path::Path;

    /// Builds a minimal template: one text field `Texto18` and one checkbox
    /// whose `/T` is the UTF-16BE spelling of "Casilla de verificación6"
    /// with on-state `Marcada`.
    fn write_sample_template(path: &Path) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let text_field_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::String(b"Texto18".to_vec(), StringFormat::Literal),
            "Rect" => vec![100.into(), 700.into(), 300.into(), 720.into()],
        });

        let mut ap_n = Dictionary::new();
        ap_n.set("Marcada", Object::Null);
        ap_n.set("Off", Object::Null);
        let mut ap = Dictionary::new();
        ap.set("N", Object::Dictionary(ap_n));

        let mut checkbox = Dictionary::new();
        checkbox.set("Type", Object::Name(b"Annot".to_vec()));
        checkbox.set("Subtype", Object::Name(b"Widget".to_vec()));
        checkbox.set("FT", Object::Name(b"Btn".to_vec()));
        checkbox.set(
            "T",
            Object::String(encode_latin1(CASILLA_6), StringFormat::Literal),
        );
        checkbox.set("AP", Object::Dictionary(ap));
        let checkbox_id = doc.add_object(checkbox);

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Annots" => vec![
                Object::Reference(text_field_id),
                Object::Reference(checkbox_id),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let acroform_id = doc.add_object(dictionary! {
            "Fields" => vec![
                Object::Reference(text_field_id),
                Object::Reference(checkbox_id),
            ],
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => acroform_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_decode_string_utf16() {
        let bytes = encode_latin1(CASILLA_6);
        assert_eq!(bytes[0], 0xFE);
        assert_eq!(bytes[1], 0xFF);
        assert_eq!(decode_string(&bytes), "Casilla de verificación6");
    }

    #[test]
    fn test_decode_string_plain() {
        assert_eq!(decode_string(b"Texto18"), "Texto18");
    }

    #[test]
    fn test_normalized_matches_both_spellings() {
        assert_eq!(normalized(CASILLA_6), "Casilla de verificación6");
        assert_eq!(normalized("Casilla de verificación6"), normalized(CASILLA_6));
        assert_eq!(normalized("Texto18"), "Texto18");
    }

    #[test]
    fn test_encode_text_latin1_and_utf16() {
        assert_eq!(encode_text("48"), b"48".to_vec());
        assert_eq!(encode_text("Cañón"), vec![b'C', b'a', 0xF1, 0xF3, b'n']);
        let wide = encode_text("Ω");
        assert!(wide.starts_with(&[0xFE, 0xFF]));
    }

    #[test]
    fn test_fill_form_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_template(&template);

        let mut values = FieldValues::new();
        values.set("Texto18", "Radio Enlace Sur");
        values.set(CASILLA_6, "Yes");
        values.set("Texto99", "ignored");

        let filled = fill_form(&template, &output, &values).unwrap();
        assert_eq!(filled, 2);

        let fields = list_form_fields(&output).unwrap();
        let text = fields.iter().find(|f| f.name == "Texto18").unwrap();
        assert_eq!(text.kind, FieldKind::Text);
        assert_eq!(text.value.as_deref(), Some("Radio Enlace Sur"));

        // The checkbox is set to its real on-state, not the literal "Yes".
        let checkbox = fields
            .iter()
            .find(|f| f.name == "Casilla de verificación6")
            .unwrap();
        assert_eq!(checkbox.kind, FieldKind::Checkbox);
        assert_eq!(checkbox.value.as_deref(), Some("Marcada"));
    }

    #[test]
    fn test_fill_form_sets_need_appearances() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.pdf");
        let output = dir.path().join("out.pdf");
        write_sample_template(&template);

        fill_form(&template, &output, &FieldValues::new()).unwrap();

        let doc = Document::load(&output).unwrap();
        let root_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let catalog = doc.get_dictionary(root_id).unwrap();
        let acro_id = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
        let acro = doc.get_dictionary(acro_id).unwrap();
        assert!(acro.get(b"NeedAppearances").unwrap().as_bool().unwrap());
    }

    #[test]
    fn test_fill_form_without_acroform() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("plain.pdf");
        let output = dir.path().join("out.pdf");

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(&template).unwrap();

        match fill_form(&template, &output, &FieldValues::new()) {
            Err(FormError::MissingForm) => {}
            other => panic!("expected MissingForm, got {other:?}"),
        }
    }
}
