/// Indirect object identifier: (object_number, generation_number).
/// Documents written by this crate always use generation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

impl ObjId {
    /// Identifier with generation 0.
    pub fn new(num: u32) -> Self {
        ObjId(num, 0)
    }
}

/// The subset of PDF object types (PDF 32000-1:2008 Section 7.3)
/// needed to describe a page tree with text content.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored unescaped and without parens.
    LiteralString(String),
    Array(Vec<PdfObject>),
    /// Entries keep insertion order so output is deterministic.
    Dictionary(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn literal_string(s: &str) -> Self {
        PdfObject::LiteralString(s.to_string())
    }

    pub fn reference(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    /// `[0 0 width height]` rectangle, as used for `/MediaBox`.
    pub fn page_rect(width: f64, height: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Integer(0),
            PdfObject::Integer(0),
            PdfObject::Real(width),
            PdfObject::Real(height),
        ])
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(owned_entries(entries))
    }

    pub fn stream(
        dict_entries: Vec<(&str, PdfObject)>,
        data: Vec<u8>,
    ) -> Self {
        PdfObject::Stream {
            dict: owned_entries(dict_entries),
            data,
        }
    }
}

fn owned_entries(
    entries: Vec<(&str, PdfObject)>,
) -> Vec<(String, PdfObject)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_id_new_uses_generation_zero() {
        assert_eq!(ObjId::new(7), ObjId(7, 0));
        assert_ne!(ObjId::new(7), ObjId::new(8));
    }

    #[test]
    fn page_rect_layout() {
        let rect = PdfObject::page_rect(842.0, 595.0);
        assert_eq!(
            rect,
            PdfObject::Array(vec![
                PdfObject::Integer(0),
                PdfObject::Integer(0),
                PdfObject::Real(842.0),
                PdfObject::Real(595.0),
            ])
        );
    }

    #[test]
    fn dict_keeps_insertion_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::reference(ObjId::new(2))),
            ("MediaBox", PdfObject::page_rect(595.0, 842.0)),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                let keys: Vec<&str> =
                    entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["Type", "Parent", "MediaBox"]);
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn stream_owns_dict_and_data() {
        let obj = PdfObject::stream(
            vec![("Filter", PdfObject::name("FlateDecode"))],
            b"BT ET".to_vec(),
        );
        match obj {
            PdfObject::Stream { dict, data } => {
                assert_eq!(dict[0].0, "Filter");
                assert_eq!(data, b"BT ET");
            }
            _ => panic!("expected Stream"),
        }
    }
}
