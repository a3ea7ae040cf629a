//! `FT.INFO` decoding.

use serde::Serialize;

use crate::{
    reply::Reply,
    schema::{
        Field, FieldOptions, GeoFieldOptions, IndexOptions, NumericFieldOptions, Schema,
        TagFieldOptions, TextFieldOptions,
    },
    Result, SearchError,
};

/// Index statistics and schema as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Schema reconstructed from the reply.
    pub schema: Schema,
    /// Number of documents.
    pub doc_count: u64,
    /// Number of inverted index records.
    pub record_count: u64,
    /// Number of distinct terms.
    pub term_count: u64,
    /// Highest internal document id.
    pub max_doc_id: u64,
    /// Inverted index size in MB.
    pub inverted_index_size_mb: f64,
    /// Offset vector size in MB.
    pub offset_vector_size_mb: f64,
    /// Document table size in MB.
    pub doc_table_size_mb: f64,
    /// Key table size in MB.
    pub key_table_size_mb: f64,
    /// Average records per document.
    pub records_per_doc_avg: f64,
    /// Average bytes per record.
    pub bytes_per_record_avg: f64,
    /// Average offsets per term.
    pub offsets_per_term_avg: f64,
    /// Average offset bits per record.
    pub offset_bits_per_record_avg: f64,
}

/// Decode an `FT.INFO` reply. Unknown keys are skipped.
pub fn decode_info(reply: Reply) -> Result<IndexInfo> {
    let items = match reply {
        Reply::Array(items) => items,
        Reply::Error(msg) => return Err(SearchError::Server(msg)),
        other => {
            return Err(SearchError::Decode(format!(
                "expected array reply, got {}",
                other.kind()
            )));
        }
    };
    if items.len() % 2 != 0 {
        return Err(SearchError::Decode(format!(
            "info reply has odd length {}",
            items.len()
        )));
    }

    let mut info = IndexInfo::default();
    for pair in items.chunks(2) {
        let Some(key) = pair[0].as_text() else {
            continue;
        };
        let value = &pair[1];
        let count = || value.as_i64().map(|v| v.max(0) as u64).unwrap_or_default();
        let float = || value.as_f64().unwrap_or_default();

        match key.as_str() {
            "index_name" => info.name = value.as_text().unwrap_or_default(),
            "index_options" => info.schema.options = decode_index_options(value),
            "fields" | "attributes" => {
                for field in value.as_array().unwrap_or_default() {
                    if let Some(field) = decode_field(field) {
                        info.schema.fields.push(field);
                    }
                }
            }
            "num_docs" => info.doc_count = count(),
            "num_records" => info.record_count = count(),
            "num_terms" => info.term_count = count(),
            "max_doc_id" => info.max_doc_id = count(),
            "inverted_sz_mb" => info.inverted_index_size_mb = float(),
            "offset_vectors_sz_mb" => info.offset_vector_size_mb = float(),
            "doc_table_size_mb" => info.doc_table_size_mb = float(),
            "key_table_size_mb" => info.key_table_size_mb = float(),
            "records_per_doc_avg" => info.records_per_doc_avg = float(),
            "bytes_per_record_avg" => info.bytes_per_record_avg = float(),
            "offsets_per_term_avg" => info.offsets_per_term_avg = float(),
            "offset_bits_per_record_avg" => info.offset_bits_per_record_avg = float(),
            _ => {}
        }
    }

    Ok(info)
}

fn decode_index_options(value: &Reply) -> IndexOptions {
    let mut opts = IndexOptions::default();
    for flag in value.as_array().unwrap_or_default() {
        match flag.as_text().as_deref() {
            Some("NOFIELDS") => opts.no_field_flags = true,
            Some("NOFREQS") => opts.no_frequencies = true,
            Some("NOOFFSETS") => opts.no_offset_vectors = true,
            _ => {}
        }
    }
    opts
}

/// Field entries look like `[name, type, TEXT, WEIGHT, 1, SORTABLE]`, or with
/// newer servers `[identifier, path, attribute, name, type, TEXT, ...]`.
fn decode_field(entry: &Reply) -> Option<Field> {
    let tokens: Vec<String> = entry.as_array()?.iter().filter_map(Reply::as_text).collect();

    let value_after = |key: &str| {
        tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case(key))
            .and_then(|i| tokens.get(i + 1))
    };
    let has = |flag: &str| tokens.iter().any(|t| t.eq_ignore_ascii_case(flag));

    let name = value_after("attribute").or_else(|| tokens.first())?.clone();
    let sortable = has("SORTABLE");
    let no_index = has("NOINDEX");

    let options = match value_after("type")?.to_ascii_uppercase().as_str() {
        "TEXT" => FieldOptions::Text(TextFieldOptions {
            weight: value_after("WEIGHT")
                .and_then(|w| w.parse().ok())
                .unwrap_or(1.0),
            sortable,
            no_index,
        }),
        "NUMERIC" => FieldOptions::Numeric(NumericFieldOptions { sortable, no_index }),
        "GEO" => FieldOptions::Geo(GeoFieldOptions { no_index }),
        "TAG" => FieldOptions::Tag(TagFieldOptions {
            separator: value_after("SEPARATOR").and_then(|s| s.chars().next()),
            no_index,
        }),
        _ => return None,
    };

    Some(Field { name, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn list(items: &[&str]) -> Reply {
        Reply::Array(items.iter().map(|s| Reply::bulk(*s)).collect())
    }

    #[test]
    fn test_decode_info() {
        let reply = Reply::Array(vec![
            Reply::bulk("index_name"),
            Reply::bulk("testung"),
            Reply::bulk("index_options"),
            list(&["NOFREQS"]),
            Reply::bulk("fields"),
            Reply::Array(vec![
                list(&["foo", "type", "TEXT", "WEIGHT", "1", "SORTABLE"]),
                list(&["bar", "type", "NUMERIC", "SORTABLE"]),
                list(&["tags", "type", "TAG", "SEPARATOR", ";"]),
            ]),
            Reply::bulk("num_docs"),
            Reply::bulk("100"),
            Reply::bulk("max_doc_id"),
            Reply::Integer(100),
            Reply::bulk("num_terms"),
            Reply::bulk("2"),
            Reply::bulk("num_records"),
            Reply::bulk("200"),
            Reply::bulk("inverted_sz_mb"),
            Reply::bulk("0.0012"),
            Reply::bulk("gc_stats"),
            Reply::Array(vec![]),
        ]);

        let info = decode_info(reply).unwrap();
        assert_eq!(info.name, "testung");
        assert_eq!(info.doc_count, 100);
        assert_eq!(info.max_doc_id, 100);
        assert_eq!(info.term_count, 2);
        assert_eq!(info.record_count, 200);
        assert_eq!(info.inverted_index_size_mb, 0.0012);
        assert!(info.schema.options.no_frequencies);

        let kinds: Vec<FieldKind> = info.schema.fields.iter().map(Field::kind).collect();
        assert_eq!(kinds, vec![FieldKind::Text, FieldKind::Numeric, FieldKind::Tag]);
        assert_eq!(
            info.schema.fields[0].options,
            FieldOptions::Text(TextFieldOptions {
                weight: 1.0,
                sortable: true,
                no_index: false,
            })
        );
        assert_eq!(
            info.schema.fields[2].options,
            FieldOptions::Tag(TagFieldOptions {
                separator: Some(';'),
                no_index: false,
            })
        );
    }

    #[test]
    fn test_decode_attribute_style_field() {
        let field = decode_field(&list(&[
            "identifier", "f1", "attribute", "f1", "type", "TEXT", "WEIGHT", "2", "SORTABLE",
            "NOINDEX",
        ]))
        .unwrap();
        assert_eq!(field.name, "f1");
        assert_eq!(
            field.options,
            FieldOptions::Text(TextFieldOptions {
                weight: 2.0,
                sortable: true,
                no_index: true,
            })
        );
    }

    #[test]
    fn test_decode_info_errors() {
        assert!(matches!(
            decode_info(Reply::Error("Unknown Index name".into())),
            Err(SearchError::Server(_))
        ));
        assert!(decode_info(list(&["index_name"])).is_err());
    }
}
