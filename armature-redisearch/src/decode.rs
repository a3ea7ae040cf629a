//! Search reply decoding.
//!
//! The `FT.SEARCH` reply is a flat array: the total match count followed by
//! one group per returned document. The group layout depends on the query
//! flags, so the decoder reads it from the query rather than guessing:
//!
//! ```text
//! id [score] [payload] [field-value list]
//! ```
//!
//! The score is present with `WITHSCORES`, the payload with `WITHPAYLOADS`,
//! and the field list unless `NOCONTENT` is set.

use crate::{
    document::{Document, FieldValue},
    query::{Query, QueryFlags},
    reply::Reply,
    Result, SearchError,
};

/// Decoded search reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Total number of matches on the server, independent of paging.
    pub total: u64,
    /// Returned documents in server order.
    pub documents: Vec<Document>,
}

impl SearchResult {
    /// Number of returned documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if no document was returned.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids of the returned documents.
    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Per-document reply layout derived from the query flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupLayout {
    score: Option<usize>,
    payload: Option<usize>,
    fields: Option<usize>,
    len: usize,
}

impl GroupLayout {
    fn for_flags(flags: QueryFlags) -> Self {
        let mut len = 1;
        let mut slot = |present: bool| {
            if present {
                len += 1;
                Some(len - 1)
            } else {
                None
            }
        };
        let score = slot(flags.contains(QueryFlags::WITH_SCORES));
        let payload = slot(flags.contains(QueryFlags::WITH_PAYLOADS));
        let fields = slot(!flags.contains(QueryFlags::NO_CONTENT));
        Self {
            score,
            payload,
            fields,
            len,
        }
    }
}

/// Decode an `FT.SEARCH` reply.
///
/// Any mismatch between the reply and the layout the query implies fails the
/// whole call; no partial result is returned.
pub fn decode_search(reply: Reply, query: &Query) -> Result<SearchResult> {
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

    let (head, rest) = items
        .split_first()
        .ok_or_else(|| SearchError::Decode("empty search reply".to_string()))?;

    let total = head
        .as_i64()
        .filter(|t| *t >= 0)
        .ok_or_else(|| SearchError::Decode(format!("invalid total count: {:?}", head)))?
        as u64;

    let layout = GroupLayout::for_flags(query.flags());
    if rest.len() % layout.len != 0 {
        return Err(SearchError::Decode(format!(
            "{} reply elements do not split into groups of {}",
            rest.len(),
            layout.len
        )));
    }

    let documents = rest
        .chunks(layout.len)
        .map(|group| decode_group(group, layout, query))
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResult { total, documents })
}

fn decode_group(group: &[Reply], layout: GroupLayout, query: &Query) -> Result<Document> {
    let id = match &group[0] {
        Reply::Bulk(_) | Reply::Status(_) => group[0].as_text().unwrap_or_default(),
        other => {
            return Err(SearchError::Decode(format!(
                "expected document id, got {}",
                other.kind()
            )));
        }
    };

    // Results carry a score only when it was requested.
    let mut doc = Document::new(id, 0.0);

    if let Some(i) = layout.score {
        doc.score = group[i].as_f64().ok_or_else(|| {
            SearchError::Decode(format!("document `{}`: invalid score {:?}", doc.id, group[i]))
        })?;
    }

    if let Some(i) = layout.payload {
        doc.payload = match &group[i] {
            Reply::Nil => None,
            Reply::Bulk(b) => Some(b.clone()),
            other => {
                return Err(SearchError::Decode(format!(
                    "document `{}`: invalid payload {}",
                    doc.id,
                    other.kind()
                )));
            }
        };
    }

    if let Some(i) = layout.fields {
        decode_fields(&mut doc, &group[i], query)?;
    }

    Ok(doc)
}

fn decode_fields(doc: &mut Document, reply: &Reply, query: &Query) -> Result<()> {
    let pairs = match reply {
        Reply::Array(pairs) => pairs,
        // A document deleted between match and load comes back without fields.
        Reply::Nil => return Ok(()),
        other => {
            return Err(SearchError::Decode(format!(
                "document `{}`: expected field list, got {}",
                doc.id,
                other.kind()
            )));
        }
    };

    if pairs.len() % 2 != 0 {
        return Err(SearchError::Decode(format!(
            "document `{}`: field list has odd length {}",
            doc.id,
            pairs.len()
        )));
    }

    for pair in pairs.chunks(2) {
        let name = pair[0].as_text().ok_or_else(|| {
            SearchError::Decode(format!(
                "document `{}`: invalid field name {}",
                doc.id,
                pair[0].kind()
            ))
        })?;
        if !query.returns_field(&name) {
            continue;
        }
        match &pair[1] {
            Reply::Nil => {}
            value => {
                let text = value.as_text().ok_or_else(|| {
                    SearchError::Decode(format!(
                        "document `{}`: invalid value for `{}`: {}",
                        doc.id,
                        name,
                        value.kind()
                    ))
                })?;
                doc.fields.push((name, FieldValue::Text(text)));
            }
        }
    }

    Ok(())
}
