//! Command encoding.
//!
//! Turns schemas, documents, and queries into the ordered argument lists of
//! the `FT.*` commands. Encoding is pure: no I/O and no shared state.

use std::fmt;

use crate::{
    document::{format_float, Document, IndexingOptions},
    query::{Query, QueryFlags},
    schema::{FieldOptions, Schema, Stopwords},
    Result, SearchError,
};

/// A named command with its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: &'static str,
    args: Vec<Vec<u8>>,
}

impl Command {
    /// Create a command without arguments.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.push(arg);
        self
    }

    fn push(&mut self, arg: impl AsRef<[u8]>) {
        self.args.push(arg.as_ref().to_vec());
    }

    fn push_counted(&mut self, keyword: &str, items: &[String]) {
        self.push(keyword);
        self.push(items.len().to_string());
        for item in items {
            self.push(item);
        }
    }

    /// Command name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw arguments.
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// Arguments as text. Non UTF-8 bytes (payloads) are replaced.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect()
    }

    /// Build the redis command.
    pub fn to_redis(&self) -> redis::Cmd {
        let mut cmd = redis::cmd(self.name);
        for arg in &self.args {
            cmd.arg(arg.as_slice());
        }
        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for arg in self.args_lossy() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn check_index_name(index: &str) -> Result<()> {
    if index.trim().is_empty() {
        return Err(SearchError::Encoding("index name is empty".to_string()));
    }
    Ok(())
}

/// Encode `FT.CREATE`.
pub fn encode_create(index: &str, schema: &Schema) -> Result<Command> {
    check_index_name(index)?;
    schema.validate()?;

    let opts = &schema.options;
    let mut cmd = Command::new("FT.CREATE").arg(index);

    if let Some(language) = &opts.language {
        cmd.push("LANGUAGE");
        cmd.push(language);
    }
    if let Some(score) = opts.score {
        cmd.push("SCORE");
        cmd.push(format_float(score)?);
    }
    if opts.no_offset_vectors {
        cmd.push("NOOFFSETS");
    }
    if opts.no_field_flags {
        cmd.push("NOFIELDS");
    }
    if opts.no_frequencies {
        cmd.push("NOFREQS");
    }
    match &opts.stopwords {
        Stopwords::Default => {}
        Stopwords::Disabled => cmd.push_counted("STOPWORDS", &[]),
        Stopwords::Custom(words) => cmd.push_counted("STOPWORDS", words),
    }

    cmd.push("SCHEMA");
    for field in &schema.fields {
        cmd.push(&field.name);
        cmd.push(field.kind().keyword());
        match field.options {
            FieldOptions::Text(o) => {
                if o.weight != 1.0 {
                    cmd.push("WEIGHT");
                    cmd.push(format_float(o.weight)?);
                }
                if o.sortable {
                    cmd.push("SORTABLE");
                }
                if o.no_index {
                    cmd.push("NOINDEX");
                }
            }
            FieldOptions::Numeric(o) => {
                if o.sortable {
                    cmd.push("SORTABLE");
                }
                if o.no_index {
                    cmd.push("NOINDEX");
                }
            }
            FieldOptions::Tag(o) => {
                if let Some(sep) = o.separator {
                    cmd.push("SEPARATOR");
                    cmd.push(sep.to_string());
                }
                if o.no_index {
                    cmd.push("NOINDEX");
                }
            }
            FieldOptions::Geo(o) => {
                if o.no_index {
                    cmd.push("NOINDEX");
                }
            }
        }
    }

    Ok(cmd)
}

/// Encode `FT.DROP`.
pub fn encode_drop(index: &str) -> Result<Command> {
    check_index_name(index)?;
    Ok(Command::new("FT.DROP").arg(index))
}

/// Encode `FT.INFO`.
pub fn encode_info(index: &str) -> Result<Command> {
    check_index_name(index)?;
    Ok(Command::new("FT.INFO").arg(index))
}

/// Encode `FT.ADD` for one document.
pub fn encode_add(index: &str, doc: &Document, opts: &IndexingOptions) -> Result<Command> {
    check_index_name(index)?;
    if doc.id.is_empty() {
        return Err(SearchError::Encoding("document id is empty".to_string()));
    }
    if !(0.0..=1.0).contains(&doc.score) {
        return Err(SearchError::Encoding(format!(
            "document `{}`: score must be within [0, 1], got {}",
            doc.id, doc.score
        )));
    }

    let mut cmd = Command::new("FT.ADD")
        .arg(index)
        .arg(&doc.id)
        .arg(format_float(doc.score)?);

    if opts.no_save {
        cmd.push("NOSAVE");
    }
    if opts.replace || opts.partial {
        cmd.push("REPLACE");
        if opts.partial {
            cmd.push("PARTIAL");
        }
    }
    if let Some(language) = &opts.language {
        cmd.push("LANGUAGE");
        cmd.push(language);
    }
    if let Some(payload) = &doc.payload {
        cmd.push("PAYLOAD");
        cmd.push(payload);
    }

    cmd.push("FIELDS");
    for (name, value) in &doc.fields {
        if name.is_empty() {
            return Err(SearchError::Encoding(format!(
                "document `{}`: field name is empty",
                doc.id
            )));
        }
        cmd.push(name);
        cmd.push(value.to_arg()?);
    }

    Ok(cmd)
}

/// Encode `FT.SEARCH`.
pub fn encode_search(index: &str, query: &Query) -> Result<Command> {
    check_index_name(index)?;
    let mut cmd = Command::new("FT.SEARCH").arg(index);
    push_query(&mut cmd, query)?;
    Ok(cmd)
}

/// Encode `FT.EXPLAIN`.
pub fn encode_explain(index: &str, query: &Query) -> Result<Command> {
    check_index_name(index)?;
    let mut cmd = Command::new("FT.EXPLAIN").arg(index);
    push_query(&mut cmd, query)?;
    Ok(cmd)
}

/// Option blocks always go out in the same order, whatever order the
/// setters were called in.
fn push_query(cmd: &mut Command, q: &Query) -> Result<()> {
    if q.raw.trim().is_empty() {
        return Err(SearchError::Encoding("query expression is empty".to_string()));
    }
    cmd.push(&q.raw);

    const FLAGS: [(QueryFlags, &str); 6] = [
        (QueryFlags::VERBATIM, "VERBATIM"),
        (QueryFlags::NO_CONTENT, "NOCONTENT"),
        (QueryFlags::NO_STOPWORDS, "NOSTOPWORDS"),
        (QueryFlags::WITH_SCORES, "WITHSCORES"),
        (QueryFlags::WITH_PAYLOADS, "WITHPAYLOADS"),
        (QueryFlags::IN_ORDER, "INORDER"),
    ];
    for (flag, keyword) in FLAGS {
        if q.flags.contains(flag) {
            cmd.push(keyword);
        }
    }

    cmd.push("LIMIT");
    cmd.push(q.paging.offset.to_string());
    cmd.push(q.paging.num.to_string());

    if !q.in_keys.is_empty() {
        cmd.push_counted("INKEYS", &q.in_keys);
    }
    if let Some(slop) = q.slop {
        cmd.push("SLOP");
        cmd.push(slop.to_string());
    }
    if let Some(scorer) = &q.scorer {
        cmd.push("SCORER");
        cmd.push(scorer);
    }
    if let Some(expander) = &q.expander {
        cmd.push("EXPANDER");
        cmd.push(expander);
    }

    if !q.return_fields.is_empty() {
        cmd.push_counted("RETURN", &q.return_fields);
    }

    if let Some(sort) = &q.sort_by {
        cmd.push("SORTBY");
        cmd.push(&sort.field);
        cmd.push(if sort.ascending { "ASC" } else { "DESC" });
    }

    if let Some(hl) = &q.highlight
        && let Some(fields) = projected(q, &hl.fields)
    {
        cmd.push("HIGHLIGHT");
        if !fields.is_empty() {
            cmd.push_counted("FIELDS", &fields);
        }
        cmd.push("TAGS");
        cmd.push(&hl.tags.0);
        cmd.push(&hl.tags.1);
    }

    if let Some(sum) = &q.summarize
        && let Some(fields) = projected(q, &sum.fields)
    {
        cmd.push("SUMMARIZE");
        if !fields.is_empty() {
            cmd.push_counted("FIELDS", &fields);
        }
        if sum.num_fragments > 0 {
            cmd.push("FRAGS");
            cmd.push(sum.num_fragments.to_string());
        }
        if sum.fragment_len > 0 {
            cmd.push("LEN");
            cmd.push(sum.fragment_len.to_string());
        }
        if !sum.separator.is_empty() {
            cmd.push("SEPARATOR");
            cmd.push(&sum.separator);
        }
    }

    if let Some(language) = &q.language {
        cmd.push("LANGUAGE");
        cmd.push(language);
    }

    Ok(())
}

/// Narrow highlight/summarize fields to the returned ones.
///
/// `None` means nothing is left to act on and the block is dropped. An empty
/// list means "every returned field".
fn projected(q: &Query, fields: &[String]) -> Option<Vec<String>> {
    if q.flags.contains(QueryFlags::NO_CONTENT) {
        return None;
    }
    if fields.is_empty() || q.return_fields.is_empty() {
        return Some(fields.to_vec());
    }
    let kept: Vec<String> = fields
        .iter()
        .filter(|f| q.return_fields.contains(f))
        .cloned()
        .collect();
    if kept.is_empty() { None } else { Some(kept) }
}
