use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ParseError, ParseErrorKind};
use crate::frontmatter::{extract_frontmatter, FrontMatterError};
use crate::model::{ChapterDocument, ReadTime, Status};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Keys whose absence makes a chapter unloadable, in reporting order.
/// `part` is also satisfied by `partNumber`.
const REQUIRED_KEYS: [&str; 4] = ["title", "part", "chapter", "status"];

/// The recognized front-matter keys. Anything else in the block is ignored.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatterSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reviewer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translator: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    part: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    part_number: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    part_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chapter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimated_read_time: Option<Value>,
}

/// Read a chapter file and parse its front matter.
pub fn load_chapter(path: &Path) -> Result<ChapterDocument, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| ParseError::new(path, ParseErrorKind::Io(err.to_string())))?;
    let doc = parse_chapter(path, &content)?;
    tracing::debug!(
        path = %path.display(),
        part = doc.part,
        chapter = doc.chapter,
        status = %doc.status,
        "loaded chapter"
    );
    Ok(doc)
}

/// Parse chapter content already in memory. `path` is recorded, never read.
pub fn parse_chapter(path: &Path, content: &str) -> Result<ChapterDocument, ParseError> {
    let fail = |kind: ParseErrorKind| ParseError::new(path, kind);

    let fields = extract_frontmatter(content).map_err(|err| {
        fail(match err {
            FrontMatterError::MissingOpening | FrontMatterError::Unterminated => {
                ParseErrorKind::MissingFrontMatter
            }
            FrontMatterError::Empty => ParseErrorKind::EmptyFrontMatter,
            FrontMatterError::Malformed(msg) => ParseErrorKind::Malformed(msg),
        })
    })?;

    if let Some(key) = first_missing_key(&fields) {
        return Err(fail(ParseErrorKind::MissingKey(key)));
    }

    let object: serde_json::Map<String, Value> = fields.into_iter().collect();
    let schema: FrontMatterSchema = serde_json::from_value(Value::Object(object))
        .map_err(|err| fail(ParseErrorKind::Malformed(err.to_string())))?;

    let part_number = schema
        .part_number
        .as_ref()
        .filter(|v| !v.is_null())
        .map(|v| index_value("partNumber", v))
        .transpose()
        .map_err(&fail)?;
    let part = match schema.part.as_ref().filter(|v| !v.is_null()) {
        Some(value) => index_value("part", value).map_err(&fail)?,
        None => part_number.ok_or_else(|| fail(ParseErrorKind::MissingKey("part")))?,
    };
    let chapter = schema
        .chapter
        .as_ref()
        .map(|v| index_value("chapter", v))
        .transpose()
        .map_err(&fail)?
        .ok_or_else(|| fail(ParseErrorKind::MissingKey("chapter")))?;
    let status = schema
        .status
        .as_ref()
        .map(status_value)
        .ok_or_else(|| fail(ParseErrorKind::MissingKey("status")))?;
    let title = text_value("title", schema.title.as_ref())
        .map_err(&fail)?
        .ok_or_else(|| fail(ParseErrorKind::MissingKey("title")))?;

    let date = date_value("date", schema.date.as_ref()).map_err(&fail)?;
    let last_updated = date_value("lastUpdated", schema.last_updated.as_ref()).map_err(&fail)?;

    Ok(ChapterDocument {
        path: path.to_path_buf(),
        title,
        description: text_value("description", schema.description.as_ref()).map_err(&fail)?,
        author: text_value("author", schema.author.as_ref()).map_err(&fail)?,
        reviewer: text_value("reviewer", schema.reviewer.as_ref()).map_err(&fail)?,
        translator: text_value("translator", schema.translator.as_ref()).map_err(&fail)?,
        date,
        last_updated,
        part,
        part_number,
        part_name: text_value("partName", schema.part_name.as_ref()).map_err(&fail)?,
        chapter,
        status,
        estimated_read_time: schema
            .estimated_read_time
            .as_ref()
            .filter(|v| !v.is_null())
            .map(read_time_value),
    })
}

impl ChapterDocument {
    /// Render this document's metadata as a front-matter block
    /// (`---` delimited YAML) that [`parse_chapter`] reads back unchanged.
    pub fn to_front_matter(&self) -> Result<String, serde_yaml::Error> {
        let schema = FrontMatterSchema {
            title: Some(Value::String(self.title.clone())),
            description: self.description.clone().map(Value::String),
            author: self.author.clone().map(Value::String),
            reviewer: self.reviewer.clone().map(Value::String),
            translator: self.translator.clone().map(Value::String),
            date: self.date.map(|d| Value::String(d.format(DATE_FORMAT).to_string())),
            last_updated: self
                .last_updated
                .map(|d| Value::String(d.format(DATE_FORMAT).to_string())),
            part: Some(Value::from(self.part)),
            part_number: self.part_number.map(Value::from),
            part_name: self.part_name.clone().map(Value::String),
            chapter: Some(Value::from(self.chapter)),
            status: Some(Value::String(self.status.as_str().to_string())),
            estimated_read_time: self.estimated_read_time.as_ref().map(|rt| match rt {
                ReadTime::Minutes(m) => Value::from(*m),
                ReadTime::Invalid(raw) => Value::String(raw.clone()),
            }),
        };
        let yaml = serde_yaml::to_string(&schema)?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

fn first_missing_key(fields: &BTreeMap<String, Value>) -> Option<&'static str> {
    let present = |key: &str| fields.get(key).is_some_and(|v| !v.is_null());
    REQUIRED_KEYS.into_iter().find(|key| match *key {
        "part" => !present("part") && !present("partNumber"),
        other => !present(other),
    })
}

/// Part and chapter numbers: non-negative integers, optionally quoted.
fn index_value(key: &'static str, value: &Value) -> Result<u32, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidField {
        key,
        message: format!("expected a non-negative integer, found {value}"),
    };
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(invalid),
        Value::String(s) => parse_digits(s).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Free-text fields. Scalars are taken as written; lists and mappings are not text.
fn text_value(key: &'static str, value: Option<&Value>) -> Result<Option<String>, ParseErrorKind> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_)) => Err(ParseErrorKind::InvalidField {
            key,
            message: "expected text, found a list".to_string(),
        }),
        Some(Value::Object(_)) => Err(ParseErrorKind::InvalidField {
            key,
            message: "expected text, found a mapping".to_string(),
        }),
    }
}

/// Quoted integers: ASCII digits only, so `+5`, `-5` and `5.0` are rejected.
fn parse_digits<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn status_value(value: &Value) -> Status {
    match value {
        Value::String(s) => Status::parse(s),
        other => Status::Unrecognized(other.to_string()),
    }
}

fn read_time_value(value: &Value) -> ReadTime {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(minutes) => ReadTime::Minutes(minutes),
            None => ReadTime::Invalid(n.to_string()),
        },
        Value::String(s) => match parse_digits::<u64>(s) {
            Some(minutes) => ReadTime::Minutes(minutes),
            None => ReadTime::Invalid(s.clone()),
        },
        other => ReadTime::Invalid(other.to_string()),
    }
}

fn date_value(key: &'static str, value: Option<&Value>) -> Result<Option<NaiveDate>, ParseErrorKind> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|err| ParseErrorKind::InvalidField {
                key,
                message: format!("`{s}` is not a YYYY-MM-DD date ({err})"),
            }),
        Some(other) => Err(ParseErrorKind::InvalidField {
            key,
            message: format!("expected a YYYY-MM-DD date, found {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CHAPTER_03: &str = r#"---
title: "A First Look at the C Programming Language"
description: "Variables, types, and control flow for driver authors"
author: "Edson Brandi"
date: "2025-08-01"
status: complete
part: 1
chapter: 3
reviewer: "TBD"
translator: "TBD"
estimatedReadTime: 120
---

# A First Look at C
"#;

    fn path() -> PathBuf {
        PathBuf::from("book/part-1/chapter-03.md")
    }

    #[test]
    fn parses_full_front_matter() {
        let doc = parse_chapter(&path(), CHAPTER_03).expect("parse");
        assert_eq!(doc.title, "A First Look at the C Programming Language");
        assert_eq!(doc.part, 1);
        assert_eq!(doc.part_number, None);
        assert_eq!(doc.chapter, 3);
        assert_eq!(doc.status, Status::Complete);
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Minutes(120)));
        assert_eq!(doc.reviewer.as_deref(), Some("TBD"));
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2025, 8, 1));
        assert_eq!(doc.path, path());
    }

    #[test]
    fn missing_title_is_named() {
        let content = "---\npart: 1\nchapter: 2\nstatus: draft\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("title"));
        assert_eq!(err.path, path());
    }

    #[test]
    fn missing_keys_reported_in_fixed_order() {
        let err = parse_chapter(&path(), "---\ndescription: x\n---\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("title"));

        let err = parse_chapter(&path(), "---\ntitle: x\nstatus: draft\n---\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("part"));

        let err = parse_chapter(&path(), "---\ntitle: x\npart: 1\nstatus: draft\n---\n")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("chapter"));

        let err = parse_chapter(&path(), "---\ntitle: x\npart: 1\nchapter: 1\n---\n")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("status"));
    }

    #[test]
    fn null_required_value_counts_as_missing() {
        let err = parse_chapter(&path(), "---\ntitle:\npart: 1\nchapter: 1\nstatus: draft\n---\n")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingKey("title"));
    }

    #[test]
    fn part_number_stands_in_for_part() {
        let content = "---\ntitle: x\npartNumber: 2\npartName: Kernel\nchapter: 7\nstatus: draft\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.part, 2);
        assert_eq!(doc.part_number, Some(2));
        assert_eq!(doc.part_name.as_deref(), Some("Kernel"));
    }

    #[test]
    fn quoted_numbers_are_accepted() {
        let content = "---\ntitle: x\npart: \"1\"\nchapter: \"4\"\nstatus: draft\nestimatedReadTime: \"480\"\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.chapter, 4);
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Minutes(480)));
    }

    #[test]
    fn non_numeric_chapter_is_invalid_field() {
        let content = "---\ntitle: x\npart: 1\nchapter: three\nstatus: draft\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { key: "chapter", .. }
        ));
    }

    #[test]
    fn unknown_status_and_bad_read_time_are_kept_for_the_builder() {
        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: \"in-review\"\nestimatedReadTime: -5\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.status, Status::Unrecognized("in-review".to_string()));
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Invalid("-5".to_string())));

        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\nestimatedReadTime: 1.5\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Invalid("1.5".to_string())));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\ntags: [a, b]\nweight: 3\n---\n";
        assert!(parse_chapter(&path(), content).is_ok());
    }

    #[test]
    fn list_title_is_invalid_field() {
        let content = "---\ntitle: [a, b]\npart: 1\nchapter: 1\nstatus: draft\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { key: "title", .. }
        ));

        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\nauthor: {name: x}\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { key: "author", .. }
        ));
    }

    #[test]
    fn scalar_text_fields_are_taken_as_written() {
        let content = "---\ntitle: 1984\npart: 1\nchapter: 1\nstatus: draft\nreviewer: 2025\ntranslator: true\npartName: 7\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.title, "1984");
        assert_eq!(doc.reviewer.as_deref(), Some("2025"));
        assert_eq!(doc.translator.as_deref(), Some("true"));
        assert_eq!(doc.part_name.as_deref(), Some("7"));

        let reparsed = parse_chapter(&path(), &doc.to_front_matter().expect("render"))
            .expect("reparse");
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn read_time_beyond_u32_is_still_minutes() {
        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\nestimatedReadTime: 5000000000\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Minutes(5_000_000_000)));

        let content = format!(
            "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\nestimatedReadTime: {}\n---\n",
            u64::MAX
        );
        let doc = parse_chapter(&path(), &content).expect("parse");
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Minutes(u64::MAX)));
    }

    #[test]
    fn signed_quoted_numbers_are_rejected() {
        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\nestimatedReadTime: \"+5\"\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        assert_eq!(doc.estimated_read_time, Some(ReadTime::Invalid("+5".to_string())));

        let content = "---\ntitle: x\npart: 1\nchapter: \"+2\"\nstatus: draft\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { key: "chapter", .. }
        ));
    }

    #[test]
    fn bad_date_is_invalid_field() {
        let content = "---\ntitle: x\npart: 1\nchapter: 1\nstatus: draft\ndate: \"August 2025\"\n---\n";
        let err = parse_chapter(&path(), content).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidField { key: "date", .. }
        ));
    }

    #[test]
    fn missing_front_matter() {
        let err = parse_chapter(&path(), "# Just a heading\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingFrontMatter);

        let err = parse_chapter(&path(), "---\ntitle: x\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingFrontMatter);
    }

    #[test]
    fn front_matter_round_trips() {
        let doc = parse_chapter(&path(), CHAPTER_03).expect("parse");
        let rendered = doc.to_front_matter().expect("render");
        let reparsed = parse_chapter(&path(), &rendered).expect("reparse");
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn front_matter_round_trips_optional_fields() {
        let content = "---\ntitle: \"Kernel: the basics\"\npartNumber: 2\npartName: Drivers\nchapter: 9\nstatus: draft\nlastUpdated: 2025-09-10\n---\n";
        let doc = parse_chapter(&path(), content).expect("parse");
        let reparsed = parse_chapter(&path(), &doc.to_front_matter().expect("render"))
            .expect("reparse");
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn load_chapter_reports_io_errors() {
        let missing = std::env::temp_dir().join("folio-definitely-missing-chapter.md");
        let err = load_chapter(&missing).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Io(_)));
        assert_eq!(err.path, missing);
    }
}
