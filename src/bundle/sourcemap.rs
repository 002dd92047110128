//! Source map (revision 3) generation.
//!
//! Only what the bundle needs: a single source, mappings as base64 VLQ,
//! serialized with `serde_json` either to a standalone `.map` file or to an
//! inline `data:` URL.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// One mapping from a generated position to an original position.
///
/// Lines and columns are zero-based; columns count UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Segment {
    pub generated_line: u32,
    pub generated_column: u32,
    pub original_line: u32,
    pub original_column: u32,
}

/// Collects segments for one generated file with one source.
#[derive(Debug)]
pub struct SourceMapBuilder {
    file: String,
    source: String,
    source_content: Option<String>,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapJson<'a> {
    version: u8,
    file: &'a str,
    sources: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_content: Option<[&'a str; 1]>,
    names: [&'a str; 0],
    mappings: String,
}

impl SourceMapBuilder {
    /// `source` is the path of the original file as seen from the generated file.
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            source_content: None,
            segments: Vec::new(),
        }
    }

    /// Embed the original text as `sourcesContent`.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.source_content = Some(content.into());
        self
    }

    pub fn add(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        original_line: u32,
        original_column: u32,
    ) {
        self.segments.push(Segment {
            generated_line,
            generated_column,
            original_line,
            original_column,
        });
    }

    /// Encoded `mappings` field.
    pub fn mappings(&self) -> String {
        let mut segments = self.segments.clone();
        segments.sort();
        segments.dedup_by(|b, a| {
            a.generated_line == b.generated_line && a.generated_column == b.generated_column
        });

        let mut out = String::new();
        let mut line = 0;
        let mut prev_column = 0i64;
        let mut prev_original_line = 0i64;
        let mut prev_original_column = 0i64;
        let mut first_in_line = true;

        for seg in &segments {
            while line < seg.generated_line {
                out.push(';');
                line += 1;
                prev_column = 0;
                first_in_line = true;
            }
            if !first_in_line {
                out.push(',');
            }
            first_in_line = false;

            encode_vlq(&mut out, i64::from(seg.generated_column) - prev_column);
            // single source, index is always 0
            encode_vlq(&mut out, 0);
            encode_vlq(&mut out, i64::from(seg.original_line) - prev_original_line);
            encode_vlq(&mut out, i64::from(seg.original_column) - prev_original_column);

            prev_column = i64::from(seg.generated_column);
            prev_original_line = i64::from(seg.original_line);
            prev_original_column = i64::from(seg.original_column);
        }
        out
    }

    pub fn to_json(&self) -> String {
        let map = SourceMapJson {
            version: 3,
            file: &self.file,
            sources: [self.source.as_str()],
            sources_content: self.source_content.as_deref().map(|c| [c]),
            names: [],
            mappings: self.mappings(),
        };
        // Serializing plain strings and arrays cannot fail.
        serde_json::to_string(&map).unwrap_or_default()
    }

    /// Map as an inline `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:application/json;charset=utf-8,{}",
            utf8_percent_encode(&self.to_json(), NON_ALPHANUMERIC)
        )
    }
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}
