//! HTML document generation.
//!
//! Reads `html.template`, references the bundle with a module script and
//! writes exactly one document to `<output.dir>/<html.filename>`.

use super::{BuildContext, Phase, Plugin};
use crate::config::{BuildConfig, InjectPosition};
use crate::pipeline::BuildError;
use crate::utils::html::{escape, insert_before_tag};
use anyhow::Result;
use regex::Regex;
use std::fs;
use std::sync::LazyLock;

// ASCII-only classes: regex is built without its unicode features
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[Tt][Ii][Tt][Ll][Ee](?:[ \t\r\n][^>]*)?>(?s:.)*?</[Tt][Ii][Tt][Ll][Ee][ \t\r\n]*>")
        .unwrap()
});

pub struct HtmlPlugin;

impl Plugin for HtmlPlugin {
    fn name(&self) -> &'static str {
        "html"
    }

    fn phase(&self) -> Phase {
        Phase::Emit
    }

    fn apply(&self, ctx: &mut BuildContext<'_>) -> Result<()> {
        let config = ctx.config;
        let template = &config.html.template;
        let content = fs::read_to_string(template).map_err(|source| BuildError::Template {
            path: template.clone(),
            source,
        })?;

        let html = render(config, &content);

        let path = config.output.dir.join(&config.html.filename);
        fs::write(&path, html).map_err(|source| BuildError::Write {
            path: path.clone(),
            source,
        })?;
        ctx.emit(path);
        Ok(())
    }
}

/// Template with title and script tag applied.
fn render(config: &BuildConfig, template: &str) -> Vec<u8> {
    let mut content = template.to_string();

    if let Some(title) = &config.html.title {
        let tag = format!("<title>{}</title>", escape(title));
        content = if TITLE_RE.is_match(&content) {
            TITLE_RE.replace(&content, regex::NoExpand(&tag)).into_owned()
        } else {
            String::from_utf8_lossy(&insert_before_tag(
                content.as_bytes(),
                "</head>",
                tag.as_bytes(),
            ))
            .into_owned()
        };
    }

    let script = script_tag(&config.output.filename);
    let anchor = match config.html.inject {
        InjectPosition::Head => "</head>",
        InjectPosition::Body => "</body>",
    };
    insert_before_tag(content.as_bytes(), anchor, script.as_bytes())
}

fn script_tag(src: &str) -> String {
    format!("<script type=\"module\" src=\"{}\"></script>\n", escape(src))
}
