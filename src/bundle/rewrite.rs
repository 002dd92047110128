//! Import specifier rewriting.
//!
//! The entry is treated as one ES module. Specifiers that resolve to a
//! registered [`ModuleAlias`] are rewritten to the staged module, and the
//! module's async initializer is awaited before its exports are used:
//!
//! ```text
//! import("./pkg")              ─▶ import("./pkg/index.js").then(__wasp_init)
//! import { greet } from "./pkg" ─▶ import { greet } from "./pkg/index.js"
//!                                  (+ prelude awaiting the default export)
//! ```
//!
//! Anything else is left untouched. Relative and bare imports that are not
//! aliases are reported, since nothing bundles them. Lines starting with `//`
//! are copied as they are; block comments are not recognized.

use crate::plugin::ModuleAlias;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

/// Name of the helper awaiting a dynamically imported package's initializer.
const INIT_HELPER: &str = "__wasp_init";

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<kw>(?-u:\b)from[ \t]*|(?-u:\b)import[ \t]*\([ \t]*|(?-u:\b)import[ \t]*)(?P<q>["'])(?P<target>[^"'\r\n]+)["'](?P<close>[ \t]*\))?"#,
    )
    .unwrap()
});

/// A replaced span on one line. Columns are UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub line: u32,
    pub original: Range<u32>,
    pub generated: Range<u32>,
}

/// Result of rewriting an entry module.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// Lines prepended to the body. They have no original position.
    pub prelude: Vec<String>,
    /// Rewritten source, line for line with the original.
    pub body: String,
    pub edits: Vec<Edit>,
    pub warnings: Vec<String>,
}

impl Rewrite {
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(self.body.len() + 128);
        for line in &self.prelude {
            code.push_str(line);
            code.push('\n');
        }
        code.push_str(&self.body);
        code
    }

    /// Edits on original line `line`, in column order.
    pub fn edits_on(&self, line: u32) -> impl Iterator<Item = &Edit> {
        self.edits.iter().filter(move |e| e.line == line)
    }
}

/// Rewrite import specifiers of `source`, located in `entry_dir`.
pub fn rewrite_imports(source: &str, entry_dir: &Path, aliases: &[ModuleAlias]) -> Rewrite {
    let mut out = Rewrite::default();
    let mut static_inits: Vec<&str> = Vec::new();
    let mut dynamic_init = false;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let line_no = index as u32;
        if line.trim_start().starts_with("//") {
            out.body.push_str(line);
            continue;
        }
        let mut new_line = String::with_capacity(line.len());
        let mut cursor = 0;

        for caps in IMPORT_RE.captures_iter(line) {
            let (Some(target), Some(kw), Some(quote)) =
                (caps.name("target"), caps.name("kw"), caps.name("q"))
            else {
                continue;
            };
            let Some(alias) = resolve(target.as_str(), entry_dir, aliases, &mut out.warnings)
            else {
                continue;
            };

            let dynamic = kw.as_str().contains('(');
            let (range, text) = match caps.name("close") {
                Some(close) if dynamic => {
                    dynamic_init = true;
                    (
                        target.start()..close.end(),
                        format!("{}{}).then({INIT_HELPER})", alias.specifier, quote.as_str()),
                    )
                }
                _ => {
                    if !static_inits.contains(&alias.specifier.as_str()) {
                        static_inits.push(&alias.specifier);
                    }
                    (target.range(), alias.specifier.clone())
                }
            };

            new_line.push_str(&line[cursor..range.start]);
            let generated_start = utf16_len(&new_line);
            new_line.push_str(&text);
            out.edits.push(Edit {
                line: line_no,
                original: utf16_len(&line[..range.start])..utf16_len(&line[..range.end]),
                generated: generated_start..utf16_len(&new_line),
            });
            cursor = range.end;
        }

        new_line.push_str(&line[cursor..]);
        out.body.push_str(&new_line);
    }

    for (i, specifier) in static_inits.iter().enumerate() {
        out.prelude.push(format!(
            "import __wasp_default{i} from \"{specifier}\"; await __wasp_default{i}();"
        ));
    }
    if dynamic_init {
        out.prelude.push(format!(
            "const {INIT_HELPER} = async (m) => {{ await m.default(); return m; }};"
        ));
    }
    out
}

/// Find the alias a specifier refers to, reporting imports nothing will bundle.
fn resolve<'a>(
    target: &str,
    entry_dir: &Path,
    aliases: &'a [ModuleAlias],
    warnings: &mut Vec<String>,
) -> Option<&'a ModuleAlias> {
    if is_relative(target) {
        let resolved = entry_dir.join(target);
        let alias = aliases.iter().find(|a| a.matches(&resolved));
        if alias.is_none() {
            push_unique(
                warnings,
                format!("`{target}` is not bundled; serve it next to the bundle"),
            );
        }
        alias
    } else {
        if !target.starts_with('/') && !target.contains("://") {
            push_unique(
                warnings,
                format!("bare import `{target}` is left for the browser to resolve"),
            );
        }
        None
    }
}

fn is_relative(target: &str) -> bool {
    target == "." || target == ".." || target.starts_with("./") || target.starts_with("../")
}

fn push_unique(warnings: &mut Vec<String>, message: String) {
    if !warnings.contains(&message) {
        warnings.push(message);
    }
}

#[inline]
fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn aliases() -> Vec<ModuleAlias> {
        vec![ModuleAlias {
            dir: PathBuf::from("/app/pkg"),
            name: "index".into(),
            specifier: "./pkg/index.js".into(),
        }]
    }

    #[test]
    fn test_import_pattern_compiles() {
        assert!(IMPORT_RE.is_match("import(\"./pkg\")"));
        assert!(IMPORT_RE.is_match("import x from\t'./pkg'"));
        assert!(!IMPORT_RE.is_match("reimport(\"./pkg\")"));
    }

    #[test]
    fn test_commented_import_untouched() {
        let source = "  // import { greet } from \"./pkg\";\nimport(\"./pkg\");\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());

        assert!(rewrite.body.starts_with("  // import { greet } from \"./pkg\";\n"));
        assert_eq!(rewrite.edits.len(), 1);
        assert_eq!(rewrite.edits[0].line, 1);
        assert!(!rewrite.prelude.iter().any(|l| l.contains("__wasp_default")));
    }

    #[test]
    fn test_dynamic_import_awaits_initializer() {
        let source = "import(\"./pkg\").catch(console.error);\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());

        assert_eq!(
            rewrite.body,
            "import(\"./pkg/index.js\").then(__wasp_init).catch(console.error);\n"
        );
        assert_eq!(
            rewrite.prelude,
            ["const __wasp_init = async (m) => { await m.default(); return m; };"]
        );
        assert_eq!(
            rewrite.edits,
            [Edit {
                line: 0,
                original: 8..15,
                generated: 8..42,
            }]
        );
        assert!(rewrite.warnings.is_empty());
    }

    #[test]
    fn test_static_import_gets_prelude() {
        let source = "import { greet } from '../pkg/index.js';\ngreet();\n";
        let rewrite = rewrite_imports(source, Path::new("/app/www"), &aliases());

        assert_eq!(
            rewrite.body,
            "import { greet } from './pkg/index.js';\ngreet();\n"
        );
        assert_eq!(
            rewrite.prelude,
            ["import __wasp_default0 from \"./pkg/index.js\"; await __wasp_default0();"]
        );
        assert_eq!(rewrite.edits[0].original, 23..38);
        assert_eq!(rewrite.edits[0].generated, 23..37);
        assert!(rewrite.code().starts_with("import __wasp_default0"));
    }

    #[test]
    fn test_extensionless_module_path() {
        let source = "import * as wasm from \"./pkg/index\";\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());
        assert_eq!(
            rewrite.body,
            "import * as wasm from \"./pkg/index.js\";\n"
        );
    }

    #[test]
    fn test_unrelated_imports_reported() {
        let source = "import React from \"react\";\nimport \"./style.js\";\nimport x from \"https://cdn.example.com/x.js\";\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());

        assert_eq!(rewrite.body, source);
        assert!(rewrite.edits.is_empty());
        assert!(rewrite.prelude.is_empty());
        assert_eq!(rewrite.warnings.len(), 2);
        assert!(rewrite.warnings[0].contains("react"));
        assert!(rewrite.warnings[1].contains("./style.js"));
    }

    #[test]
    fn test_no_aliases_leaves_package_import() {
        let source = "import(\"./pkg\");\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &[]);
        assert_eq!(rewrite.body, source);
        assert_eq!(rewrite.warnings.len(), 1);
    }

    #[test]
    fn test_columns_count_utf16_units() {
        let source = "const s = \"😀\"; import(\"./pkg\");\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());

        // the emoji is 4 bytes but 2 UTF-16 units
        let edit = &rewrite.edits[0];
        assert_eq!(edit.original.start, 24);
        assert_eq!(edit.generated.start, 24);
    }

    #[test]
    fn test_multiple_imports_one_line() {
        let source = "import a from \"./pkg\"; import(\"./pkg\").then(go);\n";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());

        assert_eq!(rewrite.edits.len(), 2);
        assert_eq!(rewrite.prelude.len(), 2);
        assert_eq!(rewrite.edits_on(0).count(), 2);
        assert!(rewrite.body.contains("import(\"./pkg/index.js\").then(__wasp_init).then(go)"));
    }

    #[test]
    fn test_line_count_preserved() {
        let source = "a();\nimport(\"./pkg\");\nb();";
        let rewrite = rewrite_imports(source, Path::new("/app"), &aliases());
        assert_eq!(rewrite.body.lines().count(), 3);
        assert_eq!(rewrite.edits[0].line, 1);
    }
}
