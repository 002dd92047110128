//! Entry bundling.
//!
//! Produces `<output.dir>/<output.filename>` from the entry module with
//! package imports rewritten (see [`rewrite`]), plus debug info according to
//! the build's [`DevtoolPolicy`]:
//!
//! | Policy | Map location | Mappings |
//! |--------|--------------|----------|
//! | `SourceMap` | `<filename>.map`, with `sourcesContent` | line and column |
//! | `EvalCheapModuleSourceMap` | inline `data:` URL | line only |

pub mod rewrite;
pub mod sourcemap;

use crate::config::BuildConfig;
use crate::core::DevtoolPolicy;
use crate::pipeline::BuildError;
use crate::plugin::ModuleAlias;
use crate::utils::path::{relative_path, to_slash};
use rewrite::{Rewrite, rewrite_imports};
use sourcemap::SourceMapBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written by [`bundle`].
#[derive(Debug)]
pub struct BundleOutput {
    pub path: PathBuf,
    /// External map, only under [`DevtoolPolicy::SourceMap`].
    pub map_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Bundle the entry module into the output directory.
pub fn bundle(config: &BuildConfig, aliases: &[ModuleAlias]) -> Result<BundleOutput, BuildError> {
    let entry = &config.entry;
    let source = fs::read_to_string(entry).map_err(|source| BuildError::Entry {
        path: entry.clone(),
        source,
    })?;

    let entry_dir = entry.parent().unwrap_or(&config.root);
    let rewrite = rewrite_imports(&source, entry_dir, aliases);
    let devtool = config.devtool();
    let map = source_map(config, &source, &rewrite, devtool);

    let mut code = rewrite.code();
    if !code.is_empty() && !code.ends_with('\n') {
        code.push('\n');
    }

    let map_path = if devtool.is_external() {
        let map_path = config.output.dir.join(config.output.map_filename());
        write(&map_path, map.to_json())?;
        code.push_str(&format!(
            "//# sourceMappingURL={}\n",
            config.output.map_filename()
        ));
        Some(map_path)
    } else {
        code.push_str(&format!("//# sourceMappingURL={}\n", map.to_data_url()));
        None
    };

    let path = config.output.bundle_path();
    write(&path, code)?;

    Ok(BundleOutput {
        path,
        map_path,
        warnings: rewrite.warnings,
    })
}

fn source_map(
    config: &BuildConfig,
    source: &str,
    rewrite: &Rewrite,
    devtool: DevtoolPolicy,
) -> SourceMapBuilder {
    let source_url = to_slash(&relative_path(&config.output.dir, &config.entry));
    let mut map = SourceMapBuilder::new(config.output.filename.clone(), source_url);
    if devtool.is_external() {
        map = map.with_content(source);
    }

    // prelude lines stay unmapped
    let offset = rewrite.prelude.len() as u32;
    let line_count = source.split_inclusive('\n').count() as u32;
    for line in 0..line_count {
        let generated = line + offset;
        map.add(generated, 0, line, 0);
        if devtool.maps_columns() {
            for edit in rewrite.edits_on(line) {
                map.add(generated, edit.generated.start, line, edit.original.start);
                map.add(generated, edit.generated.end, line, edit.original.end);
            }
        }
    }
    map
}

fn write(path: &Path, content: String) -> Result<(), BuildError> {
    fs::write(path, content).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_project;
    use crate::core::BuildMode;

    fn wasm_alias(config: &BuildConfig) -> Vec<ModuleAlias> {
        vec![ModuleAlias {
            dir: config.wasm.pkg_dir(),
            name: config.wasm.out_name.clone(),
            specifier: config.wasm.module_specifier(),
        }]
    }

    #[test]
    fn test_development_inlines_line_map() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());
        fs::create_dir_all(&config.output.dir).unwrap();

        let output = bundle(&config, &wasm_alias(&config)).unwrap();
        assert!(output.map_path.is_none());
        assert!(!config.output.dir.join("index.js.map").exists());

        let code = fs::read_to_string(&output.path).unwrap();
        assert!(code.contains("import(\"./pkg/index.js\").then(__wasp_init)"));
        assert!(code.contains("//# sourceMappingURL=data:application/json;charset=utf-8,"));
    }

    #[test]
    fn test_production_writes_external_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_project(dir.path());
        config.mode = BuildMode::Production;
        fs::create_dir_all(&config.output.dir).unwrap();

        let output = bundle(&config, &wasm_alias(&config)).unwrap();
        let map_path = output.map_path.unwrap();
        assert_eq!(map_path, config.output.dir.join("index.js.map"));

        let code = fs::read_to_string(&output.path).unwrap();
        assert!(code.ends_with("//# sourceMappingURL=index.js.map\n"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&map_path).unwrap()).unwrap();
        assert_eq!(json["sources"][0], "../index.js");
        assert_eq!(
            json["sourcesContent"][0],
            "import(\"./pkg\").catch(console.error);\n"
        );
        let mappings = json["mappings"].as_str().unwrap();
        // one unmapped prelude line, then column segments around the specifier
        assert!(mappings.starts_with(";AAAA,"));
    }

    #[test]
    fn test_development_map_is_line_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());
        let source = "a();\nimport(\"./pkg\");\n";
        let rewrite = rewrite_imports(source, &config.root, &wasm_alias(&config));

        let map = source_map(&config, source, &rewrite, DevtoolPolicy::EvalCheapModuleSourceMap);
        assert_eq!(map.mappings(), ";AAAA;AACA");
    }

    #[test]
    fn test_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_project(dir.path());
        fs::remove_file(&config.entry).unwrap();

        assert!(matches!(
            bundle(&config, &[]),
            Err(BuildError::Entry { .. })
        ));
    }
}
