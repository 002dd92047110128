//! Configuration section definitions.
//!
//! Each module corresponds to a section in `wasp.toml`:
//!
//! | Module        | TOML Section     | Purpose                                 |
//! |---------------|------------------|-----------------------------------------|
//! | `output`      | `[output]`       | Bundle directory, filename, clean       |
//! | `html`        | `[html]`         | Template and generated document         |
//! | `wasm`        | `[wasm]`         | Crate directory and wasm-pack options   |
//! | `experiments` | `[experiments]`  | Bundler capability flags                |
//! | `serve`       | `[serve]`        | Development server                      |

mod experiments;
mod html;
mod output;
mod serve;
mod wasm;

pub use experiments::ExperimentsConfig;
pub use html::{HtmlConfig, InjectPosition};
pub use output::OutputConfig;
pub use serve::ServeConfig;
pub use wasm::WasmConfig;

use super::ConfigDiagnostics;
use super::FieldPath;

/// Report `field` when `value` is not a bare file name.
pub(crate) fn validate_file_name(value: &str, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if value.is_empty() {
        diag.error(field, "must not be empty");
    } else if value.contains(['/', '\\']) || value == "." || value == ".." {
        diag.error_with_hint(
            field,
            format!("`{value}` is not a plain file name"),
            "use a name like `index.js`; directories belong in `output.dir`",
        );
    }
}
