//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (hotreload.js)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the dev server answers with the hot reload client.
    pub const HOTRELOAD_PATH: &str = "/__wasp/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__WASP_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Hot reload client with WebSocket port injection.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// Tag that loads the hot reload client.
    pub fn hotreload_tag() -> String {
        format!("<script src=\"{HOTRELOAD_PATH}\"></script>\n")
    }
}
