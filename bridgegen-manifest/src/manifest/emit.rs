use serde::Deserialize;

/// Indentation of generated statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Tab,
    Spaces,
}

/// The `[emit]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Emit {
    /// Global mutex guarding calls into the manager
    pub lock: String,

    /// Local capturing the manager's result in non-void handlers
    pub result_variable: String,

    pub indent: IndentStyle,

    /// Width used when `indent = "spaces"`
    pub indent_width: usize,

    /// Comment out the skeleton's `main` so the output links as a library
    pub comment_out_main: bool,

    /// Replaces the skeleton's leading `//` comment block
    pub banner: Vec<String>,
}

impl Default for Emit {
    fn default() -> Self {
        Self {
            lock: "g_criticalSection".into(),
            result_variable: "function_result".into(),
            indent: IndentStyle::Tab,
            indent_width: 4,
            comment_out_main: true,
            banner: vec![
                "// Automatically generated OpenZWave::Manager_server wrapper".into(),
                "// (c) 2011 Elias Karakoulakis <elias.karakoulakis@gmail.com>".into(),
            ],
        }
    }
}

impl Emit {
    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        match self.indent {
            IndentStyle::Tab => "\t".to_string(),
            IndentStyle::Spaces => " ".repeat(self.indent_width),
        }
    }
}
