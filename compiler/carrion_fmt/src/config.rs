//! Formatter configuration.

/// Layout options, mirroring the LSP formatting request's knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatConfig {
    /// Spaces per indent level when `insert_spaces` is set.
    pub tab_size: u32,
    /// Indent with spaces (`true`) or one tab per level (`false`).
    pub insert_spaces: bool,
    /// Strip trailing whitespace from every line.
    pub trim_trailing_whitespace: bool,
    /// Guarantee the output ends with a newline.
    pub insert_final_newline: bool,
    /// Collapse multiple trailing newlines to one.
    pub trim_final_newlines: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            tab_size: 4,
            insert_spaces: true,
            trim_trailing_whitespace: true,
            insert_final_newline: true,
            trim_final_newlines: true,
        }
    }
}

impl FormatConfig {
    /// The indent string for one level.
    pub(crate) fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size as usize)
        } else {
            "\t".to_string()
        }
    }
}
