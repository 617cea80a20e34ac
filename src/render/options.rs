//! Rendering options and configuration.

use super::JsonFormat;

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// HTML `<title>`; falls back to the document title
    pub html_title: Option<String>,

    /// Embed the table stylesheet in HTML output
    pub html_stylesheet: bool,

    /// Cell delimiter for tables in plain text
    pub table_delimiter: String,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// JSON layout
    pub json_format: JsonFormat,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML title.
    pub fn with_html_title(mut self, title: impl Into<String>) -> Self {
        self.html_title = Some(title.into());
        self
    }

    /// Enable or disable the embedded HTML stylesheet.
    pub fn with_stylesheet(mut self, include: bool) -> Self {
        self.html_stylesheet = include;
        self
    }

    /// Set the plain-text table delimiter.
    pub fn with_table_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.table_delimiter = delimiter.into();
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            html_title: None,
            html_stylesheet: true,
            table_delimiter: "\t".to_string(),
            escape_special_chars: true,
            json_format: JsonFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_html_title("Report")
            .with_stylesheet(false)
            .with_table_delimiter(" | ")
            .with_escape(false)
            .with_json_format(JsonFormat::Compact);

        assert_eq!(options.html_title.as_deref(), Some("Report"));
        assert!(!options.html_stylesheet);
        assert_eq!(options.table_delimiter, " | ");
        assert!(!options.escape_special_chars);
        assert_eq!(options.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.table_delimiter, "\t");
        assert!(options.escape_special_chars);
        assert!(options.html_stylesheet);
    }
}
