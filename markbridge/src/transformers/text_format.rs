use crate::tree::TextFormat;

/// A delimiter pair mapped to format flags (`**` ↔ bold).
///
/// Tags carrying more than one flag (`***` for bold italic) are only used on import;
/// export always composes single-flag tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormatTransformer {
    name: String,
    format: TextFormat,
    tag: String,
    close_tag: Option<String>,
    intraword: bool,
}

impl TextFormatTransformer {
    pub fn new(name: impl Into<String>, format: TextFormat, tag: impl Into<String>) -> Self {
        TextFormatTransformer {
            name: name.into(),
            format,
            tag: tag.into(),
            close_tag: None,
            intraword: true,
        }
    }

    /// Use a closing delimiter distinct from the opening one
    pub fn with_close_tag(mut self, close_tag: impl Into<String>) -> Self {
        self.close_tag = Some(close_tag.into());
        self
    }

    /// Whether the delimiters may sit inside a word (`a*b*c`); `_` tags may not
    pub fn with_intraword(mut self, intraword: bool) -> Self {
        self.intraword = intraword;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn open_tag(&self) -> &str {
        &self.tag
    }

    pub fn close_tag(&self) -> &str {
        self.close_tag.as_deref().unwrap_or(&self.tag)
    }

    pub fn intraword(&self) -> bool {
        self.intraword
    }

    pub fn is_single_format(&self) -> bool {
        self.format.len() == 1
    }

    /// Code spans take their content verbatim
    pub fn is_code(&self) -> bool {
        self.format.contains(TextFormat::CODE)
    }
}
