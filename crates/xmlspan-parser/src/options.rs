//! Parser configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What one tab stands for, both in column arithmetic and when classifying
/// indentation inside markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "TabWidthRepr", into = "String")]
pub enum TabWidth {
    /// A tab counts as two columns; indentation unit is two spaces.
    #[default]
    Two,
    /// A tab counts as four columns; indentation unit is four spaces.
    Four,
    /// A tab counts as one column; indentation unit is a tab.
    Tab,
}

impl TabWidth {
    /// Columns added per tab on top of the tab byte itself.
    #[must_use]
    pub const fn extra_columns(self) -> usize {
        match self {
            Self::Two => 1,
            Self::Four => 3,
            Self::Tab => 0,
        }
    }

    /// The text of one indentation unit.
    #[must_use]
    pub const fn indent_unit(self) -> &'static str {
        match self {
            Self::Two => "  ",
            Self::Four => "    ",
            Self::Tab => "\t",
        }
    }
}

impl fmt::Display for TabWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Two => write!(f, "2"),
            Self::Four => write!(f, "4"),
            Self::Tab => write!(f, "tab"),
        }
    }
}

/// Error for unrecognised tab width settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported tab width {0:?}, expected 2, 4, or tab")]
pub struct InvalidTabWidth(pub String);

impl FromStr for TabWidth {
    type Err = InvalidTabWidth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" | "  " => Ok(Self::Two),
            "4" | "    " => Ok(Self::Four),
            "tab" | "\t" => Ok(Self::Tab),
            other => Err(InvalidTabWidth(other.to_string())),
        }
    }
}

impl From<TabWidth> for String {
    fn from(value: TabWidth) -> Self {
        value.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TabWidthRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<TabWidthRepr> for TabWidth {
    type Error = InvalidTabWidth;

    fn try_from(value: TabWidthRepr) -> Result<Self, Self::Error> {
        match value {
            TabWidthRepr::Number(n) => n.to_string().parse(),
            TabWidthRepr::Text(s) => s.parse(),
        }
    }
}

/// Options consulted by the parser.
///
/// Deserializes from camelCase keys; missing keys take their defaults and
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    /// Tab representation for columns and indentation tokens.
    pub tab_width: TabWidth,
    /// Treat `<name/>` as a complete element. When off, `/>` ends the start
    /// tag and the element needs an explicit close tag.
    pub recognize_self_closing: bool,
    /// Compare tag and attribute names exactly. When off, names are
    /// lowercased in the tree and compared case-insensitively.
    pub case_sensitive_names: bool,
    /// Also list comments among their element's children.
    pub expose_comments_as_children: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            tab_width: TabWidth::Two,
            recognize_self_closing: true,
            case_sensitive_names: true,
            expose_comments_as_children: false,
        }
    }
}

impl ParserOptions {
    /// Set the tab width.
    #[must_use]
    pub const fn with_tab_width(mut self, tab_width: TabWidth) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Set whether `<name/>` closes the element.
    #[must_use]
    pub const fn with_self_closing(mut self, recognize: bool) -> Self {
        self.recognize_self_closing = recognize;
        self
    }

    /// Set whether names are case-sensitive.
    #[must_use]
    pub const fn with_case_sensitive_names(mut self, sensitive: bool) -> Self {
        self.case_sensitive_names = sensitive;
        self
    }

    /// Set whether comments are also listed among children.
    #[must_use]
    pub const fn with_comments_as_children(mut self, expose: bool) -> Self {
        self.expose_comments_as_children = expose;
        self
    }

    /// Normalise a tag or attribute name for the tree and for structural
    /// comparisons.
    #[must_use]
    pub fn normalize_name(&self, name: &str) -> String {
        if self.case_sensitive_names {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.tab_width, TabWidth::Two);
        assert!(options.recognize_self_closing);
        assert!(options.case_sensitive_names);
        assert!(!options.expose_comments_as_children);
    }

    #[test]
    fn test_tab_width_from_str() {
        assert_eq!("2".parse::<TabWidth>(), Ok(TabWidth::Two));
        assert_eq!("4".parse::<TabWidth>(), Ok(TabWidth::Four));
        assert_eq!("tab".parse::<TabWidth>(), Ok(TabWidth::Tab));
        assert_eq!("\t".parse::<TabWidth>(), Ok(TabWidth::Tab));
        assert!("3".parse::<TabWidth>().is_err());
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let options: ParserOptions =
            serde_json::from_str(r#"{"tabWidth": 4, "caseSensitiveNames": false, "xmlMode": true}"#)
                .unwrap();
        assert_eq!(options.tab_width, TabWidth::Four);
        assert!(!options.case_sensitive_names);
        assert!(options.recognize_self_closing);
    }

    #[test]
    fn test_deserialize_tab_as_string() {
        let options: ParserOptions = serde_json::from_str(r#"{"tabWidth": "tab"}"#).unwrap();
        assert_eq!(options.tab_width, TabWidth::Tab);
        assert!(serde_json::from_str::<ParserOptions>(r#"{"tabWidth": 8}"#).is_err());
    }

    #[test]
    fn test_normalize_name() {
        let insensitive = ParserOptions::default().with_case_sensitive_names(false);
        assert_eq!(insensitive.normalize_name("EntityForm"), "entityform");
        assert_eq!(ParserOptions::default().normalize_name("EntityForm"), "EntityForm");
    }
}
