//! Syntax highlighting definitions
//!
//! A small regex-based registry with one definition per output language:
//! `C#`, `VB` and `XML`. The registry is built once per process and looked
//! up by file extension (`.cs`) or by name.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Language keyword
    Keyword,
    /// String literal or attribute value
    String,
    /// Comment
    Comment,
    /// Numeric literal
    Number,
    /// Element name
    Tag,
    /// Attribute name
    AttributeName,
    /// Character or entity reference
    Entity,
}

/// A highlighted byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Category
    pub kind: TokenKind,
}

#[derive(Debug)]
struct Rule {
    regex: Regex,
    kind: TokenKind,
    group: usize,
}

/// One language's highlighting rules
pub struct HighlightDefinition {
    name: &'static str,
    extensions: &'static [&'static str],
    rules: Vec<Rule>,
}

impl fmt::Debug for HighlightDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightDefinition")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl PartialEq for HighlightDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl HighlightDefinition {
    fn new(
        name: &'static str,
        extensions: &'static [&'static str],
        patterns: &[(&str, TokenKind, usize)],
    ) -> Self {
        let rules = patterns
            .iter()
            .filter_map(|(pattern, kind, group)| match Regex::new(pattern) {
                Ok(regex) => Some(Rule {
                    regex,
                    kind: *kind,
                    group: *group,
                }),
                Err(e) => {
                    warn!(language = name, error = %e, "dropping highlight rule");
                    None
                }
            })
            .collect();
        Self {
            name,
            extensions,
            rules,
        }
    }

    /// Definition name (`C#`, `VB`, `XML`)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// File extensions, with leading dot
    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Tokenize `text`
    ///
    /// Rules are applied in order; a match overlapping a range already
    /// claimed by an earlier rule is skipped. Tokens come back sorted by
    /// start offset.
    pub fn highlight(&self, text: &str) -> Vec<Token> {
        // Claimed ranges stay sorted and disjoint, so only the last token
        // starting before a match can overlap it
        let mut tokens: Vec<Token> = Vec::new();
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                let Some(m) = caps.get(rule.group) else {
                    continue;
                };
                if m.start() == m.end() {
                    continue;
                }
                let at = tokens.partition_point(|t| t.start < m.end());
                if at > 0 && tokens[at - 1].end > m.start() {
                    continue;
                }
                tokens.insert(
                    at,
                    Token {
                        start: m.start(),
                        end: m.end(),
                        kind: rule.kind,
                    },
                );
            }
        }
        tokens
    }
}

/// Process-wide set of highlighting definitions
#[derive(Debug)]
pub struct HighlightRegistry {
    definitions: Vec<HighlightDefinition>,
}

impl HighlightRegistry {
    /// The shared registry, built on first use
    pub fn global() -> &'static HighlightRegistry {
        static REGISTRY: OnceLock<HighlightRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| HighlightRegistry {
            definitions: vec![csharp(), visual_basic(), xml()],
        })
    }

    /// Look up a definition by extension; the leading dot is optional and
    /// case is ignored
    pub fn by_extension(&self, extension: &str) -> Option<&HighlightDefinition> {
        let wanted = format!(".{}", extension.trim_start_matches('.'));
        self.definitions.iter().find(|d| {
            d.extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&wanted))
        })
    }

    /// Look up a definition by name
    pub fn by_name(&self, name: &str) -> Option<&HighlightDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// All definitions
    pub fn definitions(&self) -> &[HighlightDefinition] {
        &self.definitions
    }
}

type Pattern = (&'static str, TokenKind, usize);

const CSHARP_PATTERNS: &[Pattern] = &[
    (r"//[^\n]*", TokenKind::Comment, 0),
    (r#""(?:\\.|[^"\\])*""#, TokenKind::String, 0),
    (
        r"\b(?:using|namespace|public|private|class|void|new|return|string|bool|true|false|null|var)\b",
        TokenKind::Keyword,
        0,
    ),
    (r"\b\d+\b", TokenKind::Number, 0),
];

const VB_PATTERNS: &[Pattern] = &[
    (r#""(?:""|[^"])*""#, TokenKind::String, 0),
    (r"'[^\n]*", TokenKind::Comment, 0),
    (
        r"(?i)\b(?:Imports|Namespace|Public|Private|Class|Function|Sub|End|Dim|As|New|Return|Using|ByVal|String|Of|True|False|Nothing)\b",
        TokenKind::Keyword,
        0,
    ),
    (r"\b\d+\b", TokenKind::Number, 0),
];

const XML_PATTERNS: &[Pattern] = &[
    (r"<!--[\s\S]*?-->", TokenKind::Comment, 0),
    (r"<!\[CDATA\[[\s\S]*?\]\]>", TokenKind::String, 0),
    (r"</?([\w:.\-]+)", TokenKind::Tag, 1),
    (r#"([\w:.\-]+)\s*=\s*""#, TokenKind::AttributeName, 1),
    (r#""[^"]*""#, TokenKind::String, 0),
    (r"&(?:#\d+|#x[0-9a-fA-F]+|\w+);", TokenKind::Entity, 0),
];

fn csharp() -> HighlightDefinition {
    HighlightDefinition::new("C#", &[".cs"], CSHARP_PATTERNS)
}

fn visual_basic() -> HighlightDefinition {
    HighlightDefinition::new("VB", &[".vb"], VB_PATTERNS)
}

fn xml() -> HighlightDefinition {
    HighlightDefinition::new("XML", &[".xml"], XML_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = HighlightRegistry::global();
        assert_eq!(registry.by_extension(".cs").unwrap().name(), "C#");
        assert_eq!(registry.by_extension("vb").unwrap().name(), "VB");
        assert_eq!(registry.by_extension(".XML").unwrap().name(), "XML");
        assert!(registry.by_extension(".txt").is_none());
        assert_eq!(registry.by_name("xml").unwrap().extensions(), &[".xml"]);
    }

    #[test]
    fn test_registry_is_shared() {
        assert!(std::ptr::eq(
            HighlightRegistry::global(),
            HighlightRegistry::global()
        ));
    }

    #[test]
    fn test_all_rules_compile() {
        let registry = HighlightRegistry::global();
        let expected = [CSHARP_PATTERNS, VB_PATTERNS, XML_PATTERNS];
        for (definition, patterns) in registry.definitions().iter().zip(expected) {
            assert_eq!(definition.rules.len(), patterns.len(), "{}", definition.name());
        }
    }

    #[test]
    fn test_later_rules_skip_claimed_ranges() {
        let cs = HighlightRegistry::global().by_name("C#").unwrap();
        let text = "// return 1\nreturn \"new\" + 2; // x\n".repeat(500);
        let tokens = cs.highlight(&text);

        assert_eq!(tokens.len(), 500 * 5);
        for pair in tokens.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(&text[tokens[1].start..tokens[1].end], "return");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[3].kind, TokenKind::Number);
        assert_eq!(&text[tokens[4].start..tokens[4].end], "// x");
    }

    #[test]
    fn test_csharp_tokens() {
        let cs = HighlightRegistry::global().by_name("C#").unwrap();
        let text = r#"Text text1 = new Text(); // "not a string""#;
        let kinds: Vec<_> = cs
            .highlight(text)
            .iter()
            .map(|t| (t.kind, &text[t.start..t.end]))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Keyword, "new"),
                (TokenKind::Comment, "// \"not a string\""),
            ]
        );
    }

    #[test]
    fn test_xml_tokens() {
        let xml = HighlightRegistry::global().by_name("XML").unwrap();
        let text = r#"<w:t xml:space="preserve">a &amp; b</w:t>"#;
        let kinds: Vec<_> = xml
            .highlight(text)
            .iter()
            .map(|t| (t.kind, &text[t.start..t.end]))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Tag, "w:t"),
                (TokenKind::AttributeName, "xml:space"),
                (TokenKind::String, "\"preserve\""),
                (TokenKind::Entity, "&amp;"),
                (TokenKind::Tag, "w:t"),
            ]
        );
    }
}
