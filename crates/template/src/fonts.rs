//! Font availability and fallback

use crate::{xml_error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::PathBuf;
use std::sync::Arc;
use usvg::fontdb;

/// CSS generic families; available whenever the database has any face
const GENERIC_FAMILIES: [&str; 5] = ["serif", "sans-serif", "monospace", "cursive", "fantasy"];

/// Outcome of resolving a requested font family list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Family list to use
    pub family: String,
    /// Whether the resolver fell back to its default family
    pub substituted: bool,
}

/// A family that was replaced because the host does not have it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSubstitution {
    pub requested: String,
    pub replacement: String,
}

/// Decides which fonts the renderer may use
pub trait FontResolver: Send + Sync {
    /// Whether a single family name can be rendered
    fn is_available(&self, family: &str) -> bool;

    /// Family used when none of the requested ones are available
    fn default_family(&self) -> &str;

    /// Font database handed to the SVG parser
    fn database(&self) -> Arc<fontdb::Database>;

    /// Resolve a CSS `font-family` list
    ///
    /// The list is kept as written when any of its entries is available;
    /// otherwise the default family replaces it. Never fails.
    fn resolve(&self, requested: &str) -> ResolvedFont {
        let available = parse_family_list(requested)
            .iter()
            .any(|family| self.is_available(family));

        if available {
            ResolvedFont {
                family: requested.to_string(),
                substituted: false,
            }
        } else {
            ResolvedFont {
                family: quote_family(self.default_family()),
                substituted: true,
            }
        }
    }
}

/// Font resolver backed by a `fontdb` database
pub struct HostFontResolver {
    db: Arc<fontdb::Database>,
    default_family: String,
}

impl HostFontResolver {
    /// Wrap an already populated database
    pub fn new(db: fontdb::Database, default_family: impl Into<String>) -> Self {
        let default_family = default_family.into();
        let mut db = db;
        db.set_serif_family(default_family.clone());
        db.set_sans_serif_family(default_family.clone());
        db.set_monospace_family(default_family.clone());
        db.set_cursive_family(default_family.clone());
        db.set_fantasy_family(default_family.clone());

        Self {
            db: Arc::new(db),
            default_family,
        }
    }

    /// Start configuring a resolver
    pub fn builder() -> HostFontResolverBuilder {
        HostFontResolverBuilder::default()
    }

    /// Number of font faces known to the resolver
    pub fn face_count(&self) -> usize {
        self.db.len()
    }
}

impl FontResolver for HostFontResolver {
    fn is_available(&self, family: &str) -> bool {
        if GENERIC_FAMILIES
            .iter()
            .any(|g| g.eq_ignore_ascii_case(family))
        {
            return !self.db.is_empty();
        }

        self.db.faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        })
    }

    fn default_family(&self) -> &str {
        &self.default_family
    }

    fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }
}

impl std::fmt::Debug for HostFontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFontResolver")
            .field("faces", &self.db.len())
            .field("default_family", &self.default_family)
            .finish()
    }
}

/// Builder for [`HostFontResolver`]
#[derive(Debug, Clone)]
pub struct HostFontResolverBuilder {
    system_fonts: bool,
    font_dirs: Vec<PathBuf>,
    default_family: String,
}

impl Default for HostFontResolverBuilder {
    fn default() -> Self {
        Self {
            system_fonts: false,
            font_dirs: Vec::new(),
            default_family: "DejaVu Sans".to_string(),
        }
    }
}

impl HostFontResolverBuilder {
    /// Also load the fonts installed on the host
    pub fn system_fonts(mut self, enabled: bool) -> Self {
        self.system_fonts = enabled;
        self
    }

    /// Load every font in a directory (missing directories are skipped)
    pub fn font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Family to fall back to
    pub fn default_family(mut self, family: impl Into<String>) -> Self {
        self.default_family = family.into();
        self
    }

    pub fn build(self) -> HostFontResolver {
        let mut db = fontdb::Database::new();
        if self.system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            if dir.is_dir() {
                db.load_fonts_dir(dir);
            } else {
                tracing::debug!(dir = %dir.display(), "font directory not found, skipping");
            }
        }

        tracing::debug!(faces = db.len(), default = %self.default_family, "font database loaded");
        HostFontResolver::new(db, self.default_family)
    }
}

/// Rewrite `font-family` values the resolver cannot satisfy
///
/// Both the presentation attribute and the `font-family` declaration inside
/// a `style` attribute are checked. Only the family is replaced; size,
/// weight, style and position are left exactly as written.
pub fn apply_font_policy(
    markup: &str,
    resolver: &dyn FontResolver,
) -> Result<(String, Vec<FontSubstitution>)> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len()));
    let mut substitutions = Vec::new();

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error(e, reader.buffer_position()))?;

        let event = match event {
            Event::Eof => break,
            Event::Start(e) => match rewrite_element(&e, resolver, &mut substitutions, offset)? {
                Some(rewritten) => Event::Start(rewritten),
                None => Event::Start(e),
            },
            Event::Empty(e) => match rewrite_element(&e, resolver, &mut substitutions, offset)? {
                Some(rewritten) => Event::Empty(rewritten),
                None => Event::Empty(e),
            },
            other => other,
        };

        writer
            .write_event(event)
            .map_err(|e| xml_error(e, offset))?;
    }

    let markup = String::from_utf8(writer.into_inner())
        .map_err(|e| xml_error(format!("output is not UTF-8: {e}"), markup.len()))?;
    Ok((markup, substitutions))
}

/// Rebuild an element whose font family needs replacing, or `None` to keep it
fn rewrite_element(
    element: &BytesStart,
    resolver: &dyn FontResolver,
    substitutions: &mut Vec<FontSubstitution>,
    offset: usize,
) -> Result<Option<BytesStart<'static>>> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(name);
    let mut changed = false;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(e, offset))?;
        let key = attr.key.as_ref();

        let replacement = match key {
            b"font-family" => {
                let value = attr.unescape_value().map_err(|e| xml_error(e, offset))?;
                substitute_family(&value, resolver, substitutions)
            }
            b"style" => {
                let value = attr.unescape_value().map_err(|e| xml_error(e, offset))?;
                rewrite_style(&value, resolver, substitutions)
            }
            _ => None,
        };

        match replacement {
            Some(value) => {
                changed = true;
                let key = String::from_utf8_lossy(key).into_owned();
                rebuilt.push_attribute((key.as_str(), value.as_str()));
            }
            None => rebuilt.push_attribute(attr),
        }
    }

    Ok(changed.then_some(rebuilt))
}

fn substitute_family(
    requested: &str,
    resolver: &dyn FontResolver,
    substitutions: &mut Vec<FontSubstitution>,
) -> Option<String> {
    let resolved = resolver.resolve(requested);
    if !resolved.substituted {
        return None;
    }

    tracing::warn!(
        requested = %requested.trim(),
        replacement = %resolved.family,
        "font not available, substituting default"
    );
    substitutions.push(FontSubstitution {
        requested: requested.trim().to_string(),
        replacement: resolved.family.clone(),
    });
    Some(resolved.family)
}

/// Rewrite the `font-family` declaration in an inline style, if needed
fn rewrite_style(
    style: &str,
    resolver: &dyn FontResolver,
    substitutions: &mut Vec<FontSubstitution>,
) -> Option<String> {
    let mut changed = false;
    let declarations: Vec<String> = style
        .split(';')
        .map(|decl| match decl.split_once(':') {
            Some((prop, value)) if prop.trim().eq_ignore_ascii_case("font-family") => {
                match substitute_family(value, resolver, substitutions) {
                    Some(family) => {
                        changed = true;
                        format!("{prop}:{family}")
                    }
                    None => decl.to_string(),
                }
            }
            _ => decl.to_string(),
        })
        .collect();

    changed.then(|| declarations.join(";"))
}

/// Split a CSS family list into bare family names
fn parse_family_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

fn quote_family(family: &str) -> String {
    if family.contains(char::is_whitespace) {
        format!("'{family}'")
    } else {
        family.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Resolver that knows a fixed set of families
    struct KnownFonts(Vec<&'static str>);

    impl FontResolver for KnownFonts {
        fn is_available(&self, family: &str) -> bool {
            self.0.iter().any(|f| f.eq_ignore_ascii_case(family))
        }

        fn default_family(&self) -> &str {
            "DejaVu Sans"
        }

        fn database(&self) -> Arc<fontdb::Database> {
            Arc::new(fontdb::Database::new())
        }
    }

    #[test]
    fn test_parse_family_list() {
        assert_eq!(
            parse_family_list(" 'Bebas Neue', \"Open Sans\" ,sans-serif,"),
            vec!["Bebas Neue", "Open Sans", "sans-serif"]
        );
    }

    #[test]
    fn test_resolve_keeps_available_family() {
        let fonts = KnownFonts(vec!["Open Sans"]);
        let resolved = fonts.resolve("'Bebas Neue', 'Open Sans'");
        assert!(!resolved.substituted);
        assert_eq!(resolved.family, "'Bebas Neue', 'Open Sans'");
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let fonts = KnownFonts(vec![]);
        let resolved = fonts.resolve("Bebas Neue");
        assert!(resolved.substituted);
        assert_eq!(resolved.family, "'DejaVu Sans'");
    }

    #[test]
    fn test_policy_rewrites_attribute_only_family() {
        let fonts = KnownFonts(vec!["Open Sans"]);
        let markup = r#"<svg><text font-family="Bebas Neue" font-size="18" font-weight="bold" x="5" y="9">A</text><text font-family="Open Sans">B</text></svg>"#;

        let (out, subs) = apply_font_policy(markup, &fonts).unwrap();
        assert_eq!(
            out,
            r#"<svg><text font-family="&apos;DejaVu Sans&apos;" font-size="18" font-weight="bold" x="5" y="9">A</text><text font-family="Open Sans">B</text></svg>"#
        );
        assert_eq!(
            subs,
            vec![FontSubstitution {
                requested: "Bebas Neue".to_string(),
                replacement: "'DejaVu Sans'".to_string(),
            }]
        );
    }

    #[test]
    fn test_policy_rewrites_style_declaration() {
        let fonts = KnownFonts(vec![]);
        let markup = r#"<svg><tspan style="font-size:10px;font-family:Bebas Neue;font-weight:700"/></svg>"#;

        let (out, subs) = apply_font_policy(markup, &fonts).unwrap();
        assert!(out.contains("font-size:10px;font-family:&apos;DejaVu Sans&apos;;font-weight:700"));
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_policy_without_fonts_is_identity() {
        let fonts = KnownFonts(vec![]);
        let markup = "<?xml version=\"1.0\"?>\n<svg width=\"10\" height=\"10\">\n  <rect width=\"10\" height=\"10\"/>\n</svg>";
        let (out, subs) = apply_font_policy(markup, &fonts).unwrap();
        assert_eq!(out, markup);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_host_resolver_empty_database() {
        let fonts = HostFontResolver::builder()
            .font_dir("/nonexistent/fonts")
            .default_family("Fallback Sans")
            .build();
        assert_eq!(fonts.face_count(), 0);
        assert!(!fonts.is_available("sans-serif"));
        assert!(!fonts.is_available("Fallback Sans"));
        assert_eq!(fonts.default_family(), "Fallback Sans");
        assert!(fonts.resolve("Arial").substituted);
    }
}
