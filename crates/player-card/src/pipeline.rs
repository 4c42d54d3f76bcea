//! Card generation pipeline

use crate::config::{CardConfig, ConfigError};
use crate::error::{CardError, Result};
use crate::request::CardRequest;
use card_dates::{Clock, DateCalculator, ResolvedDates};
use pdf_core::{compose, OutputArtifact, StaticPage};
use std::fmt;
use std::path::{Path, PathBuf};
use template::{
    substitute, FieldId, FieldMap, FontResolver, FontSubstitution, HostFontResolver, PageRenderer,
    SvgTemplate,
};
use tracing::{debug, info};

/// Everything the CLI reports about a generated card
#[derive(Debug, Clone, PartialEq)]
pub struct CardOutcome {
    pub path: PathBuf,
    pub name: String,
    pub date_of_birth: String,
    pub issued: String,
    pub expires: String,
    pub dates: ResolvedDates,
    pub page_count: usize,
    pub font_substitutions: Vec<FontSubstitution>,
}

impl fmt::Display for CardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✓ Generated {}", self.path.display())?;
        writeln!(f, "  Name: {}", self.name)?;
        writeln!(f, "  DOB: {}", self.date_of_birth)?;
        writeln!(f, "  Issued: {}", self.issued)?;
        write!(f, "  Expires: {}", self.expires)
    }
}

/// A composed card that has not been written anywhere yet
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    pub artifact: OutputArtifact,
    pub fields: FieldMap,
    pub dates: ResolvedDates,
    pub font_substitutions: Vec<FontSubstitution>,
}

/// Runs request → dates → substitution → render → compose → write
///
/// Template and static page are read from disk on every run, so
/// nothing from one card can end up in the next.
pub struct Pipeline {
    config: CardConfig,
    dates: DateCalculator,
    fonts: Box<dyn FontResolver>,
}

impl Pipeline {
    pub fn new(
        config: CardConfig,
        dates: DateCalculator,
        fonts: impl FontResolver + 'static,
    ) -> Self {
        Self {
            config,
            dates,
            fonts: Box::new(fonts),
        }
    }

    /// Build a pipeline from configuration, loading fonts into a host resolver
    pub fn from_config(
        config: CardConfig,
        clock: impl Clock + 'static,
    ) -> std::result::Result<Self, ConfigError> {
        let dates = DateCalculator::new(clock).with_display_format(&config.date_format)?;

        let mut fonts = HostFontResolver::builder()
            .system_fonts(config.load_system_fonts)
            .default_family(config.default_font_family.clone());
        if let Some(dir) = &config.fonts_dir {
            fonts = fonts.font_dir(dir.clone());
        }

        Ok(Self::new(config, dates, fonts.build()))
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn dates(&self) -> &DateCalculator {
        &self.dates
    }

    /// Resolve the dates for a request and format the four field values
    pub fn fields_for(&self, request: &CardRequest) -> Result<(ResolvedDates, FieldMap)> {
        let dates = self.dates.resolve(request.issue_date())?;
        let fields = FieldMap::new(
            request.name(),
            self.dates.format_for_display(request.date_of_birth()),
            self.dates.format_for_display(dates.issue_date),
            self.dates.format_for_display(dates.expiration_date),
        );
        Ok((dates, fields))
    }

    /// Produce the two-page card in memory
    pub fn generate(&self, request: &CardRequest) -> Result<GeneratedCard> {
        let (dates, fields) = self.fields_for(request)?;
        debug!(
            issued = %dates.issue_date,
            expires = %dates.expiration_date,
            "dates resolved"
        );

        let template =
            SvgTemplate::load(&self.config.template_path).map_err(CardError::TemplateStructure)?;
        let filled = substitute(template, &fields).map_err(CardError::TemplateStructure)?;
        debug!(template = %self.config.template_path.display(), "fields substituted");

        let page = PageRenderer::new(&*self.fonts)
            .render(&filled)
            .map_err(CardError::Render)?;
        debug!(width = page.size.width, height = page.size.height, "page 1 rendered");

        let static_page = StaticPage::load(&self.config.static_page_path)?;
        let artifact = compose(&page.document, &static_page)?;
        debug!(pages = artifact.page_count(), "pages composed");

        Ok(GeneratedCard {
            artifact,
            fields,
            dates,
            font_substitutions: page.font_substitutions,
        })
    }

    /// Generate a card into the configured output directory
    pub fn run(&self, request: &CardRequest) -> Result<CardOutcome> {
        let path = output_path_for(&self.config.output_dir, request.name());
        self.run_to(request, path)
    }

    /// Generate a card and write it to `path`, replacing any existing file
    pub fn run_to<P: AsRef<Path>>(&self, request: &CardRequest, path: P) -> Result<CardOutcome> {
        let path = path.as_ref();
        let card = self.generate(request)?;
        card.artifact.write_atomic(path)?;

        info!(path = %path.display(), name = %request.name(), "card generated");

        Ok(CardOutcome {
            path: path.to_path_buf(),
            name: card.fields.get(FieldId::NameField).to_string(),
            date_of_birth: card.fields.get(FieldId::DobField).to_string(),
            issued: card.fields.get(FieldId::IssuedDate).to_string(),
            expires: card.fields.get(FieldId::ExpirationDate).to_string(),
            dates: card.dates,
            page_count: card.artifact.page_count(),
            font_substitutions: card.font_substitutions,
        })
    }
}

/// Slug used when a name yields nothing usable as a file name
const FALLBACK_SLUG: &str = "card";

/// File-name-safe form of a player name
///
/// Lowercased, with spaces and hyphens turned into underscores. Path
/// separators and other characters that are not valid in a file name also
/// become underscores, and leading dots are removed, so the slug is always
/// a single file name that cannot climb out of the output directory.
pub fn slugify_name(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let slug = slug.trim_start_matches('.');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Default destination for a player's card
pub fn output_path_for(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{}.pdf", slugify_name(name)))
}
