//! Output filename generation.
//!
//! A template such as `{stem}_markers` or `{stem}_{date}_{time}` is rendered
//! against the input CSV's file stem and the current local time, then made
//! filesystem-safe and given a `.wav` extension.

use deunicode::deunicode;

/// Default template string.
pub const DEFAULT_TEMPLATE: &str = "{stem}_markers";

/// Default date format for {date} tag.
const DEFAULT_DATE_FORMAT: &str = "%y%m%d";

/// Default time format for {time} tag.
const DEFAULT_TIME_FORMAT: &str = "%H%M";

/// Output file extension.
const EXTENSION: &str = ".wav";

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Fallback when sanitization leaves nothing.
const FALLBACK_NAME: &str = "markers";

/// Maximum filename length for most filesystems.
const MAX_FILENAME_LENGTH: usize = 255;

/// Options for rendering a template.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum length of the `{stem}` part (minimum 1).
    pub stem_max_length: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stem_max_length: 50,
        }
    }
}

impl Options {
    pub fn new(stem_max_length: usize) -> Self {
        Self {
            stem_max_length: stem_max_length.max(1),
        }
    }
}

/// Errors from template parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Template cannot be empty")]
    Empty,
    #[error("Unclosed brace in template")]
    UnclosedBrace,
    #[error("Unmatched closing brace in template")]
    UnmatchedCloseBrace,
    #[error("Unknown template tag: {0}")]
    UnknownTag(String),
    #[error("Invalid format string: {0}")]
    InvalidFormat(String),
}

/// Errors from filename generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Filename too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },
}

/// Make `input` safe to use as (part of) a filename.
///
/// Transliterates to ASCII, turns whitespace runs into single hyphens,
/// drops characters filesystems reject, trims leading/trailing dots and
/// hyphens, and prefixes Windows reserved names with `_`.
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(input);
    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;

    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        }
        // Anything else, including `/ \ : * ? " < > |`, is dropped.
    }

    let trimmed = result.trim_matches(|c| c == '.' || c == ' ' || c == '-');
    let name = guard_reserved(trimmed);

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// Sanitize a file stem and cut it to `options.stem_max_length`.
pub fn sanitize_stem(input: &str, options: &Options) -> String {
    let sanitized = sanitize(input);
    sanitized.chars().take(options.stem_max_length).collect()
}

/// Render `template` for the input stem and append `.wav`.
pub fn generate(stem: &str, template: &str, options: &Options) -> Result<String, GenerateError> {
    let rendered = Template::parse(template)?.render(stem, options);

    let filename = if rendered.to_ascii_lowercase().ends_with(EXTENSION) {
        rendered
    } else {
        format!("{}{}", rendered, EXTENSION)
    };

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(GenerateError::TooLong {
            length: filename.len(),
            max: MAX_FILENAME_LENGTH,
        });
    }
    Ok(filename)
}

fn guard_reserved(name: &str) -> String {
    let base = name.split('.').next().unwrap_or(name).to_uppercase();
    if WINDOWS_RESERVED.contains(&base.as_str()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Input file stem.
    Stem,
    /// Date with strftime format.
    Date(String),
    /// Time with strftime format.
    Time(String),
}

/// A parsed filename template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            segments: vec![Segment::Stem, Segment::Literal("_markers".to_string())],
        }
    }
}

impl Template {
    /// Parses a template string into segments.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let mut tag = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(TemplateError::UnclosedBrace),
                            Some(tc) => tag.push(tc),
                        }
                    }
                    segments.push(parse_tag(&tag)?);
                }
                '}' => return Err(TemplateError::UnmatchedCloseBrace),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Render with the given stem and the current local time.
    pub fn render(&self, stem: &str, options: &Options) -> String {
        let now = chrono::Local::now();
        let mut result = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => result.push_str(s),
                Segment::Stem => result.push_str(&sanitize_stem(stem, options)),
                Segment::Date(fmt) | Segment::Time(fmt) => {
                    result.push_str(&now.format(fmt).to_string())
                }
            }
        }

        result
    }
}

/// Parses a tag (without braces): `stem`, `date[:fmt]`, `time[:fmt]`.
fn parse_tag(content: &str) -> Result<Segment, TemplateError> {
    let (name, format) = match content.split_once(':') {
        Some((name, fmt)) => (name, Some(fmt)),
        None => (content, None),
    };

    match name {
        "stem" => match format {
            Some(_) => Err(TemplateError::InvalidFormat(
                "stem tag does not accept format".to_string(),
            )),
            None => Ok(Segment::Stem),
        },
        "date" => Ok(Segment::Date(checked_format(
            format.unwrap_or(DEFAULT_DATE_FORMAT),
        )?)),
        "time" => Ok(Segment::Time(checked_format(
            format.unwrap_or(DEFAULT_TIME_FORMAT),
        )?)),
        _ => Err(TemplateError::UnknownTag(name.to_string())),
    }
}

/// Accept a strftime format only if it has at least one known specifier.
fn checked_format(fmt: &str) -> Result<String, TemplateError> {
    const SPECIFIERS: &[char] = &[
        'Y', 'y', 'm', 'd', 'H', 'M', 'S', 'j', 'a', 'A', 'b', 'B', 'e', 'I', 'p', 'F', 'T', 's',
        'u', 'V',
    ];

    let has_specifier = fmt
        .split('%')
        .skip(1)
        .any(|rest| rest.chars().next().is_some_and(|c| SPECIFIERS.contains(&c)));

    if has_specifier {
        Ok(fmt.to_string())
    } else {
        Err(TemplateError::InvalidFormat(format!(
            "format string '{}' contains no valid strftime specifiers",
            fmt
        )))
    }
}
