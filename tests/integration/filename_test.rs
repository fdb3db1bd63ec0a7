//! Tests for output filename sanitization and generation.

use markwav::files::filename::{
    self, GenerateError, Options, Segment, Template, TemplateError, DEFAULT_TEMPLATE,
};

// ============================================================================
// Sanitization
// ============================================================================

#[test]
fn sanitize_replaces_whitespace_runs_with_one_hyphen() {
    assert_eq!(filename::sanitize("my project"), "my-project");
    assert_eq!(filename::sanitize("my \t\n project"), "my-project");
}

#[test]
fn sanitize_removes_path_separators_and_reserved_punctuation() {
    assert_eq!(filename::sanitize("path/to\\file"), "pathtofile");
    assert_eq!(filename::sanitize("a:b*c?d\"e<f>g|h"), "abcdefgh");
}

#[test]
fn sanitize_transliterates_unicode() {
    assert_eq!(filename::sanitize("Café Ünïcode"), "Cafe-Unicode");
}

#[test]
fn sanitize_trims_edges() {
    assert_eq!(filename::sanitize("  -session- "), "session");
    assert_eq!(filename::sanitize("..hidden.."), "hidden");
}

#[test]
fn sanitize_guards_windows_reserved_names() {
    assert_eq!(filename::sanitize("CON"), "_CON");
    assert_eq!(filename::sanitize("nul.txt"), "_nul.txt");
    assert_eq!(filename::sanitize("console"), "console");
}

#[test]
fn sanitize_falls_back_when_nothing_is_left() {
    assert_eq!(filename::sanitize("???"), "markers");
    assert_eq!(filename::sanitize(""), "markers");
}

#[test]
fn sanitize_stem_truncates() {
    assert_eq!(filename::sanitize_stem("abcdef", &Options::new(3)), "abc");
    assert_eq!(filename::sanitize_stem("abcdef", &Options::new(0)), "a");
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn default_template_appends_markers_suffix() {
    let name = filename::generate("Day One", DEFAULT_TEMPLATE, &Options::default()).unwrap();
    assert_eq!(name, "Day-One_markers.wav");
}

#[test]
fn existing_extension_is_not_doubled() {
    let name = filename::generate("take", "{stem}.WAV", &Options::default()).unwrap();
    assert_eq!(name, "take.WAV");
}

#[test]
fn date_tag_renders_with_format() {
    let name = filename::generate("log", "{stem}_{date:%Y}", &Options::default()).unwrap();
    assert!(name.starts_with("log_"));
    assert!(name.ends_with(".wav"));
    assert_eq!(name.len(), "log_".len() + 4 + ".wav".len());
    assert!(name[4..8].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn overlong_result_is_rejected() {
    let template = format!("{}{{stem}}", "x".repeat(260));
    let err = filename::generate("log", &template, &Options::default()).unwrap_err();
    assert!(matches!(err, GenerateError::TooLong { max: 255, .. }));
}

// ============================================================================
// Template parsing
// ============================================================================

#[test]
fn template_parses_all_tags() {
    let template = Template::parse("{stem}-{date}-{time:%H%M%S}").unwrap();
    assert_eq!(
        template.segments(),
        &[
            Segment::Stem,
            Segment::Literal("-".to_string()),
            Segment::Date("%y%m%d".to_string()),
            Segment::Literal("-".to_string()),
            Segment::Time("%H%M%S".to_string()),
        ]
    );
}

#[test]
fn template_errors() {
    assert_eq!(Template::parse("").unwrap_err(), TemplateError::Empty);
    assert_eq!(
        Template::parse("{stem").unwrap_err(),
        TemplateError::UnclosedBrace
    );
    assert_eq!(
        Template::parse("stem}").unwrap_err(),
        TemplateError::UnmatchedCloseBrace
    );
    assert_eq!(
        Template::parse("{project}").unwrap_err(),
        TemplateError::UnknownTag("project".to_string())
    );
    assert!(matches!(
        Template::parse("{stem:%Y}").unwrap_err(),
        TemplateError::InvalidFormat(_)
    ));
    assert!(matches!(
        Template::parse("{date:plain}").unwrap_err(),
        TemplateError::InvalidFormat(_)
    ));
}
