use crate::template::{render, render_all};

/// WHAT: Known placeholders are substituted, other text kept
/// WHY: Encoder and merge command lines are built from templates
#[test]
fn given_known_placeholders_when_rendering_then_substituted() {
    // Given: A template with two placeholders
    let values = [("width", "320"), ("height", "240")];

    // When: Rendering
    let rendered = render("{width}x{height}", &values);

    // Then: Both substituted
    assert_eq!(rendered, Ok("320x240".to_string()));
}

/// WHAT: Unknown placeholder is reported by name
/// WHY: A typo in the config must fail configuration, not run a wrong command
#[test]
fn given_unknown_placeholder_when_rendering_then_error_names_it() {
    // Given / When: A template with an unknown placeholder
    let rendered = render("-i {input}", &[("output", "x")]);

    // Then: Error carries the name
    assert_eq!(rendered, Err("input".to_string()));
}

/// WHAT: Unterminated brace passes through literally
/// WHY: Arguments like ffmpeg filter expressions may contain lone braces
#[test]
fn given_unterminated_brace_when_rendering_then_literal() {
    // Given / When / Then
    assert_eq!(render("a{b", &[]), Ok("a{b".to_string()));
    assert_eq!(render("plain", &[]), Ok("plain".to_string()));
}

/// WHAT: Every argument of a list is rendered
/// WHY: Command lines are argument vectors, not single strings
#[test]
fn given_argument_list_when_rendering_all_then_each_rendered() {
    // Given: An argument template list
    let templates = vec!["-b:v".to_string(), "{bit_rate}".to_string(), "{output}".to_string()];

    // When: Rendering all
    let rendered = render_all(&templates, &[("bit_rate", "65536"), ("output", "/tmp/a.ts")]);

    // Then: Each rendered in order
    assert_eq!(
        rendered,
        Ok(vec![
            "-b:v".to_string(),
            "65536".to_string(),
            "/tmp/a.ts".to_string()
        ])
    );
}
