use insta::assert_snapshot;
use mathgram_core::{
    CalendarDate, ElementIds, MathSpan, RenderConfig, Renderer, check, escape, export_document,
    export_filename,
};
use mathgram_core::delimiters::MathDisplay;

const RESERVED: [char; 5] = ['&', '<', '>', '"', '\''];
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;"];

fn samples() -> Vec<&'static str> {
    vec![
        "",
        "plain text",
        r"$\frac{a}{b}$ and \(x\)",
        "O Teorema <de> Pitágoras",
        "Ana & Cia",
        r#"<img src=x onerror="alert('xss')">"#,
        "&amp;&lt;",
        "a'b\"c<d>e&f",
        "ü & 世界 <>",
    ]
}

#[test]
fn escape_without_reserved_characters_is_identity() {
    for text in samples() {
        if !text.contains(RESERVED) {
            assert_eq!(escape(text).as_str(), text);
        }
    }
}

#[test]
fn escaped_output_has_no_reserved_literals() {
    for text in samples() {
        let out = escape(text);
        assert!(!out.contains(['<', '>', '"', '\'']), "{out}");
        for (idx, _) in out.match_indices('&') {
            let rest = &out[idx..];
            assert!(
                ENTITIES.iter().any(|e| rest.starts_with(e)),
                "stray ampersand in {out}"
            );
        }
    }
}

#[test]
fn escape_is_not_idempotent() {
    for text in samples() {
        let once = escape(text);
        let twice = escape(&once);
        if text.contains(RESERVED) {
            assert_ne!(twice, once, "{text}");
        } else {
            assert_eq!(twice, once, "{text}");
        }
    }
}

#[test]
fn render_locates_math_spans() {
    let renderer = Renderer::default();

    let inline = renderer.render("$x^2$", "a");
    assert_eq!(inline.math_spans().len(), 1);
    assert_eq!(inline.math_spans()[0].display, MathDisplay::Inline);

    let display = renderer.render("$$x^2$$", "b");
    assert_eq!(display.math_spans().len(), 1);
    assert_eq!(display.math_spans()[0].display, MathDisplay::Block);

    let unterminated = renderer.render("$x^2", "c");
    assert!(unterminated.math_spans().is_empty());
    assert!(unterminated.body().contains("$x^2"));
}

#[test]
fn render_mixed_content() {
    let fragment = Renderer::default().render(
        r"Seja \(f(x) = x^2\). Então \[\int_0^1 f = \tfrac13\] e $\ce{H2O}$.",
        "post-9",
    );
    let spans: Vec<_> = fragment
        .math_spans()
        .iter()
        .map(|MathSpan { display, tex, .. }| (*display, tex.as_str()))
        .collect();
    assert_eq!(
        spans,
        vec![
            (MathDisplay::Inline, "f(x) = x^2"),
            (MathDisplay::Block, r"\int_0^1 f = \tfrac13"),
            (MathDisplay::Inline, r"\ce{H2O}"),
        ]
    );
    assert!(fragment.diagnostics().is_empty());
}

#[test]
fn render_respects_configured_height() {
    let renderer = Renderer::new(RenderConfig {
        max_height: 120,
        ..Default::default()
    });
    let html = renderer.render("x", "p").to_iframe_html();
    assert!(html.contains("max-height: 120px"));
}

#[test]
fn render_config_from_toml() {
    let config: RenderConfig = toml::from_str("max-height = 500").unwrap();
    assert_eq!(config.max_height, 500);
    assert_eq!(config.katex_url, RenderConfig::default().katex_url);
}

#[test]
fn element_ids_do_not_collide_across_a_page() {
    let renderer = Renderer::default();
    let mut ids = ElementIds::new();
    let first = renderer.render("same", &ids.keyed("post", 1));
    let second = renderer.render("same", &ids.keyed("post", 1));
    assert_ne!(first.element_id(), second.element_id());
}

#[test]
fn end_to_end_scenario() {
    let title = "O Teorema <de> Pitágoras";
    let content = "$a^2+b^2=c^2$";
    let author = "Ana & Cia";

    let renderer = Renderer::default();
    let title_fragment = renderer.render(title, "title");
    assert!(title_fragment.body().contains("O Teorema &lt;de&gt; Pitágoras"));

    let tex = export_document(title, content, author, CalendarDate::new(2024, 3, 14));
    assert!(tex.contains(r"\author{Ana &amp; Cia}"));
    assert!(tex.contains("\n$a^2+b^2=c^2$\n"));

    assert_snapshot!(tex, @r"
    \documentclass{article}
    \usepackage[utf8]{inputenc}
    \usepackage[T1]{fontenc}
    \usepackage{amsmath}
    \usepackage{amsfonts}
    \usepackage{amssymb}
    \usepackage{mhchem}
    \usepackage[portuguese]{babel}

    \title{O Teorema &lt;de&gt; Pitágoras}
    \author{Ana &amp; Cia}
    \date{14/03/2024}

    \begin{document}

    \maketitle

    $a^2+b^2=c^2$

    \end{document}
    ");
}

#[test]
fn export_same_day_is_identical() {
    let today = CalendarDate::today();
    assert_eq!(
        export_document("T", "C", "A", today),
        export_document("T", "C", "A", today)
    );
}

#[test]
fn export_filename_replaces_separators() {
    assert_eq!(export_filename("Cálculo I/Aula 1"), "Cálculo_I_Aula_1.tex");
}

#[test]
fn unclosed_delimiter_report() {
    let input = r"Resultado: \(x + 1";
    let diagnostics = check(input);
    assert_eq!(diagnostics.len(), 1);

    let report = diagnostics[0].to_report("<post>", false);
    let mut buf = Vec::new();
    report
        .write(("<post>", ariadne::Source::from(input)), &mut buf)
        .expect("failed to write report");
    let output = String::from_utf8(buf).expect("report should be valid UTF-8");
    assert!(output.contains(r#"Unclosed delimiter "\(""#));
    assert!(output.contains("this delimiter is never closed"));
}
