use chartdoc_cli::chart::ChartDocumentationInfo;
use chartdoc_cli::constants::FALLBACK_DIRECTIVE;
use chartdoc_cli::document::DocumentRenderer;
use chartdoc_cli::config::Config;
use chartdoc_cli::templating::{
    SpecifierKind, TemplateComposer, TemplateError, TemplateResolver, build_chart_context,
};
use chartdoc_cli::test_utils::{ChartFixture, init_test_logging};

#[test]
fn test_resolver_classifies_and_falls_back() -> anyhow::Result<()> {
    init_test_logging(None);
    let fixture = ChartFixture::new("charts/demo").template("present.tera", "present").build();
    fixture.write("shared/common.tera", "common;");

    assert_eq!(SpecifierKind::classify("./shared/common.tera"), SpecifierKind::Relative);
    assert_eq!(SpecifierKind::classify("present.tera"), SpecifierKind::BareFilename);

    let loaded = TemplateResolver::new(&fixture.chart_dir(), fixture.root()).load(&[
        "./shared/common.tera",
        "present.tera",
        "missing.tera",
    ])?;
    assert_eq!(loaded.files.len(), 2);
    assert!(loaded.used_fallback);
    assert!(loaded.text.starts_with("common;present"));
    assert!(loaded.text.ends_with(FALLBACK_DIRECTIVE));
    Ok(())
}

#[test]
fn test_later_file_overrides_earlier_definition() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .template("a.tmpl", "{% define \"section\" %}from a{% enddefine %}")
        .template("b.tmpl", "{% define \"section\" %}from b{% enddefine %}[{% include \"section\" %}]")
        .build();

    let info = ChartDocumentationInfo::load(&fixture.chart_dir())?;
    let template = TemplateComposer::new().compose(&fixture.chart_dir(), fixture.root(), &[
        "a.tmpl", "b.tmpl",
    ])?;

    assert_eq!(template.render(&build_chart_context(&info)?)?, "[from b]");
    Ok(())
}

#[test]
fn test_include_function_passes_data() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .values_yaml("ports:\n  - 80\n  - 443\n")
        .template(
            "README.md.tera",
            "{% define \"port\" %}port={{ data }}{% enddefine %}{% for p in values.ports %}{{ include(name=\"port\", data=p) }};{% endfor %}",
        )
        .build();

    let document = DocumentRenderer::new(Config::default())
        .render_chart(&fixture.chart_dir(), fixture.root())?;
    assert_eq!(document.content, "port=80;port=443;");
    Ok(())
}

#[test]
fn test_include_output_can_be_piped_through_filters() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .template(
            "README.md.tera",
            "{% define \"doc\" %}## Usage{% enddefine %}{{ include(name=\"doc\") | toHTML }}",
        )
        .build();

    let document = DocumentRenderer::new(Config::default())
        .render_chart(&fixture.chart_dir(), fixture.root())?;
    assert!(document.content.contains("<h2 id=\"usage\">Usage</h2>"));
    Ok(())
}

#[test]
fn test_malformed_from_yaml_yields_error_key() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .template(
            "README.md.tera",
            "{% set parsed = \"key: value\n- item\n\" | fromYaml %}{{ parsed | length }}:{{ parsed.Error != \"\" }}",
        )
        .build();

    let document = DocumentRenderer::new(Config::default())
        .render_chart(&fixture.chart_dir(), fixture.root())?;
    assert_eq!(document.content, "1:true");
    Ok(())
}

#[test]
fn test_parse_error_aborts_composition() {
    let fixture = ChartFixture::new("demo").template("README.md.tera", "{% for %}").build();

    let err = TemplateComposer::new()
        .compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"])
        .unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }));
}

#[test]
fn test_unclosed_define_is_a_parse_error() {
    let fixture = ChartFixture::new("demo")
        .template("README.md.tera", "{% define \"open\" %}never closed")
        .build();

    let err = TemplateComposer::new()
        .compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"])
        .unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }), "got {err:?}");
}
