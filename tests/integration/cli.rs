use assert_cmd::Command;
use chartdoc_cli::test_utils::ChartFixture;
use predicates::prelude::*;

fn chartdoc() -> Command {
    let mut cmd = Command::cargo_bin("chartdoc").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("CHARTDOC_LOG_LEVEL");
    cmd
}

#[test]
fn test_writes_default_readme() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("charts/nginx")
        .chart_yaml(
            "name: nginx\nversion: 1.2.3\nappVersion: \"1.25\"\ndescription: A web server\ntype: application\n",
        )
        .values_yaml("image:\n  repository: nginx\n  tag: stable\nreplicaCount: 2\n")
        .build();

    chartdoc().arg("--chart-search-root").arg(fixture.root()).assert().success();

    let readme = fixture.read("charts/nginx/README.md");
    assert!(readme.starts_with("# nginx"), "got {readme}");
    assert!(readme.contains("A web server"));
    assert!(readme.contains("image.repository"));
    assert!(readme.contains("replicaCount"));
    Ok(())
}

#[test]
fn test_dry_run_prints_and_writes_nothing() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .chart_yaml("name: demo\nversion: 0.1.0\n")
        .template("README.md.tera", "Chart {{ chart.name }} v{{ chart.version }}\n")
        .build();

    chartdoc()
        .arg("-c")
        .arg(fixture.root())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("README.md <=="))
        .stdout(predicate::str::contains("Chart demo v0.1.0"));

    assert!(!fixture.chart_dir().join("README.md").exists());
    Ok(())
}

#[test]
fn test_chart_template_overrides_default_section() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .chart_yaml("name: demo\nversion: 0.1.0\ndescription: Original description\n")
        .template(
            "README.md.tera",
            "{% define \"chart.description\" %}Custom description{% enddefine %}\n{% include \"chart.defaultTemplate\" %}",
        )
        .build();

    chartdoc().arg("-c").arg(fixture.root()).assert().success();

    let readme = fixture.read("demo/README.md");
    assert!(readme.contains("Custom description"));
    assert!(!readme.contains("Original description"));
    Ok(())
}

#[test]
fn test_shared_template_relative_to_search_root() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("charts/app")
        .chart_yaml("name: app\nversion: 3.0.0\n")
        .template("README.md.tera", "{% include \"shared.footer\" %}\n")
        .build();
    fixture.write("templates/shared.tera", "{% define \"shared.footer\" %}-- {{ chart.name }} --{% enddefine %}");

    chartdoc()
        .arg("-c")
        .arg(fixture.root())
        .args(["-t", "./templates/shared.tera", "-t", "README.md.tera"])
        .assert()
        .success();

    assert_eq!(fixture.read("charts/app/README.md"), "-- app --\n");
    Ok(())
}

#[test]
fn test_custom_output_file_and_config() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo").template("DOCS.md.tera", "configured\n").build();
    fixture.write(
        "chartdoc.toml",
        "template_files = [\"DOCS.md.tera\"]\noutput_file = \"DOCS.md\"\n",
    );

    chartdoc().arg("-c").arg(fixture.root()).assert().success();

    assert_eq!(fixture.read("demo/DOCS.md"), "configured\n");
    assert!(!fixture.chart_dir().join("README.md").exists());
    Ok(())
}

#[test]
fn test_ignored_charts_are_skipped() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("charts/kept").template("README.md.tera", "kept\n").build();
    fixture.add_chart("vendor/skipped", "name: skipped\n");
    fixture.write("chartdoc.toml", "ignore = [\"vendor\"]\n");

    chartdoc().arg("-c").arg(fixture.root()).assert().success();

    assert_eq!(fixture.read("charts/kept/README.md"), "kept\n");
    assert!(!fixture.root().join("vendor/skipped/README.md").exists());
    Ok(())
}

#[test]
fn test_recursion_limit_fails_with_message() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("loop")
        .template(
            "README.md.tera",
            "{% define \"loop\" %}{{ include(name=\"loop\") }}{% enddefine %}{{ include(name=\"loop\") }}",
        )
        .build();

    chartdoc()
        .arg("-c")
        .arg(fixture.root())
        .args(["--max-include-depth", "5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nested reference name"))
        .stderr(predicate::str::contains("1 of 1 chart(s) failed"));

    assert!(!fixture.chart_dir().join("README.md").exists());
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo").build();
    fixture.write("chartdoc.toml", "unknown_key = true\n");

    chartdoc()
        .arg("-c")
        .arg(fixture.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("chartdoc.toml"));
    Ok(())
}

#[test]
fn test_converters_available_in_templates() -> anyhow::Result<()> {
    let fixture = ChartFixture::new("demo")
        .values_yaml("service:\n  port: 80\n")
        .template(
            "README.md.tera",
            "{{ values.service | toYaml }}\n{% set parsed = valuesYaml | fromYaml %}{{ parsed.service.port }}\n{{ \"# Title\" | toHTML }}",
        )
        .build();

    chartdoc().arg("-c").arg(fixture.root()).assert().success();

    let readme = fixture.read("demo/README.md");
    assert!(readme.starts_with("port: 80\n80\n"), "got {readme}");
    assert!(readme.contains("<h1 id=\"title\">Title</h1>"));
    Ok(())
}
