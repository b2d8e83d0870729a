use std::sync::{Arc, Barrier};
use std::thread;

use chartdoc_cli::constants::MAX_INCLUDE_DEPTH;
use chartdoc_cli::templating::TemplateComposer;
use chartdoc_cli::test_utils::ChartFixture;
use tera::Context as TeraContext;

const MAX_DEPTH: usize = 20;

const COUNTDOWN: &str = r#"{% define "countdown" %}{{ data }}{% if data > 0 %},{{ include(name="countdown", data=data - 1) }}{% endif %}{% enddefine %}{{ include(name="countdown", data=start) }}"#;

/// Both charts define `countdown`. One always nests exactly to the bound, the
/// other always overshoots it; with shared counters the first would fail too.
#[test]
fn test_concurrent_renders_do_not_share_depths() {
    let fixture = ChartFixture::new("charts/within").template("README.md.tera", COUNTDOWN).build();
    let beyond = fixture.add_chart("charts/beyond", "name: beyond\n");
    fixture.write("charts/beyond/README.md.tera", COUNTDOWN);

    let composer = TemplateComposer::new().with_max_include_depth(MAX_DEPTH);
    let within = Arc::new(
        composer.compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"]).unwrap(),
    );
    let beyond = Arc::new(composer.compose(&beyond, fixture.root(), &["README.md.tera"]).unwrap());

    let barrier = Arc::new(Barrier::new(2));
    let spawn = |template: Arc<chartdoc_cli::templating::ChartTemplate>, start: usize| {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let mut context = TeraContext::new();
            context.insert("start", &start);
            barrier.wait();
            (0..25).map(|_| template.render(&context)).collect::<Vec<_>>()
        })
    };

    let ok_thread = spawn(Arc::clone(&within), MAX_DEPTH - 1);
    let failing_thread = spawn(Arc::clone(&beyond), MAX_DEPTH + 5);

    let ok_results = ok_thread.join().unwrap();
    let failing_results = failing_thread.join().unwrap();

    for result in ok_results {
        let output = result.unwrap();
        assert!(output.starts_with("19,18,"));
        assert!(output.ends_with(",1,0"));
    }
    for result in failing_results {
        assert!(result.unwrap_err().is_recursion_limit());
    }

    assert_eq!(within.include_depth("countdown"), 0);
    assert_eq!(beyond.include_depth("countdown"), 0);
}

/// Two independently composed templates of the same chart keep separate counters.
#[test]
fn test_same_chart_composed_twice_is_isolated() {
    let fixture = ChartFixture::new("demo").template("README.md.tera", COUNTDOWN).build();
    let composer = TemplateComposer::new().with_max_include_depth(3);

    let first = composer.compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"]).unwrap();
    let second = composer.compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"]).unwrap();

    let mut context = TeraContext::new();
    context.insert("start", &2);
    assert_eq!(first.render(&context).unwrap(), "2,1,0");
    assert_eq!(second.render(&context).unwrap(), "2,1,0");
}

/// A library caller on an ordinary thread can nest includes up to the default bound.
#[test]
fn test_default_bound_renders_without_caller_stack_setup() {
    let fixture = ChartFixture::new("deep").template("README.md.tera", COUNTDOWN).build();
    let template = TemplateComposer::new()
        .compose(&fixture.chart_dir(), fixture.root(), &["README.md.tera"])
        .unwrap();

    let mut context = TeraContext::new();
    context.insert("start", &(MAX_INCLUDE_DEPTH - 1));
    let output = thread::spawn(move || template.render(&context)).join().unwrap().unwrap();

    assert!(output.starts_with(&format!("{},{},", MAX_INCLUDE_DEPTH - 1, MAX_INCLUDE_DEPTH - 2)));
    assert!(output.ends_with(",1,0"));
}
