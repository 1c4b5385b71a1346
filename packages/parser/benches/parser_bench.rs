use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagecraft_parser::{parse_declarations, parse_fragment, parse_page, parse_stylesheet};

fn parse_simple_block(c: &mut Criterion) {
    let source = r#"<button style="padding:14px 32px;border:none;border-radius:999px">Get Started</button>"#;

    c.bench_function("parse_simple_block", |b| {
        b.iter(|| parse_fragment(black_box(source)))
    });
}

fn parse_section_block(c: &mut Criterion) {
    let source = r#"
<section style="padding:80px 20px;background:#f9fafb">
  <h2 style="text-align:center;font-size:36px;margin-bottom:40px">Features</h2>
  <div style="display:grid;grid-template-columns:repeat(auto-fit,minmax(250px,1fr));gap:24px">
    <div style="padding:30px;background:white;border-radius:12px;box-shadow:0 10px 30px rgba(0,0,0,.08)">
      <h3>Fast Performance</h3>
      <p>Optimized layouts that load instantly.</p>
    </div>
    <div style="padding:30px;background:white;border-radius:12px;box-shadow:0 10px 30px rgba(0,0,0,.08)">
      <h3>Responsive Design</h3>
      <p>Looks great on every device.</p>
    </div>
    <div style="padding:30px;background:white;border-radius:12px;box-shadow:0 10px 30px rgba(0,0,0,.08)">
      <h3>Easy Customization</h3>
      <p>Edit anything visually.</p>
    </div>
  </div>
</section>
"#;

    c.bench_function("parse_section_block", |b| {
        b.iter(|| parse_fragment(black_box(source)))
    });
}

fn parse_large_page(c: &mut Criterion) {
    let mut body = String::new();
    let mut css = String::from("body{margin:0;}");

    for i in 0..200 {
        body.push_str(&format!(
            r##"<div id="c{i}"><h3>Card {i}</h3><p>Body text for card {i}</p><a href="#c{i}">More</a></div>"##
        ));
        css.push_str(&format!("#c{i}{{padding:16px;color:#333;}}"));
    }
    css.push_str("@media (max-width: 375px){#c1{padding:8px;}}");

    let source = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>{css}</style>\n</head>\n<body>{body}</body>\n</html>"
    );

    c.bench_function("parse_large_page", |b| {
        b.iter(|| parse_page(black_box(&source)))
    });
}

fn parse_styles_only(c: &mut Criterion) {
    let inline = "display:flex;justify-content:space-between;padding:20px 40px;background:#111;color:#fff";
    let sheet = "#c1{color:red;}#c2{padding:4px;}@media (max-width: 555px){#c1{color:blue;}}";

    c.bench_function("parse_declarations", |b| {
        b.iter(|| parse_declarations(black_box(inline)))
    });
    c.bench_function("parse_stylesheet", |b| {
        b.iter(|| parse_stylesheet(black_box(sheet)))
    });
}

criterion_group!(
    benches,
    parse_simple_block,
    parse_section_block,
    parse_large_page,
    parse_styles_only
);
criterion_main!(benches);
