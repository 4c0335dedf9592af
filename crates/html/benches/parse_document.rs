use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use html::ParserOptions;

/// A document that exercises tables, formatting elements and foreign content
fn sample_document(rows: usize) -> String {
    let mut source = String::from("<!DOCTYPE html><title>Benchmark</title><table>");
    for row in 0..rows {
        source.push_str(&format!(
            "<tr><td><b>{row}<i>cell</b> text</i><td><a href=\"#{row}\">link</a>"
        ));
    }
    source.push_str("</table><svg viewBox=\"0 0 10 10\"><circle r=\"5\"/></svg><p>done");
    source
}

fn criterion_benchmark(c: &mut Criterion) {
    for rows in [10, 100] {
        let source = sample_document(rows);
        c.bench_with_input(BenchmarkId::new("Parse document", rows), &source, |b, s| {
            b.iter(|| html::parse_str(s, ParserOptions::default()))
        });
    }

    let fragment = "<li>one<li>two<li><em>three</em>";
    c.bench_with_input(
        BenchmarkId::new("Parse fragment", "ul"),
        &fragment,
        |b, &s| b.iter(|| html::parse_fragment_str(s, "ul", ParserOptions::default())),
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
