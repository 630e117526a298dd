use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use jsx_editor_server::core::Document;
use jsx_editor_server::parser::{parse_elements, scan_source};

/// Generate JSX source of different shapes for benchmarking
fn generate_jsx_source(elements: usize, pattern: &str) -> String {
    let mut content = String::from("import { Canvas } from \"@react-three/fiber\";\n\n");

    match pattern {
        "attribute_heavy" => {
            for i in 0..elements {
                content.push_str(&format!(
                    "<mesh position={{[{}, {}, 0]}} rotation={{[0, {}, 0]}} scale={{{}}} visible={{true}} castShadow />\n",
                    i, i * 2, i % 7, 1 + (i % 3)
                ));
            }
        }
        "comment_heavy" => {
            for i in 0..elements {
                content.push_str(&format!(
                    "// element {i} below\n/* block */ <Box index={{{i}}} />\n"
                ));
            }
        }
        "string_heavy" => {
            for i in 0..elements {
                content.push_str(&format!(
                    "const label{i} = \"not <a tag={{{i}}}>\";\n<Panel title=\"panel {i}\" />\n"
                ));
            }
        }
        "nested" => {
            for i in 0..elements {
                content.push_str(&format!(
                    "<group>\n  <mesh scale={{{i}}}>\n    <boxGeometry args={{[1, 1, 1]}} />\n  </mesh>\n</group>\n"
                ));
            }
        }
        _ => unreachable!(),
    }

    content
}

fn bench_scan_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_source");

    for pattern in ["attribute_heavy", "comment_heavy", "string_heavy", "nested"] {
        let source = generate_jsx_source(500, pattern);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern),
            &source,
            |b, source| {
                b.iter(|| scan_source(black_box(source)));
            },
        );
    }

    group.finish();
}

fn bench_parse_elements(c: &mut Criterion) {
    let source = generate_jsx_source(500, "attribute_heavy");
    let document = Document::new(source);

    c.bench_function("parse_elements_500", |b| {
        b.iter(|| parse_elements(black_box(&document)));
    });
}

criterion_group!(benches, bench_scan_source, bench_parse_elements);
criterion_main!(benches);
