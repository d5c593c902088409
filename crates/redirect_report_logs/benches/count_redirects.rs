use criterion::{Criterion, criterion_group, criterion_main};
use redirect_report_logs::{RedirectRules, count_redirects};
use std::hint::black_box;
use std::io::Cursor;

fn criterion_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let rules = RedirectRules::load_from(include_str!("../test_data/redirects.map")).unwrap();

    let bytes = include_bytes!("../test_data/access.log");
    c.bench_function("access", |b| {
        b.to_async(&rt).iter(|| async {
            let mut rules = rules.clone();
            count_redirects(black_box(Cursor::new(bytes)), &mut rules).await
        });
    });

    let bytes = include_bytes!("../test_data/central.log");
    c.bench_function("central", |b| {
        b.to_async(&rt).iter(|| async {
            let mut rules = rules.clone();
            count_redirects(black_box(Cursor::new(bytes)), &mut rules).await
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
