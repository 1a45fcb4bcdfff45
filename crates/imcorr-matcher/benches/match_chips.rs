use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imcorr_matcher::{Chip, ChipMatcher, ChipSize, MatchParams};

fn pattern(x: f64, y: f64) -> f64 {
    128.0 + 40.0 * (0.31 * x + 0.12 * y).sin() + 30.0 * (0.37 * y - 0.09 * x).cos()
        + 20.0 * (0.22 * x + 0.27 * y + 2.3).sin()
}

fn bench_match_chips(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_chips");

    for (reference, search) in [
        (ChipSize::S16, ChipSize::S32),
        (ChipSize::S32, ChipSize::S64),
        (ChipSize::S64, ChipSize::S128),
    ] {
        let half = (search.side() - reference.side()) as f64 / 2.0;
        let search_chip = Chip::from_fn(search, |r, c| pattern(c as f64 - 2.5, r as f64 + 1.5));
        let reference_chip = Chip::from_fn(reference, |r, c| pattern(c as f64 + half, r as f64 + half));
        let matcher = ChipMatcher::new(MatchParams {
            reference_chip: reference,
            search_chip: search,
            ..MatchParams::default()
        });

        group.bench_with_input(
            BenchmarkId::new("paraboloid", format!("{}x{}", reference.side(), search.side())),
            &(search_chip, reference_chip),
            |b, (s, r)| b.iter(|| black_box(matcher.match_chips(black_box(s), black_box(r)))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_match_chips);
criterion_main!(benches);
