use criterion::{criterion_group, criterion_main, Criterion};

use shogiban_core::{init_all_tables_once, perft, Position};

fn bench_perft(c: &mut Criterion) {
    init_all_tables_once();

    c.bench_function("perft_startpos_depth2", |b| {
        let mut pos = Position::startpos();
        b.iter(|| perft(&mut pos, 2).nodes_count)
    });

    c.bench_function("generate_moves_startpos", |b| {
        let pos = Position::startpos();
        b.iter(|| {
            let mut list = shogiban_core::MoveList::new();
            shogiban_core::generate_all_moves(&pos, &mut list);
            list.len()
        })
    });
}

criterion_group!(benches, bench_perft);
criterion_main!(benches);
