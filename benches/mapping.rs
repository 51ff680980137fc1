use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bondmap::{
    map_batch, map_templates, AnchorSpec, Atom, AtomId, EquivalenceClasses, MapRequest,
    MapperConfig, MoleculeGraph, ReactionJob,
};

/// Linear alkane C_nH_(2n+2) with ids starting at `offset + 1`; carbons
/// come first.
fn alkane(n: u32, offset: u32) -> MoleculeGraph {
    let mut atoms: Vec<Atom> = (1..=n).map(|i| Atom::new(offset + i, "C")).collect();
    let mut bonds: Vec<(u32, u32)> = (1..n).map(|i| (offset + i, offset + i + 1)).collect();
    let mut next = offset + n + 1;
    for i in 1..=n {
        let hydrogens = if i == 1 || i == n { 3 } else { 2 };
        for _ in 0..hydrogens {
            atoms.push(Atom::new(next, "H"));
            bonds.push((offset + i, next));
            next += 1;
        }
    }
    MoleculeGraph::from_parts(atoms, bonds).unwrap()
}

/// Benzene with ring carbons 1..=6 and hydrogens 7..=12, shifted by `offset`.
fn benzene(offset: u32) -> MoleculeGraph {
    let atoms = (1..=6)
        .map(|i| Atom::new(offset + i, "ca"))
        .chain((7..=12).map(|i| Atom::new(offset + i, "ha")));
    let bonds = (1..=6)
        .map(|i| (offset + i, offset + i % 6 + 1))
        .chain((1..=6).map(|i| (offset + i, offset + i + 6)));
    MoleculeGraph::from_parts(atoms, bonds).unwrap()
}

fn bench_alkane(c: &mut Criterion) {
    let pre = alkane(8, 0);
    let post = alkane(8, 100);
    let classes = EquivalenceClasses::new();
    let anchors = AnchorSpec::bonding(vec![AtomId(1)], vec![AtomId(101)]);

    c.bench_function("octane_one_anchor", |b| {
        b.iter(|| {
            black_box(
                map_templates(&pre, &post, &classes, &anchors, &MapperConfig::default()).unwrap(),
            )
        })
    });

    let quick = MapperConfig {
        detect_ambiguity: false,
        ..MapperConfig::default()
    };
    c.bench_function("octane_one_anchor_no_probe", |b| {
        b.iter(|| black_box(map_templates(&pre, &post, &classes, &anchors, &quick).unwrap()))
    });
}

fn bench_ring(c: &mut Criterion) {
    let pre = benzene(0);
    let post = benzene(20);
    let classes = EquivalenceClasses::new();
    let anchors = AnchorSpec::bonding(vec![AtomId(1), AtomId(2)], vec![AtomId(21), AtomId(22)]);

    c.bench_function("benzene_two_anchors", |b| {
        b.iter(|| {
            black_box(
                map_templates(&pre, &post, &classes, &anchors, &MapperConfig::default()).unwrap(),
            )
        })
    });

    let unanchored = AnchorSpec::default();
    c.bench_function("benzene_unanchored", |b| {
        b.iter(|| {
            black_box(
                map_templates(&pre, &post, &classes, &unanchored, &MapperConfig::default())
                    .unwrap(),
            )
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let jobs: Vec<ReactionJob> = (2..34)
        .map(|n| {
            let request = MapRequest {
                anchors: AnchorSpec::bonding(vec![AtomId(1)], vec![AtomId(1001)]),
                ..MapRequest::default()
            };
            ReactionJob::new(format!("C{n}"), alkane(n, 0), alkane(n, 1000), request)
        })
        .collect();

    c.bench_function("batch_32_alkanes", |b| {
        b.iter(|| black_box(map_batch(&jobs)))
    });
}

criterion_group!(benches, bench_alkane, bench_ring, bench_batch);
criterion_main!(benches);
