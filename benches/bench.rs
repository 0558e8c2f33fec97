use criterion::{Criterion, criterion_group, criterion_main};
use ppsat::sat::cnf::Cnf;
use ppsat::sat::config::Config;
use ppsat::sat::context::SearchContext;
use ppsat::sat::dpll::Dpll;
use ppsat::sat::generator::RandomCnf;
use ppsat::sat::portfolio::Portfolio;
use ppsat::sat::restarter::{Never, TimedGeometric};
use ppsat::sat::variable_selection::{FirstLiteral, RandomPick};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn random_3sat(count: u64) -> Vec<Cnf> {
    (0..count)
        .map(|seed| {
            RandomCnf {
                num_vars: 50,
                num_clauses: 213,
                max_width: 3,
                fixed_width: true,
                seed,
            }
            .generate()
        })
        .collect()
}

fn bench_random_3sat(c: &mut Criterion) {
    let cnfs = random_3sat(20);

    let mut group = c.benchmark_group("uf50 - Literal selection");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Random pick", |b| {
        b.iter(|| {
            for (seed, cnf) in cnfs.iter().enumerate() {
                let ctx = Arc::new(SearchContext::detached(0));
                let mut dpll = Dpll::root(cnf, RandomPick::new(seed as u64), Never, ctx, 0);
                black_box(dpll.run());
            }
        });
    });

    group.bench_function("First literal", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let ctx = Arc::new(SearchContext::detached(0));
                let mut dpll = Dpll::root(cnf, FirstLiteral, Never, ctx, 0);
                black_box(dpll.run());
            }
        });
    });

    group.finish();

    let mut group = c.benchmark_group("uf50 - Restarts");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("Never", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let ctx = Arc::new(SearchContext::detached(0));
                let mut dpll = Dpll::root(cnf, RandomPick::new(1), Never, ctx, 0);
                black_box(dpll.run());
            }
        });
    });

    group.bench_function("Timed geometric (1ms, x3)", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let ctx = Arc::new(SearchContext::detached(0));
                let restarter = TimedGeometric::new(Duration::from_millis(1), 3);
                let mut dpll = Dpll::root(cnf, RandomPick::new(1), restarter, ctx, 0);
                black_box(dpll.run());
            }
        });
    });

    group.finish();

    let mut group = c.benchmark_group("uf50 - Parallelism");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for (workers, decision_threads) in [(1, 0), (2, 0), (4, 0), (1, 2), (2, 2)] {
        let name = format!("{workers} workers, {decision_threads} forks");
        group.bench_function(name, |b| {
            b.iter(|| {
                for cnf in &cnfs {
                    let config = Config {
                        workers,
                        decision_threads,
                        seed: Some(7),
                        ..Config::default()
                    };
                    black_box(Portfolio::new(cnf.clone(), config).run());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_random_3sat);

criterion_main!(benches);
