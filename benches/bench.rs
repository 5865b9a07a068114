use rand::{seq::SliceRandom, Rng};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use level_forest::{AugmentedTree, Config, Manager, Record, Scope};

const COUNTS: [usize; 2] = [1000, 10000];
const SCALE: usize = 50;

fn records(count: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (1..=count as u64)
        .map(|id| {
            Record::new(id, 1, rng.gen_range(0..SCALE)).with_level(rng.gen_range(0..count as u64))
        })
        .collect()
}

fn tree_of(records: &[Record]) -> AugmentedTree {
    let mut tree = AugmentedTree::new(SCALE);
    for r in records {
        tree.insert(r).unwrap();
    }
    tree
}

fn benchmark_tree(c: &mut Criterion) {
    for count in COUNTS {
        let records = records(count);

        c.bench_function(format!("tree insert {count}").as_str(), |b| {
            b.iter(|| black_box(tree_of(&records)));
        });

        c.bench_function(format!("tree remove {count}").as_str(), |b| {
            let tree = tree_of(&records);
            let mut shuffled = records.clone();
            shuffled.shuffle(&mut rand::thread_rng());

            b.iter(|| {
                let mut tree = tree.clone();
                for r in &shuffled {
                    tree.remove(r).unwrap();
                }
                tree
            });
        });

        c.bench_function(format!("tree merge {count}").as_str(), |b| {
            let (left, right) = records.split_at(count / 2);
            let (left, right) = (tree_of(left), tree_of(right));

            b.iter(|| AugmentedTree::merge(left.clone(), right.clone()).unwrap());
        });

        c.bench_function(format!("tree queries {count}").as_str(), |b| {
            let tree = tree_of(&records);

            b.iter(|| {
                for m in (1..count).step_by(count / 10) {
                    black_box(tree.average_level_of_top(m).unwrap());
                    black_box(tree.score_bounds_among_top(m % SCALE, m));
                    black_box(tree.percent_with_score_in_range(
                        m as u64 / 2,
                        m as u64,
                        m % SCALE,
                    ));
                }
            });
        });
    }
}

fn benchmark_manager(c: &mut Criterion) {
    for count in COUNTS {
        c.bench_function(format!("manager add and level {count}").as_str(), |b| {
            b.iter(|| {
                let mut manager = Manager::new(Config::new(16, SCALE)).unwrap();
                for id in 1..=count as i64 {
                    manager
                        .add_record(id, id % 16 + 1, id % SCALE as i64)
                        .unwrap();
                    manager.increase_level(id, id % 97 + 1).unwrap();
                }
                for g in 2..=16 {
                    manager.merge_groups(1, g).unwrap();
                }
                black_box(manager.average_level_of_top(Scope::Group(3), 10).unwrap())
            });
        });
    }
}

criterion_group!(benches, benchmark_tree, benchmark_manager);
criterion_main!(benches);
