use criterion::{criterion_group, criterion_main, Criterion};
use ledger_core::{mine::proof_of_work_parallel, pow::proof_of_work, valid_chain, Ledger};
use std::hint::black_box;

fn bench_pow(c: &mut Criterion) {
    c.bench_function("proof_of_work_from_genesis", |b| {
        b.iter(|| proof_of_work(black_box(100)));
    });

    c.bench_function("proof_of_work_parallel_from_genesis", |b| {
        b.iter(|| proof_of_work_parallel(black_box(100)));
    });

    let mut ledger = Ledger::new();
    for i in 0..5u64 {
        ledger.new_transaction(format!("alice-{i}"), "bob", i);
        let proof = proof_of_work(ledger.last_block().proof);
        ledger.new_block(proof, None);
    }
    let chain = ledger.chain().to_vec();
    c.bench_function("valid_chain_6_blocks", |b| {
        b.iter(|| valid_chain(black_box(&chain)));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
