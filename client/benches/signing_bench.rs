// Signing and encoding benchmarks for the client.
//
// Covers Ed25519 key generation, raw signing and verification, body
// encoding, and building a multi-signature transfer.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use shardline_client::transaction::{AccountAmount, CryptoTransferBody, TransactionBody, TransactionData};
use shardline_client::{AccountId, Connection, Emulator, SecretKey, Signer, TransactionId};

fn sample_body(legs: usize) -> TransactionBody {
    let transfers = (0..legs)
        .map(|i| AccountAmount {
            account_id: AccountId::simple(1_000 + i as i64),
            amount: if i == 0 { -((legs as i64 - 1) * 10) } else { 10 },
        })
        .collect();
    TransactionBody {
        transaction_id: TransactionId::generate(AccountId::simple(2)),
        node_account_id: AccountId::simple(3),
        transaction_fee: 10,
        valid_duration_seconds: 120,
        generate_record: false,
        memo: "bench".to_string(),
        data: TransactionData::CryptoTransfer(CryptoTransferBody { transfers }),
    }
}

fn bench_key_generation(c: &mut Criterion) {
    c.bench_function("ed25519/key_generate", |b| {
        b.iter(SecretKey::generate);
    });
}

fn bench_sign_and_verify(c: &mut Criterion) {
    let key = SecretKey::generate();
    let message = sample_body(2).to_bytes().unwrap();
    let signature = key.sign(&message);
    let public = key.public();

    c.bench_function("ed25519/sign_body", |b| {
        b.iter(|| key.sign(&message));
    });
    c.bench_function("ed25519/verify_body", |b| {
        b.iter(|| public.verify(&message, &signature));
    });
}

fn bench_body_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("body/encode");
    for legs in [2, 10, 50] {
        let body = sample_body(legs);
        group.throughput(Throughput::Elements(legs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(legs), &body, |b, body| {
            b.iter(|| body.to_bytes().unwrap());
        });
    }
    group.finish();
}

fn bench_build_signed_transfer(c: &mut Criterion) {
    let connection = Connection::with_channel(Emulator::default());
    let keys: Vec<SecretKey> = (0..3).map(|_| SecretKey::generate()).collect();

    c.bench_function("transaction/build_and_sign_x3", |b| {
        b.iter(|| {
            let mut tx = connection
                .crypto_transfer()
                .operator(AccountId::simple(2))
                .node(AccountId::simple(3))
                .transfer(AccountId::simple(2), -100)
                .transfer(AccountId::simple(5), 100);
            for key in &keys {
                tx = tx.sign(key as &dyn Signer).unwrap();
            }
            tx
        });
    });
}

criterion_group!(
    benches,
    bench_key_generation,
    bench_sign_and_verify,
    bench_body_encoding,
    bench_build_signed_transfer,
);
criterion_main!(benches);
