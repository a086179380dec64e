use seekgits_crypto::{decrypt, encrypt, FileKey};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let key = FileKey::generate();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&key), divan::black_box(&data)));
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let key = FileKey::generate();
    let data = make_data(size);
    let frame = encrypt(&key, &data);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&key), divan::black_box(&frame)).unwrap());
}

fn main() {
    divan::main();
}
