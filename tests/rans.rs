// rANS exactness: normalisation always sums to SCALE, and encode/decode are
// bit-exact inverses for any byte sequence.

use brio::rans::{
    build_frequencies, build_symbol_lookup, cumulative, decode, encode, normalise, SCALE,
};

fn assert_roundtrip(data: &[u8]) {
    let freqs = normalise(&build_frequencies(data));
    assert_eq!(freqs.iter().sum::<u32>(), SCALE, "normalisation not exact");
    let cum = cumulative(&freqs);
    assert_eq!(cum[256], SCALE);
    let lookup = build_symbol_lookup(&freqs, &cum);
    let payload = encode(data, &freqs, &cum);
    let decoded = decode(&payload, data.len(), &freqs, &cum, &lookup).unwrap();
    assert_eq!(decoded, data);
}

/// Deterministic pseudo-random bytes (xorshift), no RNG dependency needed.
fn pseudo_random(len: usize, mut seed: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        out.push(seed as u8);
    }
    out
}

#[test]
fn empty_input() {
    assert_roundtrip(b"");
}

#[test]
fn single_byte() {
    assert_roundtrip(b"z");
}

#[test]
fn short_english() {
    assert_roundtrip(b"To install packages, use pip: `pip install numpy`");
}

#[test]
fn all_byte_values() {
    let data: Vec<u8> = (0u8..=255).collect();
    assert_roundtrip(&data);
}

#[test]
fn pseudo_random_streams() {
    for (len, seed) in [(16usize, 1u64), (255, 7), (1024, 42), (8192, 1234)] {
        assert_roundtrip(&pseudo_random(len, seed));
    }
}

#[test]
fn uniform_runs() {
    assert_roundtrip(&vec![0xAB; 5000]);
}

#[test]
fn heavily_skewed_distribution() {
    // One dominant symbol plus a sprinkle of others: exercises the
    // remainder-distribution path of normalise in both directions.
    let mut data = vec![b'a'; 100_000];
    data.extend_from_slice(b"bcdefghij");
    assert_roundtrip(&data);

    let freqs = normalise(&build_frequencies(&data));
    assert_eq!(freqs.iter().sum::<u32>(), SCALE);
    assert!(freqs.iter().all(|&f| f >= 1), "no frequency may reach zero");
}

#[test]
fn normalise_is_deterministic() {
    let data = pseudo_random(512, 99);
    let a = normalise(&build_frequencies(&data));
    let b = normalise(&build_frequencies(&data));
    assert_eq!(a.to_vec(), b.to_vec());
}

#[test]
fn decode_respects_requested_count() {
    let data = b"abcabcabc";
    let freqs = normalise(&build_frequencies(data));
    let cum = cumulative(&freqs);
    let lookup = build_symbol_lookup(&freqs, &cum);
    let payload = encode(data, &freqs, &cum);
    // Decoding fewer symbols than encoded yields exactly that prefix.
    let partial = decode(&payload, 3, &freqs, &cum, &lookup).unwrap();
    assert_eq!(partial, b"abc");
}
