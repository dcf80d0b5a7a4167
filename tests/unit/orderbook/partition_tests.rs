// Unit tests for instrument partitioning across shards

use lighter_wall_monitor::orderbook::{partition, Instrument};

fn instruments(n: u32) -> Vec<Instrument> {
    (0..n).map(|i| Instrument::new(i, format!("M{}", i))).collect()
}

#[test]
fn test_shard_count_is_ceiling_and_cover_is_exact() {
    for n in [0u32, 1, 49, 50, 51, 99, 100, 101, 130, 250] {
        for limit in [1usize, 7, 50, 100] {
            let all = instruments(n);
            let shards = partition(&all, limit);

            assert_eq!(shards.len(), (n as usize).div_ceil(limit), "n={} limit={}", n, limit);
            assert!(shards.iter().all(|s| !s.instruments.is_empty() && s.instruments.len() <= limit));

            let flattened: Vec<_> = shards.iter().flat_map(|s| s.instruments.clone()).collect();
            assert_eq!(flattened, all);

            let ids: Vec<_> = shards.iter().map(|s| s.shard_id).collect();
            assert_eq!(ids, (1..=shards.len()).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_130_instruments_by_100() {
    let sizes: Vec<_> = partition(&instruments(130), 100)
        .iter()
        .map(|s| s.instruments.len())
        .collect();
    assert_eq!(sizes, vec![100, 30]);
}
