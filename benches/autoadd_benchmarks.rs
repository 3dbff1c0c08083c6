//! # cmus-autoadd Performance Benchmarks
//!
//! Every track change pays for one cache scan and one selection, so these
//! are the two paths measured here.
//!
//! ```bash
//! cargo bench
//! cargo bench cache_scan
//! cargo bench selection
//! ```

use std::hint::black_box;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cmus_autoadd::cache::{CacheLayout, CacheScanner, CacheWriter};
use cmus_autoadd::index::ArtistIndex;
use cmus_autoadd::library::LibrarySet;
use cmus_autoadd::selector::{Selector, SelectorConfig};

fn track_path(i: usize) -> String {
    format!("/music/Artist {:03}/Album {}/{i:05} - Song.flac", i / 25, i / 10)
}

/// Synthetic cache with `tracks` records, 25 per artist.
fn create_benchmark_cache(tracks: usize) -> Vec<u8> {
    let mut writer = CacheWriter::new(CacheLayout::native());
    for i in 0..tracks {
        let artist = format!("Artist {:03}", i / 25);
        let title = format!("Song {i:05}");
        let album = format!("Album {}", i / 10);
        writer.push_track(
            &track_path(i),
            180 + (i % 120) as i32,
            1_700_000_000 + i as i64,
            &[
                ("artist", artist.as_str()),
                ("album", album.as_str()),
                ("title", title.as_str()),
                ("genre", "Electronic"),
                ("date", "1998"),
            ],
        );
    }
    writer.into_bytes()
}

fn benchmark_cache_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_scan");
    let layout = CacheLayout::native();

    for size in [1_000, 10_000, 50_000] {
        let cache = create_benchmark_cache(size);
        group.bench_with_input(BenchmarkId::new("scan", size), &cache, |b, cache| {
            b.iter(|| CacheScanner::new(layout).scan(black_box(cache)))
        });

        // Library holding every other track.
        let library: LibrarySet = (0..size).step_by(2).map(track_path).collect();
        group.bench_with_input(BenchmarkId::new("scan_restricted", size), &cache, |b, cache| {
            b.iter(|| {
                CacheScanner::new(layout)
                    .restrict_to(Some(&library))
                    .scan(black_box(cache))
            })
        });
    }

    group.finish();
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let cache = create_benchmark_cache(10_000);
    let index: ArtistIndex = match CacheScanner::new(CacheLayout::native()).scan(&cache) {
        Ok(index) => index,
        Err(e) => panic!("benchmark cache did not scan: {e}"),
    };

    // Last.fm returns up to 100 similar artists; half of them are known.
    let ranking: Vec<String> = (0..100)
        .map(|i| if i % 2 == 0 { format!("Artist {:03}", i * 3) } else { format!("Stranger {i}") })
        .collect();
    let exists = |_: &Path| true;

    group.bench_function("select_most_similar", |b| {
        let selector = Selector::new(SelectorConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| selector.select(black_box(&ranking), &index, &mut rng, &exists))
    });

    group.bench_function("select_jump_out", |b| {
        let selector = Selector::new(SelectorConfig {
            jumpout_epsilon: 1.0,
            ..SelectorConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| selector.select(black_box(&ranking), &index, &mut rng, &exists))
    });

    group.finish();
}

criterion_group!(benches, benchmark_cache_scan, benchmark_selection);

criterion_main!(benches);
