//! Benchmarks comparing SegmentedList and std::Vec.
//!
//! Run with: `cargo bench`

use recycled_list::SegmentedList;

fn main() {
    divan::main();
}

const LENS: &[usize] = &[1_000, 100_000];

#[divan::bench(args = LENS)]
fn push_segmented(bencher: divan::Bencher, len: usize) {
    bencher.bench(|| {
        let mut list: SegmentedList<u64> = SegmentedList::new();
        for i in 0..len as u64 {
            list.push(i);
        }
        list
    });
}

#[divan::bench(args = LENS)]
fn push_vec(bencher: divan::Bencher, len: usize) {
    bencher.bench(|| {
        let mut vec: Vec<u64> = Vec::new();
        for i in 0..len as u64 {
            vec.push(i);
        }
        vec
    });
}

#[divan::bench(args = LENS)]
fn get_segmented(bencher: divan::Bencher, len: usize) {
    let list: SegmentedList<u64> = (0..len as u64).collect();
    bencher.bench(|| {
        let mut sum = 0u64;
        for i in 0..len {
            sum = sum.wrapping_add(list[i]);
        }
        sum
    });
}

#[divan::bench(args = LENS)]
fn get_vec(bencher: divan::Bencher, len: usize) {
    let vec: Vec<u64> = (0..len as u64).collect();
    bencher.bench(|| {
        let mut sum = 0u64;
        for i in 0..len {
            sum = sum.wrapping_add(vec[i]);
        }
        sum
    });
}

#[divan::bench(args = LENS)]
fn iterate_segmented(bencher: divan::Bencher, len: usize) {
    let list: SegmentedList<u64> = (0..len as u64).collect();
    bencher.bench(|| list.iter().copied().fold(0u64, u64::wrapping_add));
}

#[divan::bench(args = LENS)]
fn iterate_vec(bencher: divan::Bencher, len: usize) {
    let vec: Vec<u64> = (0..len as u64).collect();
    bencher.bench(|| vec.iter().copied().fold(0u64, u64::wrapping_add));
}

#[divan::bench(args = LENS)]
fn index_of_miss_segmented(bencher: divan::Bencher, len: usize) {
    let list: SegmentedList<u64> = (0..len as u64).collect();
    bencher.bench(|| list.index_of(&u64::MAX));
}

#[divan::bench(args = LENS)]
fn index_of_miss_vec(bencher: divan::Bencher, len: usize) {
    let vec: Vec<u64> = (0..len as u64).collect();
    bencher.bench(|| vec.iter().position(|&x| x == u64::MAX));
}

#[divan::bench]
fn sort_segmented(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| {
            let mut list: SegmentedList<u64> = SegmentedList::new();
            let mut state = 0x9e3779b97f4a7c15u64;
            for _ in 0..100_000 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                list.push(state);
            }
            list
        })
        .bench_values(|mut list| {
            list.sort();
            list
        });
}

#[divan::bench]
fn sort_vec(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| {
            let mut vec: Vec<u64> = Vec::new();
            let mut state = 0x9e3779b97f4a7c15u64;
            for _ in 0..100_000 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                vec.push(state);
            }
            vec
        })
        .bench_values(|mut vec| {
            vec.sort_unstable();
            vec
        });
}
