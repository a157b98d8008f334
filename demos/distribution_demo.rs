use std::hash::BuildHasher;
use std::hash::RandomState;

use chain_index::HashIndex;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "items", default_value_t = 10_000)]
    items: usize,

    #[arg(short = 'b', long = "buckets", default_value_t = 4096)]
    buckets: usize,

    #[arg(short = 'g', long = "granularity", default_value_t = 1024)]
    granularity: usize,

    /// Hash only the low bits of each value so chains pile up.
    #[arg(long = "clustered", default_value_t = false)]
    clustered: bool,
}

fn main() {
    let args = Args::parse();

    if !args.buckets.is_power_of_two() {
        eprintln!("--buckets must be a power of two, got {}", args.buckets);
        std::process::exit(2);
    }
    if args.granularity == 0 {
        eprintln!("--granularity must be positive");
        std::process::exit(2);
    }

    println!(
        "Creating HashIndex with {} buckets, granularity {}",
        args.buckets, args.granularity
    );

    let state = RandomState::new();
    let mut index: HashIndex<u32, u64> = HashIndex::with_sizes(args.buckets, args.granularity);
    index.set_granularity(args.granularity);

    println!("Inserting {} positions...", args.items);
    for i in 0..args.items {
        let key = if args.clustered { i % 16 } else { i };
        index.insert(state.hash_one(key as u64), i as u32);
    }

    println!(
        "Index chain grew to {} slots ({} bytes total)",
        index.index_chain_size(),
        index.allocated_bytes()
    );

    index.chain_length_histogram().print();
    index.debug_stats().print();
    println!(
        "Distribution score: {}%",
        index.compute_distribution_percentage()
    );
}
