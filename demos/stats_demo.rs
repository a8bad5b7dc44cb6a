use clap::Parser;
use fixtab::ChainingTable;
use fixtab::OpenAddressingTable;
use fixtab::stats::print_histogram;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    /// Slot count of the open-addressing table, rounded up to a power of two.
    #[arg(short = 'c', long = "capacity", default_value_t = 1024)]
    capacity: usize,

    /// Fraction of the capacity to fill, between 0 and 1.
    #[arg(short = 'l', long = "load", default_value_t = 0.9)]
    load: f64,

    /// Fraction of the inserted keys to remove again.
    #[arg(short = 'r', long = "remove", default_value_t = 0.25)]
    remove: f64,

    /// Bucket count of the chaining table; defaults to the capacity.
    #[arg(short = 'b', long = "buckets")]
    buckets: Option<usize>,
}

fn main() -> Result<(), fixtab::Error> {
    let args = Args::parse();
    let capacity = args.capacity.max(1).next_power_of_two();
    let buckets = args.buckets.unwrap_or(capacity);
    let count = ((capacity as f64 * args.load.clamp(0.0, 1.0)) as usize).min(capacity);

    println!("Open-addressing capacity: {capacity}, chaining buckets: {buckets}");
    println!("Inserting {count} random keys, removing {:.0}%", args.remove * 100.0);

    let mut open = OpenAddressingTable::new(capacity)?;
    let mut chained = ChainingTable::new(buckets)?;

    let mut rng = SmallRng::seed_from_u64(OsRng.try_next_u64().unwrap_or(0));
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let key: u32 = rng.random();
        if open.try_emplace(key, key).0 {
            chained.try_emplace(key, key);
            keys.push(key);
        }
    }

    let mut removed = 0;
    for &key in &keys {
        if rng.random_bool(args.remove.clamp(0.0, 1.0)) {
            open.remove(key);
            chained.remove(key);
            removed += 1;
        }
    }
    println!("Removed {removed} keys, {} remain", open.len());
    println!();

    open.statistics().print();
    print_histogram("Probe distance", &open.probe_histogram());
    println!();

    chained.statistics().print();
    print_histogram("Chain length", &chained.chain_histogram());

    Ok(())
}
