use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use buffer_collections::FixedMap;
use buffer_collections::HashTable;
use buffer_collections::InsertOutcome;
use buffer_collections::capacity::Indexing;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Capacity hint passed to the table constructors.
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the inserted values to remove again before reporting.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.25)]
    remove_fraction: f64,

    /// Use set sizing (power-of-two slots, mask indexing) instead of map
    /// sizing.
    #[arg(long)]
    set_sizing: bool,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = if args.set_sizing {
        HashTable::for_set(args.target_capacity)
    } else {
        HashTable::for_map(args.target_capacity)
    };

    println!(
        "Actual capacity: {} slots, limit {} ({:?} indexing)",
        table.capacity(),
        table.limit(),
        table.indexing()
    );
    println!("Filling table with u64 values until it rejects one...");

    let mut num_rejected = 0;
    let num_values = table.capacity() as u64;
    for value in 0..num_values {
        match table.insert(hash_u64(value), value, |a, b| a == b) {
            InsertOutcome::Inserted => {}
            InsertOutcome::Overwritten(_) => {
                panic!("Value already exists in table: {}", value);
            }
            InsertOutcome::Rejected(_) => num_rejected += 1,
        }
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );
    println!(
        "Number of rejected inserts: {} ({:.02}%)",
        num_rejected,
        num_rejected as f64 / num_values as f64 * 100.0
    );

    let to_remove = (table.len() as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    for value in 0..to_remove {
        table.remove(hash_u64(value), |&v| v == value);
    }
    println!("Removed {} values, leaving tombstones behind", to_remove);

    println!("Probe histogram (distance: count):");
    for (distance, count) in table.probe_histogram().iter().enumerate() {
        if *count != 0 {
            println!("  {:>4}: {}", distance, count);
        }
    }
    table.debug_stats().print();

    // Identity hashing of sequential keys produces no collisions at all.
    let mut map: FixedMap<u64, u64> = FixedMap::with_capacity(args.target_capacity);
    for key in 0..map.limit() as u64 {
        if map.insert(key, key * 2).is_err() {
            break;
        }
    }
    println!();
    println!(
        "FixedMap with identity keys: {} entries in {} slots",
        map.len(),
        map.capacity()
    );
    map.table().debug_stats().print();

    if table.indexing() == Indexing::Mask {
        println!("(mask indexing: slot count is a power of two)");
    }
}
