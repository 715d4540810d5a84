use clap::Parser;
use prime_hash::HashTable;
use prime_hash::TableError;

#[derive(Parser, Debug)]
struct Args {
    /// Number of string keys to insert.
    #[arg(short = 'k', long = "keys", default_value_t = 1000)]
    keys: usize,

    /// Erase every n-th key after filling (0 disables erasing).
    #[arg(short = 'e', long = "erase-every", default_value_t = 0)]
    erase_every: usize,
}

fn main() {
    let args = Args::parse();

    let keys: Vec<String> = (0..args.keys).map(|i| format!("key_{i:08}")).collect();
    let values: Vec<Vec<u8>> = (0..args.keys)
        .map(|i| (i as u64).to_le_bytes().to_vec())
        .collect();

    let mut table = HashTable::new();
    println!("Initial capacity: {}", table.capacity());
    println!("Filling table with {} string keys...", args.keys);

    let mut growths = 0;
    let mut failures = 0;
    for (key, value) in keys.iter().zip(&values) {
        let before = table.capacity();
        match table.insert(key, value) {
            Ok(()) => {}
            Err(TableError::DuplicateKey) => panic!("Key inserted twice: {key}"),
            Err(err) => {
                eprintln!("insert {key} failed: {err}");
                failures += 1;
            }
        }
        if table.capacity() != before {
            growths += 1;
            println!("  grew {} -> {} at {} entries", before, table.capacity(), table.len());
        }
    }

    if args.erase_every > 0 {
        let erased = keys
            .iter()
            .step_by(args.erase_every)
            .filter(|key| table.erase(*key).is_ok())
            .count();
        println!("Erased {} keys", erased);
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Final load factor: {:.2}% after {} growths",
        table.load_factor() * 100.0,
        growths
    );

    table.print_probe_histogram();
    table.debug_stats().print();
    println!("Number of failed inserts: {}", failures);
}
