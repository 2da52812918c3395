use data_loader::ItemCatalog;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/demo");

    println!("Loading feed fixtures...\n");

    let start = Instant::now();
    let catalog = match ItemCatalog::load_from_dir(data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to load fixtures: {e}");
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    let (items, viewers, interactions) = catalog.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {}", items);
    println!("Viewers with follows: {}", viewers);
    println!("Interactions: {}", interactions);
}
