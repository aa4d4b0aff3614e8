//! Basic usage of cityfinder-core
//!
//! Builds a sorted index from a handful of cities and runs prefix queries
//! through the coordinator.

use cityfinder_core::prelude::*;

fn main() -> Result<()> {
    println!("=== cityfinder basic usage ===\n");

    let records = r#"[
        {"country":"US","name":"Alabama","_id":1,"coord":{"lon":-86.79113,"lat":32.806671}},
        {"country":"US","name":"Albuquerque","_id":2,"coord":{"lon":-106.65014,"lat":35.08449}},
        {"country":"US","name":"Anaheim","_id":3,"coord":{"lon":-117.91449,"lat":33.83659}},
        {"country":"US","name":"Arizona","_id":4,"coord":{"lon":-111.43122,"lat":33.729759}},
        {"country":"AU","name":"Sydney","_id":5,"coord":{"lon":151.20732,"lat":-33.86785}}
    ]"#;
    let cities = cityfinder_core::source::decode_records(records.as_bytes())?;

    let mut coordinator = CityCoordinator::new(FavoritesStore::new(MemoryStore::new()));
    coordinator.subscribe(|result| println!("  (published {} results)", result.len()));
    coordinator.load_cities(cities);
    println!("Loaded {} cities\n", coordinator.total_count());

    for prefix in ["A", "Al", "s", "x"] {
        println!("--- prefix {prefix:?} ---");
        coordinator.set_query(prefix);
        for city in coordinator.result().iter() {
            println!("  {:<20} {}", city.display_name(), city.coordinates_label());
        }
        println!();
    }

    // Lower-level access: query the index directly.
    let index = coordinator.index();
    println!("lower_bound(\"an\") = {}", index.lower_bound("an"));
    println!("prefix_range(\"a\") = {:?}", index.prefix_range("a"));

    Ok(())
}
