//! Favorites example for cityfinder-core
//!
//! Persists favorites in a directory, reopens them, and filters the list.

use cityfinder_core::prelude::*;

fn main() -> Result<()> {
    println!("=== cityfinder favorites ===\n");

    let cities = vec![
        City::new(3128760, "Barcelona", "ES", Coordinates::new(41.38879, 2.15899)),
        City::new(3435910, "Buenos Aires", "AR", Coordinates::new(-34.613152, -58.377232)),
        City::new(2950159, "Berlin", "DE", Coordinates::new(52.524368, 13.41053)),
        City::new(3117735, "Madrid", "ES", Coordinates::new(40.4165, -3.70256)),
    ];

    let dir = std::env::temp_dir().join("cityfinder-favorites-demo");
    {
        let mut coordinator = CityCoordinator::new(FavoritesStore::new(DirStore::new(&dir)));
        coordinator.load_cities(cities.clone());
        coordinator.toggle_favorite(3128760);
        coordinator.toggle_favorite(3435910);
        println!("Saved {} favorites to {}", coordinator.favorites_count(), dir.display());
    }

    let mut coordinator = CityCoordinator::new(FavoritesStore::new(DirStore::new(&dir)));
    coordinator.load_cities(cities);
    coordinator.set_favorites_only(true);

    for prefix in ["B", "Ba"] {
        coordinator.set_query(prefix);
        let names: Vec<String> = coordinator.result().iter().map(City::display_name).collect();
        println!("favorites matching {prefix:?}: {names:?}");
    }

    coordinator.clear_favorites();
    println!("\nCleared; {} favorites left", coordinator.favorites_count());
    Ok(())
}
