//! Synthetic café generator used when real sources fail or come back thin.

use async_trait::async_trait;
use cafefinder_core::Coordinates;
use cafefinder_core::config::SyntheticConfig;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::CafeProvider;
use crate::errors::PlaceSearchError;
use crate::osm::realistic_rating;
use crate::regions::region_for;
use crate::types::{Cafe, DataSource};

const CAFE_NAMES: [&str; 20] = [
    "Coffee Central",
    "The Daily Grind",
    "Brew & Beans",
    "Café Delight",
    "Morning Roast",
    "Urban Bean",
    "Cozy Corner Café",
    "Artisan Coffee House",
    "Bean There",
    "Roast Masters",
    "The Coffee Lab",
    "Espresso Express",
    "Caffeine Corner",
    "Steam & Beans",
    "Local Roasters",
    "The Grind House",
    "Coffee Culture",
    "Bean Counter",
    "Drip Drop Café",
    "Percolator Place",
];

const STREET_NAMES: [&str; 15] = [
    "Main Street",
    "Coffee Avenue",
    "Espresso Lane",
    "Latte Street",
    "Cappuccino Road",
    "Mocha Boulevard",
    "Comfort Street",
    "Craft Avenue",
    "Bean Street",
    "Roast Road",
    "Grind Avenue",
    "Steam Street",
    "Brew Boulevard",
    "Café Circle",
    "Java Junction",
];

/// Generates plausible cafés scattered around the search centre.
///
/// Output is reproducible when a seed is configured: the same seed and centre
/// always yield the same cafés.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    config: SyntheticConfig,
    source: DataSource,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(SyntheticConfig::default())
    }
}

impl SyntheticProvider {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            source: DataSource::EnhancedMock,
        }
    }

    /// Same generator reporting a different source label.
    pub fn labelled(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    /// RNG for one request around `centre`.
    pub fn request_rng(&self, centre: Coordinates) -> ChaCha8Rng {
        seeded_rng(self.config.seed, centre)
    }

    /// Cafés within `radius_m` of `centre`, nearest not guaranteed first.
    pub fn generate(&self, centre: Coordinates, radius_m: u32) -> Vec<Cafe> {
        let mut rng = self.request_rng(centre);
        self.generate_with(centre, radius_m, &mut rng)
    }

    pub fn generate_with<R: Rng>(
        &self,
        centre: Coordinates,
        radius_m: u32,
        rng: &mut R,
    ) -> Vec<Cafe> {
        let region = region_for(centre);
        let max_offset = self.config.max_offset_deg;
        let mut cafes = Vec::new();

        for i in 0..self.config.attempts {
            let position = centre.offset(
                random_offset(rng, max_offset),
                random_offset(rng, max_offset),
            );
            let distance = centre.distance_to(&position);
            if distance > f64::from(radius_m) {
                continue;
            }

            let name = CAFE_NAMES[i % CAFE_NAMES.len()];
            let street_number = rng.random_range(100..1099);
            let street = STREET_NAMES.choose(rng).copied().unwrap_or("Main Street");
            let area = region.random_area(rng);

            let mut cafe = Cafe::new(
                format!("enhanced_mock_{}", i + 1),
                name,
                position,
                format!("{street_number} {street}, {area}, {}", region.city),
                centre,
            );
            cafe.rating = Some(realistic_rating(rng));
            cafe.price_level = Some(rng.random_range(1..=4));
            cafe.open_now = Some(rng.random_bool(0.85));
            cafe.phone_number = rng
                .random_bool(0.7)
                .then(|| region.phone.generate(rng));
            cafe.website = rng.random_bool(0.4).then(|| website_for(name));

            cafes.push(cafe);
        }

        tracing::debug!(
            "Generated {} synthetic cafés around {} ({})",
            cafes.len(),
            centre,
            region.city
        );

        cafes
    }
}

#[async_trait]
impl CafeProvider for SyntheticProvider {
    fn source(&self) -> DataSource {
        self.source
    }

    async fn nearby_cafes(
        &self,
        centre: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Cafe>, PlaceSearchError> {
        Ok(self.generate(centre, radius_m))
    }
}

fn random_offset<R: Rng>(rng: &mut R, max_offset: f64) -> f64 {
    if max_offset > 0.0 {
        rng.random_range(-max_offset..max_offset)
    } else {
        0.0
    }
}

/// `https://<letters of the name>.com`
fn website_for(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();
    format!("https://{slug}.com")
}

/// Seeded RNG mixed with the centre, or a fresh one from the thread RNG.
fn seeded_rng(seed: Option<u64>, centre: Coordinates) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            let mixed = seed ^ centre.lat.to_bits().rotate_left(17) ^ centre.lng.to_bits();
            ChaCha8Rng::seed_from_u64(mixed)
        }
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}
