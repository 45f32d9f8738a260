//! Known metropolitan regions used to make synthetic cafés look local.

use cafefinder_core::{Bounds, Coordinates};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Phone-number layout of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneFormat {
    France,
    UnitedKingdom,
    UnitedStates,
    India,
    Japan,
    Placeholder,
}

impl PhoneFormat {
    /// Random number in this region's layout.
    pub fn generate<R: Rng>(self, rng: &mut R) -> String {
        match self {
            PhoneFormat::France => format!(
                "+33 1 {} {} {} {}",
                rng.random_range(10..100),
                rng.random_range(10..100),
                rng.random_range(10..100),
                rng.random_range(10..100)
            ),
            PhoneFormat::UnitedKingdom => format!(
                "+44 20 {} {}",
                rng.random_range(1000..10000),
                rng.random_range(1000..10000)
            ),
            PhoneFormat::UnitedStates => format!(
                "+1 ({}) {}-{}",
                rng.random_range(100..1000),
                rng.random_range(100..1000),
                rng.random_range(1000..10000)
            ),
            PhoneFormat::India => format!(
                "+91 {}-{}",
                rng.random_range(10000..100000),
                rng.random_range(10000..100000)
            ),
            PhoneFormat::Japan => format!(
                "+81 3-{}-{}",
                rng.random_range(1000..10000),
                rng.random_range(1000..10000)
            ),
            PhoneFormat::Placeholder => format!(
                "+1 (555) {}-{}",
                rng.random_range(100..1000),
                rng.random_range(1000..10000)
            ),
        }
    }
}

/// A city with a bounding box and neighbourhood names.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub bounds: Option<Bounds>,
    pub city: &'static str,
    pub areas: &'static [&'static str],
    pub phone: PhoneFormat,
}

impl Region {
    /// Random neighbourhood name.
    pub fn random_area<R: Rng>(&self, rng: &mut R) -> &'static str {
        self.areas.choose(rng).copied().unwrap_or(self.city)
    }
}

const fn bounds(south: f64, north: f64, west: f64, east: f64) -> Option<Bounds> {
    Some(Bounds {
        north,
        south,
        east,
        west,
    })
}

/// Regions checked in order; the first containing box wins.
pub static REGIONS: &[Region] = &[
    Region {
        bounds: bounds(48.8, 48.9, 2.2, 2.5),
        city: "Paris, France",
        areas: &[
            "Champs-Élysées",
            "Montmartre",
            "Le Marais",
            "Saint-Germain",
            "Bastille",
            "Belleville",
            "Pigalle",
            "République",
            "Opéra",
            "Louvre",
        ],
        phone: PhoneFormat::France,
    },
    Region {
        bounds: bounds(51.4, 51.6, -0.3, 0.1),
        city: "London, UK",
        areas: &[
            "Covent Garden",
            "Soho",
            "Camden",
            "Shoreditch",
            "Notting Hill",
            "Kensington",
            "Westminster",
            "Borough",
            "Canary Wharf",
            "Fitzrovia",
        ],
        phone: PhoneFormat::UnitedKingdom,
    },
    Region {
        bounds: bounds(40.6, 40.9, -74.1, -73.7),
        city: "New York, NY",
        areas: &[
            "Manhattan",
            "Brooklyn Heights",
            "SoHo",
            "Greenwich Village",
            "Upper East Side",
            "Tribeca",
            "Chelsea",
            "Midtown",
            "Lower East Side",
            "Williamsburg",
        ],
        phone: PhoneFormat::UnitedStates,
    },
    Region {
        bounds: bounds(28.4, 28.8, 76.8, 77.3),
        city: "New Delhi, India",
        areas: &[
            "Connaught Place",
            "Khan Market",
            "Karol Bagh",
            "Lajpat Nagar",
            "Saket",
            "Vasant Kunj",
            "Dwarka",
            "Rohini",
            "Janakpuri",
            "Rajouri Garden",
        ],
        phone: PhoneFormat::India,
    },
    Region {
        bounds: bounds(37.7, 37.8, -122.5, -122.3),
        city: "San Francisco, CA",
        areas: &[
            "Mission District",
            "Castro",
            "Haight-Ashbury",
            "North Beach",
            "Financial District",
            "SOMA",
            "Nob Hill",
            "Chinatown",
            "Marina",
            "Presidio",
        ],
        phone: PhoneFormat::UnitedStates,
    },
    Region {
        bounds: bounds(35.6, 35.8, 139.6, 139.8),
        city: "Tokyo, Japan",
        areas: &[
            "Shibuya",
            "Shinjuku",
            "Harajuku",
            "Ginza",
            "Akihabara",
            "Roppongi",
            "Asakusa",
            "Ikebukuro",
            "Ueno",
            "Odaiba",
        ],
        phone: PhoneFormat::Japan,
    },
];

/// Fallback for points outside every known region.
pub static UNKNOWN_REGION: Region = Region {
    bounds: None,
    city: "Unknown Location",
    areas: &[
        "Downtown",
        "City Center",
        "Main Street",
        "Central District",
        "Old Town",
        "New Town",
        "Market Square",
        "Business District",
    ],
    phone: PhoneFormat::Placeholder,
};

/// Region whose box contains `point`, or [`UNKNOWN_REGION`].
pub fn region_for(point: Coordinates) -> &'static Region {
    REGIONS
        .iter()
        .find(|region| region.bounds.is_some_and(|b| b.contains(point)))
        .unwrap_or(&UNKNOWN_REGION)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_region_lookup() {
        assert_eq!(region_for(Coordinates::new(48.8566, 2.3522)).city, "Paris, France");
        assert_eq!(region_for(Coordinates::new(51.5074, -0.1278)).city, "London, UK");
        assert_eq!(region_for(Coordinates::new(35.68, 139.76)).city, "Tokyo, Japan");
        assert_eq!(region_for(Coordinates::new(0.0, 0.0)).city, "Unknown Location");
    }

    #[test]
    fn test_region_box_is_inclusive() {
        assert_eq!(region_for(Coordinates::new(37.7, -122.5)).city, "San Francisco, CA");
    }

    #[test]
    fn test_phone_formats() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let fr = PhoneFormat::France.generate(&mut rng);
        assert!(fr.starts_with("+33 1 "));
        assert_eq!(fr.split(' ').count(), 6);

        let us = PhoneFormat::UnitedStates.generate(&mut rng);
        assert!(us.starts_with("+1 ("));

        let placeholder = PhoneFormat::Placeholder.generate(&mut rng);
        assert!(placeholder.starts_with("+1 (555) "));

        let jp = PhoneFormat::Japan.generate(&mut rng);
        assert!(jp.starts_with("+81 3-"));
    }

    #[test]
    fn test_random_area_belongs_to_region() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let region = region_for(Coordinates::new(28.6, 77.2));
        let area = region.random_area(&mut rng);
        assert!(region.areas.contains(&area));
    }
}
