//! Heuristics for turning sparse OpenStreetMap tags into café fields.
//!
//! OSM rarely carries ratings or price information, so the values filled in
//! here are partly synthetic. Address parts present in the tags always win
//! over generated ones.

use std::collections::BTreeMap;

use cafefinder_core::Coordinates;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::regions::region_for;

/// Tag map of an OSM element.
pub type Tags = BTreeMap<String, String>;

/// Ratings drawn for sources that do not provide one.
pub const REALISTIC_RATINGS: [f32; 13] = [
    3.2, 3.5, 3.7, 3.8, 4.0, 4.1, 4.2, 4.3, 4.4, 4.5, 4.6, 4.7, 4.8,
];

/// Price levels weighted towards the mid-range.
const WEIGHTED_PRICE_LEVELS: [u8; 8] = [1, 1, 2, 2, 2, 3, 3, 4];

const NAME_PREFIXES: [&str; 10] = [
    "The", "Café", "Coffee", "Bean", "Brew", "Roast", "Daily", "Morning", "Urban", "Local",
];

const NAME_SUFFIXES: [&str; 10] = [
    "House", "Shop", "Corner", "Central", "Roasters", "Grind", "Bean", "Café", "Kitchen", "Co.",
];

/// Address keys joined in order when present.
const ADDRESS_KEYS: [&[&str]; 7] = [
    &["addr:housenumber"],
    &["addr:street"],
    &["addr:suburb", "addr:neighbourhood"],
    &["addr:locality"],
    &["addr:city"],
    &["addr:state"],
    &["addr:postcode"],
];

pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";

/// First non-empty value among `keys`.
pub fn first_tag<'a>(tags: &'a Tags, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| tags.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// Human-readable address from `addr:*` tags, falling back to a generated one.
pub fn format_address<R: Rng>(tags: &Tags, position: Coordinates, rng: &mut R) -> String {
    let parts: Vec<&str> = ADDRESS_KEYS
        .iter()
        .filter_map(|keys| first_tag(tags, keys))
        .collect();

    if !parts.is_empty() {
        return parts.join(", ");
    }

    if let Some(full) = first_tag(tags, &["addr:full"]) {
        return full.to_string();
    }
    if let Some(place) = first_tag(tags, &["addr:place"]) {
        return place.to_string();
    }

    generated_address(position, rng)
}

/// `"<number> <area>, <city>"` for the region around `position`.
pub fn generated_address<R: Rng>(position: Coordinates, rng: &mut R) -> String {
    // A zero on either axis is treated as "no position known".
    if position.lat == 0.0 || position.lng == 0.0 {
        return ADDRESS_NOT_AVAILABLE.to_string();
    }

    let region = region_for(position);
    let number = rng.random_range(1..=999);
    format!("{number} {}, {}", region.random_area(rng), region.city)
}

/// Price level 1-4 from `price:coffee`, else a weighted random draw.
pub fn price_level<R: Rng>(tags: &Tags, rng: &mut R) -> u8 {
    if let Some(price) = first_tag(tags, &["price:coffee"]).and_then(parse_leading_number) {
        return match price {
            p if p < 3.0 => 1,
            p if p < 5.0 => 2,
            p if p < 8.0 => 3,
            _ => 4,
        };
    }

    WEIGHTED_PRICE_LEVELS.choose(rng).copied().unwrap_or(2)
}

/// Whether the café is likely open at local `hour` (0-23).
pub fn open_status<R: Rng>(tags: &Tags, hour: u32, rng: &mut R) -> bool {
    if first_tag(tags, &["opening_hours"]).is_none() {
        return true;
    }
    if (6..=22).contains(&hour) {
        return true;
    }
    rng.random_bool(0.8)
}

pub fn realistic_rating<R: Rng>(rng: &mut R) -> f32 {
    REALISTIC_RATINGS.choose(rng).copied().unwrap_or(4.0)
}

/// Generated name for unnamed elements.
pub fn cafe_name<R: Rng>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES.choose(rng).copied().unwrap_or("The");
    let suffix = NAME_SUFFIXES.choose(rng).copied().unwrap_or("Café");
    format!("{prefix} {suffix}")
}

/// Parses the numeric prefix of values like `"2.50"` or `"3.2 EUR"`.
fn parse_leading_number(value: &str) -> Option<f64> {
    let end = value
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok().filter(|n: &f64| n.is_finite())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

    #[test]
    fn test_address_from_tags_in_order() {
        let t = tags(&[
            ("addr:postcode", "75004"),
            ("addr:street", "Rue de Rivoli"),
            ("addr:housenumber", "12"),
            ("addr:neighbourhood", "Le Marais"),
            ("addr:city", "Paris"),
        ]);
        assert_eq!(
            format_address(&t, PARIS, &mut rng()),
            "12, Rue de Rivoli, Le Marais, Paris, 75004"
        );
    }

    #[test]
    fn test_suburb_preferred_over_neighbourhood() {
        let t = tags(&[("addr:suburb", "Soho"), ("addr:neighbourhood", "West End")]);
        assert_eq!(format_address(&t, PARIS, &mut rng()), "Soho");
    }

    #[test]
    fn test_address_full_and_place_fallbacks() {
        let t = tags(&[("addr:full", "1 Infinite Loop"), ("addr:place", "Campus")]);
        assert_eq!(format_address(&t, PARIS, &mut rng()), "1 Infinite Loop");

        let t = tags(&[("addr:place", "Campus")]);
        assert_eq!(format_address(&t, PARIS, &mut rng()), "Campus");
    }

    #[test]
    fn test_generated_address_uses_region() {
        let address = format_address(&Tags::new(), PARIS, &mut rng());
        assert!(address.ends_with(", Paris, France"), "got {address}");
    }

    #[test]
    fn test_zero_coordinate_has_no_address() {
        let address = format_address(&Tags::new(), Coordinates::new(0.0, 10.0), &mut rng());
        assert_eq!(address, ADDRESS_NOT_AVAILABLE);
    }

    #[test]
    fn test_price_level_from_tag() {
        let mut r = rng();
        assert_eq!(price_level(&tags(&[("price:coffee", "2.5")]), &mut r), 1);
        assert_eq!(price_level(&tags(&[("price:coffee", "4")]), &mut r), 2);
        assert_eq!(price_level(&tags(&[("price:coffee", "7.99 EUR")]), &mut r), 3);
        assert_eq!(price_level(&tags(&[("price:coffee", "12")]), &mut r), 4);
    }

    #[test]
    fn test_price_level_random_in_range() {
        let mut r = rng();
        for _ in 0..50 {
            let level = price_level(&tags(&[("price:coffee", "free")]), &mut r);
            assert!((1..=4).contains(&level));
        }
    }

    #[test]
    fn test_open_status() {
        let mut r = rng();
        assert!(open_status(&Tags::new(), 3, &mut r));
        assert!(open_status(&tags(&[("opening_hours", "Mo-Fr 07:00-18:00")]), 9, &mut r));
        assert!(open_status(&tags(&[("opening_hours", "24/7")]), 22, &mut r));
    }

    #[test]
    fn test_generated_values_come_from_tables() {
        let mut r = rng();
        for _ in 0..20 {
            assert!(REALISTIC_RATINGS.contains(&realistic_rating(&mut r)));
            let name = cafe_name(&mut r);
            let (prefix, suffix) = name.split_once(' ').unwrap();
            assert!(NAME_PREFIXES.contains(&prefix));
            assert!(NAME_SUFFIXES.contains(&suffix));
        }
    }
}
