//! Offline price estimate used when the model server is unreachable.

use rand::Rng;

use crate::prediction::types::Features;

const BASE_PRICE: f64 = 150_000.0;
const PER_SQFT: f64 = 100.0;
const PER_BEDROOM: f64 = 25_000.0;
const PER_BATHROOM: f64 = 15_000.0;
const PER_FLOOR: f64 = 20_000.0;

/// Linear estimate scaled by `factor`.
pub fn estimate_price(features: &Features, factor: f64) -> f64 {
    let base = BASE_PRICE
        + PER_SQFT * features.area as f64
        + PER_BEDROOM * features.bedrooms as f64
        + PER_BATHROOM * features.bathrooms as f64
        + PER_FLOOR * features.floors as f64;
    (base * factor).round()
}

/// Random factor in `[0.9, 1.1)`.
pub fn random_factor() -> f64 {
    rand::thread_rng().gen_range(0.9..1.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let features = Features {
            area: 1000,
            bedrooms: 2,
            bathrooms: 1,
            floors: 1,
            year_built: 1990,
            location: "Rural".into(),
            condition: "Fair".into(),
            garage: 0,
        };
        // 150000 + 100000 + 50000 + 15000 + 20000
        assert_eq!(estimate_price(&features, 1.0), 335_000.0);
        assert_eq!(estimate_price(&features, 0.9), 301_500.0);
    }

    #[test]
    fn test_factor_range() {
        for _ in 0..100 {
            let f = random_factor();
            assert!((0.9..1.1).contains(&f));
        }
    }
}
