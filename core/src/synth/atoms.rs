//! Built-in named atomic generators (§4.D "Built-in atomic generators").
//!
//! These are opt-in: a caller names one explicitly via `column_type_mappings`, there is no
//! column-name sniffing here. Grounded in the original's per-column `Faker` helper branches,
//! reimplemented on the `fake` crate.

use fake::Fake;
use fake::faker::address::en::{CityName, CountryName};
use fake::faker::company::en::{CompanyName, Industry};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::rngs::StdRng;

use crate::model::Value;

/// Resolve a named generator key to a generated text value, or `None` if the key is unknown.
pub fn generate(name: &str, rng: &mut StdRng) -> Option<Value> {
    let text = match name {
        "first_name" => FirstName().fake_with_rng::<String, _>(rng),
        "last_name" => LastName().fake_with_rng::<String, _>(rng),
        "email" => SafeEmail().fake_with_rng::<String, _>(rng),
        "phone" => PhoneNumber().fake_with_rng::<String, _>(rng),
        "address" => format!(
            "{} {}",
            (1..9999).fake_with_rng::<u32, _>(rng),
            Word().fake_with_rng::<String, _>(rng)
        ),
        "city" => CityName().fake_with_rng::<String, _>(rng),
        "country" => CountryName().fake_with_rng::<String, _>(rng),
        "company" => CompanyName().fake_with_rng::<String, _>(rng),
        "job_title" => Industry().fake_with_rng::<String, _>(rng),
        "word" => Word().fake_with_rng::<String, _>(rng),
        _ => return None,
    };
    Some(Value::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn known_keys_produce_non_empty_text() {
        let mut rng = StdRng::seed_from_u64(1);
        for key in ["first_name", "last_name", "email", "phone", "address", "city", "country", "company", "job_title", "word"] {
            let v = generate(key, &mut rng).unwrap();
            assert!(!v.as_text().is_empty(), "{key} produced empty value");
        }
    }

    #[test]
    fn unknown_key_returns_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate("not_a_real_key", &mut rng).is_none());
    }
}
