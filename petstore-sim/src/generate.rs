//! Random entity payload generation

use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use petstore_client::models::{Category, Order, OrderStatus, Pet, PetStatus, Tag, User, UserUpdate};

/// Login password every generated user is created with, so subsequent
/// login operations against generated accounts succeed.
pub const DEFAULT_PASSWORD: &str = "password123";

const PET_NAMES: [&str; 16] = [
    "Buddy", "Max", "Bella", "Luna", "Charlie", "Lucy", "Cooper", "Daisy", "Rocky", "Sadie",
    "Duke", "Molly", "Bear", "Maggie", "Tucker", "Sophie",
];

const PET_CATEGORIES: [(i64, &str); 5] = [
    (1, "Dogs"),
    (2, "Cats"),
    (3, "Birds"),
    (4, "Fish"),
    (5, "Reptiles"),
];

const PET_TAGS: [(i64, &str); 10] = [
    (1, "friendly"),
    (2, "trained"),
    (3, "playful"),
    (4, "colorful"),
    (5, "exotic"),
    (6, "rare"),
    (7, "puppy"),
    (8, "kitten"),
    (9, "senior"),
    (10, "quiet"),
];

/// Random lowercase ascii string, default length 8
pub fn random_string(length: usize) -> String {
    (0..length).map(|_| fastrand::lowercase()).collect()
}

pub fn random_pet_name() -> &'static str {
    PET_NAMES[fastrand::usize(..PET_NAMES.len())]
}

pub fn random_pet_status() -> PetStatus {
    let all = PetStatus::all();
    all[fastrand::usize(..all.len())]
}

pub fn random_category() -> Category {
    let (id, name) = PET_CATEGORIES[fastrand::usize(..PET_CATEGORIES.len())];
    Category {
        id,
        name: name.to_string(),
    }
}

/// Between one and three distinct tags from the fixed vocabulary
pub fn random_tags() -> Vec<Tag> {
    let count = fastrand::usize(1..=3);
    fastrand::choose_multiple(PET_TAGS.iter(), count)
        .into_iter()
        .map(|(id, name)| Tag {
            id: *id,
            name: name.to_string(),
        })
        .collect()
}

/// Between one and three distinct tag names, for findByTags queries
pub fn random_tag_names() -> Vec<String> {
    random_tags().into_iter().map(|tag| tag.name).collect()
}

/// A pet payload with no id; the server assigns one on create.
pub fn random_pet() -> Pet {
    Pet {
        id: None,
        name: random_pet_name().to_string(),
        photo_urls: vec![format!("https://example.com/pets/{}.jpg", random_string(8))],
        category: Some(random_category()),
        tags: random_tags(),
        status: Some(random_pet_status()),
    }
}

pub fn random_user() -> User {
    let username = format!("user_{}", random_string(8));
    User {
        email: format!("{}@example.com", username),
        first_name: format!("First_{}", random_string(4)),
        last_name: format!("Last_{}", random_string(4)),
        password: DEFAULT_PASSWORD.to_string(),
        phone: random_phone(),
        user_status: fastrand::i32(0..=2),
        username,
    }
}

/// Partial update payload for an existing user
pub fn random_user_update(username: &str) -> UserUpdate {
    UserUpdate {
        first_name: format!("Updated_{}", random_string(4)),
        last_name: format!("Updated_{}", random_string(4)),
        email: format!("updated_{}@example.com", username),
        phone: random_phone(),
    }
}

pub fn random_order_status() -> OrderStatus {
    let all = OrderStatus::all();
    all[fastrand::usize(..all.len())]
}

/// An order for the given pet, shipping 1 to 30 days out
pub fn random_order(pet_id: i64) -> Order {
    let ship_date = Utc::now() + ChronoDuration::days(fastrand::i64(1..=30));
    Order {
        id: None,
        pet_id,
        quantity: fastrand::i32(1..=3),
        ship_date: ship_date.to_rfc3339_opts(SecondsFormat::Secs, true),
        status: random_order_status(),
        complete: fastrand::bool(),
    }
}

fn random_phone() -> String {
    format!(
        "555-{}-{}",
        fastrand::u32(100..=999),
        fastrand::u32(1000..=9999)
    )
}
