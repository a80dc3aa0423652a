//! Demo catalog used to populate an empty store on startup.

use eshop_products::NewProduct;
use tracing::info;

use super::{ProductStore, RepositoryError};

fn item(name: &str, image: &str, price: i64, description: &str, quantity: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        main_image_url: image.to_string(),
        price,
        description: description.to_string(),
        quantity,
    }
}

/// A handful of products covering in-stock and sold-out items.
pub fn demo_catalog() -> Vec<NewProduct> {
    vec![
        item(
            "Rubber duck - Classic",
            "https://www.shipducky.com/cdn/shop/products/Instagrampost-1a.jpg",
            25_000,
            "A rubber duck for the bath and for talking through a stubborn bug.",
            42,
        ),
        item(
            "Ortega R55",
            "https://image.alza.cz/products/OTG008w1e/OTG008w1e.jpg",
            514_900,
            "Full size classical guitar with a solid spruce top and satin finish.",
            0,
        ),
        item(
            "Rubber duck - Cupcake",
            "https://www.shipducky.com/cdn/shop/products/cupcake-canard-rubber-duck.jpg",
            50_000,
            "A cupcake-shaped rubber duck.",
            19,
        ),
        item(
            "Qiushi dog bed grey and white XXL",
            "https://image.alza.cz/products/CHPpe1072/CHPpe1072.jpg",
            139_000,
            "Dog bed, 105 x 80 x 23 cm, suitable for all breeds.",
            13,
        ),
        item(
            "LEGO Lord of the Rings 10316 Rivendell",
            "https://image.alza.cz/products/LO10316/LO10316.jpg",
            1_289_000,
            "Display model of Rivendell with the Elven forge and Elrond's study.",
            23,
        ),
        item(
            "BOSCH BGL41SIL1H GL41",
            "https://image.alza.cz/products/BSHsvys140/BSHsvys140.jpg",
            511_900,
            "Bagged vacuum cleaner with a HEPA filter.",
            0,
        ),
        item(
            "Rubik's Cube 2x2 Speed Cube",
            "https://image.alza.cz/products/HRAls12449/HRAls12449.jpg",
            28_900,
            "Magnetic 2x2 speed cube.",
            46,
        ),
    ]
}

/// Insert the demo catalog if the store holds no products. Returns how many were inserted.
pub async fn seed_if_empty(store: &dyn ProductStore) -> Result<usize, RepositoryError> {
    let session = store.session().await?;
    if !session.list(false).await?.is_empty() {
        return Ok(0);
    }

    let catalog = demo_catalog();
    let count = catalog.len();
    for new in catalog {
        session.create(new).await?;
    }
    session.commit().await?;

    info!(count, "seeded demo catalog");
    Ok(count)
}
