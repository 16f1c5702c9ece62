//! Product Catalogue Example
//!
//! Declares three resources and two relationships, then serves the
//! generated routes:
//!
//! ```text
//! GET|POST|PUT  /products
//! GET|DELETE    /products/{id}
//! GET|PUT       /products/{id}/productVarieties
//! GET|DELETE    /products/{id}/productVarieties/{sub_id}
//! GET|PUT       /products/{id}/productPricings
//! GET|DELETE    /products/{id}/productPricings/{sub_id}
//! ```
//!
//! Run with `cargo run --example products [config.yaml]`.

mod entities;

use anyhow::Result;
use entities::{Product, ProductPricing, ProductVariety};
use restbase::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    }
    .apply_env_overrides()?;
    init_tracing(&config.logging)?;

    let varieties: Arc<dyn ResourceStore<ProductVariety>> = Arc::new(InMemoryStore::new());
    let pricings: Arc<dyn ResourceStore<ProductPricing>> = Arc::new(InMemoryStore::new());
    let products: Arc<dyn ResourceStore<Product>> = Arc::new(InMemoryStore::new());

    populate_test_data(&products, &varieties, &pricings).await?;

    let product_service = ResourceService::new(products)
        .with_relation(RelationDescriptor::many("varieties", varieties.clone())?)?
        .with_relation(RelationDescriptor::single("pricing", pricings.clone())?)?;

    let builder = ServerBuilder::new()
        .with_config(config)
        .register(product_service)?
        .register(ResourceService::new(varieties))?
        .register(ResourceService::new(pricings))?;

    builder.serve().await
}

async fn populate_test_data(
    products: &Arc<dyn ResourceStore<Product>>,
    varieties: &Arc<dyn ResourceStore<ProductVariety>>,
    pricings: &Arc<dyn ResourceStore<ProductPricing>>,
) -> Result<()> {
    let small = varieties
        .create(ProductVariety::new("Small".to_string(), "MUG-S".to_string()))
        .await?;
    let large = varieties
        .create(ProductVariety::new("Large".to_string(), "MUG-L".to_string()))
        .await?;
    let price = pricings
        .create(ProductPricing::new("EUR".to_string(), 1250))
        .await?;

    let mut mug = Product::new("Mug".to_string(), Some("Stoneware, dishwasher safe".to_string()));
    mug.varieties = small.id().into_iter().chain(large.id()).collect();
    mug.pricing = price.id();
    let mug = products.create(mug).await?;

    tracing::info!(product = ?mug.id(), "seeded demo catalogue");
    Ok(())
}
