//! Resources served by the products demo

use restbase::prelude::*;

impl_resource!(
    Product,
    singular: "product",
    fields: {
        name: String,
        description: Option<String>,
    },
    relations: {
        varieties: many,
        pricing: single,
    }
);

impl_resource!(
    ProductVariety,
    singular: "productVariety",
    fields: {
        name: String,
        sku: String,
    }
);

impl_resource!(
    ProductPricing,
    singular: "productPricing",
    fields: {
        currency: String,
        amount_cents: i64,
    }
);
