//! Product catalog route handlers.

use axum::Json;
use serde::Serialize;

use dairy_farm_core::catalog::{self, Product};

#[derive(Debug, Serialize)]
pub struct ProductsEnvelope {
    pub message: &'static str,
    pub products: Vec<Product>,
}

/// `GET /api/products`
pub async fn list() -> Json<ProductsEnvelope> {
    Json(ProductsEnvelope {
        message: "Products retrieved successfully",
        products: catalog::products(),
    })
}
