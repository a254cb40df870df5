//! Category, product and stock-movement endpoints

use super::{ApiClient, ClientError};
use crate::types::{
    Category, CategoryPayload, Product, ProductPayload, StockMovement, StockMovementPayload,
};
use serde::de::IgnoredAny;

const CATEGORIES: &str = "/api/categorias";
const PRODUCTS: &str = "/api/produtos";
const MOVEMENTS: &str = "/api/movimentacoes";

impl ApiClient {
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get(CATEGORIES).await
    }

    pub async fn create_category(
        &self,
        payload: &CategoryPayload,
    ) -> Result<Category, ClientError> {
        self.post(CATEGORIES, payload).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        payload: &CategoryPayload,
    ) -> Result<Category, ClientError> {
        self.put(&format!("{CATEGORIES}/{id}"), payload).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ClientError> {
        self.delete::<IgnoredAny>(&format!("{CATEGORIES}/{id}"))
            .await
            .map(drop)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        self.get(PRODUCTS).await
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ClientError> {
        self.post(PRODUCTS, payload).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        payload: &ProductPayload,
    ) -> Result<Product, ClientError> {
        self.put(&format!("{PRODUCTS}/{id}"), payload).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ClientError> {
        self.delete::<IgnoredAny>(&format!("{PRODUCTS}/{id}"))
            .await
            .map(drop)
    }

    pub async fn list_movements(&self) -> Result<Vec<StockMovement>, ClientError> {
        self.get(MOVEMENTS).await
    }

    /// Record an inbound or outbound movement. Rejections carry the backend's
    /// explanation in [`ClientError::message`].
    pub async fn create_movement(
        &self,
        payload: &StockMovementPayload,
    ) -> Result<StockMovement, ClientError> {
        self.post(MOVEMENTS, payload).await
    }
}
