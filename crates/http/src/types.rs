//! Inventory entities exchanged with the backend
//!
//! Field names on the wire are the backend's camelCase Portuguese names.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to another entity by id, with its name when the backend embeds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn by_id(id: i64) -> Self {
        Self { id, name: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategorySize {
    #[serde(rename = "Pequeno")]
    Small,
    #[serde(rename = "Médio")]
    Medium,
    #[serde(rename = "Grande")]
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packaging {
    #[serde(rename = "Lata")]
    Can,
    #[serde(rename = "Vidro")]
    Glass,
    #[serde(rename = "Plástico")]
    Plastic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tamanho")]
    pub size: CategorySize,
    #[serde(rename = "embalagem")]
    pub packaging: Packaging,
}

/// Body for creating or updating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tamanho")]
    pub size: CategorySize,
    #[serde(rename = "embalagem")]
    pub packaging: Packaging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "precoUnitario")]
    pub unit_price: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "quantidadeEmEstoque")]
    pub stock_quantity: i64,
    #[serde(rename = "quantidadeMinima")]
    pub min_quantity: i64,
    #[serde(rename = "quantidadeMaxima")]
    pub max_quantity: i64,
    #[serde(rename = "categoria")]
    pub category: EntityRef,
}

impl Product {
    pub fn is_below_minimum(&self) -> bool {
        self.stock_quantity < self.min_quantity
    }

    pub fn stock_value(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let quantity = self.stock_quantity as f64;
        self.unit_price * quantity
    }
}

/// Body for creating or updating a product; the category is referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "precoUnitario")]
    pub unit_price: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "quantidadeEmEstoque")]
    pub stock_quantity: i64,
    #[serde(rename = "quantidadeMinima")]
    pub min_quantity: i64,
    #[serde(rename = "quantidadeMaxima")]
    pub max_quantity: i64,
    #[serde(rename = "categoria")]
    pub category: EntityRef,
}

impl From<&Product> for ProductPayload {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            unit_price: product.unit_price,
            unit: product.unit.clone(),
            stock_quantity: product.stock_quantity,
            min_quantity: product.min_quantity,
            max_quantity: product.max_quantity,
            category: EntityRef::by_id(product.category.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "ENTRADA")]
    Inbound,
    #[serde(rename = "SAIDA")]
    Outbound,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => f.pad("ENTRADA"),
            Self::Outbound => f.pad("SAIDA"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: i64,
    #[serde(rename = "produto")]
    pub product: EntityRef,
    /// ISO-8601 local timestamp as sent by the backend
    #[serde(rename = "dataMovimentacao", default)]
    pub timestamp: String,
    #[serde(rename = "quantidadeMovimentada")]
    pub quantity: i64,
    #[serde(rename = "tipoMovimentacao")]
    pub kind: MovementKind,
}

impl StockMovement {
    /// `dd/mm/yyyy HH:MM`, `-` when absent, raw text when unparseable
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    /// Calendar day of the movement in the backend's local time
    pub fn date(&self) -> Option<NaiveDate> {
        parse_timestamp(&self.timestamp).map(|dt| dt.date())
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "-".to_string();
    }

    parse_timestamp(raw).map_or_else(
        || raw.to_string(),
        |dt| dt.format("%d/%m/%Y %H:%M").to_string(),
    )
}

/// Body for recording a stock movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovementPayload {
    #[serde(rename = "produto")]
    pub product: EntityRef,
    #[serde(rename = "quantidadeMovimentada")]
    pub quantity: i64,
    #[serde(rename = "tipoMovimentacao")]
    pub kind: MovementKind,
}
