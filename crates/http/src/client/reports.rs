//! Aggregate report endpoints and the dashboard summary

use super::{ApiClient, ClientError};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

const REPORTS: &str = "/api/relatorios";

impl ApiClient {
    pub async fn price_list(&self) -> Result<Vec<PriceListEntry>, ClientError> {
        self.get(&format!("{REPORTS}/lista-de-precos")).await
    }

    pub async fn stock_balance(&self) -> Result<StockBalance, ClientError> {
        self.get(&format!("{REPORTS}/balanco-financeiro")).await
    }

    pub async fn below_minimum(&self) -> Result<Vec<BelowMinimumEntry>, ClientError> {
        self.get(&format!("{REPORTS}/produtos-abaixo-minimo")).await
    }

    pub async fn products_per_category(&self) -> Result<Vec<CategoryCount>, ClientError> {
        self.get(&format!("{REPORTS}/produtos-por-categoria")).await
    }

    pub async fn movement_highlights(&self) -> Result<MovementHighlights, ClientError> {
        self.get(&format!("{REPORTS}/maiores-movimentacoes")).await
    }

    /// Fetch every report concurrently; fails as a whole if any one fails
    pub async fn all_reports(&self) -> Result<Reports, ClientError> {
        let (price_list, balance, below_minimum, per_category, highlights) = tokio::try_join!(
            self.price_list(),
            self.stock_balance(),
            self.below_minimum(),
            self.products_per_category(),
            self.movement_highlights(),
        )?;

        Ok(Reports {
            price_list,
            balance,
            below_minimum,
            per_category,
            highlights,
        })
    }

    /// Dashboard KPIs derived from live data, counting today's movements by
    /// the local calendar
    pub async fn dashboard(&self) -> Result<DashboardSummary, ClientError> {
        self.dashboard_on(Local::now().date_naive()).await
    }

    /// Dashboard KPIs with movements counted for `day`
    pub async fn dashboard_on(&self, day: NaiveDate) -> Result<DashboardSummary, ClientError> {
        let (products, balance, below_minimum, movements) = tokio::try_join!(
            self.list_products(),
            self.stock_balance(),
            self.below_minimum(),
            self.list_movements(),
        )?;

        Ok(DashboardSummary {
            total_products: products.len(),
            stock_value: balance.total_value,
            below_minimum: below_minimum.len(),
            movements_today: movements
                .iter()
                .filter(|m| m.date() == Some(day))
                .count(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "precoUnitario")]
    pub unit_price: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "nomeCategoria")]
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceItem {
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "quantidadeEmEstoque")]
    pub stock_quantity: i64,
    #[serde(rename = "valorTotalProduto")]
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBalance {
    #[serde(rename = "valorTotalEstoque")]
    pub total_value: f64,
    #[serde(rename = "itens", default)]
    pub items: Vec<BalanceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelowMinimumEntry {
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "quantidadeMinima")]
    pub min_quantity: i64,
    #[serde(rename = "quantidadeEmEstoque")]
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "nomeCategoria")]
    pub category_name: String,
    #[serde(rename = "quantidadeProdutos")]
    pub product_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLeader {
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "totalMovimentado")]
    pub total_moved: i64,
}

/// Products with the largest inbound and outbound totals; absent when no
/// movement of that kind exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementHighlights {
    #[serde(rename = "produtoComMaisSaidas", default)]
    pub most_outbound: Option<MovementLeader>,
    #[serde(rename = "produtoComMaisEntradas", default)]
    pub most_inbound: Option<MovementLeader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reports {
    pub price_list: Vec<PriceListEntry>,
    pub balance: StockBalance,
    pub below_minimum: Vec<BelowMinimumEntry>,
    pub per_category: Vec<CategoryCount>,
    pub highlights: MovementHighlights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub stock_value: f64,
    pub below_minimum: usize,
    pub movements_today: usize,
}
