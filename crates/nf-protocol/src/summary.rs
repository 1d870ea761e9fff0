use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Statistics over the loaded header set, served by `GET /api/summary`.
///
/// Field names follow the JSON consumed by the chat front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    #[serde(rename = "total_notas")]
    pub total_invoices: usize,
    #[serde(rename = "total_itens")]
    pub total_items: usize,
    #[serde(rename = "estatisticas_financeiras")]
    pub financials: FinancialStats,
    #[serde(rename = "periodo")]
    pub period: Option<DateRange>,
    /// Top 5 issuers by invoice count, most first. Serialized as a
    /// `{name: count}` object in this order.
    #[serde(rename = "principais_fornecedores", with = "supplier_map")]
    pub top_suppliers: Vec<SupplierCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    #[serde(rename = "valor_total")]
    pub total_value: f64,
    /// Absent when there are no invoices.
    #[serde(rename = "valor_medio")]
    pub mean_value: Option<f64>,
    #[serde(rename = "maior_nota")]
    pub max_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "inicio")]
    pub start: NaiveDateTime,
    #[serde(rename = "fim")]
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierCount {
    pub name: String,
    pub count: usize,
}

/// Identity and provenance of one load cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Load-cycle ID (UUIDv7, time-sortable).
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub total_headers: usize,
    pub total_items: usize,
    pub header_path: PathBuf,
    pub item_path: PathBuf,
}

/// Serialize supplier counts as a JSON object, keeping list order.
mod supplier_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::SupplierCount;

    pub fn serialize<S>(suppliers: &[SupplierCount], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(suppliers.len()))?;
        for supplier in suppliers {
            map.serialize_entry(&supplier.name, &supplier.count)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<SupplierCount>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SupplierMapVisitor)
    }

    struct SupplierMapVisitor;

    impl<'de> Visitor<'de> for SupplierMapVisitor {
        type Value = Vec<SupplierCount>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of supplier name to invoice count")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut suppliers = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, count)) = access.next_entry::<String, usize>()? {
                suppliers.push(SupplierCount { name, count });
            }
            Ok(suppliers)
        }
    }
}
