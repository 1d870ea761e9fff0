use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column names used by the invoice datasets, after whitespace trimming.
pub mod columns {
    /// Shared join key present in both files.
    pub const ACCESS_KEY: &str = "CHAVE DE ACESSO";
    pub const ISSUER_NAME: &str = "RAZÃO SOCIAL EMITENTE";
    pub const ISSUER_STATE: &str = "UF EMITENTE";
    pub const ISSUED_AT: &str = "DATA EMISSÃO";
    pub const TOTAL_VALUE: &str = "VALOR NOTA FISCAL";
    pub const DESCRIPTION: &str = "DESCRIÇÃO DO PRODUTO/SERVIÇO";
    pub const QUANTITY: &str = "QUANTIDADE";
}

/// One invoice (nota fiscal) from the header file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Unique access key (44-digit chave de acesso in real data).
    pub access_key: String,
    /// Issuer legal name (razão social).
    pub issuer_name: String,
    /// Issuer state code (UF), e.g. "SP".
    pub issuer_state: String,
    /// Issue date and time.
    pub issued_at: NaiveDateTime,
    /// Total invoice value in BRL.
    pub total_value: f64,
}

/// One line item from the item file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Access key of the owning invoice.
    pub access_key: String,
    /// Product or service description.
    pub description: String,
    pub quantity: f64,
}

/// A row of the header/item inner join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub header: HeaderRecord,
    pub item: ItemRecord,
}

impl CombinedRecord {
    pub fn access_key(&self) -> &str {
        &self.header.access_key
    }
}
