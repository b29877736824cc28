use serde::{Deserialize, Serialize};

// ==================================================================================================
// Upload / Inbox
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedItem {
    pub id: String,
    pub file_name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub items: Vec<UploadedItem>,
}

/// Inbox entry tracking server-side processing of one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxItem {
    pub id: String,
    pub file_name: String,
    pub status: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl InboxItem {
    /// Whether the server is still working on this item
    pub fn is_in_progress(&self) -> bool {
        matches!(self.status.as_str(), "pending" | "processing")
    }
}

// ==================================================================================================
// Receipts
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub supermarket_id: i64,
    pub date: String,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ReceiptProduct>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptsResponse {
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
    pub items: Vec<Receipt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supermarket {
    pub id: i64,
    pub name: String,
    pub country_code: String,
    pub receipt_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupermarketsResponse {
    pub total: i64,
    pub items: Vec<Supermarket>,
}
