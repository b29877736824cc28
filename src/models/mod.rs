// Data models for persisted state and receipt-service payloads

pub mod api;
pub mod receipts;
pub mod stored;

pub use api::{ApiErrorBody, AuthConfigResponse};
pub use receipts::{
    InboxItem, Receipt, ReceiptProduct, ReceiptsResponse, Supermarket, SupermarketsResponse,
    UploadResponse, UploadedItem,
};
pub use stored::{ConfigRecord, CredentialRecord, DEFAULT_CURRENCY};
