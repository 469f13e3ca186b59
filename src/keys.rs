//! Canonical field keys produced by normalization.

pub const DOC_TYPE: &str = "doc_type";
pub const DATE: &str = "date";
pub const ADDRESS: &str = "address";
pub const TOTAL_AMOUNT: &str = "total_amount";

// collective buckets, resolved positionally after a full pass
pub const NAME_ANY: &str = "name_any";
pub const ID_ANY: &str = "id_any";
pub const COMPANY_ANY: &str = "company_any";

pub const ISSUER_NAME: &str = "issuer_name";
pub const RECIPIENT_NAME: &str = "recipient_name";
pub const ISSUER_ID: &str = "issuer_id";
pub const RECIPIENT_ID: &str = "recipient_id";
pub const ISSUER_COMPANY: &str = "issuer_company";

/// Fields re-validated with the RUT checksum when scoring.
pub const DEFAULT_IDENTITY_FIELDS: &[&str] = &[
    ISSUER_ID,
    RECIPIENT_ID,
    "RUT_DEUDOR",
    "RUT_CORREDOR",
    "EMPRESA_DEUDOR_RUT",
    "EMPRESA_CORREDOR_RUT",
];
