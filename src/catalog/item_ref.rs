//! Line-item identifier resolution
//!
//! Orders reference either a product (`"<productId>"`) or a specific color
//! variant (`"<productId>-<variantIndex>"`). Parsing always prefers the
//! variant interpretation: a product id that literally ends in `-<digits>`
//! cannot be told apart from a variant reference. This conflation comes
//! from the storefront's id convention and is kept as a documented
//! limitation; stale or out-of-range indices fail closed to "not found"
//! at lookup time.

/// A parsed line-item identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub product_id: String,
    pub variant_index: Option<usize>,
}

impl ItemRef {
    /// Parse a raw line-item id. Never fails: anything that does not match
    /// the trailing `-<digits>` pattern is treated as a plain product id.
    pub fn parse(raw: &str) -> Self {
        if let Some(pos) = raw.rfind('-') {
            let head = &raw[..pos];
            let digits = &raw[pos + 1..];
            if !head.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            {
                if let Ok(index) = digits.parse::<usize>() {
                    return Self {
                        product_id: head.to_string(),
                        variant_index: Some(index),
                    };
                }
            }
        }

        Self {
            product_id: raw.to_string(),
            variant_index: None,
        }
    }
}
