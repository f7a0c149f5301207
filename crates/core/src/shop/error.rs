use thiserror::Error;

/// Errors raised while validating storefront requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),
    #[error("Product not found")]
    ProductNotFound,
    #[error("Item not found")]
    CartItemNotFound,
    #[error("Review not found")]
    ReviewNotFound,
}

impl ShopError {
    pub fn validation(message: impl Into<String>) -> Self {
        ShopError::Validation(message.into())
    }
}

/// Maps a [`ShopError`] to an HTTP status code.
pub fn shop_error_to_status_code(error: &ShopError) -> u16 {
    match error {
        ShopError::Validation(_) => 400,
        ShopError::ProductNotFound | ShopError::CartItemNotFound | ShopError::ReviewNotFound => {
            404
        }
    }
}
