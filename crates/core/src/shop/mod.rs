//! Storefront domain: typed records, request validation and price arithmetic.

mod error;
mod operations;
mod requests;
mod types;

pub use error::{shop_error_to_status_code, ShopError};
pub use operations::{
    cart_count, cart_lines, clamp_rating, effective_price, mask_card_number, merged_quantity,
    order_record, review_fields, search_products, sort_newest_first, truncate_chars,
    ORDER_STATUS_COMPLETED, SEARCH_HISTORY_LIMIT,
};
pub use requests::{
    AddToCartRequest, CreateProductRequest, ListProductsQuery, OrderTotals, PaymentDetails,
    PlaceOrderRequest, ReviewRequest, ReviewsQuery, SearchQuery, ShippingDetails,
    UpdateCartRequest, UpdateProductRequest, MAX_CART_QUANTITY, REVIEW_NAME_MAX_CHARS,
};
pub use types::{
    from_records, CartItem, CartLine, Order, Product, Review, SearchEntry, DEFAULT_IMAGE,
    UNKNOWN_PRODUCT,
};
