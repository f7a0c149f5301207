//! MySQL schema definitions.
//!
//! Tables are provisioned on first use with idempotent DDL. Money columns are
//! `DOUBLE` so rows decode to plain JSON numbers; timestamps are RFC 3339
//! strings written by the application.

use storefront_core::storage::Table;

const PRODUCTS: &str = r#"
CREATE TABLE IF NOT EXISTS `products` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `name` VARCHAR(255) NOT NULL,
    `price` DOUBLE NOT NULL,
    `gender_id` INT NULL,
    `sale` TINYINT NOT NULL DEFAULT 0,
    `sale_price` DOUBLE NULL,
    `image` VARCHAR(255) NOT NULL DEFAULT '/2.png'
)
"#;

const CART: &str = r#"
CREATE TABLE IF NOT EXISTS `cart` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `product_id` INT NOT NULL,
    `quantity` INT NOT NULL DEFAULT 1,
    `price` DOUBLE NULL
)
"#;

const ORDERS: &str = r#"
CREATE TABLE IF NOT EXISTS `orders` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `items` TEXT NOT NULL,
    `subtotal` DOUBLE NOT NULL DEFAULT 0,
    `shipping` DOUBLE NOT NULL DEFAULT 0,
    `total` DOUBLE NOT NULL DEFAULT 0,
    `card_last4` VARCHAR(4) NOT NULL DEFAULT '',
    `expiry_date` VARCHAR(10) NOT NULL DEFAULT '',
    `cardholder_name` VARCHAR(255) NOT NULL DEFAULT '',
    `email` VARCHAR(255) NOT NULL DEFAULT '',
    `address` VARCHAR(255) NOT NULL DEFAULT '',
    `city` VARCHAR(100) NOT NULL DEFAULT '',
    `postal_code` VARCHAR(20) NOT NULL DEFAULT '',
    `status` VARCHAR(20) NOT NULL DEFAULT 'completed',
    `created_at` VARCHAR(40) NOT NULL
)
"#;

const REVIEWS: &str = r#"
CREATE TABLE IF NOT EXISTS `reviews` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `product_id` INT NULL,
    `name` VARCHAR(80) NOT NULL,
    `rating` INT NOT NULL DEFAULT 5,
    `comment` TEXT NOT NULL,
    `created_at` VARCHAR(40) NULL
)
"#;

const USERS: &str = r#"
CREATE TABLE IF NOT EXISTS `users` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `username` VARCHAR(100) NOT NULL UNIQUE,
    `role` VARCHAR(20) NOT NULL DEFAULT 'user',
    `created_at` VARCHAR(40) NULL
)
"#;

const SEARCH_HISTORY: &str = r#"
CREATE TABLE IF NOT EXISTS `search_history` (
    `id` INT AUTO_INCREMENT PRIMARY KEY,
    `search_term` VARCHAR(255) NOT NULL,
    `created_at` VARCHAR(40) NULL
)
"#;

/// `CREATE TABLE IF NOT EXISTS` statement for a table.
pub fn create_table(table: Table) -> &'static str {
    match table {
        Table::Products => PRODUCTS,
        Table::Cart => CART,
        Table::Orders => ORDERS,
        Table::Reviews => REVIEWS,
        Table::Users => USERS,
        Table::SearchHistory => SEARCH_HISTORY,
    }
}
