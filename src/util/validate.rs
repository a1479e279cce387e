//! Upload-size and price validation.
//!
//! Rejections surface as localized error notifications, the same way the
//! rest of the platform reports user-facing problems.

use crate::i18n::I18n;
use crate::state::notifications::Notifications;

/// Maximum accepted upload size: 2 MiB.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Minimum accepted price, in euros.
pub const MIN_PRICE: f64 = 1.0;

const FILE_TOO_LARGE_KEY: &str = "validation.file.too_large";
const PRICE_TOO_LOW_KEY: &str = "validation.price.too_low";

/// Check a single file's size, notifying on rejection.
pub async fn validate_file_size(
    notifications: &Notifications,
    i18n: &I18n,
    file_name: &str,
    size: u64,
) -> bool {
    if size > MAX_FILE_SIZE {
        let message = i18n.t_with(FILE_TOO_LARGE_KEY, &[("name", file_name)]).await;
        notifications.error(message).await;
        return false;
    }
    true
}

/// Check every file's size; the first oversize file fails the batch.
pub async fn validate_files_size(
    notifications: &Notifications,
    i18n: &I18n,
    files: &[(&str, u64)],
) -> bool {
    for (name, size) in files {
        if !validate_file_size(notifications, i18n, name, *size).await {
            return false;
        }
    }
    true
}

/// Keep only the files under the size limit, silently.
#[must_use]
pub fn filter_valid_files<'a>(files: &[(&'a str, u64)]) -> Vec<(&'a str, u64)> {
    files
        .iter()
        .copied()
        .filter(|(_, size)| *size <= MAX_FILE_SIZE)
        .collect()
}

/// Check a price against the platform minimum, notifying on rejection.
pub async fn validate_price(notifications: &Notifications, i18n: &I18n, price: f64) -> bool {
    if price < MIN_PRICE {
        let message = i18n
            .t_with(PRICE_TOO_LOW_KEY, &[("min", &MIN_PRICE.to_string())])
            .await;
        notifications.error(message).await;
        return false;
    }
    true
}

/// Check every price; the first underpriced entry fails the batch.
pub async fn validate_prices(notifications: &Notifications, i18n: &I18n, prices: &[f64]) -> bool {
    for price in prices {
        if !validate_price(notifications, i18n, *price).await {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
