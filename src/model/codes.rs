//! Fixed categorical code tables shared between the store-observed codes and
//! client display. These mirror the encoding used by the upstream scoring
//! process and must not be reordered.

/// Merchant category codes 0..=16.
pub const MERCHANT_CATEGORIES: [&str; 17] = [
    "Luxury Goods",
    "Travel",
    "Electronics",
    "Apparel",
    "Food Delivery",
    "Online Services",
    "Groceries",
    "Utilities",
    "Medical",
    "Wellness",
    "Organic Grocery",
    "Jewelry",
    "Health",
    "Hygiene Products",
    "Apparel (gifts)",
    "Food",
    "Apparel Deals",
];

/// Device type codes 0..=2.
pub const DEVICE_TYPES: [&str; 3] = ["Mobile", "PC", "Tablet"];

pub const UNKNOWN: &str = "Unknown";

/// Resolve a merchant category code to its display name.
pub fn merchant_name(code: u32) -> &'static str {
    MERCHANT_CATEGORIES
        .get(code as usize)
        .copied()
        .unwrap_or(UNKNOWN)
}

/// Reverse lookup: merchant display name back to its code.
pub fn merchant_code(name: &str) -> Option<u32> {
    MERCHANT_CATEGORIES
        .iter()
        .position(|&n| n == name)
        .map(|i| i as u32)
}

pub fn device_name(code: u32) -> &'static str {
    DEVICE_TYPES.get(code as usize).copied().unwrap_or(UNKNOWN)
}

pub fn device_code(name: &str) -> Option<u32> {
    DEVICE_TYPES.iter().position(|&n| n == name).map(|i| i as u32)
}
