use ulid::Ulid;

/// `{prefix}-{ulid}`, unique across test runs.
///
/// ```
/// use db_test_support::unique_str;
///
/// let a = unique_str("inventory");
/// let b = unique_str("inventory");
/// assert_ne!(a, b);
/// assert!(a.starts_with("inventory-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// Item SKU in the warehouse style: upper-case family, dash, short suffix.
///
/// Uses the random tail of a ULID, so two calls in the same millisecond still
/// differ.
pub fn unique_sku(family: &str) -> String {
    let ulid = Ulid::new().to_string();
    let tail = &ulid[ulid.len() - 8..];
    format!("{}-{tail}", family.to_ascii_uppercase())
}
