/// Custom actions for Product entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Marks the product as the storefront highlight.
    Feature,
    /// Clears the highlight.
    Unfeature,
}
