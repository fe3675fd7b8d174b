// crates/provstat-core/src/traits.rs
use crate::text::equals_folded;

/// Name-based matching helpers for types that expose a canonical name.
///
/// This trait centralizes accent-insensitive and case-insensitive
/// comparisons based on [`fold_key`](crate::text::fold_key). Implementors
/// provide a `&str` view of their canonical name via
/// [`NameMatch::name_str`] and get [`NameMatch::is_named`], equality on the
/// folded form.
///
/// # Examples
/// ```rust
/// use provstat_core::traits::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("DKI JAKARTA").is_named("dki  jakarta"));
/// assert!(!Place("KEPULAUAN RIAU").is_named("riau"));
/// ```
pub trait NameMatch {
    /// Returns the canonical name used for matching.
    fn name_str(&self) -> &str;

    /// Returns `true` if `q` equals the canonical name after folding.
    #[inline]
    fn is_named(&self, q: &str) -> bool {
        equals_folded(self.name_str(), q)
    }
}

/// Finds the first item whose name matches `q` after folding.
pub fn find_named<'a, T: NameMatch>(items: &'a [T], q: &str) -> Option<&'a T> {
    items.iter().find(|it| it.is_named(q))
}
