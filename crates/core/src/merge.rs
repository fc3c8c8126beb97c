//! Optional-field merging.

/// Overwrite `target` with `fresh` only when `fresh` holds a value.
///
/// Returns `true` if `target` was overwritten. An absent fresh value never
/// clears a present one.
///
/// ```
/// use shopfloor_core::merge_present;
///
/// let mut current = Some(1);
/// assert!(!merge_present(&mut current, None));
/// assert_eq!(current, Some(1));
///
/// assert!(merge_present(&mut current, Some(2)));
/// assert_eq!(current, Some(2));
/// ```
pub fn merge_present<T>(target: &mut Option<T>, fresh: Option<T>) -> bool {
    match fresh {
        Some(value) => {
            *target = Some(value);
            true
        }
        None => false,
    }
}
