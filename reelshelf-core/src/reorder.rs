use crate::error::ValidationError;

/// Single-element move: remove the element at `from`, reinsert it at `to`.
///
/// Not a swap. Both indices must lie in `[0, len)`.
pub fn move_item<T: Clone>(
    items: &[T],
    from: usize,
    to: usize,
) -> Result<Vec<T>, ValidationError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len });
        }
    }

    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Ok(moved)
}
