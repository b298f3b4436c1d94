//! Picks the next unowned book in a series

use crate::services::resolver::SeriesBook;

/// The next book to get: the lowest whole-numbered sequence strictly above
/// the highest owned order. Novellas and other fractional entries (1.5,
/// 2.5) never qualify. Equal sequences keep the first-listed book.
pub fn select_next_book(owned_max: f64, books: &[SeriesBook]) -> Option<SeriesBook> {
    let mut next: Option<&SeriesBook> = None;

    for book in books {
        if book.sequence.fract() != 0.0 {
            continue;
        }
        if book.sequence <= owned_max {
            continue;
        }

        let better = match next {
            None => true,
            Some(current) => book.sequence < current.sequence,
        };
        if better {
            next = Some(book);
        }
    }

    next.cloned()
}
