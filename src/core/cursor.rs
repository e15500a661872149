// Row cursor for tables: an explicit position that never dangles across mutations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Cursor {
    #[default]
    BeforeFirst,
    At(usize),
}

impl Cursor {
    pub fn new() -> Self {
        Self::BeforeFirst
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Cursor::BeforeFirst => None,
            Cursor::At(index) => Some(index),
        }
    }

    /// Moves to the next ordinal if one exists among `len` rows; stays put at the end.
    pub(crate) fn advance(&mut self, len: usize) -> Option<usize> {
        let next = match *self {
            Cursor::BeforeFirst => 0,
            Cursor::At(index) => index + 1,
        };
        if next >= len {
            return None;
        }
        *self = Cursor::At(next);
        Some(next)
    }

    /// Position after the row at `removed` has been taken out: the preceding row, if any.
    pub(crate) fn after_removal(removed: usize) -> Self {
        match removed.checked_sub(1) {
            Some(prev) => Cursor::At(prev),
            None => Cursor::BeforeFirst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn advance_stops_at_end_without_moving() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.advance(2), Some(0));
        assert_eq!(cursor.advance(2), Some(1));
        assert_eq!(cursor.advance(2), None);
        assert_eq!(cursor, Cursor::At(1));
        assert_eq!(cursor.advance(2), None);
        assert_eq!(cursor, Cursor::At(1));
    }

    #[test]
    fn empty_table_keeps_cursor_before_first() {
        let mut cursor = Cursor::new();
        assert_eq!(cursor.advance(0), None);
        assert_eq!(cursor, Cursor::BeforeFirst);
    }

    #[test]
    fn removal_steps_back_one_row() {
        assert_eq!(Cursor::after_removal(0), Cursor::BeforeFirst);
        assert_eq!(Cursor::after_removal(3), Cursor::At(2));
    }
}
