// Copyright (C) 2020-2024 Andy Kurnia.

use super::{cache, config, error, matrix};

pub const CROSSWORD_GAME_LAYOUT: &str = "CrosswordGame";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Premium {
    pub word_multiplier: i8,
    pub letter_multiplier: i8,
}

static FVS: Premium = Premium {
    word_multiplier: 1,
    letter_multiplier: 1,
};

// = and - are triple and double word, " and ' are triple and double letter,
// ~ and ^ quadruple word and letter.
static CROSSWORD_GAME_BOARD: &[&str] = &[
    r#"=  '   =   '  ="#,
    r#" -   "   "   - "#,
    r#"  -   ' '   -  "#,
    r#"'  -   '   -  '"#,
    r#"    -     -    "#,
    r#" "   "   "   " "#,
    r#"  '   ' '   '  "#,
    r#"=  '   -   '  ="#,
    r#"  '   ' '   '  "#,
    r#" "   "   "   " "#,
    r#"    -     -    "#,
    r#"'  -   '   -  '"#,
    r#"  -   ' '   -  "#,
    r#" -   "   "   - "#,
    r#"=  '   =   '  ="#,
];

pub struct BoardLayout {
    name: String,
    dim: matrix::Dim,
    star_row: i8,
    star_col: i8,
    premiums: Box<[Premium]>,
}

fn premium_of(c: char) -> Option<Premium> {
    let (word_multiplier, letter_multiplier) = match c {
        '~' => (4, 1),
        '=' => (3, 1),
        '-' => (2, 1),
        '^' => (1, 4),
        '"' => (1, 3),
        '\'' => (1, 2),
        ' ' => (1, 1),
        _ => return None,
    };
    Some(Premium {
        word_multiplier,
        letter_multiplier,
    })
}

impl BoardLayout {
    /// Parses one string per row; the star is the center square.
    pub fn from_rows(name: &str, rows: &[&str]) -> error::Returns<BoardLayout> {
        let num_cols = rows.first().map_or(0, |r| r.chars().count());
        if rows.is_empty() || num_cols == 0 || rows.len() > 127 || num_cols > 127 {
            return_error!(format!("board {name} has bad dimensions"));
        }
        let mut premiums = Vec::with_capacity(rows.len() * num_cols);
        for row in rows {
            if row.chars().count() != num_cols {
                return_error!(format!("board {name} is not rectangular"));
            }
            for c in row.chars() {
                match premium_of(c) {
                    Some(premium) => premiums.push(premium),
                    None => {
                        return_error!(format!("unrecognized bonus square {c:?}"));
                    }
                }
            }
        }
        let dim = matrix::Dim {
            rows: rows.len() as i8,
            cols: num_cols as i8,
        };
        let (star_row, star_col) = dim.center();
        Ok(BoardLayout {
            name: name.to_string(),
            dim,
            star_row,
            star_col,
            premiums: premiums.into_boxed_slice(),
        })
    }

    pub fn named(name: &str) -> error::Returns<BoardLayout> {
        match name {
            "" | CROSSWORD_GAME_LAYOUT => {
                Self::from_rows(CROSSWORD_GAME_LAYOUT, CROSSWORD_GAME_BOARD)
            }
            _ => Err(error::GameError::Setup(format!("layout {name:?} not supported"))),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn dim(&self) -> matrix::Dim {
        self.dim
    }

    #[inline(always)]
    pub fn star_row(&self) -> i8 {
        self.star_row
    }

    #[inline(always)]
    pub fn star_col(&self) -> i8 {
        self.star_col
    }

    #[inline(always)]
    pub fn premium(&self, idx: usize) -> Premium {
        self.premiums.get(idx).copied().unwrap_or(FVS)
    }

    #[inline(always)]
    pub fn premium_at(&self, row: i8, col: i8) -> Premium {
        self.premium(self.dim.at_row_col(row, col))
    }
}

impl cache::Loadable for BoardLayout {
    fn load(_cfg: &config::Config, name: &str) -> error::Returns<Self> {
        Self::named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossword_game_board() {
        let layout = BoardLayout::named(CROSSWORD_GAME_LAYOUT).unwrap();
        assert_eq!(layout.dim(), matrix::Dim { rows: 15, cols: 15 });
        assert_eq!((layout.star_row(), layout.star_col()), (7, 7));
        assert_eq!(layout.premium_at(0, 0).word_multiplier, 3);
        assert_eq!(layout.premium_at(7, 7).word_multiplier, 2);
        assert_eq!(layout.premium_at(1, 5).letter_multiplier, 3);
        assert_eq!(layout.premium_at(0, 3).letter_multiplier, 2);
        assert_eq!(layout.premium_at(7, 8), FVS);
        // symmetric both ways
        for r in 0..15 {
            for c in 0..15 {
                assert_eq!(layout.premium_at(r, c), layout.premium_at(14 - r, c));
                assert_eq!(layout.premium_at(r, c), layout.premium_at(c, r));
            }
        }
    }

    #[test]
    fn rejects_unknown_layouts() {
        assert!(BoardLayout::named("SuperCrosswordGame").is_err());
        assert!(BoardLayout::from_rows("x", &["= ", "="]).is_err());
        assert!(BoardLayout::from_rows("x", &["=x"]).is_err());
    }
}
