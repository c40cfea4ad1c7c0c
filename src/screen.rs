use crate::{Coords, GridInt};

/// Off-screen character grid. Everything is drawn here first and then
/// handed to the console in one piece.
pub struct Screen {
    width: GridInt,
    height: GridInt,
    cells: Vec<char>,
}

impl Screen {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Screen { width, height, cells: vec![' '; width as usize * height as usize] }
    }

    pub fn size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = ' ');
    }

    pub fn put_char(&mut self, pos: Coords, ch: char) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = ch;
        }
    }

    /// Writes `text` from `pos` rightwards, clipped at the end of the row.
    pub fn put_text(&mut self, pos: Coords, text: &str) {
        if self.index(pos).is_none() {
            return;
        }

        for (x, ch) in (pos.0..self.width).zip(text.chars()) {
            self.put_char((x, pos.1), ch);
        }
    }

    #[cfg(test)]
    pub fn get(&self, pos: Coords) -> Option<char> {
        self.index(pos).map(|i| self.cells[i])
    }

    pub fn row(&self, y: GridInt) -> &[char] {
        if y < 0 || y >= self.height {
            return &[];
        }
        let start = self.width as usize * y as usize;
        &self.cells[start..start + self.width as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(move |y| self.row(y).iter().collect())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, (x, y): Coords) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some(self.width as usize * y as usize + x as usize)
        }
    }
}
