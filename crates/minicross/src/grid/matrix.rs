use std::ops::{Index, IndexMut};

use crate::puzzle::Pos;

/// Square N×N matrix co-indexed with the puzzle grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|cell| *cell = value.clone());
    }

    /// Row-major rows, for serialization.
    pub fn rows(&self) -> Vec<Vec<T>> {
        self.cells
            .chunks(self.size.max(1))
            .map(<[T]>::to_vec)
            .collect()
    }
}

impl<T> Matrix<T> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        self.offset(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        self.offset(pos).map(move |i| &mut self.cells[i])
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Pos::new(row, col)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        self.positions().zip(self.cells.iter())
    }

    fn offset(&self, pos: Pos) -> Option<usize> {
        (pos.row < self.size && pos.col < self.size).then(|| pos.row * self.size + pos.col)
    }
}

impl<T> Index<Pos> for Matrix<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &T {
        &self.cells[pos.row * self.size + pos.col]
    }
}

impl<T> IndexMut<Pos> for Matrix<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        &mut self.cells[pos.row * self.size + pos.col]
    }
}
