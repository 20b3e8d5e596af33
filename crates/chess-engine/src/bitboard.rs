//! Bitboard representation and operations.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the
//! chess board. Directional shifts are masked so that nothing wraps from one
//! edge file to the other, and sliding rays are produced by a bounded fill
//! rather than lookup tables.

use chess_core::{File, Rank, Square};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// One of the eight compass directions on the board.
///
/// North points toward rank 8 and east toward file h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All eight directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four directions a rook slides in.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The four directions a bishop slides in.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Returns the reverse direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

const DEBRUIJN64: u64 = 0x03f7_9d71_b4cb_0a89;

const LSB_TABLE: [u8; 64] = [
    0, 1, 48, 2, 57, 49, 28, 3, 61, 58, 50, 42, 38, 29, 17, 4, 62, 55, 59, 36, 53, 51, 43, 22, 45,
    39, 33, 30, 24, 18, 12, 5, 63, 47, 56, 27, 60, 41, 37, 16, 54, 35, 52, 21, 44, 32, 23, 11, 46,
    26, 40, 15, 34, 20, 31, 10, 25, 14, 19, 9, 13, 8, 7, 6,
];

const MSB_TABLE: [u8; 64] = [
    0, 47, 1, 56, 48, 27, 2, 60, 57, 49, 41, 37, 28, 16, 3, 61, 54, 58, 35, 52, 50, 42, 21, 44, 38,
    32, 29, 23, 17, 11, 4, 62, 46, 55, 26, 59, 40, 36, 15, 53, 34, 51, 20, 43, 31, 22, 10, 45, 25,
    39, 14, 33, 19, 30, 9, 24, 13, 18, 8, 12, 7, 6, 5, 63,
];

/// A 64-bit set of squares.
///
/// Bit 0 = a1, bit 1 = b1, ..., bit 63 = h8 (little-endian rank-file mapping).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    /// Empty bitboard (no squares set).
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Full bitboard (all squares set).
    pub const FULL: Bitboard = Bitboard(!0);

    // File masks
    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_B: Bitboard = Bitboard(0x0202_0202_0202_0202);
    pub const FILE_G: Bitboard = Bitboard(0x4040_4040_4040_4040);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    // Rank masks
    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_7: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    /// The outer ring of squares.
    pub const EDGES: Bitboard =
        Bitboard(Self::FILE_A.0 | Self::FILE_H.0 | Self::RANK_1.0 | Self::RANK_8.0);

    /// Creates a bitboard from a raw u64.
    #[inline]
    pub const fn new(bits: u64) -> Self {
        Bitboard(bits)
    }

    /// Creates a bitboard with a single square set.
    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.index())
    }

    /// Returns the mask of every square on `file`.
    #[inline]
    pub const fn file(file: File) -> Self {
        Bitboard(Self::FILE_A.0 << file.index())
    }

    /// Returns the mask of every square on `rank`.
    #[inline]
    pub const fn rank(rank: Rank) -> Self {
        Bitboard(Self::RANK_1.0 << (8 * rank.index()))
    }

    /// Returns true if the bitboard is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the bitboard is not empty.
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns the number of set bits.
    ///
    /// Uses a bit-parallel reduction: pairwise sums, then nibble sums, then a
    /// multiply that accumulates every byte into the top one.
    #[inline]
    pub const fn count(self) -> u32 {
        let mut n = self.0;
        n -= (n >> 1) & 0x5555_5555_5555_5555;
        n = (n & 0x3333_3333_3333_3333) + ((n >> 2) & 0x3333_3333_3333_3333);
        n = (n + (n >> 4)) & 0x0F0F_0F0F_0F0F_0F0F;
        (n.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
    }

    /// Returns true if the given square is set.
    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 & (1u64 << sq.index())) != 0
    }

    /// Returns a copy with the given square set.
    #[inline]
    pub const fn with(self, sq: Square) -> Self {
        Bitboard(self.0 | (1u64 << sq.index()))
    }

    /// Returns a copy with the given square cleared.
    #[inline]
    pub const fn without(self, sq: Square) -> Self {
        Bitboard(self.0 & !(1u64 << sq.index()))
    }

    /// Sets the given square.
    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.index();
    }

    /// Clears the given square.
    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.index());
    }

    /// Returns the squares in either set.
    #[inline]
    pub const fn union(self, other: Bitboard) -> Self {
        Bitboard(self.0 | other.0)
    }

    /// Returns the squares in both sets.
    #[inline]
    pub const fn intersection(self, other: Bitboard) -> Self {
        Bitboard(self.0 & other.0)
    }

    /// Returns the squares of `self` that are not in `other`.
    #[inline]
    pub const fn difference(self, other: Bitboard) -> Self {
        Bitboard(self.0 & !other.0)
    }

    /// Returns the lowest set square.
    ///
    /// Isolates the lowest bit, multiplies by a De Bruijn constant and reads
    /// the index out of the top six bits.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let isolated = self.0 & self.0.wrapping_neg();
        let index = LSB_TABLE[(isolated.wrapping_mul(DEBRUIJN64) >> 58) as usize];
        Square::from_index(index)
    }

    /// Returns the highest set square.
    ///
    /// Smears the highest bit into every lower position first, so the same
    /// De Bruijn multiply identifies it.
    #[inline]
    pub const fn msb(self) -> Option<Square> {
        if self.0 == 0 {
            return None;
        }
        let mut x = self.0;
        x |= x >> 1;
        x |= x >> 2;
        x |= x >> 4;
        x |= x >> 8;
        x |= x >> 16;
        x |= x >> 32;
        let index = MSB_TABLE[(x.wrapping_mul(DEBRUIJN64) >> 58) as usize];
        Square::from_index(index)
    }

    /// Pops and returns the least significant square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Pops and returns the most significant square.
    #[inline]
    pub fn pop_msb(&mut self) -> Option<Square> {
        let sq = self.msb()?;
        self.clear(sq);
        Some(sq)
    }

    /// Shifts every square one step toward `dir`, dropping what leaves the board.
    #[inline]
    pub const fn shift(self, dir: Direction) -> Bitboard {
        match dir {
            Direction::North => self.north(),
            Direction::NorthEast => self.north_east(),
            Direction::East => self.east(),
            Direction::SouthEast => self.south_east(),
            Direction::South => self.south(),
            Direction::SouthWest => self.south_west(),
            Direction::West => self.west(),
            Direction::NorthWest => self.north_west(),
        }
    }

    /// Extends every square toward `dir` until it meets an obstacle.
    ///
    /// The result includes the starting squares and every empty square up to
    /// (not including) the first obstacle. Seven steps reach any edge.
    #[inline]
    pub const fn fill(self, dir: Direction, obstacles: Bitboard) -> Bitboard {
        let empty = !obstacles.0;
        let mut bb = self.0;
        let mut i = 0;
        while i < 7 {
            bb |= empty & Bitboard(bb).shift(dir).0;
            i += 1;
        }
        Bitboard(bb)
    }

    /// Returns the squares a slider on these squares reaches toward `dir`.
    ///
    /// Includes the first obstacle hit, excludes the starting squares.
    #[inline]
    pub const fn ray(self, dir: Direction, obstacles: Bitboard) -> Bitboard {
        self.fill(dir, obstacles).shift(dir)
    }

    /// Shifts the bitboard north (toward rank 8).
    #[inline]
    pub const fn north(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// Shifts the bitboard south (toward rank 1).
    #[inline]
    pub const fn south(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    /// Shifts the bitboard east (toward file H).
    #[inline]
    pub const fn east(self) -> Bitboard {
        Bitboard((self.0 << 1) & !Self::FILE_A.0)
    }

    /// Shifts the bitboard west (toward file A).
    #[inline]
    pub const fn west(self) -> Bitboard {
        Bitboard((self.0 >> 1) & !Self::FILE_H.0)
    }

    /// Shifts the bitboard northeast.
    #[inline]
    pub const fn north_east(self) -> Bitboard {
        Bitboard((self.0 << 9) & !Self::FILE_A.0)
    }

    /// Shifts the bitboard northwest.
    #[inline]
    pub const fn north_west(self) -> Bitboard {
        Bitboard((self.0 << 7) & !Self::FILE_H.0)
    }

    /// Shifts the bitboard southeast.
    #[inline]
    pub const fn south_east(self) -> Bitboard {
        Bitboard((self.0 >> 7) & !Self::FILE_A.0)
    }

    /// Shifts the bitboard southwest.
    #[inline]
    pub const fn south_west(self) -> Bitboard {
        Bitboard((self.0 >> 9) & !Self::FILE_H.0)
    }
}

impl From<Square> for Bitboard {
    #[inline]
    fn from(sq: Square) -> Self {
        Bitboard::from_square(sq)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Self;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let sq = rank * 8 + file;
                if (self.0 >> sq) & 1 == 1 {
                    write!(f, "X ")?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

/// Iterator over set squares in a bitboard, lowest first.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl DoubleEndedIterator for BitboardIter {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_msb()
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn bitboard_from_square() {
        let bb = Bitboard::from_square(Square::A1);
        assert_eq!(bb.0, 1);
        assert!(bb.contains(Square::A1));
        assert!(!bb.contains(Square::B1));
    }

    #[test]
    fn count_matches_hardware_popcount() {
        assert_eq!(Bitboard::EMPTY.count(), 0);
        assert_eq!(Bitboard::FULL.count(), 64);
        assert_eq!(Bitboard::FILE_A.count(), 8);
        assert_eq!(Bitboard::EDGES.count(), 28);
        for bits in [0x8000_0000_0000_0001u64, 0xDEAD_BEEF_0BAD_F00D, 0x5555, u64::MAX - 1] {
            assert_eq!(Bitboard(bits).count(), bits.count_ones());
        }
    }

    #[test]
    fn lsb_and_msb_match_hardware_scans() {
        assert_eq!(Bitboard::EMPTY.lsb(), None);
        assert_eq!(Bitboard::EMPTY.msb(), None);
        for index in 0..64u8 {
            let single = Bitboard(1u64 << index);
            assert_eq!(single.lsb().map(|s| s.index()), Some(index));
            assert_eq!(single.msb().map(|s| s.index()), Some(index));
        }
        let bits = 0x0040_0000_1000_0300u64;
        assert_eq!(
            Bitboard(bits).lsb().map(|s| s.index()),
            Some(bits.trailing_zeros() as u8)
        );
        assert_eq!(
            Bitboard(bits).msb().map(|s| s.index()),
            Some(63 - bits.leading_zeros() as u8)
        );
    }

    #[test]
    fn shifts_do_not_wrap() {
        let h_file = Bitboard::FILE_H;
        assert!(h_file.east().is_empty());
        assert!(h_file.north_east().is_empty());
        assert!(h_file.south_east().is_empty());
        let a_file = Bitboard::FILE_A;
        assert!(a_file.west().is_empty());
        assert!(a_file.north_west().is_empty());
        assert!(a_file.south_west().is_empty());
        assert!(Bitboard::RANK_8.north().is_empty());
        assert!(Bitboard::RANK_1.south().is_empty());
    }

    #[test]
    fn shift_directions() {
        let e4 = Bitboard::from_square(sq("e4"));
        assert_eq!(e4.shift(Direction::North), Bitboard::from_square(sq("e5")));
        assert_eq!(e4.shift(Direction::SouthWest), Bitboard::from_square(sq("d3")));
        assert_eq!(e4.shift(Direction::East), Bitboard::from_square(sq("f4")));
        for dir in Direction::ALL {
            assert_eq!(e4.shift(dir).shift(dir.opposite()), e4);
        }
    }

    #[test]
    fn fill_stops_before_obstacle() {
        let a1 = Bitboard::from_square(Square::A1);
        let obstacles = Bitboard::from_square(sq("a5"));
        let filled = a1.fill(Direction::North, obstacles);
        assert_eq!(
            filled,
            [sq("a1"), sq("a2"), sq("a3"), sq("a4")].into_iter().collect()
        );
        let ray = a1.ray(Direction::North, obstacles);
        assert_eq!(
            ray,
            [sq("a2"), sq("a3"), sq("a4"), sq("a5")].into_iter().collect()
        );
    }

    #[test]
    fn ray_reaches_edge_on_empty_board() {
        let d4 = Bitboard::from_square(sq("d4"));
        assert_eq!(d4.ray(Direction::East, Bitboard::EMPTY).count(), 4);
        assert_eq!(d4.ray(Direction::NorthWest, Bitboard::EMPTY).count(), 3);
        assert_eq!(d4.ray(Direction::SouthWest, Bitboard::EMPTY).count(), 3);
    }

    #[test]
    fn named_set_algebra() {
        let a = Bitboard::FILE_A;
        let r = Bitboard::RANK_1;
        assert_eq!(a.intersection(r), Bitboard::from_square(Square::A1));
        assert_eq!(a.union(r).count(), 15);
        assert_eq!(a.difference(r).count(), 7);
        assert_eq!(a.without(Square::A1), a.difference(r));
        assert_eq!(Bitboard::file(File::H), Bitboard::FILE_H);
        assert_eq!(Bitboard::rank(Rank::R8), Bitboard::RANK_8);
    }

    #[test]
    fn bitboard_iterator_both_ends() {
        let squares: Vec<Square> = Bitboard::FILE_A.into_iter().collect();
        assert_eq!(squares.len(), 8);
        assert_eq!(squares[0], Square::A1);
        assert_eq!(Bitboard::FILE_A.into_iter().next_back(), Some(Square::A8));
    }

    #[test]
    fn bitboard_pop_lsb_and_msb() {
        let mut bb = Bitboard::new(0b1010);
        assert_eq!(bb.pop_msb().map(|s| s.index()), Some(3));
        assert_eq!(bb.pop_lsb().map(|s| s.index()), Some(1));
        assert_eq!(bb.pop_lsb(), None);
    }
}
