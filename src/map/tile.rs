//! Cell contents and their classification for navigation.

/// What a single grid cell holds, as written in level text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    /// A regular wall (`*`).
    Wall,
    /// Permanent wall belonging to fixed level geometry, such as the ghost chamber shell (`#`).
    HardBlock,
    /// An open cell with a bean (`.`).
    Bean,
    /// An open cell with a big bean (`O`).
    BigBean,
    /// An open cell with nothing on it (` `).
    Empty,
    /// The player's starting cell (`e`).
    PlayerSpawn,
    /// The starting cell of ghost `n` (`0`-`9`).
    GhostSpawn(u8),
    /// The chamber door (`=`).
    Door,
    /// A tunnel mouth on the outer border (`T`).
    Teleport,
}

/// Navigation classification of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Open,
    Wall,
    Door,
    OutOfBounds,
}

impl Tile {
    /// Parses a single level symbol.
    pub fn from_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            '*' => Some(Tile::Wall),
            '#' => Some(Tile::HardBlock),
            '.' => Some(Tile::Bean),
            'O' => Some(Tile::BigBean),
            ' ' => Some(Tile::Empty),
            'e' => Some(Tile::PlayerSpawn),
            '=' => Some(Tile::Door),
            'T' => Some(Tile::Teleport),
            c @ '0'..='9' => Some(Tile::GhostSpawn(c as u8 - b'0')),
            _ => None,
        }
    }

    /// The level symbol for this tile.
    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '*',
            Tile::HardBlock => '#',
            Tile::Bean => '.',
            Tile::BigBean => 'O',
            Tile::Empty => ' ',
            Tile::PlayerSpawn => 'e',
            Tile::Door => '=',
            Tile::Teleport => 'T',
            Tile::GhostSpawn(n) => (b'0' + n.min(9)) as char,
        }
    }

    pub fn kind(self) -> CellKind {
        match self {
            Tile::Wall | Tile::HardBlock => CellKind::Wall,
            Tile::Door => CellKind::Door,
            _ => CellKind::Open,
        }
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, Tile::Bean | Tile::BigBean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_roundtrip() {
        for symbol in "*#.O e=T0123456789".chars() {
            let tile = Tile::from_symbol(symbol).unwrap();
            assert_eq!(tile.symbol(), symbol);
        }
        assert_eq!(Tile::from_symbol('Z'), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Tile::HardBlock.kind(), CellKind::Wall);
        assert_eq!(Tile::Door.kind(), CellKind::Door);
        assert_eq!(Tile::GhostSpawn(2).kind(), CellKind::Open);
        assert_eq!(Tile::Teleport.kind(), CellKind::Open);
    }
}
