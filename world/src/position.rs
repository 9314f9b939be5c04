//! Tile positions, directions, regions and client coordinate frames.

/// Number of planes (height levels). The wire carries the plane in 2 bits.
pub const PLANE_COUNT: u8 = 4;

/// Side length of a spatial index region, in tiles.
pub const REGION_SIZE: u16 = 32;

/// Side length of a map chunk, in tiles.
pub const CHUNK_SIZE: u16 = 8;

/// Side length of the client's loaded map area, in tiles.
pub const FRAME_SIZE: i32 = 104;

/// Local coordinates inside `FRAME_MARGIN..FRAME_SIZE - FRAME_MARGIN` keep the
/// current frame; anything outside forces a re-anchor.
pub const FRAME_MARGIN: i32 = 16;

/// An absolute tile position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub plane: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: u16, y: u16, plane: u8) -> Self {
        Self { x, y, plane }
    }

    /// Chebyshev distance on the same plane; `None` across planes.
    #[must_use]
    pub fn distance(self, other: Self) -> Option<u16> {
        if self.plane != other.plane {
            return None;
        }
        Some(self.x.abs_diff(other.x).max(self.y.abs_diff(other.y)))
    }

    /// Returns `true` if `other` is on the same plane and no more than
    /// `distance` tiles away on each axis.
    #[must_use]
    pub fn is_within(self, other: Self, distance: u16) -> bool {
        self.distance(other).is_some_and(|d| d <= distance)
    }

    /// Position one step in `direction`, or `None` at the edge of the map.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y, ..self })
    }

    #[must_use]
    pub const fn chunk_x(self) -> u16 {
        self.x / CHUNK_SIZE
    }

    #[must_use]
    pub const fn chunk_y(self) -> u16 {
        self.y / CHUNK_SIZE
    }

    #[must_use]
    pub const fn region(self) -> RegionCoordinates {
        RegionCoordinates::of(self)
    }
}

/// One of the eight movement directions, with the client's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    /// 3-bit wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::NorthWest => 0,
            Self::North => 1,
            Self::NorthEast => 2,
            Self::West => 3,
            Self::East => 4,
            Self::SouthWest => 5,
            Self::South => 6,
            Self::SouthEast => 7,
        }
    }

    /// The direction named by the low three bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::NorthWest),
            1 => Some(Self::North),
            2 => Some(Self::NorthEast),
            3 => Some(Self::West),
            4 => Some(Self::East),
            5 => Some(Self::SouthWest),
            6 => Some(Self::South),
            7 => Some(Self::SouthEast),
            _ => None,
        }
    }

    /// Tile offset `(dx, dy)`; north is +y.
    #[must_use]
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Self::NorthWest => (-1, 1),
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::SouthWest => (-1, -1),
            Self::South => (0, -1),
            Self::SouthEast => (1, -1),
        }
    }

    /// Direction of a single step from `from` to `to`, if they are adjacent.
    #[must_use]
    pub fn between(from: Position, to: Position) -> Option<Self> {
        let dx = i32::from(to.x) - i32::from(from.x);
        let dy = i32::from(to.y) - i32::from(from.y);
        Self::ALL.into_iter().find(|dir| {
            let (ddx, ddy) = dir.delta();
            i32::from(ddx) == dx && i32::from(ddy) == dy
        })
    }
}

/// Coordinates of a spatial index region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoordinates {
    pub x: u16,
    pub y: u16,
}

impl RegionCoordinates {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn of(position: Position) -> Self {
        Self {
            x: position.x / REGION_SIZE,
            y: position.y / REGION_SIZE,
        }
    }

    /// Neighbouring region, or `None` past the edge of the map.
    #[must_use]
    pub fn offset(self, dx: i16, dy: i16) -> Option<Self> {
        let max = u16::MAX / REGION_SIZE;
        let x = self.x.checked_add_signed(dx).filter(|&x| x <= max)?;
        let y = self.y.checked_add_signed(dy).filter(|&y| y <= max)?;
        Some(Self { x, y })
    }
}

/// The client-side map area local coordinates are relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFrame {
    anchor: Position,
}

impl CoordinateFrame {
    #[must_use]
    pub const fn anchored_at(anchor: Position) -> Self {
        Self { anchor }
    }

    #[must_use]
    pub const fn anchor(self) -> Position {
        self.anchor
    }

    /// Central chunk, as sent in the region change message.
    #[must_use]
    pub const fn central_chunk(self) -> (u16, u16) {
        (self.anchor.chunk_x(), self.anchor.chunk_y())
    }

    /// Absolute tile coordinates of the frame's south-west corner. Negative
    /// near the map origin.
    #[must_use]
    pub fn origin(self) -> (i32, i32) {
        let origin = |chunk: u16| (i32::from(chunk) - 6) * i32::from(CHUNK_SIZE);
        (origin(self.anchor.chunk_x()), origin(self.anchor.chunk_y()))
    }

    /// `(x, y)` of `position` relative to the frame's origin.
    #[must_use]
    pub fn local(self, position: Position) -> (i32, i32) {
        let (ox, oy) = self.origin();
        (i32::from(position.x) - ox, i32::from(position.y) - oy)
    }

    /// Returns `true` while `position` is far enough from the frame edge.
    #[must_use]
    pub fn keeps(self, position: Position) -> bool {
        let (lx, ly) = self.local(position);
        let range = FRAME_MARGIN..FRAME_SIZE - FRAME_MARGIN;
        range.contains(&lx) && range.contains(&ly)
    }
}
