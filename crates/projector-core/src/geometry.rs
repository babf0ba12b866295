use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn distance(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }

    /// Whether `other` lies entirely in the half-plane on the `dir` side of `self`.
    pub fn faces(&self, other: &Rect, dir: Direction) -> bool {
        const EPS: f32 = 0.001;
        match dir {
            Direction::Up => other.bottom() <= self.y + EPS,
            Direction::Down => other.y >= self.bottom() - EPS,
            Direction::Left => other.right() <= self.x + EPS,
            Direction::Right => other.x >= self.right() - EPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Movement along an ordered sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Backward,
    Forward,
}

impl Step {
    /// Applies the step to `index`, returning `None` when it would leave `0..len`.
    pub fn apply(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Step::Backward => index.checked_sub(1),
            Step::Forward => (index + 1 < len).then_some(index + 1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// Maps a direction onto this axis; perpendicular directions yield `None`.
    pub fn step(self, dir: Direction) -> Option<Step> {
        match (self, dir) {
            (Orientation::Vertical, Direction::Up) | (Orientation::Horizontal, Direction::Left) => {
                Some(Step::Backward)
            }
            (Orientation::Vertical, Direction::Down)
            | (Orientation::Horizontal, Direction::Right) => Some(Step::Forward),
            _ => None,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}
