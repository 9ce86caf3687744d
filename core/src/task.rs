//! Parser for the `#`-delimited task description format.

use std::str::FromStr;

use thiserror::Error;

use crate::{BoosterKind, Point};

const FIELD_DELIMITER: char = '#';
const ITEM_DELIMITER: char = ';';
const FIELD_NAMES: [&str; 4] = ["boundary", "start point", "obstacles", "boosters"];

/// Errors raised while loading a task description into a map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DescriptionError {
    /// One of the four `#`-separated fields was absent.
    #[error("task description is missing the {0} field")]
    MissingField(&'static str),
    /// The description contained more than four fields.
    #[error("task description has {0} fields; expected 4")]
    TooManyFields(usize),
    /// A point was not of the form `(x,y)` with non-negative integers.
    #[error("malformed point {0:?}")]
    MalformedPoint(String),
    /// A polygon had fewer vertices than a closed rectilinear shape requires.
    #[error("polygon has {0} vertices; at least 4 are required")]
    TooFewVertices(usize),
    /// A polygon edge was neither horizontal nor vertical.
    #[error("polygon edge {from} -> {to} is not axis-aligned")]
    DiagonalEdge {
        /// First vertex of the edge.
        from: Point,
        /// Second vertex of the edge.
        to: Point,
    },
    /// A polygon edge joined a vertex to itself.
    #[error("polygon edge {from} -> {to} has zero length")]
    DegenerateEdge {
        /// First vertex of the edge.
        from: Point,
        /// Second vertex of the edge.
        to: Point,
    },
    /// A booster placement used an unknown code.
    #[error("unknown booster placement {0:?}")]
    UnknownBooster(String),
    /// The start point was outside the map or on a wall.
    #[error("start point {0} is outside the map or on a wall")]
    StartNotFree(Point),
    /// The boundary spans more cells than a grid may hold.
    #[error("map of {width}x{height} cells is too large")]
    MapTooLarge {
        /// Columns the grid would need.
        width: u32,
        /// Rows the grid would need.
        height: u32,
    },
    /// A booster was placed outside the map or on a wall.
    #[error("{kind} booster at {cell} is outside the map or on a wall")]
    BoosterOnWall {
        /// Kind of the misplaced booster.
        kind: BoosterKind,
        /// Cell named by the placement.
        cell: Point,
    },
}

/// Closed rectilinear polygon. The closing edge from the last vertex back to
/// the first is implicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validates the vertex list and wraps it.
    pub fn new(vertices: Vec<Point>) -> Result<Self, DescriptionError> {
        if vertices.len() < 4 {
            return Err(DescriptionError::TooFewVertices(vertices.len()));
        }

        let polygon = Self { vertices };
        for (from, to) in polygon.edges() {
            if from == to {
                return Err(DescriptionError::DegenerateEdge { from, to });
            }
            if from.x() != to.x() && from.y() != to.y() {
                return Err(DescriptionError::DiagonalEdge { from, to });
            }
        }
        Ok(polygon)
    }

    /// Vertices in traversal order.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Edges in traversal order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |index| (self.vertices[index], self.vertices[(index + 1) % count]))
    }

    /// Largest x and y coordinates among the vertices.
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        self.vertices.iter().fold((0, 0), |(max_x, max_y), vertex| {
            (max_x.max(vertex.x()), max_y.max(vertex.y()))
        })
    }

    fn parse(text: &str) -> Result<Self, DescriptionError> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| DescriptionError::MalformedPoint(trimmed.to_owned()))?;

        let vertices = inner
            .split("),(")
            .map(parse_coordinates)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(vertices)
    }
}

/// Booster lying on the map before the run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoosterPlacement {
    /// Kind of booster.
    pub kind: BoosterKind,
    /// Cell the booster lies on.
    pub cell: Point,
}

/// Parsed task: the map outline, obstacles, start point and boosters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskDescription {
    boundary: Polygon,
    start: Point,
    obstacles: Vec<Polygon>,
    boosters: Vec<BoosterPlacement>,
}

impl TaskDescription {
    /// Assembles a task from already validated parts.
    #[must_use]
    pub fn new(
        boundary: Polygon,
        start: Point,
        obstacles: Vec<Polygon>,
        boosters: Vec<BoosterPlacement>,
    ) -> Self {
        Self {
            boundary,
            start,
            obstacles,
            boosters,
        }
    }

    /// Parses the four-field textual description.
    pub fn parse(text: &str) -> Result<Self, DescriptionError> {
        let fields: Vec<&str> = text.trim().split(FIELD_DELIMITER).collect();
        if fields.len() > FIELD_NAMES.len() {
            return Err(DescriptionError::TooManyFields(fields.len()));
        }
        if let Some(missing) = FIELD_NAMES.get(fields.len()) {
            return Err(DescriptionError::MissingField(*missing));
        }

        let boundary = Polygon::parse(fields[0])?;
        let start = parse_point(fields[1])?;
        let obstacles = items(fields[2])
            .map(Polygon::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let boosters = items(fields[3])
            .map(parse_booster)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(boundary, start, obstacles, boosters))
    }

    /// Outer boundary of the map.
    #[must_use]
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    /// Cell the agent starts on.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Obstacles carved out of the map interior.
    #[must_use]
    pub fn obstacles(&self) -> &[Polygon] {
        &self.obstacles
    }

    /// Boosters lying on the map.
    #[must_use]
    pub fn boosters(&self) -> &[BoosterPlacement] {
        &self.boosters
    }
}

impl FromStr for TaskDescription {
    type Err = DescriptionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

fn items<'a>(field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    field
        .split(ITEM_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_point(text: &str) -> Result<Point, DescriptionError> {
    let trimmed = text.trim();
    trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| DescriptionError::MalformedPoint(trimmed.to_owned()))
        .and_then(parse_coordinates)
}

fn parse_coordinates(text: &str) -> Result<Point, DescriptionError> {
    let malformed = || DescriptionError::MalformedPoint(text.to_owned());
    let (x, y) = text.split_once(',').ok_or_else(malformed)?;
    let x = x.trim().parse::<u32>().map_err(|_| malformed())?;
    let y = y.trim().parse::<u32>().map_err(|_| malformed())?;
    Ok(Point::new(x, y))
}

fn parse_booster(text: &str) -> Result<BoosterPlacement, DescriptionError> {
    let mut chars = text.chars();
    let kind = chars
        .next()
        .and_then(BoosterKind::from_code)
        .ok_or_else(|| DescriptionError::UnknownBooster(text.to_owned()))?;
    let cell = parse_point(chars.as_str())?;
    Ok(BoosterPlacement { kind, cell })
}
