//! Grid topology: valid vertices, move edges and capturing lines.
//!
//! A grid is pure data built from its list of lines. Two vertices are
//! connected by a move edge when they are consecutive within some line,
//! so every topology is described completely by its lines.

use super::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// Built-in grid topologies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GridKind {
    /// Three concentric squares with mid-side connectors (24 vertices).
    #[default]
    NineMensMorris,
    /// 3x3 square with diagonals (9 vertices).
    ThreeMensMorris,
}

impl GridKind {
    /// Builds the grid for this topology.
    #[instrument]
    pub fn build(self) -> Grid {
        match self {
            GridKind::NineMensMorris => Grid::from_lines(self, nine_mens_lines()),
            GridKind::ThreeMensMorris => Grid::from_lines(self, three_mens_lines()),
        }
    }
}

/// An ordered run of vertices that forms a capturing line when fully held by one side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line(Vec<Position>);

impl Line {
    /// Returns the vertices of this line in order.
    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    /// Returns true if the line passes through `position`.
    pub fn contains(&self, position: Position) -> bool {
        self.0.contains(&position)
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<_> = self.0.iter().map(|p| format!("({})", p)).collect();
        write!(f, "{}", labels.join("-"))
    }
}

/// Board geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    kind: GridKind,
    vertices: BTreeSet<Position>,
    lines: Vec<Line>,
    edges: BTreeMap<Position, BTreeSet<Position>>,
}

impl Grid {
    /// Builds a grid from its lines.
    ///
    /// Vertices are the union of all line vertices; consecutive vertices
    /// within a line are connected.
    #[instrument(skip(lines))]
    pub fn from_lines(kind: GridKind, lines: Vec<Vec<Position>>) -> Self {
        let mut vertices = BTreeSet::new();
        let mut edges: BTreeMap<Position, BTreeSet<Position>> = BTreeMap::new();

        for line in &lines {
            vertices.extend(line.iter().copied());
            for pair in line.windows(2) {
                edges.entry(pair[0]).or_default().insert(pair[1]);
                edges.entry(pair[1]).or_default().insert(pair[0]);
            }
        }

        Self {
            kind,
            vertices,
            lines: lines.into_iter().map(Line).collect(),
            edges,
        }
    }

    /// Returns the topology this grid was built from.
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Returns true if `position` is a vertex of this grid.
    pub fn contains(&self, position: Position) -> bool {
        self.vertices.contains(&position)
    }

    /// Returns all vertices in coordinate order.
    pub fn vertices(&self) -> impl Iterator<Item = Position> + '_ {
        self.vertices.iter().copied()
    }

    /// Returns the number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the grid has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns every line in definition order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the lines passing through `position`.
    pub fn lines_through(&self, position: Position) -> impl Iterator<Item = &Line> + '_ {
        self.lines.iter().filter(move |line| line.contains(position))
    }

    /// Returns the vertices connected to `position` by a move edge.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        self.edges
            .get(&position)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns true if `from` and `to` are connected by a move edge.
    pub fn is_adjacent(&self, from: Position, to: Position) -> bool {
        self.edges
            .get(&from)
            .is_some_and(|set| set.contains(&to))
    }
}

fn line(points: [(i32, i32); 3]) -> Vec<Position> {
    points.iter().map(|&(x, y)| Position::new(x, y)).collect()
}

fn nine_mens_lines() -> Vec<Vec<Position>> {
    vec![
        // Rows
        line([(0, 0), (3, 0), (6, 0)]),
        line([(1, 1), (3, 1), (5, 1)]),
        line([(2, 2), (3, 2), (4, 2)]),
        line([(0, 3), (1, 3), (2, 3)]),
        line([(4, 3), (5, 3), (6, 3)]),
        line([(2, 4), (3, 4), (4, 4)]),
        line([(1, 5), (3, 5), (5, 5)]),
        line([(0, 6), (3, 6), (6, 6)]),
        // Columns
        line([(0, 0), (0, 3), (0, 6)]),
        line([(1, 1), (1, 3), (1, 5)]),
        line([(2, 2), (2, 3), (2, 4)]),
        line([(3, 0), (3, 1), (3, 2)]),
        line([(3, 4), (3, 5), (3, 6)]),
        line([(4, 2), (4, 3), (4, 4)]),
        line([(5, 1), (5, 3), (5, 5)]),
        line([(6, 0), (6, 3), (6, 6)]),
    ]
}

fn three_mens_lines() -> Vec<Vec<Position>> {
    vec![
        // Rows
        line([(0, 0), (1, 0), (2, 0)]),
        line([(0, 1), (1, 1), (2, 1)]),
        line([(0, 2), (1, 2), (2, 2)]),
        // Columns
        line([(0, 0), (0, 1), (0, 2)]),
        line([(1, 0), (1, 1), (1, 2)]),
        line([(2, 0), (2, 1), (2, 2)]),
        // Diagonals
        line([(0, 0), (1, 1), (2, 2)]),
        line([(2, 0), (1, 1), (0, 2)]),
    ]
}
