use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Edge length of one grid cell in world units.
pub const TILE_SIZE: f32 = 40.0;

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level grid: {0}")]
    Csv(#[from] csv::Error),
    #[error("level grid is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("level grid contains no tiles")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Empty,
    Platform,
    Spike,
    Orb,
    End,
}

impl Tile {
    /// Unknown tokens are treated as empty space.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "00" => Tile::Platform,
            "Sp" => Tile::Spike,
            "Or" => Tile::Orb,
            "End" => Tile::End,
            _ => Tile::Empty,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Tile::Empty => "",
            Tile::Platform => "00",
            Tile::Spike => "Sp",
            Tile::Orb => "Or",
            Tile::End => "End",
        }
    }
}

/// Entry of the level list: display name and the grid file it loads from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LevelInfo {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelMap {
    pub rows: Vec<Vec<Tile>>,
}

impl LevelMap {
    /// One grid row per text line. Blank lines are kept as empty rows so the
    /// rows below them stay at their line's depth.
    pub fn from_csv_str(s: &str) -> Result<Self, LevelError> {
        let mut rows = Vec::new();
        for line in s.lines() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .quote(b'"')
                .from_reader(line.as_bytes());
            let row = match reader.records().next() {
                Some(record) => record?.iter().map(Tile::from_token).collect(),
                None => Vec::new(),
            };
            rows.push(row);
        }

        let map = LevelMap { rows };
        if map.tiles().next().is_none() {
            return Err(LevelError::Empty);
        }
        Ok(map)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_str(&content)
    }

    pub fn to_csv_string(&self) -> Result<String, LevelError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in &self.rows {
            writer.write_record(row.iter().map(|t| t.token()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| LevelError::Csv(e.into_error().into()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Non-empty cells as `(col, row, tile)`, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, t)| **t != Tile::Empty)
                .map(move |(col, t)| (col, row, *t))
        })
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles().filter(|(_, _, t)| *t == tile).count()
    }

    pub fn has_end(&self) -> bool {
        self.count(Tile::End) > 0
    }
}

/// World-space center of a grid cell. Rows grow downward, world y grows up.
pub fn cell_center(col: usize, row: usize) -> (f32, f32) {
    let x = col as f32 * TILE_SIZE + TILE_SIZE / 2.0;
    let y = -(row as f32 * TILE_SIZE + TILE_SIZE / 2.0);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0,0,0,0\n0,Or,0,End\n00,Sp,00,00\n";

    #[test]
    fn tokens_map_to_tiles() {
        assert_eq!(Tile::from_token("00"), Tile::Platform);
        assert_eq!(Tile::from_token(" Sp "), Tile::Spike);
        assert_eq!(Tile::from_token("Or"), Tile::Orb);
        assert_eq!(Tile::from_token("End"), Tile::End);
        assert_eq!(Tile::from_token("0"), Tile::Empty);
        assert_eq!(Tile::from_token(""), Tile::Empty);
        assert_eq!(Tile::from_token("??"), Tile::Empty);
    }

    #[test]
    fn parses_grid_in_row_major_order() {
        let map = LevelMap::from_csv_str(SAMPLE).unwrap();
        assert_eq!(map.height(), 3);
        assert_eq!(map.width(), 4);
        let tiles: Vec<_> = map.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                (1, 1, Tile::Orb),
                (3, 1, Tile::End),
                (0, 2, Tile::Platform),
                (1, 2, Tile::Spike),
                (2, 2, Tile::Platform),
                (3, 2, Tile::Platform),
            ]
        );
        assert_eq!(map.count(Tile::Platform), 3);
        assert!(map.has_end());
    }

    #[test]
    fn ragged_rows_and_quoted_tokens() {
        let map = LevelMap::from_csv_str("\"00\",0\n0,0,0,\"Sp\"\n").unwrap();
        assert_eq!(map.width(), 4);
        assert_eq!(map.rows[0][0], Tile::Platform);
        assert_eq!(map.rows[1][3], Tile::Spike);
        assert!(!map.has_end());
    }

    #[test]
    fn blank_line_keeps_its_row() {
        let map = LevelMap::from_csv_str("0,Or\n\n00,00\n").unwrap();
        assert_eq!(map.height(), 3);
        assert!(map.rows[1].is_empty());
        let tiles: Vec<_> = map.tiles().collect();
        assert_eq!(
            tiles,
            vec![(1, 0, Tile::Orb), (0, 2, Tile::Platform), (1, 2, Tile::Platform)]
        );
    }

    #[test]
    fn grid_without_tiles_is_rejected() {
        assert!(matches!(
            LevelMap::from_csv_str("0,0\n0,0\n"),
            Err(LevelError::Empty)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LevelMap::from_path("does/not/exist.csv").unwrap_err();
        match err {
            LevelError::Io { path, .. } => assert_eq!(path, PathBuf::from("does/not/exist.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn csv_output_parses_back_to_same_grid() {
        let map = LevelMap::from_csv_str(SAMPLE).unwrap();
        let text = map.to_csv_string().unwrap();
        assert_eq!(LevelMap::from_csv_str(&text).unwrap(), map);
    }

    #[test]
    fn cells_are_spaced_one_tile_apart() {
        assert_eq!(cell_center(0, 0), (20.0, -20.0));
        assert_eq!(cell_center(3, 2), (140.0, -100.0));
    }
}
