// Generic table projection: rows + column specs -> sorted, colored cells.
//
// Nothing here owns data. A `TableSpec` is validated once, then `render`
// is a pure function of its inputs.

use thiserror::Error;

use crate::color::{scale, CellColor, ColorMode, Palette};
use crate::compare::{compare, CellValue};
use crate::stats::StatsRange;

/// Field lookup for anything a table can display.
pub trait TableRow {
    fn field(&self, key: &str) -> CellValue;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    Numeric,
    Lexical,
    #[default]
    None,
}

impl SortType {
    /// Direction used the first time a column is activated.
    pub fn default_ascending(self) -> bool {
        !matches!(self, SortType::Numeric)
    }

    pub fn is_sortable(self) -> bool {
        self != SortType::None
    }
}

pub type ComputeFn<T> = fn(&T) -> CellValue;
pub type FormatFn = fn(&CellValue) -> String;
pub type RenderFn<T> = fn(&T, &CellValue) -> String;

/// Describes one column.
pub struct ColumnSpec<T> {
    pub key: &'static str,
    pub label: String,
    pub sort: SortType,
    /// Field to read when it differs from `key`.
    pub src: Option<&'static str>,
    pub compute: Option<ComputeFn<T>>,
    pub color: ColorMode,
    /// Stats entry to scale against; defaults to `key`.
    pub range_key: Option<&'static str>,
    pub fmt: Option<FormatFn>,
    pub render: Option<RenderFn<T>>,
}

// Manual impls: the derives would require `T: Clone`/`T: Debug`.
impl<T> Clone for ColumnSpec<T> {
    fn clone(&self) -> Self {
        ColumnSpec {
            key: self.key,
            label: self.label.clone(),
            sort: self.sort,
            src: self.src,
            compute: self.compute,
            color: self.color,
            range_key: self.range_key,
            fmt: self.fmt,
            render: self.render,
        }
    }
}

impl<T> std::fmt::Debug for ColumnSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sort", &self.sort)
            .field("src", &self.src)
            .field("color", &self.color)
            .field("range_key", &self.range_key)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnSpec<T> {
    pub fn new(key: &'static str, label: impl Into<String>, sort: SortType) -> Self {
        ColumnSpec {
            key,
            label: label.into(),
            sort,
            src: None,
            compute: None,
            color: ColorMode::None,
            range_key: None,
            fmt: None,
            render: None,
        }
    }

    pub fn src(mut self, field: &'static str) -> Self {
        self.src = Some(field);
        self
    }

    pub fn compute(mut self, f: ComputeFn<T>) -> Self {
        self.compute = Some(f);
        self
    }

    pub fn color(mut self, mode: ColorMode) -> Self {
        self.color = mode;
        self
    }

    pub fn range_key(mut self, key: &'static str) -> Self {
        self.range_key = Some(key);
        self
    }

    pub fn fmt(mut self, f: FormatFn) -> Self {
        self.fmt = Some(f);
        self
    }

    pub fn render(mut self, f: RenderFn<T>) -> Self {
        self.render = Some(f);
        self
    }
}

impl<T: TableRow> ColumnSpec<T> {
    /// Raw value of this column for `row`.
    pub fn value(&self, row: &T) -> CellValue {
        match self.compute {
            Some(f) => f(row),
            None => row.field(self.src.unwrap_or(self.key)),
        }
    }

    /// Display text: custom renderer, then formatter, then the raw value.
    pub fn display(&self, row: &T, value: &CellValue) -> String {
        if let Some(render) = self.render {
            render(row, value)
        } else if let Some(fmt) = self.fmt {
            fmt(value)
        } else {
            value.to_string()
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub ascending: bool,
}

impl SortState {
    pub fn new(key: impl Into<String>, ascending: bool) -> Self {
        SortState {
            key: key.into(),
            ascending,
        }
    }

    /// A header was clicked. Toggles direction on the active column,
    /// otherwise switches to `column` in its default direction. Unsortable
    /// columns are ignored; returns whether anything changed.
    pub fn activate<T>(&mut self, column: &ColumnSpec<T>) -> bool {
        if !column.sort.is_sortable() {
            return false;
        }
        if self.key == column.key {
            self.ascending = !self.ascending;
        } else {
            self.key = column.key.to_string();
            self.ascending = column.sort.default_ascending();
        }
        true
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table has no columns")]
    NoColumns,

    #[error("column key must not be empty (label {0:?})")]
    EmptyKey(String),

    #[error("duplicate column key: {0}")]
    DuplicateKey(String),

    #[error("column {0} has a range key but no color mode")]
    RangeKeyWithoutColor(String),

    #[error("default sort column {0} does not exist")]
    UnknownSortKey(String),

    #[error("default sort column {0} is not sortable")]
    UnsortableDefault(String),
}

/// A validated column list plus its initial sort.
#[derive(Debug, Clone)]
pub struct TableSpec<T> {
    columns: Vec<ColumnSpec<T>>,
    default_sort: SortState,
}

impl<T> TableSpec<T> {
    pub fn new(columns: Vec<ColumnSpec<T>>, default_sort: SortState) -> Result<Self, TableError> {
        if columns.is_empty() {
            return Err(TableError::NoColumns);
        }
        for (i, col) in columns.iter().enumerate() {
            if col.key.is_empty() {
                return Err(TableError::EmptyKey(col.label.clone()));
            }
            if columns[..i].iter().any(|c| c.key == col.key) {
                return Err(TableError::DuplicateKey(col.key.to_string()));
            }
            if col.range_key.is_some() && col.color == ColorMode::None {
                return Err(TableError::RangeKeyWithoutColor(col.key.to_string()));
            }
        }
        let sort_col = columns
            .iter()
            .find(|c| c.key == default_sort.key)
            .ok_or_else(|| TableError::UnknownSortKey(default_sort.key.clone()))?;
        if !sort_col.sort.is_sortable() {
            return Err(TableError::UnsortableDefault(default_sort.key.clone()));
        }
        Ok(TableSpec {
            columns,
            default_sort,
        })
    }

    pub fn columns(&self) -> &[ColumnSpec<T>] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnSpec<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn default_sort(&self) -> SortState {
        self.default_sort.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub value: CellValue,
    pub text: String,
    pub color: CellColor,
}

#[derive(Debug, Clone)]
pub struct RenderedRow<'a, T> {
    pub source: &'a T,
    pub cells: Vec<RenderedCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: &'static str,
    pub label: String,
    /// `Some(ascending)` on the active sort column.
    pub sorted: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RenderedTable<'a, T> {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow<'a, T>>,
}

impl<'a, T> RenderedTable<'a, T> {
    /// Report the row at `index` to `on_select`. Out-of-range indices are
    /// ignored.
    pub fn select<R>(&self, index: usize, on_select: impl FnOnce(&'a T) -> R) -> Option<R> {
        self.rows.get(index).map(|r| on_select(r.source))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: TableRow> TableSpec<T> {
    /// Project `rows` into display cells, sorted by `sort`. Sorting is
    /// stable; an unknown or unsortable sort key keeps input order.
    pub fn render<'a, I>(
        &self,
        rows: I,
        sort: &SortState,
        stats: &StatsRange,
        palette: &Palette,
    ) -> RenderedTable<'a, T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut out: Vec<RenderedRow<'a, T>> = rows
            .into_iter()
            .map(|row| RenderedRow {
                source: row,
                cells: self
                    .columns
                    .iter()
                    .map(|col| {
                        let value = col.value(row);
                        let range = stats.range(col.range_key.unwrap_or(col.key));
                        RenderedCell {
                            text: col.display(row, &value),
                            color: scale(value.as_number(), range, col.color, palette),
                            value,
                        }
                    })
                    .collect(),
            })
            .collect();

        let sort_idx = self
            .columns
            .iter()
            .position(|c| c.key == sort.key && c.sort.is_sortable());
        if let Some(idx) = sort_idx {
            out.sort_by(|a, b| compare(&a.cells[idx].value, &b.cells[idx].value, sort.ascending));
        }

        let headers = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| HeaderCell {
                key: c.key,
                label: c.label.clone(),
                sorted: (Some(i) == sort_idx).then_some(sort.ascending),
            })
            .collect();

        RenderedTable { headers, rows: out }
    }
}
