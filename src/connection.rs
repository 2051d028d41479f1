//! Connection envelope and result shaping
//!
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types

use crate::args::{ConnectionArgs, PageDirection};
use crate::cursor::{Cursor, CursorPosition, encode_cursor};
use crate::filter::WhereClause;
use crate::plan::WindowPlan;
use crate::source::{Record, WindowRow};

/// An edge in a connection, containing a node and cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<N> {
    pub cursor: Cursor,
    pub node: N,
}

/// Information about pagination in a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// The unfetched form of a connection: its parent, arguments and filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDescriptor<S> {
    pub source: Option<S>,
    pub args: ConnectionArgs,
    pub filter: WhereClause,
}

/// A fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<N, S> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
    /// Rows matching the filter, ignoring the window.
    pub full_count: i64,
    pub descriptor: ConnectionDescriptor<S>,
}

/// What a connection field resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionOutput<N, S> {
    Connection(Connection<N, S>),
    /// The selection asked for no connection data, nothing was fetched.
    Descriptor(ConnectionDescriptor<S>),
}

impl<N, S> ConnectionOutput<N, S> {
    pub fn descriptor(&self) -> &ConnectionDescriptor<S> {
        match self {
            ConnectionOutput::Connection(connection) => &connection.descriptor,
            ConnectionOutput::Descriptor(descriptor) => descriptor,
        }
    }

    pub fn connection(&self) -> Option<&Connection<N, S>> {
        match self {
            ConnectionOutput::Connection(connection) => Some(connection),
            ConnectionOutput::Descriptor(_) => None,
        }
    }

    pub fn into_connection(self) -> Option<Connection<N, S>> {
        match self {
            ConnectionOutput::Connection(connection) => Some(connection),
            ConnectionOutput::Descriptor(_) => None,
        }
    }
}

/// Index of the first row after the anchor: 0 without one.
pub fn start_index(anchor: Option<&CursorPosition>) -> i64 {
    anchor.map_or(0, |cursor| cursor.window_index.saturating_add(1))
}

/// Build the edge for the row at `index` of a fetched window.
pub fn resolve_edge<N: Record>(node: N, index: usize, anchor: Option<&CursorPosition>) -> Edge<N> {
    let position = start_index(anchor).saturating_add(index as i64);
    Edge {
        cursor: encode_cursor(&node.identifier(), position),
        node,
    }
}

/// Edges for a fetched window, in the caller's order.
///
/// Backward windows arrive reversed; cursors keep their fetched position so
/// `before: startCursor` keeps walking backwards.
pub fn build_edges<N: Record>(rows: Vec<WindowRow<N>>, plan: &WindowPlan) -> Vec<Edge<N>> {
    let anchor = plan.anchor.as_ref();
    let mut edges: Vec<Edge<N>> = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| resolve_edge(row.node, index, anchor))
        .collect();
    if plan.direction == PageDirection::Backward {
        edges.reverse();
    }
    edges
}

/// The windowed count carried by the first row, if storage supplied one.
pub fn auxiliary_count<N>(rows: &[WindowRow<N>]) -> Option<i64> {
    rows.first().and_then(|row| row.full_count)
}

/// Page flags from position arithmetic.
///
/// Flags are only computed for bounded (`first`/`last`) requests with a
/// positive page size. A backward window was fetched in reverse, so its flags
/// are swapped. Cursor indexes come from clients, so the arithmetic saturates.
pub fn page_info<N>(edges: &[Edge<N>], plan: &WindowPlan, full_count: i64) -> PageInfo {
    let (mut has_next_page, mut has_previous_page) = (false, false);
    if let Some(count) = plan.page_size.filter(|count| *count > 0) {
        let index = start_index(plan.anchor.as_ref());
        has_next_page = index.saturating_add(1).saturating_add(count) <= full_count;
        has_previous_page = index.saturating_sub(count) >= 0;
        if plan.direction == PageDirection::Backward {
            std::mem::swap(&mut has_next_page, &mut has_previous_page);
        }
    }

    PageInfo {
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
        has_next_page,
        has_previous_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::decode_cursor;
    use crate::order::OrderBy;
    use crate::source::FetchParams;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, PartialEq)]
    struct Item(i64);

    impl Record for Item {
        fn identifier(&self) -> String {
            self.0.to_string()
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "id").then(|| json!(self.0))
        }
    }

    fn plan(page_size: Option<i64>, anchor: Option<i64>, direction: PageDirection) -> WindowPlan {
        WindowPlan {
            params: FetchParams {
                order: vec![OrderBy::asc("id")],
                ..Default::default()
            },
            anchor: anchor.map(|index| CursorPosition::new("x", index)),
            page_size,
            direction,
        }
    }

    fn rows(ids: &[i64]) -> Vec<WindowRow<Item>> {
        ids.iter().map(|id| WindowRow::new(Item(*id))).collect()
    }

    #[test]
    fn test_edge_cursors_continue_after_anchor() {
        let plan = plan(Some(2), Some(1), PageDirection::Forward);
        let edges = build_edges(rows(&[3, 4]), &plan);
        let positions: Vec<_> = edges
            .iter()
            .map(|e| decode_cursor(e.cursor.as_str()).unwrap())
            .collect();
        assert_eq!(positions, vec![CursorPosition::new("3", 2), CursorPosition::new("4", 3)]);
    }

    #[test]
    fn test_backward_edges_are_restored_to_natural_order() {
        let plan = plan(Some(2), None, PageDirection::Backward);
        let edges = build_edges(rows(&[5, 4]), &plan);
        assert_eq!(edges.iter().map(|e| e.node.0).collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(decode_cursor(edges[0].cursor.as_str()).unwrap().window_index, 1);
    }

    #[test]
    fn test_page_info_boundaries() {
        // 5 rows, first: 2 from the start
        let first_page = plan(Some(2), None, PageDirection::Forward);
        let info = page_info::<Item>(&[], &first_page, 5);
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);

        // after the second row
        let second_page = plan(Some(2), Some(1), PageDirection::Forward);
        let info = page_info::<Item>(&[], &second_page, 5);
        assert!(info.has_next_page);
        assert!(info.has_previous_page);

        // after the fourth row, one remaining
        let third_page = plan(Some(1), Some(3), PageDirection::Forward);
        let info = page_info::<Item>(&[], &third_page, 5);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_backward_flags_are_swapped() {
        let plan = plan(Some(2), None, PageDirection::Backward);
        let info = page_info::<Item>(&[], &plan, 5);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_unbounded_request_has_no_page_flags() {
        let plan = plan(None, Some(0), PageDirection::Forward);
        let edges = build_edges(rows(&[2, 3]), &plan);
        let info = page_info(&edges, &plan, 3);
        assert!(!info.has_next_page && !info.has_previous_page);
        assert_eq!(info.start_cursor, Some(edges[0].cursor.clone()));
        assert_eq!(info.end_cursor, Some(edges[1].cursor.clone()));
    }

    #[test]
    fn test_page_info_with_extreme_cursor_indexes() {
        let far_end = plan(Some(2), Some(i64::MAX), PageDirection::Forward);
        let info = page_info::<Item>(&[], &far_end, 5);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);

        let far_start = plan(Some(2), Some(i64::MIN), PageDirection::Forward);
        let info = page_info::<Item>(&[], &far_start, 5);
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn test_zero_page_size_has_no_page_flags() {
        let plan = plan(Some(0), None, PageDirection::Forward);
        let info = page_info::<Item>(&[], &plan, 5);
        assert!(!info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn test_auxiliary_count_reads_first_row() {
        let rows = vec![WindowRow::with_full_count(Item(1), 9), WindowRow::new(Item(2))];
        assert_eq!(auxiliary_count(&rows), Some(9));
        assert_eq!(auxiliary_count::<Item>(&[]), None);
    }
}
