//! Paging direction and comparison operator algebra
//!
//! Two independent axes decide the cursor predicate: the sort order of the
//! connection and the direction the client is paging in. Requests for `last`
//! additionally flip the physical ORDER BY so the engine returns the rows
//! nearest to the cursor first.

use super::types::Predicate;
use crate::args::PaginationArgs;
use crate::cursor::{Cursor, CursorFields};
use crate::types::{Comparison, NullsOrder, PagingDirection, QueryOrder};

/// Direction the client pages in
///
/// `before` wins over `after`, and only then does a bare `last` count as
/// backward paging.
pub fn paging_direction(args: &PaginationArgs) -> PagingDirection {
    if args.before_cursor().is_some() {
        PagingDirection::Backward
    } else if args.after_cursor().is_some() {
        PagingDirection::Forward
    } else if args.has_last() {
        PagingDirection::Backward
    } else {
        PagingDirection::Forward
    }
}

/// Physical sort order sent to the engine
pub fn effective_order(order: QueryOrder, args: &PaginationArgs) -> QueryOrder {
    if args.has_last() {
        order.reverse()
    } else {
        order
    }
}

/// Operator that selects the rows on the requested side of a cursor
///
/// `order` is the logical order of the connection, not the physical one
/// returned by [`effective_order`].
pub fn comparison_operator(order: QueryOrder, direction: PagingDirection) -> Comparison {
    match (order, direction) {
        (QueryOrder::Asc, PagingDirection::Forward) => Comparison::Gt,
        (QueryOrder::Asc, PagingDirection::Backward) => Comparison::Lt,
        (QueryOrder::Desc, PagingDirection::Forward) => Comparison::Lt,
        (QueryOrder::Desc, PagingDirection::Backward) => Comparison::Gt,
    }
}

/// Seek predicate selecting the rows strictly on one side of the cursor
///
/// `order` is the logical order, `direction` the side to select and `nulls`
/// where NULL sort values sit in the logical order. With a distinct sort
/// field and a sort value `v` in the cursor this is
/// `(order op v) OR (order = v AND id op id)`, plus the NULL block when it
/// lies on the selected side. A NULL `v` seeks within the NULL block and adds
/// the non-NULL rows when they lie on the selected side. Otherwise only the
/// id is compared.
pub fn cursor_predicate(
    fields: &CursorFields,
    cursor: &Cursor,
    order: QueryOrder,
    direction: PagingDirection,
    nulls: NullsOrder,
) -> Predicate {
    let op = comparison_operator(order, direction);
    let id_branch = Predicate::compare(fields.id_field(), op, cursor.id());

    let order_value = match cursor.order_value() {
        Some(value) if fields.is_composite() => value,
        _ => return id_branch,
    };

    let sort = fields.order_by_field();
    let nulls_ahead = (nulls == NullsOrder::Last) == (direction == PagingDirection::Forward);

    if order_value.is_null() {
        let within_nulls = Predicate::and(vec![Predicate::is_null(sort), id_branch]);
        return if nulls_ahead {
            within_nulls
        } else {
            Predicate::or(vec![Predicate::is_not_null(sort), within_nulls])
        };
    }

    let mut branches = vec![
        Predicate::compare(sort, op, order_value.clone()),
        Predicate::and(vec![Predicate::eq(sort, order_value.clone()), id_branch]),
    ];
    if nulls_ahead {
        branches.push(Predicate::is_null(sort));
    }
    Predicate::or(branches)
}
