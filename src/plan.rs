//! Argument shaping: connection arguments to fetch parameters
//!
//! This step is pure. It decides limit, offset, order, attributes and filter
//! for the window; nothing is fetched here.

use crate::args::{ConnectionArgs, PageDirection};
use crate::config::ConnectionConfig;
use crate::cursor::CursorPosition;
use crate::error::Result;
use crate::filter::{FilterTranslate, args_to_where};
use crate::order::{OrderBy, OrderDirection, OrderEnum};
use crate::source::{Attribute, FetchParams, Target};

/// Everything argument shaping needs besides the arguments themselves.
#[derive(Clone, Copy)]
pub struct ShapeContext<'a> {
    pub target: &'a Target,
    pub order_enum: &'a OrderEnum,
    pub translate: &'a dyn FilterTranslate,
    pub config: &'a ConnectionConfig,
}

/// The shaped window plus what result shaping needs to interpret it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    pub params: FetchParams,
    /// Decoded `after`/`before` cursor.
    pub anchor: Option<CursorPosition>,
    /// Requested `first`/`last` count.
    pub page_size: Option<i64>,
    pub direction: PageDirection,
}

impl WindowPlan {
    pub fn is_bounded(&self) -> bool {
        self.page_size.is_some()
    }
}

/// Turn connection arguments into window fetch parameters.
///
/// `last: n` is planned as `first: n` over the reversed ordering; result
/// shaping restores the natural edge order and page flags.
pub fn shape_window(args: &ConnectionArgs, ctx: ShapeContext<'_>) -> Result<WindowPlan> {
    args.validate(ctx.config.strict_arguments)?;

    let page_size = args.page_size();
    let direction = args.direction();
    let backward = direction == PageDirection::Backward;

    let mut order = ctx.order_enum.resolve(args)?;
    if backward {
        order = order.iter().map(OrderBy::reversed).collect();
    }
    let primary_key = &ctx.target.primary_key;
    if !order.iter().any(|o| o.attribute == *primary_key) {
        let direction = if backward {
            OrderDirection::Desc
        } else {
            OrderDirection::Asc
        };
        order.push(OrderBy::new(primary_key.clone(), direction));
    }

    let mut attributes: Vec<Attribute> = ctx
        .target
        .attributes
        .iter()
        .map(Attribute::column)
        .collect();
    attributes.extend(order.iter().map(|o| Attribute::column(o.attribute.clone())));
    if page_size.is_some() {
        attributes.extend(ctx.config.window_count_attribute());
    }
    let mut unique = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        if !unique.contains(&attribute) {
            unique.push(attribute);
        }
    }

    let filter = args_to_where(&args.filters, ctx.translate);

    let anchor = args.decode_anchor()?;
    let offset = anchor
        .as_ref()
        .filter(|cursor| cursor.window_index >= 0)
        .map(|cursor| cursor.window_index as u64 + 1);

    let params = FetchParams {
        limit: page_size.map(|count| count as u64),
        offset,
        order,
        attributes: unique,
        filter,
    };

    tracing::debug!(
        target_model = %ctx.target.label(),
        limit = ?params.limit,
        offset = ?params.offset,
        order = ?params.order.iter().map(ToString::to_string).collect::<Vec<_>>(),
        filter_keys = ?params.filter.keys().collect::<Vec<_>>(),
        "Shaped connection window"
    );

    Ok(WindowPlan {
        params,
        anchor,
        page_size,
        direction,
    })
}
