use crate::auth::RequestContext;

/// Whether the request may act on something owned by `owner`.
///
/// `owner` must come from the store, never from the request.
pub fn can_act_as(context: &RequestContext, owner: &str) -> bool {
    context
        .identity()
        .map_or(false, |identity| identity == owner)
}

/// Whether anyone is logged in at all.
pub fn is_logged_in(context: &RequestContext) -> bool {
    context.identity().is_some()
}
