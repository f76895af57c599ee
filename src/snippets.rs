//! Who may create, edit and delete snippets, and what happens when they try.
//!
//! Nothing in here knows about HTTP. Each operation takes the request's
//! [`RequestContext`](crate::auth::RequestContext) and a
//! [`SnippetRepository`](crate::model::SnippetRepository), makes at most one
//! change to the store and returns a single [`Outcome`].

pub mod gate;
pub mod handler;
mod outcome;

pub use outcome::{Outcome, SnippetForm, Target, View};
