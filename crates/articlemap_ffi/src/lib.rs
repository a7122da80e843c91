//! Flutter bridge for the article map explorer.

pub mod api;
