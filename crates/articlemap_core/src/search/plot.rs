//! Plot-facing projection of a view.

use crate::model::article::ArticleId;
use crate::model::collection::Collection;
use serde::Serialize;

/// One scatter-plot marker. `label` is the article title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub id: ArticleId,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub selected: bool,
}

/// Maps a view to plot markers in display order, flagging the selection.
pub fn plot_points(view: &Collection, selected: Option<&ArticleId>) -> Vec<PlotPoint> {
    view.iter()
        .map(|article| PlotPoint {
            id: article.id.clone(),
            x: article.x,
            y: article.y,
            label: article.title.clone(),
            selected: selected == Some(&article.id),
        })
        .collect()
}
