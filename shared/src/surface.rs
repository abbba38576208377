use serde::{Deserialize, Serialize};

use crate::area::{AreaId, Geometry};
use crate::colors::{AREA_FILL_OPACITY, area_fill_color};
use crate::state::MapState;
use crate::statistic::Statistic;
use crate::tooltip::tooltip_html;

/// Longitude/latitude of the pointer when it entered an area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerLocation {
    pub lng: f64,
    pub lat: f64,
}

/// One fill layer handed to the map surface. Users are not embedded; the
/// surface reports hovers by `area_id` and the core looks them up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaLayer {
    pub area_id: AreaId,
    pub name: String,
    pub pin_code: i64,
    pub user_count: usize,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub area_id: AreaId,
    pub statistic: Statistic,
    pub location: PointerLocation,
    pub html: String,
}

/// Whatever draws the map. It receives layers and tooltips and forwards
/// pointer enter/leave to [`HoverController`].
pub trait InteractionSurface {
    fn add_area(&mut self, layer: AreaLayer);
    fn show_tooltip(&mut self, tooltip: Tooltip);
    fn hide_tooltip(&mut self, area_id: AreaId);
}

/// Connects a [`MapState`] to an [`InteractionSurface`].
pub struct HoverController;

impl HoverController {
    /// Add one layer per joined area. Returns the number of layers added.
    pub fn render<S: InteractionSurface + ?Sized>(state: &MapState, surface: &mut S) -> usize {
        let areas = state.enriched().areas();
        for enriched in areas {
            let area = &enriched.area;
            surface.add_area(AreaLayer {
                area_id: area.area_id,
                name: area.name.clone(),
                pin_code: area.pin_code,
                user_count: enriched.users.len(),
                fill_color: area_fill_color(area.area_id),
                fill_opacity: AREA_FILL_OPACITY,
                geometry: area.geometry.clone(),
            });
        }
        areas.len()
    }

    /// Tooltip for `area_id` under `statistic`, or `None` if the area is unknown.
    pub fn tooltip_for(
        state: &MapState,
        area_id: AreaId,
        statistic: Statistic,
        location: PointerLocation,
    ) -> Option<Tooltip> {
        let enriched = state.enriched().get(area_id)?;
        Some(Tooltip {
            area_id,
            statistic,
            location,
            html: tooltip_html(&enriched.area.name, statistic, &enriched.users),
        })
    }

    /// Pointer entered an area: show the tooltip for the active statistic.
    /// Returns false when the area is not part of the current join.
    pub fn area_enter<S: InteractionSurface + ?Sized>(
        state: &MapState,
        area_id: AreaId,
        location: PointerLocation,
        surface: &mut S,
    ) -> bool {
        match Self::tooltip_for(state, area_id, state.statistic(), location) {
            Some(tooltip) => {
                surface.show_tooltip(tooltip);
                true
            }
            None => false,
        }
    }

    pub fn area_leave<S: InteractionSurface + ?Sized>(area_id: AreaId, surface: &mut S) {
        surface.hide_tooltip(area_id);
    }
}
