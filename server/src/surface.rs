use areamap_shared::{AreaId, AreaLayer, Geometry, InteractionSurface, Tooltip};
use serde::Serialize;

/// Collects layers as GeoJSON features and keeps the most recent tooltip,
/// so the HTTP API can hand both to a browser map.
#[derive(Debug, Default)]
pub struct ApiSurface {
    features: Vec<LayerFeature>,
    tooltip: Option<Tooltip>,
}

#[derive(Debug, Serialize)]
struct LayerFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    id: AreaId,
    properties: LayerProperties,
    geometry: Geometry,
}

#[derive(Debug, Serialize)]
struct LayerProperties {
    area_id: AreaId,
    name: String,
    pin_code: i64,
    user_count: usize,
    fill_color: String,
    fill_opacity: f64,
}

#[derive(Serialize)]
struct FeatureCollectionRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: &'a [LayerFeature],
}

impl ApiSurface {
    pub fn feature_collection_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&FeatureCollectionRef {
            kind: "FeatureCollection",
            features: &self.features,
        })
    }

    pub fn take_tooltip(&mut self) -> Option<Tooltip> {
        self.tooltip.take()
    }
}

impl InteractionSurface for ApiSurface {
    fn add_area(&mut self, layer: AreaLayer) {
        self.features.push(LayerFeature {
            kind: "Feature",
            id: layer.area_id,
            properties: LayerProperties {
                area_id: layer.area_id,
                name: layer.name,
                pin_code: layer.pin_code,
                user_count: layer.user_count,
                fill_color: layer.fill_color,
                fill_opacity: layer.fill_opacity,
            },
            geometry: layer.geometry,
        });
    }

    fn show_tooltip(&mut self, tooltip: Tooltip) {
        self.tooltip = Some(tooltip);
    }

    fn hide_tooltip(&mut self, area_id: AreaId) {
        if self
            .tooltip
            .as_ref()
            .is_some_and(|tooltip| tooltip.area_id == area_id)
        {
            self.tooltip = None;
        }
    }
}
