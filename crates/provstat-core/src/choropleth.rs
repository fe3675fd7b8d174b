// crates/provstat-core/src/choropleth.rs

//! Choropleth view model: per-feature fill, border and tooltip for one
//! metric, plus the viewport that frames the current selection.
//!
//! Rendering is left to the caller; [`ChoroplethLayer::to_feature_collection`]
//! emits GeoJSON whose properties carry the computed style.

use crate::analysis::Selection;
use crate::config::{HighlightMode, ViewConfig};
use crate::error::StatError;
use crate::geo::{bounds_of, Bounds, GeoShape};
use crate::model::{columns, ProvinceRecord, Region, NATIONAL_AGGREGATE};
use crate::text::fold_key;
use geojson::{Feature, FeatureCollection};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A value that can colour the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CrimeRate,
    Population,
    GiniRatio,
    Income,
    Education,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::CrimeRate,
        Metric::Population,
        Metric::GiniRatio,
        Metric::Income,
        Metric::Education,
    ];

    /// Legend caption.
    pub fn title(self) -> &'static str {
        match self {
            Metric::CrimeRate => "Tindak Pidana per 100,000 Penduduk (2023)",
            Metric::Population => "Populasi berdasarkan Provinsi (ribu jiwa, 2023)",
            Metric::GiniRatio => "Gini Ratio berdasarkan Provinsi (2023)",
            Metric::Income => "Average Income by Province (August 2023)",
            Metric::Education => "Tingkat Penyelesaian Pendidikan SMA berdasarkan Provinsi (2023)",
        }
    }

    /// Master-table column the metric reads.
    pub fn column(self) -> String {
        match self {
            Metric::CrimeRate => columns::crime(2023),
            Metric::Population => columns::POPULATION.to_string(),
            Metric::GiniRatio => columns::GINI.to_string(),
            Metric::Income => columns::INCOME_AUG.to_string(),
            Metric::Education => columns::SENIOR_OR_HIGHER.to_string(),
        }
    }

    pub fn value(self, record: &ProvinceRecord) -> Option<f64> {
        match self {
            Metric::CrimeRate => record.crime_rate(2023),
            Metric::Population => record.population,
            Metric::GiniRatio => record.gini_ratio,
            Metric::Income => record.income.august,
            Metric::Education => record.education.map(|e| e.senior_or_higher),
        }
    }

    pub fn default_scale(self) -> ColorScale {
        let (low, high) = match self {
            Metric::CrimeRate | Metric::GiniRatio => (0xffffcc, 0xff4444),
            Metric::Education => (0xffcccc, 0x44ff44),
            Metric::Income => (0xccccff, 0x4444ff),
            Metric::Population => (0xe6ccff, 0x8844ff),
        };
        ColorScale {
            low: Rgb::from_u32(low),
            high: Rgb::from_u32(high),
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Metric::CrimeRate => "crime_rate",
            Metric::Population => "population",
            Metric::GiniRatio => "gini_ratio",
            Metric::Income => "income",
            Metric::Education => "education",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Metric {
    type Err = StatError;

    /// Accepts the snake_case name, with spaces or dashes, plus the short
    /// forms `crime` and `gini`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let q = fold_key(s).replace([' ', '-'], "_");
        match q.as_str() {
            "crime" | "crime_rate" => Ok(Metric::CrimeRate),
            "gini" | "gini_ratio" => Ok(Metric::GiniRatio),
            "population" => Ok(Metric::Population),
            "income" => Ok(Metric::Income),
            "education" => Ok(Metric::Education),
            _ => Err(StatError::unknown("metric", s)),
        }
    }
}

/// An sRGB colour, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::from_u32(0x000000);
    pub const MUTED_FILL: Rgb = Rgb::from_u32(0xcccccc);
    pub const MUTED_BORDER: Rgb = Rgb::from_u32(0xbbbbbb);

    pub const fn from_u32(hex: u32) -> Self {
        Rgb {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return Err(StatError::unknown("colour", s));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb::from_u32)
            .map_err(|_| StatError::unknown("colour", s))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Two-stop linear colour scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScale {
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorScale {
    /// Colour of `value` between `min` and `max`. Out-of-range values clamp;
    /// a degenerate range maps everything to `low`.
    pub fn color_at(&self, value: f64, min: f64, max: f64) -> Rgb {
        let span = max - min;
        if !value.is_finite() || !span.is_finite() || span <= 0.0 {
            return self.low;
        }
        let t = ((value - min) / span).clamp(0.0, 1.0);
        self.low.lerp(self.high, t)
    }
}

/// Paint for one feature.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    pub fill_color: Rgb,
    pub border_color: Rgb,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl FeatureStyle {
    fn muted(fill_opacity: f64) -> Self {
        FeatureStyle {
            fill_color: Rgb::MUTED_FILL,
            border_color: Rgb::MUTED_BORDER,
            weight: 1.0,
            fill_opacity,
        }
    }
}

/// Map framing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// `(lat, lng)`.
    pub center: (f64, f64),
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Panning is confined to these bounds.
    pub bounds: Bounds,
    /// Scroll, double-click and touch zoom enabled.
    pub interactive: bool,
}

pub const DEFAULT_CENTER: (f64, f64) = (-2.5, 118.0);
pub const DEFAULT_ZOOM: u8 = 4;
pub const DEFAULT_BOUNDS: Bounds = Bounds {
    min_lat: -11.0,
    max_lat: 6.0,
    min_lng: 94.0,
    max_lng: 141.0,
};
const PROVINCE_ZOOM: u8 = 7;
const PROVINCE_PADDING: f64 = 0.5;
const REGION_ZOOM: u8 = 6;
const REGION_PADDING: f64 = 1.0;

impl Viewport {
    fn framing(center: (f64, f64), zoom: u8, bounds: Bounds, interactive: bool) -> Self {
        Viewport {
            center,
            zoom,
            min_zoom: zoom.saturating_sub(2).max(DEFAULT_ZOOM),
            max_zoom: zoom + 3,
            bounds,
            interactive,
        }
    }

    /// The whole country.
    pub fn national(fixed_zoom: bool) -> Self {
        Viewport::framing(DEFAULT_CENTER, DEFAULT_ZOOM, DEFAULT_BOUNDS, !fixed_zoom)
    }

    fn focused(bounds: Bounds, zoom: u8, padding: f64) -> Self {
        Viewport::framing(bounds.center(), zoom, bounds.padded(padding), true)
    }
}

/// What the map emphasises.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Focus {
    All,
    Province(String),
    Region(Region),
}

fn focus_for(selection: &Selection, mode: HighlightMode) -> Focus {
    match mode {
        HighlightMode::Province => match (selection.province_filter(), selection.region) {
            (Some(p), _) => Focus::Province(p.to_string()),
            (None, Some(r)) => Focus::Region(r),
            (None, None) => Focus::All,
        },
        HighlightMode::Region => {
            match selection
                .region
                .or_else(|| selection.province_filter().and_then(Region::for_province))
            {
                Some(r) => Focus::Region(r),
                None => Focus::All,
            }
        }
        HighlightMode::None => Focus::All,
    }
}

/// One styled province on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyledFeature {
    pub province: String,
    pub geo_name: String,
    pub region: Option<Region>,
    pub value: Option<f64>,
    pub style: FeatureStyle,
    pub tooltip: String,
}

/// A fully styled choropleth for one metric and selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethLayer {
    pub metric: Metric,
    pub title: String,
    pub scale: ColorScale,
    /// Value range of the records in scope; `None` when none has a value.
    pub range: Option<(f64, f64)>,
    pub viewport: Viewport,
    pub features: Vec<StyledFeature>,
}

/// Styles every shape for `metric` under `selection`.
///
/// Values come from the records in scope: the selected province, the
/// highlighted region, or every record matching the selection. The national
/// aggregate never counts. Shapes without a value are painted with the low
/// end of the scale and tooltipped `N/A`.
pub fn build_choropleth(
    records: &[ProvinceRecord],
    shapes: &[GeoShape],
    metric: Metric,
    selection: &Selection,
    view: &ViewConfig,
) -> ChoroplethLayer {
    let focus = focus_for(selection, view.highlight_mode);
    let scale = view.scale_for(metric);

    let in_scope = |r: &ProvinceRecord| {
        r.name != NATIONAL_AGGREGATE
            && match &focus {
                Focus::All => selection.matches(r),
                Focus::Province(p) => r.name == *p,
                Focus::Region(region) => r.region == Some(*region),
            }
    };
    let value_of = |province: &str| {
        records
            .iter()
            .find(|r| r.name == province)
            .filter(|&r| in_scope(r))
            .and_then(|r| metric.value(r))
    };

    let range = records
        .iter()
        .filter(|&r| in_scope(r))
        .filter_map(|r| metric.value(r))
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
    let scaled = |value: Option<f64>| match (value, range) {
        (Some(v), Some((lo, hi))) => scale.color_at(v, lo, hi),
        _ => scale.low,
    };

    let features = shapes
        .iter()
        .map(|shape| {
            let region = Region::for_province(&shape.province);
            let value = value_of(shape.province.as_str());
            let style = match &focus {
                Focus::Province(p) if shape.province == *p => FeatureStyle {
                    fill_color: scale.high,
                    border_color: Rgb::BLACK,
                    weight: 3.0,
                    fill_opacity: 1.0,
                },
                Focus::Province(_) => FeatureStyle::muted(0.2),
                Focus::Region(r) if region == Some(*r) => FeatureStyle {
                    fill_color: scaled(value),
                    border_color: Rgb::BLACK,
                    weight: 1.5,
                    fill_opacity: 0.8,
                },
                Focus::Region(_) => FeatureStyle::muted(0.3),
                Focus::All => FeatureStyle {
                    fill_color: scaled(value),
                    border_color: Rgb::BLACK,
                    weight: 1.0,
                    fill_opacity: 0.7,
                },
            };
            let tooltip = match value {
                Some(v) => format!("{}\n{}", shape.geo_name, format_grouped(v)),
                None => format!("{}\nN/A", shape.geo_name),
            };
            StyledFeature {
                province: shape.province.clone(),
                geo_name: shape.geo_name.clone(),
                region,
                value,
                style,
                tooltip,
            }
        })
        .collect();

    let viewport = match &focus {
        Focus::All => Viewport::national(view.fixed_zoom && !selection.is_filtered()),
        Focus::Province(p) => bounds_of(shapes.iter().filter(|s| s.province == *p))
            .map(|b| Viewport::focused(b, PROVINCE_ZOOM, PROVINCE_PADDING))
            .unwrap_or_else(|| Viewport::national(false)),
        Focus::Region(r) => bounds_of(
            shapes
                .iter()
                .filter(|s| Region::for_province(&s.province) == Some(*r)),
        )
        .map(|b| Viewport::focused(b, REGION_ZOOM, REGION_PADDING))
        .unwrap_or_else(|| Viewport::national(false)),
    };

    ChoroplethLayer {
        metric,
        title: metric.title().to_string(),
        scale,
        range,
        viewport,
        features,
    }
}

impl ChoroplethLayer {
    /// GeoJSON with the computed style on each feature's properties
    /// (`fillColor`, `color`, `weight`, `fillOpacity`, `value`, `tooltip`).
    ///
    /// `shapes` must be the slice the layer was built from.
    pub fn to_feature_collection(&self, shapes: &[GeoShape]) -> FeatureCollection {
        let features: Vec<Feature> = shapes
            .iter()
            .zip(&self.features)
            .map(|(shape, styled)| {
                let mut feature = shape.feature.clone();
                feature.set_property("fillColor", styled.style.fill_color.to_hex());
                feature.set_property("color", styled.style.border_color.to_hex());
                feature.set_property("weight", styled.style.weight);
                feature.set_property("fillOpacity", styled.style.fill_opacity);
                feature.set_property("value", styled.value);
                feature.set_property("tooltip", styled.tooltip.clone());
                feature
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Two decimals with `,` thousands separators: `1234567.891` → `1,234,567.89`.
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{reconcile_geometry_keys, ProvinceMapping};
    use geojson::{Geometry, JsonObject, Value};
    use std::collections::BTreeMap;

    fn shape(geo: &str, lng: f64, lat: f64) -> Feature {
        let mut props = JsonObject::new();
        props.insert("Propinsi".into(), geo.into());
        let ring = vec![
            vec![lng, lat],
            vec![lng + 1.0, lat],
            vec![lng + 1.0, lat + 1.0],
            vec![lng, lat],
        ];
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
            id: None,
            properties: Some(props),
            foreign_members: None,
        }
    }

    fn record(name: &str, crime: Option<f64>) -> ProvinceRecord {
        ProvinceRecord {
            name: name.to_string(),
            region: Region::for_province(name),
            income: Default::default(),
            completion: Default::default(),
            education: None,
            crime_rate: crime.map(|v| (2023, v)).into_iter().collect::<BTreeMap<_, _>>(),
            gini_ratio: None,
            population: None,
        }
    }

    fn fixture() -> (Vec<ProvinceRecord>, Vec<GeoShape>) {
        let records = vec![
            record("ACEH", Some(100.0)),
            record("RIAU", Some(200.0)),
            record("BALI", Some(300.0)),
            record("JAWA BARAT", None),
            record("INDONESIA", Some(10_000.0)),
        ];
        let shapes = reconcile_geometry_keys(
            vec![
                shape("ACEH", 95.0, 4.0),
                shape("RIAU", 101.0, 0.0),
                shape("BALI", 115.0, -8.5),
                shape("JAWA BARAT", 107.0, -7.0),
            ],
            &ProvinceMapping::indonesia().unwrap(),
        );
        (records, shapes)
    }

    #[test]
    fn color_scale_interpolates_and_clamps() {
        let s = Metric::CrimeRate.default_scale();
        assert_eq!(s.color_at(0.0, 0.0, 10.0), s.low);
        assert_eq!(s.color_at(10.0, 0.0, 10.0), s.high);
        assert_eq!(s.color_at(99.0, 0.0, 10.0), s.high);
        assert_eq!(s.color_at(5.0, 5.0, 5.0), s.low);
        assert_eq!(s.color_at(5.0, 0.0, 10.0).to_hex(), "#ffa288");
    }

    #[test]
    fn rgb_hex_round_trip_via_serde() {
        let json = serde_json::to_string(&Metric::Population.default_scale()).unwrap();
        assert_eq!(json, r##"{"low":"#e6ccff","high":"#8844ff"}"##);
        assert!("#12345".parse::<Rgb>().is_err());
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("crime".parse::<Metric>().unwrap(), Metric::CrimeRate);
        assert_eq!("Gini Ratio".parse::<Metric>().unwrap(), Metric::GiniRatio);
        assert!("weather".parse::<Metric>().is_err());
        assert_eq!(Metric::Income.column(), "Pendapatan Agustus");
    }

    #[test]
    fn unfiltered_map_scales_without_aggregate() {
        let (records, shapes) = fixture();
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &Selection::all(), &ViewConfig::default());

        assert_eq!(layer.range, Some((100.0, 300.0)));
        assert_eq!(layer.features.len(), 4);
        let aceh = &layer.features[0];
        assert_eq!(aceh.style.fill_color, layer.scale.low);
        assert_eq!(aceh.style.fill_opacity, 0.7);
        assert_eq!(layer.features[2].style.fill_color, layer.scale.high);

        let jabar = &layer.features[3];
        assert_eq!(jabar.value, None);
        assert!(jabar.tooltip.ends_with("N/A"));
        assert_eq!(jabar.style.fill_color, layer.scale.low);

        assert!(!layer.viewport.interactive);
        assert_eq!(layer.viewport.zoom, 4);
        assert_eq!(layer.viewport.center, DEFAULT_CENTER);
    }

    #[test]
    fn selected_province_is_emphasised_and_framed() {
        let (records, shapes) = fixture();
        let sel = Selection::all().with_province("riau");
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &sel, &ViewConfig::default());

        let riau = layer.features.iter().find(|f| f.province == "RIAU").unwrap();
        assert_eq!(riau.style.fill_color, layer.scale.high);
        assert_eq!(riau.style.weight, 3.0);
        let bali = layer.features.iter().find(|f| f.province == "BALI").unwrap();
        assert_eq!(bali.style, FeatureStyle::muted(0.2));
        assert!(bali.tooltip.ends_with("N/A"));

        assert_eq!(layer.viewport.zoom, 7);
        assert_eq!(layer.viewport.center, (0.5, 101.5));
        assert_eq!(layer.viewport.bounds.min_lng, 100.5);
        assert!(layer.viewport.interactive);
    }

    #[test]
    fn region_highlight_mode_uses_the_province_region() {
        let (records, shapes) = fixture();
        let view = ViewConfig {
            highlight_mode: HighlightMode::Region,
            ..ViewConfig::default()
        };
        let sel = Selection::all().with_province("RIAU");
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &sel, &view);

        let aceh = layer.features.iter().find(|f| f.province == "ACEH").unwrap();
        assert_eq!(aceh.style.fill_opacity, 0.8);
        assert_eq!(aceh.style.fill_color, layer.scale.low);
        assert_eq!(layer.range, Some((100.0, 200.0)));
        let bali = layer.features.iter().find(|f| f.province == "BALI").unwrap();
        assert_eq!(bali.style.fill_opacity, 0.3);
        assert_eq!(layer.viewport.zoom, 6);
    }

    #[test]
    fn province_outside_region_falls_back_to_region_focus() {
        let sel = Selection::all().with_region(Region::Jawa).with_province("ACEH");
        assert_eq!(focus_for(&sel, HighlightMode::Province), Focus::Region(Region::Jawa));
        assert_eq!(focus_for(&sel, HighlightMode::Region), Focus::Region(Region::Jawa));

        let (records, shapes) = fixture();
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &sel, &ViewConfig::default());
        let aceh = layer.features.iter().find(|f| f.province == "ACEH").unwrap();
        assert_eq!(aceh.style, FeatureStyle::muted(0.3));
        let jabar = layer.features.iter().find(|f| f.province == "JAWA BARAT").unwrap();
        assert_eq!(jabar.style.fill_opacity, 0.8);
    }

    #[test]
    fn unlocked_zoom_when_configured() {
        let (records, shapes) = fixture();
        let view = ViewConfig {
            fixed_zoom: false,
            ..ViewConfig::default()
        };
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &Selection::all(), &view);
        assert!(layer.viewport.interactive);
    }

    #[test]
    fn feature_collection_carries_style() {
        let (records, shapes) = fixture();
        let layer = build_choropleth(&records, &shapes, Metric::CrimeRate, &Selection::all(), &ViewConfig::default());
        let fc = layer.to_feature_collection(&shapes);
        let props = fc.features[2].properties.as_ref().unwrap();
        assert_eq!(props["fillColor"], "#ff4444");
        assert_eq!(props["Provinsi"], "BALI");
        assert_eq!(props["value"], 300.0);
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(format_grouped(1234567.891), "1,234,567.89");
        assert_eq!(format_grouped(12.5), "12.50");
        assert_eq!(format_grouped(-1000.0), "-1,000.00");
    }
}
