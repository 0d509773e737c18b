//! LightX feature table and per-feature payload builders.
//!
//! Every feature shares the same upload/submit/poll workflow and differs only
//! in its endpoint, the JSON fields the uploaded URLs land in, and a handful of
//! extra parameters. The table here is the single source of that data.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

use crate::error::{ClientError, ClientResult};

/// Maximum length of a text prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 500;

pub const V1_ORDER_STATUS_PATH: &str = "/v1/order-status";
pub const V2_ORDER_STATUS_PATH: &str = "/v2/order-status";

const IMAGE: &[&str] = &["imageUrl"];
const IMAGE_AND_MASK: &[&str] = &["imageUrl", "maskedImageUrl"];
const IMAGE_AND_STYLE: &[&str] = &["imageUrl", "styleImageUrl"];
const IMAGE_AND_FILTER_REFERENCE: &[&str] = &["imageUrl", "filterReferenceUrl"];
const NO_IMAGES: &[&str] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Feature {
    RemoveBackground,
    Cleanup,
    Expand,
    Replace,
    Cartoon,
    Caricature,
    Avatar,
    ProductPhotoshoot,
    BackgroundGenerator,
    Portrait,
    FaceSwap,
    Outfit,
    #[strum(serialize = "image2image")]
    Image2Image,
    #[strum(serialize = "sketch2image")]
    Sketch2Image,
    Hairstyle,
    Upscale,
    AiFilter,
    #[strum(serialize = "haircolor")]
    HairColor,
    VirtualTryon,
    Headshot,
    #[strum(serialize = "haircolor-rgb")]
    HairColorRgb,
    AiDesign,
    LogoGenerator,
    WatermarkRemover,
}

/// Where a feature's job is submitted and polled, and how many images it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRoute {
    pub endpoint_path: &'static str,
    pub status_path: &'static str,
    /// Payload fields receiving the uploaded URLs, in upload order
    pub url_fields: &'static [&'static str],
    /// Leading `url_fields` that must be filled
    pub min_assets: usize,
}

impl FeatureRoute {
    const fn v1(endpoint_path: &'static str, url_fields: &'static [&'static str], min_assets: usize) -> Self {
        Self {
            endpoint_path,
            status_path: V1_ORDER_STATUS_PATH,
            url_fields,
            min_assets,
        }
    }

    const fn v2(endpoint_path: &'static str, url_fields: &'static [&'static str], min_assets: usize) -> Self {
        Self {
            endpoint_path,
            status_path: V2_ORDER_STATUS_PATH,
            url_fields,
            min_assets,
        }
    }

    pub fn max_assets(&self) -> usize {
        self.url_fields.len()
    }

    pub fn check_asset_count(&self, count: usize) -> ClientResult<()> {
        if count < self.min_assets || count > self.max_assets() {
            return Err(ClientError::invalid_input(format!(
                "{} expects between {} and {} images, got {}",
                self.endpoint_path,
                self.min_assets,
                self.max_assets(),
                count
            )));
        }
        Ok(())
    }
}

impl Feature {
    pub const fn route(self) -> FeatureRoute {
        match self {
            Feature::RemoveBackground => FeatureRoute::v1("/v1/remove-background", IMAGE, 1),
            Feature::Cleanup => FeatureRoute::v1("/v1/cleanup-picture", IMAGE_AND_MASK, 2),
            Feature::Expand => FeatureRoute::v1("/v1/expand-photo", IMAGE, 1),
            Feature::Replace => FeatureRoute::v1("/v1/replace", IMAGE_AND_MASK, 2),
            Feature::Cartoon => FeatureRoute::v1("/v1/cartoon", IMAGE_AND_STYLE, 1),
            Feature::Caricature => FeatureRoute::v1("/v1/caricature", IMAGE_AND_STYLE, 1),
            Feature::Avatar => FeatureRoute::v1("/v1/avatar", IMAGE_AND_STYLE, 1),
            Feature::ProductPhotoshoot => {
                FeatureRoute::v1("/v1/product-photoshoot", IMAGE_AND_STYLE, 1)
            }
            Feature::BackgroundGenerator => {
                FeatureRoute::v1("/v1/background-generator", IMAGE, 1)
            }
            Feature::Portrait => FeatureRoute::v1("/v1/portrait", IMAGE_AND_STYLE, 1),
            Feature::FaceSwap => FeatureRoute::v1("/v1/face-swap", IMAGE_AND_STYLE, 2),
            Feature::Outfit => FeatureRoute::v1("/v1/outfit", IMAGE, 1),
            Feature::Image2Image => FeatureRoute::v1("/v1/image2image", IMAGE_AND_STYLE, 1),
            Feature::Sketch2Image => FeatureRoute::v1("/v1/sketch2image", IMAGE_AND_STYLE, 1),
            Feature::Hairstyle => FeatureRoute::v1("/v1/hairstyle", IMAGE, 1),
            Feature::Upscale => FeatureRoute::v2("/v2/upscale/", IMAGE, 1),
            Feature::AiFilter => FeatureRoute::v2("/v2/aifilter", IMAGE_AND_FILTER_REFERENCE, 1),
            Feature::HairColor => FeatureRoute::v2("/v2/haircolor/", IMAGE, 1),
            Feature::VirtualTryon => FeatureRoute::v2("/v2/aivirtualtryon", IMAGE_AND_STYLE, 2),
            Feature::Headshot => FeatureRoute::v2("/v2/headshot/", IMAGE, 1),
            Feature::HairColorRgb => FeatureRoute::v2("/v2/haircolor-rgb", IMAGE, 1),
            Feature::AiDesign => FeatureRoute::v2("/v2/ai-design", NO_IMAGES, 0),
            Feature::LogoGenerator => FeatureRoute::v2("/v2/logo-generator", NO_IMAGES, 0),
            Feature::WatermarkRemover => FeatureRoute::v2("/v2/watermark-remover/", IMAGE, 1),
        }
    }
}

// ── Validators ──────────────────────────────────────────────────────

fn prompt(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("text prompt cannot be empty"));
    }
    if value.chars().count() > MAX_PROMPT_CHARS {
        return Err(garde::Error::new(format!(
            "text prompt is too long (max {MAX_PROMPT_CHARS} characters)"
        )));
    }
    Ok(())
}

fn optional_prompt(value: &Option<String>, ctx: &()) -> garde::Result {
    match value {
        Some(text) => prompt(text, ctx),
        None => Ok(()),
    }
}

fn hex_color(value: &str, _ctx: &()) -> garde::Result {
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| garde::Error::new("hex color must start with '#'"))?;
    let valid_len = digits.len() == 3 || digits.len() == 6;
    if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(garde::Error::new("hex color must look like #RGB or #RRGGBB"));
    }
    Ok(())
}

fn upscale_quality(value: &u8, _ctx: &()) -> garde::Result {
    match value {
        2 | 4 => Ok(()),
        _ => Err(garde::Error::new("upscale quality must be 2 or 4")),
    }
}

// ── Parameters ──────────────────────────────────────────────────────

/// A required text prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PromptParams {
    #[garde(custom(prompt))]
    pub text_prompt: String,
}

impl PromptParams {
    pub fn new(text_prompt: impl Into<String>) -> Self {
        Self {
            text_prompt: text_prompt.into(),
        }
    }
}

/// Style transfer features take an optional prompt next to the optional style image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StyleParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(custom(optional_prompt))]
    pub text_prompt: Option<String>,
}

impl StyleParams {
    pub fn with_prompt(text_prompt: impl Into<String>) -> Self {
        Self {
            text_prompt: Some(text_prompt.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StrengthParams {
    #[garde(range(min = 0.0, max = 1.0))]
    pub strength: f64,

    #[garde(custom(prompt))]
    pub text_prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(range(min = 0.0, max = 1.0))]
    pub style_strength: Option<f64>,
}

/// Background color, color code, or image URL for background removal.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundParams {
    #[garde(length(min = 1))]
    pub background: String,
}

impl BackgroundParams {
    pub const TRANSPARENT: &'static str = "transparent";

    pub fn new(background: impl Into<String>) -> Self {
        Self {
            background: background.into(),
        }
    }

    pub fn transparent() -> Self {
        Self::new(Self::TRANSPARENT)
    }
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self::transparent()
    }
}

/// Outpainting margins in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Padding {
    pub left_padding: u32,
    pub right_padding: u32,
    pub top_padding: u32,
    pub bottom_padding: u32,
}

impl Padding {
    pub fn uniform(pixels: u32) -> Self {
        Self {
            left_padding: pixels,
            right_padding: pixels,
            top_padding: pixels,
            bottom_padding: pixels,
        }
    }

    pub fn horizontal(pixels: u32) -> Self {
        Self {
            left_padding: pixels,
            right_padding: pixels,
            ..Self::default()
        }
    }

    pub fn vertical(pixels: u32) -> Self {
        Self {
            top_padding: pixels,
            bottom_padding: pixels,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleParams {
    #[garde(custom(upscale_quality))]
    pub quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HairColorRgbParams {
    #[garde(custom(hex_color))]
    pub hair_hex_color: String,

    #[garde(range(min = 0.1, max = 1.0))]
    pub color_strength: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum DesignResolution {
    #[default]
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait9x16,
    #[serde(rename = "3:4")]
    #[strum(serialize = "3:4")]
    Portrait3x4,
    #[serde(rename = "2:3")]
    #[strum(serialize = "2:3")]
    Portrait2x3,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Landscape16x9,
    #[serde(rename = "4:3")]
    #[strum(serialize = "4:3")]
    Landscape4x3,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DesignParams {
    #[garde(custom(prompt))]
    pub text_prompt: String,

    #[garde(skip)]
    pub resolution: DesignResolution,

    #[garde(skip)]
    pub enhance_prompt: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoParams {
    #[garde(custom(prompt))]
    pub text_prompt: String,

    #[garde(skip)]
    pub enhance_prompt: bool,
}

/// A fully parameterized request for one LightX feature.
///
/// Uploaded image URLs are not part of the request; they are filled into the
/// feature's `url_fields` by [`FeatureRequest::payload`].
#[derive(Debug, Clone)]
pub enum FeatureRequest {
    RemoveBackground(BackgroundParams),
    /// Image plus mask (white marks the area to remove).
    Cleanup,
    Expand(Padding),
    /// Image plus mask, with a prompt describing the replacement.
    Replace(PromptParams),
    Cartoon(StyleParams),
    Caricature(StyleParams),
    Avatar(StyleParams),
    ProductPhotoshoot(StyleParams),
    BackgroundGenerator(PromptParams),
    Portrait(StyleParams),
    /// Source face image plus target image.
    FaceSwap,
    Outfit(PromptParams),
    Image2Image(StrengthParams),
    Sketch2Image(StrengthParams),
    Hairstyle(PromptParams),
    Upscale(UpscaleParams),
    AiFilter(PromptParams),
    HairColor(PromptParams),
    /// Person image plus garment image.
    VirtualTryon,
    Headshot(PromptParams),
    HairColorRgb(HairColorRgbParams),
    AiDesign(DesignParams),
    LogoGenerator(LogoParams),
    WatermarkRemover,
}

fn report(result: Result<(), garde::Report>) -> ClientResult<()> {
    result.map_err(|report| ClientError::invalid_input(report.to_string().trim().to_string()))
}

impl FeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            FeatureRequest::RemoveBackground(_) => Feature::RemoveBackground,
            FeatureRequest::Cleanup => Feature::Cleanup,
            FeatureRequest::Expand(_) => Feature::Expand,
            FeatureRequest::Replace(_) => Feature::Replace,
            FeatureRequest::Cartoon(_) => Feature::Cartoon,
            FeatureRequest::Caricature(_) => Feature::Caricature,
            FeatureRequest::Avatar(_) => Feature::Avatar,
            FeatureRequest::ProductPhotoshoot(_) => Feature::ProductPhotoshoot,
            FeatureRequest::BackgroundGenerator(_) => Feature::BackgroundGenerator,
            FeatureRequest::Portrait(_) => Feature::Portrait,
            FeatureRequest::FaceSwap => Feature::FaceSwap,
            FeatureRequest::Outfit(_) => Feature::Outfit,
            FeatureRequest::Image2Image(_) => Feature::Image2Image,
            FeatureRequest::Sketch2Image(_) => Feature::Sketch2Image,
            FeatureRequest::Hairstyle(_) => Feature::Hairstyle,
            FeatureRequest::Upscale(_) => Feature::Upscale,
            FeatureRequest::AiFilter(_) => Feature::AiFilter,
            FeatureRequest::HairColor(_) => Feature::HairColor,
            FeatureRequest::VirtualTryon => Feature::VirtualTryon,
            FeatureRequest::Headshot(_) => Feature::Headshot,
            FeatureRequest::HairColorRgb(_) => Feature::HairColorRgb,
            FeatureRequest::AiDesign(_) => Feature::AiDesign,
            FeatureRequest::LogoGenerator(_) => Feature::LogoGenerator,
            FeatureRequest::WatermarkRemover => Feature::WatermarkRemover,
        }
    }

    pub fn route(&self) -> FeatureRoute {
        self.feature().route()
    }

    /// Check the feature parameters. Runs before any network call.
    pub fn validate(&self) -> ClientResult<()> {
        match self {
            FeatureRequest::RemoveBackground(p) => report(p.validate()),
            FeatureRequest::Replace(p)
            | FeatureRequest::BackgroundGenerator(p)
            | FeatureRequest::Outfit(p)
            | FeatureRequest::Hairstyle(p)
            | FeatureRequest::AiFilter(p)
            | FeatureRequest::HairColor(p)
            | FeatureRequest::Headshot(p) => report(p.validate()),
            FeatureRequest::Cartoon(p)
            | FeatureRequest::Caricature(p)
            | FeatureRequest::Avatar(p)
            | FeatureRequest::ProductPhotoshoot(p)
            | FeatureRequest::Portrait(p) => report(p.validate()),
            FeatureRequest::Image2Image(p) | FeatureRequest::Sketch2Image(p) => {
                report(p.validate())
            }
            FeatureRequest::Upscale(p) => report(p.validate()),
            FeatureRequest::HairColorRgb(p) => report(p.validate()),
            FeatureRequest::AiDesign(p) => report(p.validate()),
            FeatureRequest::LogoGenerator(p) => report(p.validate()),
            FeatureRequest::Expand(_)
            | FeatureRequest::Cleanup
            | FeatureRequest::FaceSwap
            | FeatureRequest::VirtualTryon
            | FeatureRequest::WatermarkRemover => Ok(()),
        }
    }

    fn params(&self) -> ClientResult<Map<String, Value>> {
        let value = match self {
            FeatureRequest::RemoveBackground(p) => serde_json::to_value(p)?,
            FeatureRequest::Expand(p) => serde_json::to_value(p)?,
            FeatureRequest::Replace(p)
            | FeatureRequest::BackgroundGenerator(p)
            | FeatureRequest::Outfit(p)
            | FeatureRequest::Hairstyle(p)
            | FeatureRequest::AiFilter(p)
            | FeatureRequest::HairColor(p)
            | FeatureRequest::Headshot(p) => serde_json::to_value(p)?,
            FeatureRequest::Cartoon(p)
            | FeatureRequest::Caricature(p)
            | FeatureRequest::Avatar(p)
            | FeatureRequest::ProductPhotoshoot(p)
            | FeatureRequest::Portrait(p) => serde_json::to_value(p)?,
            FeatureRequest::Image2Image(p) | FeatureRequest::Sketch2Image(p) => {
                serde_json::to_value(p)?
            }
            FeatureRequest::Upscale(p) => serde_json::to_value(p)?,
            FeatureRequest::HairColorRgb(p) => serde_json::to_value(p)?,
            FeatureRequest::AiDesign(p) => serde_json::to_value(p)?,
            FeatureRequest::LogoGenerator(p) => serde_json::to_value(p)?,
            FeatureRequest::Cleanup
            | FeatureRequest::FaceSwap
            | FeatureRequest::VirtualTryon
            | FeatureRequest::WatermarkRemover => Value::Object(Map::new()),
        };

        match value {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Build the submission body, placing `urls` into the feature's URL fields
    /// in order.
    pub fn payload(&self, urls: &[String]) -> ClientResult<Value> {
        let route = self.route();
        route.check_asset_count(urls.len())?;

        let mut body = self.params()?;
        for (field, url) in route.url_fields.iter().zip(urls) {
            body.insert((*field).to_string(), Value::String(url.clone()));
        }
        Ok(Value::Object(body))
    }
}
