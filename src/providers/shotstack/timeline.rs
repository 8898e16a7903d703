//! Slideshow timelines
//!
//! Builds Shotstack render documents from a list of images: the duration is
//! split evenly across slides, each slide fades in and out unless told
//! otherwise, and an optional soundtrack plays underneath.
//!
//! [`Thumbnail`] grabs a single frame from a video and [`TemplateRender`]
//! fills a template saved in the Shotstack dashboard.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::shotstack as defaults;
use crate::error::{MediaError, ValidationError};
use crate::types::{InputRef, JobRequest};

pub const RENDER_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl SlideImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            crop: None,
            scale: None,
            position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "in")]
    pub enter: String,
    #[serde(rename = "out")]
    pub exit: String,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            enter: "fade".to_string(),
            exit: "fade".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soundtrack {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: String,
    pub resolution: String,
    pub fps: u32,
    pub quality: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: defaults::FORMAT.to_string(),
            resolution: defaults::RESOLUTION.to_string(),
            fps: defaults::FPS,
            quality: "high".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Offset {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Asset<'a> {
    Image {
        src: &'a str,
        crop: &'a str,
    },
    Audio {
        src: &'a str,
        volume: f64,
    },
    Video {
        src: &'a str,
        trim: f64,
    },
}

#[derive(Debug, Serialize)]
struct Clip<'a> {
    asset: Asset<'a>,
    start: f64,
    length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    fit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<&'a Transition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effect: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Track<'a> {
    clips: Vec<Clip<'a>>,
}

#[derive(Debug, Serialize)]
struct TimelineSoundtrack<'a> {
    src: &'a str,
    effect: &'static str,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct Timeline<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    soundtrack: Option<TimelineSoundtrack<'a>>,
    background: &'static str,
    tracks: Vec<Track<'a>>,
}

/// A slideshow render: images, optional soundtrack, and output settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slideshow {
    pub images: Vec<SlideImage>,
    pub soundtrack: Option<Soundtrack>,
    /// Per-slide transitions; missing entries fade
    pub transitions: Vec<Transition>,
    /// Per-slide effect names (e.g. `zoomIn`)
    pub effects: Vec<Option<String>>,
    /// Total length in seconds; defaults to three seconds per image, capped at 30
    pub duration: Option<f64>,
    pub output: OutputSettings,
    pub callback: Option<String>,
}

impl Slideshow {
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            images: images.into_iter().map(SlideImage::new).collect(),
            ..Default::default()
        }
    }

    pub fn with_soundtrack(mut self, src: impl Into<String>, volume: Option<f64>) -> Self {
        self.soundtrack = Some(Soundtrack {
            src: src.into(),
            volume,
        });
        self
    }

    pub fn with_transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions = transitions;
        self
    }

    pub fn with_effects(mut self, effects: Vec<Option<String>>) -> Self {
        self.effects = effects;
        self
    }

    pub const fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_output(mut self, output: OutputSettings) -> Self {
        self.output = output;
        self
    }

    pub fn with_callback(mut self, url: impl Into<String>) -> Self {
        self.callback = Some(url.into());
        self
    }

    /// Effective total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or_else(|| {
            (self.images.len() as f64 * defaults::SECONDS_PER_SLIDE)
                .min(defaults::MAX_SLIDESHOW_SECONDS)
        })
    }

    /// Build the timeline document.
    pub fn timeline(&self) -> Result<Value, MediaError> {
        if self.images.is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }
        let duration = self.duration();
        if !(duration > 0.0 && duration <= defaults::MAX_VIDEO_SECONDS) {
            return Err(MediaError::InvalidRequest(format!(
                "video duration {duration}s must be within (0, {}]",
                defaults::MAX_VIDEO_SECONDS
            )));
        }

        let slide_length = duration / self.images.len() as f64;
        let fade = Transition::default();
        let image_clips = self
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| Clip {
                asset: Asset::Image {
                    src: &image.src,
                    crop: image.crop.as_deref().unwrap_or("center"),
                },
                start: index as f64 * slide_length,
                length: slide_length,
                fit: Some("cover"),
                scale: Some(image.scale.unwrap_or(1.0)),
                position: Some(image.position.as_deref().unwrap_or("center")),
                offset: Some(Offset { x: 0.0, y: 0.0 }),
                transition: Some(self.transitions.get(index).unwrap_or(&fade)),
                effect: self.effects.get(index).and_then(|e| e.as_deref()),
            })
            .collect();

        let mut tracks = vec![Track { clips: image_clips }];
        if let Some(audio) = &self.soundtrack {
            tracks.push(Track {
                clips: vec![Clip {
                    asset: Asset::Audio {
                        src: &audio.src,
                        volume: audio.volume.unwrap_or(1.0),
                    },
                    start: 0.0,
                    length: duration,
                    fit: None,
                    scale: None,
                    position: None,
                    offset: None,
                    transition: None,
                    effect: None,
                }],
            });
        }

        let timeline = Timeline {
            soundtrack: self.soundtrack.as_ref().map(|audio| TimelineSoundtrack {
                src: &audio.src,
                effect: "fadeInFadeOut",
                volume: audio.volume.unwrap_or(0.5),
            }),
            background: "#000000",
            tracks,
        };
        Ok(serde_json::to_value(timeline)?)
    }

    /// Full render body: `{timeline, output, callback?}`.
    pub fn render_document(&self) -> Result<Value, MediaError> {
        let mut body = serde_json::json!({
            "timeline": self.timeline()?,
            "output": self.output,
        });
        if let (Some(callback), Some(map)) = (&self.callback, body.as_object_mut()) {
            map.insert("callback".to_string(), Value::String(callback.clone()));
        }
        Ok(body)
    }

    /// Request ready for a Shotstack service.
    pub fn into_request(self) -> Result<JobRequest, MediaError> {
        Ok(JobRequest::new(InputRef::document(
            RENDER_MEDIA_TYPE,
            self.render_document()?,
        )))
    }
}

/// A still frame taken from a video at `offset` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub video: String,
    pub offset: f64,
    pub format: String,
    pub resolution: String,
    pub callback: Option<String>,
}

impl Thumbnail {
    pub fn new(video: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            offset: defaults::THUMBNAIL_OFFSET_SECONDS,
            format: defaults::THUMBNAIL_FORMAT.to_string(),
            resolution: defaults::RESOLUTION.to_string(),
            callback: None,
        }
    }

    pub const fn at(mut self, seconds: f64) -> Self {
        self.offset = seconds;
        self
    }

    /// `jpg`, `png` or `bmp`.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    pub fn with_callback(mut self, url: impl Into<String>) -> Self {
        self.callback = Some(url.into());
        self
    }

    pub fn render_document(&self) -> Result<Value, MediaError> {
        if self.video.trim().is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }
        if !(self.offset >= 0.0 && self.offset <= defaults::MAX_VIDEO_SECONDS) {
            return Err(MediaError::InvalidRequest(format!(
                "thumbnail offset {}s must be within [0, {}]",
                self.offset,
                defaults::MAX_VIDEO_SECONDS
            )));
        }

        let timeline = Timeline {
            soundtrack: None,
            background: "#000000",
            tracks: vec![Track {
                clips: vec![Clip {
                    asset: Asset::Video {
                        src: &self.video,
                        trim: self.offset,
                    },
                    start: 0.0,
                    length: defaults::THUMBNAIL_CLIP_SECONDS,
                    fit: None,
                    scale: None,
                    position: None,
                    offset: None,
                    transition: None,
                    effect: None,
                }],
            }],
        };
        let mut body = serde_json::json!({
            "timeline": timeline,
            "output": {"format": self.format, "resolution": self.resolution},
        });
        if let (Some(callback), Some(map)) = (&self.callback, body.as_object_mut()) {
            map.insert("callback".to_string(), Value::String(callback.clone()));
        }
        Ok(body)
    }

    pub fn into_request(self) -> Result<JobRequest, MediaError> {
        Ok(JobRequest::new(InputRef::document(
            RENDER_MEDIA_TYPE,
            self.render_document()?,
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeField {
    pub find: String,
    pub replace: Value,
}

/// Render of a saved template with merge fields substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRender {
    pub template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge: Vec<MergeField>,
}

impl TemplateRender {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            merge: Vec::new(),
        }
    }

    /// Replace `{{ find }}` placeholders in the template with `replace`.
    pub fn with_merge_field(mut self, find: impl Into<String>, replace: impl Into<Value>) -> Self {
        self.merge.push(MergeField {
            find: find.into(),
            replace: replace.into(),
        });
        self
    }

    pub fn into_request(self) -> JobRequest {
        let document = serde_json::json!({
            "template": self.template,
            "merge": self.merge,
        });
        JobRequest::new(InputRef::document(RENDER_MEDIA_TYPE, document))
    }
}
