//! Option normalization: user-supplied parameters plus per-format defaults
//! become one validated, canonical parameter bag before anything reaches
//! the engine.
//!
//! "Same as source" settings are tagged variants, never sentinel strings;
//! they are resolved against the probed source here, once, so the engine
//! boundary only ever sees concrete values.

mod defaults;

use crate::error::{CoreError, CoreResult};
use crate::logging::LogSink;
use crate::model::{ProgressFn, TranscodeHost};
use crate::probe::MediaProbe;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Output resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Resolution {
    /// Copy the resolution of the probed source.
    SameAsSource,
    Literal { width: u32, height: u32 },
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("same") {
            return Ok(Resolution::SameAsSource);
        }
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT or \"same\", got `{s}`"))?;
        let width = w.trim().parse::<u32>().map_err(|_| format!("bad width in `{s}`"))?;
        let height = h.trim().parse::<u32>().map_err(|_| format!("bad height in `{s}`"))?;
        if width == 0 || height == 0 {
            return Err(format!("resolution must be non-zero, got `{s}`"));
        }
        Ok(Resolution::Literal { width, height })
    }
}

impl TryFrom<String> for Resolution {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Video bitrate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Bitrate {
    /// Copy the bitrate of the probed source.
    SameAsSource,
    Kbps(u32),
}

impl FromStr for Bitrate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("same") {
            return Ok(Bitrate::SameAsSource);
        }
        let digits = s.strip_suffix(['k', 'K']).unwrap_or(s);
        let kbps = digits
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("expected a kbit/s value or \"same\", got `{s}`"))?;
        Ok(Bitrate::Kbps(kbps))
    }
}

impl TryFrom<String> for Bitrate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Corner (or center) the watermark is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

/// Watermark overlay configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Watermark {
    pub path: PathBuf,
    #[serde(default)]
    pub position: WatermarkPosition,
    #[serde(default = "Watermark::default_margin")]
    pub margin: u32,
}

impl Watermark {
    fn default_margin() -> u32 {
        10
    }

    /// Renders the `-vf` overlay filter string for this watermark.
    pub fn overlay_filter(&self) -> String {
        let m = self.margin;
        let placement = match self.position {
            WatermarkPosition::TopLeft => format!("{m}:{m}"),
            WatermarkPosition::TopRight => format!("main_w-overlay_w-{m}:{m}"),
            WatermarkPosition::BottomLeft => format!("{m}:main_h-overlay_h-{m}"),
            WatermarkPosition::BottomRight => {
                format!("main_w-overlay_w-{m}:main_h-overlay_h-{m}")
            }
            WatermarkPosition::Center => {
                "(main_w-overlay_w)/2:(main_h-overlay_h)/2".to_string()
            }
        };
        format!(
            "movie={} [wm]; [in][wm] overlay={} [out]",
            self.path.display(),
            placement
        )
    }
}

/// Hook names on the host, one per lifecycle slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Callbacks {
    pub before_transcode: Option<String>,
    pub after_transcode: Option<String>,
    pub rescue: Option<String>,
    pub ensure: Option<String>,
}

impl Callbacks {
    fn configured(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("before_transcode", &self.before_transcode),
            ("after_transcode", &self.after_transcode),
            ("rescue", &self.rescue),
            ("ensure", &self.ensure),
        ]
        .into_iter()
        .filter_map(|(slot, name)| name.as_deref().map(|n| (slot, n)))
    }
}

/// Where engine log lines go for one invocation: nowhere, a literal sink,
/// or a sink looked up on the host at invocation time.
#[derive(Clone, Default)]
pub enum LoggerSpec {
    #[default]
    None,
    Sink(Arc<dyn LogSink>),
    FromHost(String),
}

impl fmt::Debug for LoggerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerSpec::None => f.write_str("None"),
            LoggerSpec::Sink(_) => f.write_str("Sink(..)"),
            LoggerSpec::FromHost(name) => write!(f, "FromHost({name:?})"),
        }
    }
}

impl<'de> Deserialize<'de> for LoggerSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(LoggerSpec::FromHost(String::deserialize(deserializer)?))
    }
}

/// Progress sink for one invocation, literal or host-resolved.
#[derive(Clone, Default)]
pub enum ProgressSpec {
    #[default]
    None,
    Sink(ProgressFn),
    FromHost(String),
}

impl ProgressSpec {
    pub fn is_configured(&self) -> bool {
        !matches!(self, ProgressSpec::None)
    }
}

impl fmt::Debug for ProgressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressSpec::None => f.write_str("None"),
            ProgressSpec::Sink(_) => f.write_str("Sink(..)"),
            ProgressSpec::FromHost(name) => write!(f, "FromHost({name:?})"),
        }
    }
}

impl<'de> Deserialize<'de> for ProgressSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(ProgressSpec::FromHost(String::deserialize(deserializer)?))
    }
}

/// Reference for the replacement pipeline: a sibling attachment on the
/// host, or a literal path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplacementRef {
    Attachment { attachment: String },
    Path(PathBuf),
}

/// The user-supplied option bag, as handed to an encode or replacement
/// operation. Deserializable so callers can keep option sets in config
/// files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    pub resolution: Option<Resolution>,
    pub video_bitrate: Option<Bitrate>,
    pub watermark: Option<Watermark>,
    /// Extra encoder arguments appended verbatim after the parameter set.
    pub custom: Vec<String>,
    /// Per-format parameter overrides; unknown keys pass through opaquely.
    pub params: BTreeMap<String, String>,
    pub callbacks: Callbacks,
    pub logger: LoggerSpec,
    pub progress: ProgressSpec,
    pub replacement: Option<ReplacementRef>,
    /// Remove replacement-pipeline intermediates after a successful swap.
    pub cleanup_intermediates: bool,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            resolution: None,
            video_bitrate: None,
            watermark: None,
            custom: Vec::new(),
            params: BTreeMap::new(),
            callbacks: Callbacks::default(),
            logger: LoggerSpec::default(),
            progress: ProgressSpec::default(),
            replacement: None,
            cleanup_intermediates: true,
        }
    }
}

impl RawOptions {
    /// Fail-fast validation: format present, every configured hook known to
    /// the host. Runs before any caching, probing, or hook execution.
    pub fn validate(&self, format: &str, host: &dyn TranscodeHost) -> CoreResult<()> {
        if format.trim().is_empty() {
            return Err(CoreError::InvalidOptions(
                "target format must not be empty".to_string(),
            ));
        }
        for (slot, name) in self.callbacks.configured() {
            if !host.has_hook(name) {
                return Err(CoreError::InvalidOptions(format!(
                    "host does not define hook `{name}` configured for `{slot}`"
                )));
            }
        }
        Ok(())
    }

    /// Whether building these options requires a probed source.
    pub fn needs_probe(&self) -> bool {
        matches!(self.resolution, Some(Resolution::SameAsSource))
            || matches!(self.video_bitrate, Some(Bitrate::SameAsSource))
    }
}

/// The normalized option set handed to the engine invocation.
#[derive(Debug, Clone)]
pub struct EncodingOptions {
    pub format: String,
    pub raw: RawOptions,
    params: BTreeMap<String, String>,
}

impl EncodingOptions {
    /// Builds the canonical parameter bag: validates, merges format
    /// defaults with caller overrides (override wins), resolves
    /// same-as-source settings against the probe, and renders the
    /// watermark filter.
    pub fn build(
        format: &str,
        raw: RawOptions,
        host: &dyn TranscodeHost,
        probe: Option<&MediaProbe>,
    ) -> CoreResult<Self> {
        raw.validate(format, host)?;

        let mut params = defaults::format_defaults(format);

        match raw.resolution {
            Some(Resolution::Literal { width, height }) => {
                params.insert("s".to_string(), format!("{width}x{height}"));
            }
            Some(Resolution::SameAsSource) => {
                let probe = probe.ok_or_else(|| {
                    CoreError::InvalidOptions(
                        "resolution \"same\" requires a probed source".to_string(),
                    )
                })?;
                let (width, height) = probe.resolution();
                params.insert("s".to_string(), format!("{width}x{height}"));
            }
            None => {}
        }

        match raw.video_bitrate {
            Some(Bitrate::Kbps(kbps)) => {
                params.insert("b:v".to_string(), format!("{kbps}k"));
            }
            Some(Bitrate::SameAsSource) => {
                let probe = probe.ok_or_else(|| {
                    CoreError::InvalidOptions(
                        "video_bitrate \"same\" requires a probed source".to_string(),
                    )
                })?;
                let kbps = probe.video_bitrate_kbps.ok_or_else(|| {
                    CoreError::InvalidOptions(
                        "source reports no video bitrate to copy".to_string(),
                    )
                })?;
                params.insert("b:v".to_string(), format!("{kbps}k"));
            }
            None => {}
        }

        if let Some(watermark) = &raw.watermark {
            params.insert("vf".to_string(), watermark.overlay_filter());
        }

        // Caller overrides win on key collision.
        for (key, value) in &raw.params {
            params.insert(key.clone(), value.clone());
        }

        Ok(Self {
            format: format.to_string(),
            raw,
            params,
        })
    }

    /// The merged parameter set as ffmpeg arguments, followed by the
    /// caller's verbatim extras.
    pub fn format_params(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.params.len() * 2 + self.raw.custom.len());
        for (key, value) in &self.params {
            args.push(format!("-{key}"));
            if !value.is_empty() {
                args.push(value.clone());
            }
        }
        args.extend(self.raw.custom.iter().cloned());
        args
    }

    /// Looks up one merged parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Resolves the logger at time of use, so a host-derived sink can
    /// depend on host state at invocation.
    pub fn logger(&self, host: &dyn TranscodeHost) -> Option<Arc<dyn LogSink>> {
        match &self.raw.logger {
            LoggerSpec::None => None,
            LoggerSpec::Sink(sink) => Some(Arc::clone(sink)),
            LoggerSpec::FromHost(name) => host.logger(name),
        }
    }

    /// Resolves the progress sink at time of use.
    pub fn progress(&self, host: &dyn TranscodeHost) -> Option<ProgressFn> {
        match &self.raw.progress {
            ProgressSpec::None => None,
            ProgressSpec::Sink(sink) => Some(Arc::clone(sink)),
            ProgressSpec::FromHost(name) => host.progress(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NullHost;

    struct HookyHost;

    impl TranscodeHost for HookyHost {
        fn has_hook(&self, name: &str) -> bool {
            name == "on_done"
        }
    }

    fn probe_720p() -> MediaProbe {
        MediaProbe {
            width: 1280,
            height: 720,
            video_bitrate_kbps: Some(2500),
            duration_secs: Some(60.0),
        }
    }

    #[test]
    fn parses_resolution_strings() {
        assert_eq!("same".parse::<Resolution>(), Ok(Resolution::SameAsSource));
        assert_eq!(
            "1280x720".parse::<Resolution>(),
            Ok(Resolution::Literal { width: 1280, height: 720 })
        );
        assert!("1280".parse::<Resolution>().is_err());
        assert!("0x720".parse::<Resolution>().is_err());
    }

    #[test]
    fn parses_bitrate_strings() {
        assert_eq!("same".parse::<Bitrate>(), Ok(Bitrate::SameAsSource));
        assert_eq!("1500k".parse::<Bitrate>(), Ok(Bitrate::Kbps(1500)));
        assert_eq!("1500".parse::<Bitrate>(), Ok(Bitrate::Kbps(1500)));
        assert!("fast".parse::<Bitrate>().is_err());
    }

    #[test]
    fn empty_format_is_invalid() {
        let err = RawOptions::default().validate("", &NullHost).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOptions(_)));
    }

    #[test]
    fn unknown_hook_fails_fast() {
        let raw = RawOptions {
            callbacks: Callbacks {
                after_transcode: Some("missing_hook".to_string()),
                ..Callbacks::default()
            },
            ..RawOptions::default()
        };
        let err = raw.validate("mp4", &HookyHost).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOptions(_)));
        assert!(err.to_string().contains("missing_hook"));

        let ok = RawOptions {
            callbacks: Callbacks {
                after_transcode: Some("on_done".to_string()),
                ..Callbacks::default()
            },
            ..RawOptions::default()
        };
        assert!(ok.validate("mp4", &HookyHost).is_ok());
    }

    #[test]
    fn same_resolution_resolves_against_probe() {
        let raw = RawOptions {
            resolution: Some(Resolution::SameAsSource),
            ..RawOptions::default()
        };
        let options =
            EncodingOptions::build("mp4", raw, &NullHost, Some(&probe_720p())).unwrap();

        assert_eq!(options.param("s"), Some("1280x720"));
        let args = options.format_params();
        assert!(!args.iter().any(|a| a.eq_ignore_ascii_case("same")));
    }

    #[test]
    fn same_bitrate_resolves_against_probe() {
        let raw = RawOptions {
            video_bitrate: Some(Bitrate::SameAsSource),
            ..RawOptions::default()
        };
        let options =
            EncodingOptions::build("mp4", raw, &NullHost, Some(&probe_720p())).unwrap();
        assert_eq!(options.param("b:v"), Some("2500k"));
    }

    #[test]
    fn sentinel_without_probe_is_rejected() {
        let raw = RawOptions {
            resolution: Some(Resolution::SameAsSource),
            ..RawOptions::default()
        };
        let err = EncodingOptions::build("mp4", raw, &NullHost, None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOptions(_)));
    }

    #[test]
    fn caller_override_wins_over_defaults() {
        let raw = RawOptions {
            params: BTreeMap::from([
                ("c:v".to_string(), "libx265".to_string()),
                ("threads".to_string(), "4".to_string()),
            ]),
            ..RawOptions::default()
        };
        let options = EncodingOptions::build("mp4", raw, &NullHost, None).unwrap();

        assert_eq!(options.param("c:v"), Some("libx265"));
        // Untouched default survives, unknown key passes through.
        assert_eq!(options.param("c:a"), Some("aac"));
        assert_eq!(options.param("threads"), Some("4"));
    }

    #[test]
    fn custom_args_are_appended_verbatim() {
        let raw = RawOptions {
            custom: vec!["-qscale".to_string(), "0".to_string()],
            ..RawOptions::default()
        };
        let options = EncodingOptions::build("mp4", raw, &NullHost, None).unwrap();
        let args = options.format_params();
        let tail: Vec<_> = args.iter().rev().take(2).rev().collect();
        assert_eq!(tail, vec!["-qscale", "0"]);
    }

    #[test]
    fn watermark_renders_overlay_filter() {
        let watermark = Watermark {
            path: PathBuf::from("/assets/logo.png"),
            position: WatermarkPosition::TopLeft,
            margin: 5,
        };
        assert_eq!(
            watermark.overlay_filter(),
            "movie=/assets/logo.png [wm]; [in][wm] overlay=5:5 [out]"
        );

        let raw = RawOptions {
            watermark: Some(watermark),
            ..RawOptions::default()
        };
        let options = EncodingOptions::build("mp4", raw, &NullHost, None).unwrap();
        assert!(options.param("vf").unwrap().contains("overlay=5:5"));
    }

    #[test]
    fn deserializes_from_json() {
        let raw: RawOptions = serde_json::from_str(
            r#"{
                "resolution": "same",
                "video_bitrate": "1500k",
                "watermark": {"path": "/assets/logo.png", "position": "center"},
                "callbacks": {"before_transcode": "prepare"},
                "logger": "transcode_logger",
                "replacement": {"attachment": "intro_clip"},
                "cleanup_intermediates": false
            }"#,
        )
        .unwrap();

        assert_eq!(raw.resolution, Some(Resolution::SameAsSource));
        assert_eq!(raw.video_bitrate, Some(Bitrate::Kbps(1500)));
        assert_eq!(
            raw.watermark.as_ref().map(|w| w.position),
            Some(WatermarkPosition::Center)
        );
        assert_eq!(raw.callbacks.before_transcode.as_deref(), Some("prepare"));
        assert!(matches!(&raw.logger, LoggerSpec::FromHost(name) if name == "transcode_logger"));
        assert_eq!(
            raw.replacement,
            Some(ReplacementRef::Attachment { attachment: "intro_clip".to_string() })
        );
        assert!(!raw.cleanup_intermediates);
    }

    #[test]
    fn cleanup_defaults_on() {
        assert!(RawOptions::default().cleanup_intermediates);
        let raw: RawOptions = serde_json::from_str("{}").unwrap();
        assert!(raw.cleanup_intermediates);
    }
}
