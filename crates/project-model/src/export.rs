//! Export parameters handed to the media engine.

use std::path::PathBuf;
use std::str::FromStr;

use framecut_common::{EditError, EditResult, ExportDefaults, MediaTime};
use serde::{Deserialize, Serialize};

use crate::timeline::TimeRange;

/// Visual quality / codec tier of the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportPreset {
    #[serde(rename = "640x480")]
    Res640x480,
    #[serde(rename = "960x540")]
    Res960x540,
    #[serde(rename = "1280x720")]
    Res1280x720,
    #[serde(rename = "1920x1080")]
    Res1920x1080,
    #[serde(rename = "3840x2160")]
    Res3840x2160,
    #[serde(rename = "hevc_1920x1080")]
    Hevc1920x1080,
    #[serde(rename = "hevc_3840x2160")]
    Hevc3840x2160,
    #[serde(rename = "hevc_1920x1080_with_alpha")]
    Hevc1920x1080WithAlpha,
    #[serde(rename = "hevc_highest_quality_with_alpha")]
    HevcHighestQualityWithAlpha,
    #[serde(rename = "low_quality")]
    LowQuality,
    #[serde(rename = "medium_quality")]
    MediumQuality,
    #[default]
    #[serde(rename = "highest_quality")]
    HighestQuality,
    #[serde(rename = "apple_m4a")]
    AppleM4a,
    #[serde(rename = "passthrough")]
    Passthrough,
}

impl ExportPreset {
    pub const ALL: [ExportPreset; 14] = [
        ExportPreset::Res640x480,
        ExportPreset::Res960x540,
        ExportPreset::Res1280x720,
        ExportPreset::Res1920x1080,
        ExportPreset::Res3840x2160,
        ExportPreset::Hevc1920x1080,
        ExportPreset::Hevc3840x2160,
        ExportPreset::Hevc1920x1080WithAlpha,
        ExportPreset::HevcHighestQualityWithAlpha,
        ExportPreset::LowQuality,
        ExportPreset::MediumQuality,
        ExportPreset::HighestQuality,
        ExportPreset::AppleM4a,
        ExportPreset::Passthrough,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportPreset::Res640x480 => "640x480",
            ExportPreset::Res960x540 => "960x540",
            ExportPreset::Res1280x720 => "1280x720",
            ExportPreset::Res1920x1080 => "1920x1080",
            ExportPreset::Res3840x2160 => "3840x2160",
            ExportPreset::Hevc1920x1080 => "hevc_1920x1080",
            ExportPreset::Hevc3840x2160 => "hevc_3840x2160",
            ExportPreset::Hevc1920x1080WithAlpha => "hevc_1920x1080_with_alpha",
            ExportPreset::HevcHighestQualityWithAlpha => "hevc_highest_quality_with_alpha",
            ExportPreset::LowQuality => "low_quality",
            ExportPreset::MediumQuality => "medium_quality",
            ExportPreset::HighestQuality => "highest_quality",
            ExportPreset::AppleM4a => "apple_m4a",
            ExportPreset::Passthrough => "passthrough",
        }
    }

    /// Presets that produce audio only.
    pub fn is_audio_only(self) -> bool {
        matches!(self, ExportPreset::AppleM4a)
    }
}

impl FromStr for ExportPreset {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| EditError::config(format!("unknown export preset '{s}'")))
    }
}

/// Target frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    Fps15,
    Fps24,
    #[default]
    Fps30,
    Fps60,
    Fps120,
}

impl FrameRate {
    pub fn fps(self) -> u32 {
        match self {
            FrameRate::Fps15 => 15,
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
            FrameRate::Fps120 => 120,
        }
    }

    /// Duration of one frame: `1 / fps`.
    pub fn frame_duration(self) -> MediaTime {
        MediaTime::from_secs_f64(1.0 / f64::from(self.fps()))
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = EditError;

    fn try_from(fps: u32) -> Result<Self, Self::Error> {
        match fps {
            15 => Ok(FrameRate::Fps15),
            24 => Ok(FrameRate::Fps24),
            30 => Ok(FrameRate::Fps30),
            60 => Ok(FrameRate::Fps60),
            120 => Ok(FrameRate::Fps120),
            other => Err(EditError::config(format!(
                "unsupported frame rate {other} (expected 15, 24, 30, 60 or 120)"
            ))),
        }
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> u32 {
        rate.fps()
    }
}

/// File format of the exported artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputContainer {
    #[default]
    Mp4,
    Mov,
    M4v,
    M4a,
}

impl OutputContainer {
    pub fn extension(self) -> &'static str {
        match self {
            OutputContainer::Mp4 => "mp4",
            OutputContainer::Mov => "mov",
            OutputContainer::M4v => "m4v",
            OutputContainer::M4a => "m4a",
        }
    }
}

impl FromStr for OutputContainer {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp4" => Ok(OutputContainer::Mp4),
            "mov" => Ok(OutputContainer::Mov),
            "m4v" => Ok(OutputContainer::M4v),
            "m4a" => Ok(OutputContainer::M4a),
            other => Err(EditError::config(format!("unknown output container '{other}'"))),
        }
    }
}

/// Everything the media engine needs besides the composition itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportParams {
    /// Destination file. Any existing file here is removed before rendering.
    pub destination: PathBuf,
    pub preset: ExportPreset,
    pub frame_rate: FrameRate,
    pub optimize_for_network: bool,
    pub container: OutputContainer,
    /// Final trim applied by the exporter; filled from the composition.
    pub time_range: Option<TimeRange>,
}

impl ExportParams {
    /// Parameters with library defaults.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            preset: ExportPreset::default(),
            frame_rate: FrameRate::default(),
            optimize_for_network: true,
            container: OutputContainer::default(),
            time_range: None,
        }
    }

    /// Parameters from configured defaults.
    pub fn from_defaults(
        destination: impl Into<PathBuf>,
        defaults: &ExportDefaults,
    ) -> EditResult<Self> {
        let params = Self {
            destination: destination.into(),
            preset: defaults.preset.parse()?,
            frame_rate: FrameRate::try_from(defaults.frame_rate)?,
            optimize_for_network: defaults.optimize_for_network,
            container: defaults.container.parse()?,
            time_range: None,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_preset(mut self, preset: ExportPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_container(mut self, container: OutputContainer) -> Self {
        self.container = container;
        self
    }

    pub fn with_network_optimization(mut self, enabled: bool) -> Self {
        self.optimize_for_network = enabled;
        self
    }

    /// Reject combinations the exporter cannot honour.
    pub fn validate(&self) -> EditResult<()> {
        if self.destination.as_os_str().is_empty() {
            return Err(EditError::config("export destination is empty"));
        }
        let audio_container = self.container == OutputContainer::M4a;
        if self.preset.is_audio_only() != audio_container {
            return Err(EditError::config(format!(
                "preset {} cannot be written to a .{} container",
                self.preset.as_str(),
                self.container.extension()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_defaults() {
        let params = ExportParams::from_defaults("out.mp4", &ExportDefaults::default()).unwrap();
        assert_eq!(params.preset, ExportPreset::HighestQuality);
        assert_eq!(params.frame_rate, FrameRate::Fps30);
        assert_eq!(params.container, OutputContainer::Mp4);
        assert!(params.optimize_for_network);
        assert!(params.time_range.is_none());
    }

    #[test]
    fn test_from_defaults_rejects_unknown_values() {
        let defaults = ExportDefaults {
            preset: "ultra".to_string(),
            ..ExportDefaults::default()
        };
        assert!(matches!(
            ExportParams::from_defaults("out.mp4", &defaults),
            Err(EditError::Config { .. })
        ));

        let defaults = ExportDefaults {
            frame_rate: 25,
            ..ExportDefaults::default()
        };
        assert!(ExportParams::from_defaults("out.mp4", &defaults).is_err());
    }

    #[test]
    fn test_audio_preset_requires_audio_container() {
        let params = ExportParams::new("out.mp4").with_preset(ExportPreset::AppleM4a);
        assert!(params.validate().is_err());
        let params = params.with_container(OutputContainer::M4a);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_frame_duration_is_reciprocal_fps() {
        assert_eq!(
            FrameRate::Fps30.frame_duration(),
            MediaTime::from_nanos(33_333_333)
        );
        assert_eq!(FrameRate::Fps15.frame_duration(), MediaTime::from_nanos(66_666_667));
    }

    #[test]
    fn test_preset_names_round_trip_through_from_str() {
        for preset in ExportPreset::ALL {
            assert_eq!(preset.as_str().parse::<ExportPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_frame_rate_serializes_as_number() {
        let json = serde_json::to_string(&FrameRate::Fps60).unwrap();
        assert_eq!(json, "60");
        let parsed: FrameRate = serde_json::from_str("24").unwrap();
        assert_eq!(parsed, FrameRate::Fps24);
    }
}
