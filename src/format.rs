use crate::GrabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container formats a download can be requested in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
    Mov,
    Webm,
    Flv,
}

impl VideoFormat {
    pub const ALL: [VideoFormat; 6] = [
        VideoFormat::Mp4,
        VideoFormat::Avi,
        VideoFormat::Mkv,
        VideoFormat::Mov,
        VideoFormat::Webm,
        VideoFormat::Flv,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => ".mp4",
            VideoFormat::Mkv => ".mkv",
            VideoFormat::Avi => ".avi",
            VideoFormat::Mov => ".mov",
            VideoFormat::Webm => ".webm",
            VideoFormat::Flv => ".flv",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VideoFormat::Mp4 => "MP4",
            VideoFormat::Mkv => "MKV",
            VideoFormat::Avi => "AVI",
            VideoFormat::Mov => "MOV",
            VideoFormat::Webm => "WEBM",
            VideoFormat::Flv => "FLV",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VideoFormat {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp4" => Ok(VideoFormat::Mp4),
            "mkv" => Ok(VideoFormat::Mkv),
            "avi" => Ok(VideoFormat::Avi),
            "mov" => Ok(VideoFormat::Mov),
            "webm" => Ok(VideoFormat::Webm),
            "flv" => Ok(VideoFormat::Flv),
            _ => Err(GrabError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Resolution labels offered by the download form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "4K")]
    Uhd4k,
    #[default]
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

impl Quality {
    pub const ALL: [Quality; 5] = [
        Quality::Uhd4k,
        Quality::P1080,
        Quality::P720,
        Quality::P480,
        Quality::P360,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Uhd4k => "4K",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quality {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4k" | "2160p" => Ok(Quality::Uhd4k),
            "1080p" | "1080" => Ok(Quality::P1080),
            "720p" | "720" => Ok(Quality::P720),
            "480p" | "480" => Ok(Quality::P480),
            "360p" | "360" => Ok(Quality::P360),
            _ => Err(GrabError::Parse(format!("unknown quality '{}'", s))),
        }
    }
}
