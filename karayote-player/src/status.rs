use std::fmt::Display;

use chrono::{DateTime, Local};

use crate::{xml::Element, PlayerError};

/// What the player is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Playing,
    InfoScreen,
}

impl PlayerState {
    fn from_attribute(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "infoscreen" => Self::InfoScreen,
            "loading" => Self::Loading,
            "playing" => Self::Playing,
            _ => Self::Idle,
        }
    }
}

impl Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::InfoScreen => "InfoScreen",
        };

        write!(f, "{}", name)
    }
}

/// State of a song in the player's own queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Ready,
    Loading,
    Playing,
}

impl ItemState {
    fn from_attribute(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "playing" => Self::Playing,
            "ready" => Self::Ready,
            _ => Self::Loading,
        }
    }
}

impl Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ready => "Ready",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
        };

        write!(f, "{}", name)
    }
}

/// One adjustable volume of the player
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub name: String,
    pub level: u8,
    pub caption: Option<String>,
    pub color: Option<String>,
}

impl Volume {
    fn from_element(element: &Element) -> Result<Self, PlayerError> {
        let level = match element.text.trim() {
            "" => 0,
            text => text.parse::<u8>().map_err(|_| {
                PlayerError::MalformedResponse(format!("volume is not a number: {}", text))
            })?,
        };

        Ok(Self {
            name: element.name.clone(),
            level: level.min(100),
            caption: element.attribute("caption").map(str::to_string),
            color: element.attribute("color").map(str::to_string),
        })
    }
}

impl Display for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "> {}: {}%", self.name, self.level)?;

        if let Some(caption) = &self.caption {
            write!(f, " ({})", caption)?;
        }

        if let Some(color) = &self.color {
            write!(f, " Color: {}", color)?;
        }

        Ok(())
    }
}

/// The volumes the player exposes. Only the general volume is always there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeControls {
    pub general: Option<Volume>,
    pub bv: Option<Volume>,
    pub lead1: Option<Volume>,
    pub lead2: Option<Volume>,
}

impl VolumeControls {
    fn from_element(element: Option<&Element>) -> Result<Self, PlayerError> {
        let mut controls = Self::default();

        let Some(element) = element else {
            return Ok(controls);
        };

        for child in &element.children {
            let volume = Some(Volume::from_element(child)?);

            match child.name.as_str() {
                "general" => controls.general = volume,
                "bv" => controls.bv = volume,
                "lead1" => controls.lead1 = volume,
                "lead2" => controls.lead2 = volume,
                _ => {}
            }
        }

        Ok(controls)
    }
}

impl Display for VolumeControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Without a general volume there is no volume data at all
        let Some(general) = &self.general else {
            return Ok(());
        };

        write!(f, "[Available Volume Controls]")?;
        write!(f, "\n {}", general)?;

        for volume in [&self.bv, &self.lead1, &self.lead2].into_iter().flatten() {
            write!(f, "\n {}", volume)?;
        }

        Ok(())
    }
}

/// A song in the player's own queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    /// Zero based position in the player's queue
    pub id: u32,
    pub state: ItemState,
    pub title: String,
    pub artist: String,
    pub year: i16,
    pub duration: f32,
    pub singer: Option<String>,
}

impl QueueItem {
    fn from_element(element: &Element) -> Result<Self, PlayerError> {
        let id = element
            .attribute_number("id")?
            .ok_or_else(|| PlayerError::MalformedResponse("queue item without id".to_string()))?;

        Ok(Self {
            id,
            state: element
                .attribute("status")
                .map(ItemState::from_attribute)
                .unwrap_or(ItemState::Loading),
            title: element.child_text("title").unwrap_or_default().to_string(),
            artist: element.child_text("artist").unwrap_or_default().to_string(),
            year: element.child_number("year")?.unwrap_or_default(),
            duration: element.child_seconds("duration")?.unwrap_or_default(),
            singer: element.child_text("singer").map(str::to_string),
        })
    }
}

impl Display for QueueItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: [{}] {} - {} | {} {}s",
            self.id + 1,
            self.state,
            self.artist,
            self.title,
            self.year,
            self.duration
        )?;

        if let Some(singer) = &self.singer {
            write!(f, " ({})", singer)?;
        }

        Ok(())
    }
}

/// A snapshot of the player, as reported by `getStatus` and most other commands
#[derive(Debug, Clone)]
pub struct PlayerStatus {
    pub state: PlayerState,
    /// Playback position in seconds
    pub position: Option<f32>,
    pub pitch: i8,
    pub tempo: i8,
    pub volumes: VolumeControls,
    pub queue: Vec<QueueItem>,
    /// When this snapshot was taken. Not part of the canonical text.
    pub timestamp: DateTime<Local>,
}

impl PlayerStatus {
    pub const PITCH_RANGE: (i8, i8) = (-6, 6);
    pub const TEMPO_RANGE: (i8, i8) = (-50, 50);

    pub fn parse(xml: &str) -> Result<Self, PlayerError> {
        let root = Element::parse(xml)?;
        Self::from_element(&root)
    }

    pub(crate) fn from_element(root: &Element) -> Result<Self, PlayerError> {
        let status = root.find("status").ok_or_else(|| {
            PlayerError::MalformedResponse(format!("expected a status, got <{}>", root.name))
        })?;

        let pitch: i8 = status.child_number("pitch")?.unwrap_or_default();
        let tempo: i8 = status.child_number("tempo")?.unwrap_or_default();

        let queue = match status.child("queue") {
            Some(queue) => queue
                .children
                .iter()
                .filter(|c| c.name == "item")
                .map(QueueItem::from_element)
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![],
        };

        Ok(Self {
            state: status
                .attribute("state")
                .map(PlayerState::from_attribute)
                .unwrap_or(PlayerState::Idle),
            position: status.child_seconds("position")?,
            pitch: pitch.clamp(Self::PITCH_RANGE.0, Self::PITCH_RANGE.1),
            tempo: tempo.clamp(Self::TEMPO_RANGE.0, Self::TEMPO_RANGE.1),
            volumes: VolumeControls::from_element(status.child("volumeList"))?,
            queue,
            timestamp: Local::now(),
        })
    }

    /// The text form used to tell snapshots apart
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Whether two snapshots describe the same player state, ignoring when they were taken
    pub fn same_as(&self, other: &PlayerStatus) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "===<PLAYER STATUS>===")?;
        write!(f, "\nStatus: {}", self.state)?;

        if let Some(position) = self.position {
            write!(f, " at {}s", position)?;
        }

        write!(f, "\nPitch: {} | Tempo: {}%", self.pitch, self.tempo)?;
        write!(f, "\n{}", self.volumes)?;

        if !self.queue.is_empty() {
            write!(f, "\n---[THE QUEUE]---")?;

            for item in &self.queue {
                write!(f, "\n{}", item)?;
            }
        }

        Ok(())
    }
}
