use std::fmt::Display;

use quick_xml::escape::escape;

/// Highest position the player accepts for its queue
pub const MAX_QUEUE_POSITION: u32 = 99999;

/// A volume the player lets us adjust
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    General,
    BackingVocals,
    Lead1,
    Lead2,
}

impl VolumeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::BackingVocals => "bv",
            Self::Lead1 => "lead1",
            Self::Lead2 => "lead2",
        }
    }
}

/// Everything the player can be asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetStatus {
        /// Leave out the player's queue from the response
        no_queue: bool,
    },
    Play,
    Pause,
    Next,
    /// Seek to a position in seconds
    Seek(u32),
    /// Shift the key in semitones, between -6 and 6
    Pitch(i8),
    /// Change the speed in percent, between -50 and 50
    Tempo(i8),
    SetVolume {
        kind: VolumeKind,
        level: u8,
    },
    ClearQueue,
    AddToQueue {
        song: u32,
        /// Where to insert the song, the end of the queue if unset
        position: Option<u32>,
        singer: Option<String>,
    },
    RemoveFromQueue(u32),
    ChangeQueuePosition {
        id: u32,
        position: u32,
    },
    Search {
        terms: String,
        limit: u32,
        offset: u32,
    },
    GetList {
        list_id: u32,
        limit: u32,
        offset: u32,
    },
    GetCatalogList,
}

impl Command {
    pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
    pub const DEFAULT_LIST_LIMIT: u32 = 100;

    pub fn status() -> Self {
        Self::GetStatus { no_queue: false }
    }

    pub fn search(terms: &str) -> Self {
        Self::Search {
            terms: terms.to_string(),
            limit: Self::DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }

    pub fn list(list_id: u32) -> Self {
        Self::GetList {
            list_id,
            limit: Self::DEFAULT_LIST_LIMIT,
            offset: 0,
        }
    }

    /// The name the player knows this command by
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetStatus { .. } => "getStatus",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Seek(_) => "seek",
            Self::Pitch(_) => "pitch",
            Self::Tempo(_) => "tempo",
            Self::SetVolume { .. } => "setVolume",
            Self::ClearQueue => "clearQueue",
            Self::AddToQueue { .. } => "addToQueue",
            Self::RemoveFromQueue(_) => "removeFromQueue",
            Self::ChangeQueuePosition { .. } => "changeQueuePosition",
            Self::Search { .. } => "search",
            Self::GetList { .. } => "getList",
            Self::GetCatalogList => "getCatalogList",
        }
    }

    /// Whether the player answers this command with its status
    pub fn returns_status(&self) -> bool {
        !matches!(
            self,
            Self::Search { .. } | Self::GetList { .. } | Self::GetCatalogList
        )
    }

    /// Formats the command as the message sent to the player, with values clamped
    /// to what the player accepts
    pub fn to_message(&self) -> String {
        let mut attributes: Vec<(&str, String)> = vec![];
        let mut flag = None;
        let mut body = None;

        match self {
            Self::GetStatus { no_queue } => {
                if *no_queue {
                    flag = Some("noqueue");
                }
            }
            Self::Seek(seconds) => body = Some(seconds.to_string()),
            Self::Pitch(pitch) => body = Some((*pitch).clamp(-6, 6).to_string()),
            Self::Tempo(tempo) => body = Some((*tempo).clamp(-50, 50).to_string()),
            Self::SetVolume { kind, level } => {
                attributes.push(("volume_type", kind.name().to_string()));
                body = Some((*level).min(100).to_string());
            }
            Self::AddToQueue {
                song,
                position,
                singer,
            } => {
                attributes.push(("song", song.to_string()));
                attributes.push(("singer", singer.clone().unwrap_or_default()));

                let position = position.unwrap_or(MAX_QUEUE_POSITION);
                body = Some(position.min(MAX_QUEUE_POSITION).to_string());
            }
            Self::RemoveFromQueue(id) => {
                attributes.push(("id", (*id).min(MAX_QUEUE_POSITION).to_string()));
            }
            Self::ChangeQueuePosition { id, position } => {
                attributes.push(("id", (*id).min(MAX_QUEUE_POSITION).to_string()));
                body = Some((*position).min(MAX_QUEUE_POSITION).to_string());
            }
            Self::Search {
                terms,
                limit,
                offset,
            } => {
                attributes.push(("offset", offset.to_string()));
                attributes.push(("limit", limit.to_string()));
                body = Some(terms.clone());
            }
            Self::GetList {
                list_id,
                limit,
                offset,
            } => {
                attributes.push(("id", list_id.to_string()));
                attributes.push(("offset", offset.to_string()));
                attributes.push(("limit", limit.to_string()));
            }
            Self::Play | Self::Pause | Self::Next | Self::ClearQueue | Self::GetCatalogList => {}
        }

        let mut message = format!("<action type=\"{}\"", self.name());

        if let Some(flag) = flag {
            message.push(' ');
            message.push_str(flag);
        }

        for (key, value) in attributes {
            message.push_str(&format!(" {}=\"{}\"", key, escape(value.as_str())));
        }

        message.push('>');

        if let Some(body) = body {
            message.push_str(&escape(body.as_str()));
        }

        message.push_str("</action>");
        message
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::{Command, VolumeKind};

    #[test]
    fn formats_simple_commands() {
        assert_eq!(
            Command::status().to_message(),
            r#"<action type="getStatus"></action>"#
        );
        assert_eq!(
            Command::GetStatus { no_queue: true }.to_message(),
            r#"<action type="getStatus" noqueue></action>"#
        );
        assert_eq!(Command::Play.to_message(), r#"<action type="play"></action>"#);
        assert_eq!(Command::Seek(90).to_message(), r#"<action type="seek">90</action>"#);
        assert_eq!(
            Command::list(3).to_message(),
            r#"<action type="getList" id="3" offset="0" limit="100"></action>"#
        );
    }

    #[test]
    fn clamps_values() {
        assert_eq!(Command::Pitch(12).to_message(), r#"<action type="pitch">6</action>"#);
        assert_eq!(Command::Pitch(-7).to_message(), r#"<action type="pitch">-6</action>"#);
        assert_eq!(Command::Tempo(-80).to_message(), r#"<action type="tempo">-50</action>"#);
        assert_eq!(
            Command::SetVolume {
                kind: VolumeKind::Lead1,
                level: 250
            }
            .to_message(),
            r#"<action type="setVolume" volume_type="lead1">100</action>"#
        );
        assert_eq!(
            Command::RemoveFromQueue(1_000_000).to_message(),
            r#"<action type="removeFromQueue" id="99999"></action>"#
        );
        assert_eq!(
            Command::ChangeQueuePosition {
                id: 123_456,
                position: 2
            }
            .to_message(),
            r#"<action type="changeQueuePosition" id="99999">2</action>"#
        );
    }

    #[test]
    fn add_to_queue_defaults_to_the_end() {
        let command = Command::AddToQueue {
            song: 42,
            position: None,
            singer: Some("jo".to_string()),
        };

        assert_eq!(
            command.to_message(),
            r#"<action type="addToQueue" song="42" singer="jo">99999</action>"#
        );
    }

    #[test]
    fn escapes_text() {
        let command = Command::AddToQueue {
            song: 1,
            position: Some(0),
            singer: Some("\"Rock\" & <Roll>".to_string()),
        };

        assert_eq!(
            command.to_message(),
            r#"<action type="addToQueue" song="1" singer="&quot;Rock&quot; &amp; &lt;Roll&gt;">0</action>"#
        );
        assert_eq!(
            Command::search("Simon & Garfunkel").to_message(),
            r#"<action type="search" offset="0" limit="10">Simon &amp; Garfunkel</action>"#
        );
    }

    #[test]
    fn only_lookups_skip_the_status() {
        assert!(Command::Play.returns_status());
        assert!(Command::status().returns_status());
        assert!(!Command::search("x").returns_status());
        assert!(!Command::GetCatalogList.returns_status());
    }
}
