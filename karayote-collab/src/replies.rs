use karayote_core::{
    AdmitResult, LinkMetadata, SelectedSong, SessionPhase, SongError, User,
};
use karayote_player::KaraokePlayer;
use log::warn;

use crate::{parse_position, Collab, OpenOutcome};

/// Replies written for the people picking songs, ready to be sent as is
impl<P> Collab<P>
where
    P: KaraokePlayer,
{
    pub fn request_song(&self, song: SelectedSong) -> String {
        let title = song.title();
        let user_id = song.owner().id;

        match self.admit(song) {
            AdmitResult::SuccessInQueue => {
                let position = self
                    .session()
                    .queue()
                    .find_by_user(user_id)
                    .map(|(_, position)| position)
                    .unwrap_or_default();

                let mut reply = format!("Added {} to the queue at position {}", title, position);
                let started = self.session().is_started();

                match (position, started) {
                    (1, true) => reply.push_str(". It's your turn right now! Come on up to the stage!"),
                    (1, false) => reply.push_str(". You will be up first! Don't go anywhere"),
                    (2, true) => reply.push_str(
                        ". You are up after this person finishes singing! Don't go anywhere",
                    ),
                    (2, false) => reply.push_str(". You will be up second! Don't go anywhere"),
                    _ => {}
                }

                reply
            }
            AdmitResult::SuccessInReserve => format!("Added {} to your reserved songs", title),
            AdmitResult::UserReserveFull => format!(
                "Couldn't add {}, you've already selected {} songs. You can delete one or select a new one after you sing next",
                title,
                User::MAX_RESERVED_SONGS + 1
            ),
            AdmitResult::AlreadySelected => format!(
                "Couldn't add {}, someone already picked that one today",
                title
            ),
            AdmitResult::QueueClosed => {
                format!("Couldn't add {}, the queue is closed right now", title)
            }
            AdmitResult::UnknownFailure => format!(
                "Couldn't add {}, but I'm not sure why it didn't work",
                title
            ),
        }
    }

    /// Picks a song found by an earlier search
    pub fn request_catalog_song(&self, user: &User, entry_id: u32) -> String {
        match self.catalog_song(entry_id) {
            Ok(song) => self.request_song(SelectedSong::catalog(user, song)),
            Err(error) => {
                warn!("{} picked a missing song: {}", user.name(), error);
                "I don't know that song anymore, try searching for it again".to_string()
            }
        }
    }

    /// Picks a video. Metadata, when known, is checked against the length limits.
    pub fn request_link_song(
        &self,
        user: &User,
        link: &str,
        metadata: Option<LinkMetadata>,
    ) -> String {
        let song = match SelectedSong::link(user, link) {
            Ok(song) => song,
            Err(_) => return "That doesn't look like a YouTube video to me".to_string(),
        };

        if let Some(metadata) = metadata {
            match song.apply_link_metadata(metadata) {
                Ok(()) => {}
                Err(SongError::TooLong { limit, .. }) => {
                    return format!(
                        "No can do, a Youtube video has to be less than {} minutes long.",
                        limit
                    )
                }
                Err(SongError::TooShort) => {
                    return "That's either a stream or less than a minute long. Nice try!"
                        .to_string()
                }
                Err(error) => return error.to_string(),
            }
        }

        self.request_song(song)
    }

    /// Adds a song for someone in the room, by name
    pub fn request_manual_song(&self, name: &str, title: &str) -> String {
        let user = self.users().find_or_create_named(name);

        match SelectedSong::manual(&user, title) {
            Ok(song) => self.request_song(song),
            Err(error) => error.to_string(),
        }
    }

    pub fn delete_song(&self, user: &User, position: &str) -> String {
        const NOT_A_POSITION: &str =
            "That wasn't the number of one of the songs that can be removed";

        let Some(position) = parse_position(position) else {
            return NOT_A_POSITION.to_string();
        };

        if !self.session().queue().has_user(user.id) {
            return "You haven't selected any songs yet".to_string();
        }

        if position == 0 || position > user.reserved_count() + 1 {
            return NOT_A_POSITION.to_string();
        }

        let had_reserve = user.reserved_count() > 0;

        let reply = if self.remove_song(user, position) {
            let mut reply = format!("Removed your selected song #{}.", position);

            if position == 1 && had_reserve {
                reply.push_str(" Your first reserved song has taken its place in the queue");
            }

            reply
        } else {
            "Couldn't remove that song, not sure why".to_string()
        };

        format!("{}\n\n{}", reply, self.my_songs(user))
    }

    pub fn switch_songs(&self, user: &User, first: &str, second: &str) -> String {
        let (Some(first), Some(second)) = (parse_position(first), parse_position(second)) else {
            return "One or both of those wasn't even close to being the number of a song!"
                .to_string();
        };

        if !self.session().queue().has_user(user.id) || user.reserved_count() == 0 {
            return "You haven't selected two songs yet to switch them".to_string();
        }

        if self.switch_user_songs(user, first, second) {
            format!("Done!\n\n{}", self.my_songs(user))
        } else {
            format!(
                "Couldn't switch songs at those positions. Make sure both numbers are between 1 and {}",
                User::MAX_RESERVED_SONGS + 1
            )
        }
    }

    /// A user's songs, numbered the way `delete_song` and `switch_songs` expect
    pub fn my_songs(&self, user: &User) -> String {
        let selections = self.user_selections(user);

        let Some((current, position)) = selections.current else {
            return "You have no songs in the queue or reserve".to_string();
        };

        let mut reply = format!(
            "Your Selected Songs:\n1) {} at queue position {}",
            current.title(),
            position
        );

        for (index, song) in selections.reserve.iter().enumerate() {
            reply.push_str(&format!("\n{}) {} [in reserve]", index + 2, song.title()));
        }

        if !selections.history.is_empty() {
            reply.push_str("\n\nPreviously sung today:");

            for song in &selections.history {
                reply.push_str(&format!("\n{}", song.title()));
            }
        }

        reply
    }

    /// What the host hears after asking to open the session
    pub fn open_session_reply(&self) -> String {
        match self.open_session() {
            OpenOutcome::Opened => "The session is now open for searching and queueing.",
            OpenOutcome::Reopened => "Reopened the queue to submissions",
            OpenOutcome::AlreadyOpen => "You already did that silly",
            OpenOutcome::PlayerUnavailable => {
                "Can't open the session, Karafun isn't speaking to us right now."
            }
            OpenOutcome::SessionOver => "This session is over, there's no opening it again",
        }
        .to_string()
    }

    /// Why songs can't be picked right now, if they can't
    pub fn session_closed_reply(&self) -> Option<String> {
        let reply = match self.session().phase() {
            SessionPhase::Open => return None,
            SessionPhase::NotYetOpen => match self.session().open_time() {
                Some(time) => format!(
                    "The session isn't open yet. Come back at {} to pick your songs",
                    time.format("%-I:%M %p")
                ),
                None => "The session isn't open yet. Hang tight!".to_string(),
            },
            SessionPhase::TemporarilyClosed if self.session().is_closed() => {
                "The host has closed the queue for now. Check back in a bit".to_string()
            }
            SessionPhase::TemporarilyClosed => {
                "The queue is closed for now, there's not enough time left for more songs. Check back in a bit"
                    .to_string()
            }
            SessionPhase::Over => "The session is over. Thanks for coming!".to_string(),
        };

        Some(reply)
    }
}

#[cfg(test)]
mod test {
    use karayote_core::{LinkMetadata, SessionConfig};

    use crate::{
        test::{collab, open_collab, song, MockPlayer},
        Collab,
    };

    #[test]
    fn queue_positions_are_announced() {
        let collab = open_collab();

        assert_eq!(
            collab.request_song(song(&collab, "ann", 1)),
            "Added Artist - Song 1 to the queue at position 1. You will be up first! Don't go anywhere"
        );
        assert_eq!(
            collab.request_song(song(&collab, "bob", 2)),
            "Added Artist - Song 2 to the queue at position 2. You will be up second! Don't go anywhere"
        );
        assert_eq!(
            collab.request_song(song(&collab, "cy", 3)),
            "Added Artist - Song 3 to the queue at position 3"
        );
        assert_eq!(
            collab.request_song(song(&collab, "ann", 4)),
            "Added Artist - Song 4 to your reserved songs"
        );
    }

    #[test]
    fn started_sessions_call_singers_up() {
        let collab = open_collab();
        collab.start_session();

        assert_eq!(
            collab.request_song(song(&collab, "ann", 1)),
            "Added Artist - Song 1 to the queue at position 1. It's your turn right now! Come on up to the stage!"
        );
    }

    #[test]
    fn failed_requests_explain_themselves() {
        let collab = collab();

        assert_eq!(
            collab.request_song(song(&collab, "ann", 1)),
            "Couldn't add Artist - Song 1, the queue is closed right now"
        );

        collab.open_session();
        collab.request_song(song(&collab, "ann", 1));

        assert_eq!(
            collab.request_song(song(&collab, "bob", 1)),
            "Couldn't add Artist - Song 1, someone already picked that one today"
        );

        collab.request_song(song(&collab, "ann", 2));
        collab.request_song(song(&collab, "ann", 3));

        assert_eq!(
            collab.request_song(song(&collab, "ann", 4)),
            "Couldn't add Artist - Song 4, you've already selected 3 songs. You can delete one or select a new one after you sing next"
        );
    }

    #[test]
    fn listing_songs() {
        let collab = open_collab();
        let ann = collab.users().find_or_create_named("ann");

        assert_eq!(collab.my_songs(&ann), "You have no songs in the queue or reserve");

        collab.request_song(song(&collab, "ann", 1));
        collab.request_song(song(&collab, "ann", 2));
        collab.request_song(song(&collab, "ann", 3));
        collab.advance_queue(true);

        assert_eq!(
            collab.my_songs(&ann),
            "Your Selected Songs:\n1) Artist - Song 2 at queue position 1\n2) Artist - Song 3 [in reserve]\n\nPreviously sung today:\nArtist - Song 1"
        );
    }

    #[test]
    fn deleting_songs() {
        let collab = open_collab();
        let ann = collab.users().find_or_create_named("ann");

        assert_eq!(collab.delete_song(&ann, "1"), "You haven't selected any songs yet");

        collab.request_song(song(&collab, "ann", 1));
        collab.request_song(song(&collab, "ann", 2));

        assert_eq!(
            collab.delete_song(&ann, "two"),
            "That wasn't the number of one of the songs that can be removed"
        );
        assert_eq!(
            collab.delete_song(&ann, "3"),
            "That wasn't the number of one of the songs that can be removed"
        );
        assert_eq!(
            collab.delete_song(&ann, "#1"),
            "Removed your selected song #1. Your first reserved song has taken its place in the queue\n\nYour Selected Songs:\n1) Artist - Song 2 at queue position 1"
        );
    }

    #[test]
    fn switching_songs() {
        let collab = open_collab();
        let ann = collab.users().find_or_create_named("ann");

        collab.request_song(song(&collab, "ann", 1));

        assert_eq!(
            collab.switch_songs(&ann, "1", "2"),
            "You haven't selected two songs yet to switch them"
        );

        collab.request_song(song(&collab, "ann", 2));

        assert_eq!(
            collab.switch_songs(&ann, "1", "x"),
            "One or both of those wasn't even close to being the number of a song!"
        );
        assert_eq!(
            collab.switch_songs(&ann, "1", "3"),
            "Couldn't switch songs at those positions. Make sure both numbers are between 1 and 3"
        );
        assert_eq!(
            collab.switch_songs(&ann, "2", "1"),
            "Done!\n\nYour Selected Songs:\n1) Artist - Song 2 at queue position 1\n2) Artist - Song 1 [in reserve]"
        );
    }

    #[test]
    fn videos_must_fit_the_limits() {
        let collab = open_collab();
        let ann = collab.users().find_or_create_named("ann");
        let link = "https://youtu.be/dQw4w9WgXcQ";

        let long = LinkMetadata {
            title: "Epic".to_string(),
            duration_in_seconds: 3600,
        };
        assert_eq!(
            collab.request_link_song(&ann, link, Some(long)),
            "No can do, a Youtube video has to be less than 10 minutes long."
        );

        let short = LinkMetadata {
            title: "Blip".to_string(),
            duration_in_seconds: 0,
        };
        assert_eq!(
            collab.request_link_song(&ann, link, Some(short)),
            "That's either a stream or less than a minute long. Nice try!"
        );

        let fine = LinkMetadata {
            title: "Never Gonna Give You Up".to_string(),
            duration_in_seconds: 213,
        };
        assert!(collab
            .request_link_song(&ann, link, Some(fine))
            .starts_with("Added Never Gonna Give You Up to the queue at position 1"));

        assert_eq!(
            collab.request_link_song(&ann, "not a video", None),
            "That doesn't look like a YouTube video to me"
        );
    }

    #[test]
    fn hosts_can_add_songs_by_name() {
        let collab = open_collab();

        assert!(collab
            .request_manual_song("dee", "Bohemian Rhapsody")
            .starts_with("Added Bohemian Rhapsody to the queue at position 1"));
        assert_eq!(collab.users().len(), 1);
    }

    #[test]
    fn searched_songs_can_be_requested() {
        let collab = open_collab();
        let ann = collab.users().find_or_create_named("ann");

        assert_eq!(
            collab.request_catalog_song(&ann, 11),
            "I don't know that song anymore, try searching for it again"
        );

        collab.search_catalog("abba").unwrap();
        assert!(collab
            .request_catalog_song(&ann, 11)
            .starts_with("Added ABBA - Waterloo to the queue"));
    }

    #[test]
    fn full_queues_explain_the_time_limit() {
        let collab = open_collab();
        let now = chrono::Local::now();

        collab
            .session()
            .schedule(Some(now), None, Some(now + chrono::Duration::minutes(1)));
        collab.request_song(song(&collab, "ann", 1));

        assert_eq!(
            collab.session_closed_reply().as_deref(),
            Some("The queue is closed for now, there's not enough time left for more songs. Check back in a bit")
        );
    }

    #[test]
    fn open_replies() {
        let unreachable = Collab::new(SessionConfig::default(), MockPlayer::new(false));
        assert_eq!(
            unreachable.open_session_reply(),
            "Can't open the session, Karafun isn't speaking to us right now."
        );

        let collab = collab();
        assert!(collab.session_closed_reply().is_some());
        assert_eq!(
            collab.open_session_reply(),
            "The session is now open for searching and queueing."
        );
        assert_eq!(collab.open_session_reply(), "You already did that silly");
        assert_eq!(collab.session_closed_reply(), None);

        collab.close_session();
        assert_eq!(
            collab.session_closed_reply().as_deref(),
            Some("The host has closed the queue for now. Check back in a bit")
        );
        assert_eq!(collab.open_session_reply(), "Reopened the queue to submissions");

        collab.end_session();
        assert_eq!(
            collab.session_closed_reply().as_deref(),
            Some("The session is over. Thanks for coming!")
        );
    }
}
