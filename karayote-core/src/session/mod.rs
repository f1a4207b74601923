mod admission;

use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta};
use crossbeam::atomic::AtomicCell;
use log::info;
use parking_lot::Mutex;

use crate::{SelectedSong, SessionConfig, SongQueue, UserId, UserRegistry};

pub use admission::*;

/// Where a session is in its lifecycle, as far as users are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotYetOpen,
    Open,
    TemporarilyClosed,
    Over,
}

#[derive(Debug, Default, Clone, Copy)]
struct Schedule {
    open_time: Option<DateTime<Local>>,
    start_time: Option<DateTime<Local>>,
    end_time: Option<DateTime<Local>>,
}

/// A single karaoke event. Owns the song queue and the history of every song
/// picked during the event.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    users: Arc<UserRegistry>,
    queue: SongQueue,
    schedule: Mutex<Schedule>,
    queue_closed: AtomicCell<bool>,
    /// Songs queued, reserved or sung tonight.
    /// Also held for the whole of any operation touching both the queue and a reserve.
    history: Mutex<Vec<SelectedSong>>,
}

impl Session {
    pub fn new(config: SessionConfig, users: Arc<UserRegistry>) -> Self {
        Self {
            config,
            users,
            queue: SongQueue::new(),
            schedule: Default::default(),
            queue_closed: AtomicCell::new(false),
            history: Default::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn users(&self) -> &Arc<UserRegistry> {
        &self.users
    }

    pub fn queue(&self) -> &SongQueue {
        &self.queue
    }

    /// A snapshot of every song picked this session
    pub fn history(&self) -> Vec<SelectedSong> {
        self.history.lock().clone()
    }

    /// Plans the session ahead of time
    pub fn schedule(
        &self,
        open_time: Option<DateTime<Local>>,
        start_time: Option<DateTime<Local>>,
        end_time: Option<DateTime<Local>>,
    ) {
        *self.schedule.lock() = Schedule {
            open_time,
            start_time,
            end_time,
        };
    }

    pub fn open_time(&self) -> Option<DateTime<Local>> {
        self.schedule.lock().open_time
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.schedule.lock().start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.schedule.lock().end_time
    }

    /// Whether songs can be added right now
    pub fn is_open(&self) -> bool {
        let schedule = *self.schedule.lock();
        let now = Local::now();

        schedule.open_time.is_some_and(|t| now >= t)
            && schedule.end_time.map_or(true, |t| now < t)
            && !self.queue_closed.load()
            && !self.is_queue_full()
    }

    /// Whether songs are being performed
    pub fn is_started(&self) -> bool {
        let start_time = self.schedule.lock().start_time;

        start_time.is_some_and(|t| Local::now() >= t) && !self.is_over()
    }

    pub fn is_over(&self) -> bool {
        let end_time = self.schedule.lock().end_time;

        end_time.is_some_and(|t| Local::now() >= t)
    }

    /// Whether the queue would already run past the scheduled end
    pub fn is_queue_full(&self) -> bool {
        let Some(end_time) = self.end_time() else {
            return false;
        };

        let seconds = self
            .queue
            .estimated_seconds(self.config.estimated_song_seconds);
        let finish = TimeDelta::try_milliseconds((seconds * 1000.) as i64)
            .and_then(|queued| Local::now().checked_add_signed(queued));

        // A queue too long to fit on the clock is full
        finish.map_or(true, |finish| finish > end_time)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_over() {
            return SessionPhase::Over;
        }

        let opened = self.open_time().is_some_and(|t| Local::now() >= t);

        if !opened {
            SessionPhase::NotYetOpen
        } else if self.is_open() {
            SessionPhase::Open
        } else {
            SessionPhase::TemporarilyClosed
        }
    }

    /// Opens the queue now instead of at the scheduled time
    pub fn open(&self) {
        self.schedule.lock().open_time = Some(Local::now());
        info!("Session opened");
    }

    /// Starts performing now instead of at the scheduled time
    pub fn start(&self) {
        self.schedule.lock().start_time = Some(Local::now());
        info!("Session started");
    }

    /// Closes the queue to new songs while keeping the session going
    pub fn close(&self) {
        self.queue_closed.store(true);
        info!("Queue closed");
    }

    pub fn reopen(&self) {
        self.queue_closed.store(false);
        info!("Queue reopened");
    }

    pub fn is_closed(&self) -> bool {
        self.queue_closed.load()
    }

    /// Ends the session now
    pub fn end(&self) {
        self.schedule.lock().end_time = Some(Local::now());
        info!("Session ended");
    }

    /// Songs this user has sung, or `None` if they haven't sung any
    pub fn user_history(&self, user_id: UserId) -> Option<Vec<SelectedSong>> {
        let sung: Vec<_> = self
            .history
            .lock()
            .iter()
            .filter(|s| s.was_sung() && s.owner().id == user_id)
            .cloned()
            .collect();

        (!sung.is_empty()).then_some(sung)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::{Duration, Local};

    use crate::{AdmitResult, CatalogSong, SelectedSong, SessionConfig, UserRegistry};

    use super::{Session, SessionPhase};

    fn session() -> Session {
        Session::new(SessionConfig::default(), Arc::new(UserRegistry::new()))
    }

    #[test]
    fn lifecycle_phases() {
        let session = session();
        assert_eq!(session.phase(), SessionPhase::NotYetOpen);
        assert!(!session.is_open());

        session.open();
        assert_eq!(session.phase(), SessionPhase::Open);
        assert!(session.is_open());
        assert!(!session.is_started());

        session.start();
        assert!(session.is_started());

        session.close();
        assert_eq!(session.phase(), SessionPhase::TemporarilyClosed);
        assert!(!session.is_open());

        session.reopen();
        assert!(session.is_open());

        session.end();
        assert_eq!(session.phase(), SessionPhase::Over);
        assert!(session.is_over());
        assert!(!session.is_open());
        assert!(!session.is_started());
    }

    #[test]
    fn scheduled_times_in_the_future() {
        let session = session();
        let now = Local::now();

        session.schedule(
            Some(now + Duration::hours(1)),
            Some(now + Duration::hours(2)),
            Some(now + Duration::hours(5)),
        );

        assert_eq!(session.phase(), SessionPhase::NotYetOpen);
        assert!(!session.is_started());
        assert!(!session.is_over());
    }

    #[test]
    fn queue_fills_up_before_the_end() {
        let session = session();
        let users = session.users().clone();
        let now = Local::now();

        session.schedule(Some(now), None, Some(now + Duration::minutes(5)));
        assert!(session.is_open());

        // Mock songs are three minutes long
        let ann = users.find_or_create_named("ann");
        let bob = users.find_or_create_named("bob");
        session.queue().add(SelectedSong::catalog(&ann, CatalogSong::mock(1, "A", "One")));
        assert!(session.is_open());

        session.queue().add(SelectedSong::catalog(&bob, CatalogSong::mock(2, "B", "Two")));
        assert!(session.is_queue_full());
        assert!(!session.is_open());
        assert_eq!(session.phase(), SessionPhase::TemporarilyClosed);
    }

    #[test]
    fn endless_songs_fill_the_queue_without_panicking() {
        let session = session();
        let users = session.users().clone();
        let now = Local::now();

        session.schedule(Some(now), None, Some(now + Duration::hours(3)));

        let ann = users.find_or_create_named("ann");
        let huge = CatalogSong::new(1, "A", "Forever", Some(f32::MAX));
        session.queue().add(SelectedSong::catalog(&ann, huge));

        assert!(session.is_queue_full());
        assert_eq!(session.phase(), SessionPhase::TemporarilyClosed);
        assert_eq!(
            session.admit(SelectedSong::catalog(&ann, CatalogSong::mock(2, "B", "Two"))),
            AdmitResult::QueueClosed
        );
    }

    #[test]
    fn unusable_durations_use_the_estimate() {
        let session = session();
        let users = session.users().clone();
        let now = Local::now();

        session.schedule(Some(now), None, Some(now + Duration::hours(3)));

        let ann = users.find_or_create_named("ann");
        let bob = users.find_or_create_named("bob");
        let endless = CatalogSong::new(1, "A", "Stream", Some(f32::INFINITY));
        let broken = CatalogSong::new(2, "B", "Broken", Some(f32::NAN));

        assert_eq!(
            session.admit(SelectedSong::catalog(&ann, endless)),
            AdmitResult::SuccessInQueue
        );
        assert_eq!(
            session.admit(SelectedSong::catalog(&bob, broken)),
            AdmitResult::SuccessInQueue
        );
        assert!(session.is_open());
        assert_eq!(session.queue().estimated_seconds(240.), 480.);
    }
}
