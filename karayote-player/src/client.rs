use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam::{
    atomic::AtomicCell,
    channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError},
};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};

use crate::{
    connection, Command, KaraokePlayer, PlayerConfig, PlayerError, PlayerEvent, PlayerStatus,
};

type Reply = Sender<Result<String, PlayerError>>;

/// A command waiting for the worker
struct Job {
    command: Command,
    reply: Option<Reply>,
}

/// State shared between the client and its worker
#[derive(Default)]
struct Shared {
    busy: AtomicCell<bool>,
    stopping: AtomicCell<bool>,
    status: RwLock<Option<Arc<PlayerStatus>>>,
}

/// Talks to the karaoke player. All commands go through a single worker thread,
/// so the player never has more than one request to deal with.
pub struct PlayerClient {
    config: PlayerConfig,
    shared: Arc<Shared>,
    job_sender: Sender<Job>,
    event_receiver: Receiver<PlayerEvent>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PlayerClient {
    pub fn new(config: PlayerConfig) -> Self {
        let (job_sender, job_receiver) = unbounded();
        let (event_sender, event_receiver) = unbounded();
        let shared = Arc::new(Shared::default());

        let worker = spawn_worker_thread(
            config.clone(),
            shared.clone(),
            job_receiver,
            event_sender,
        );

        Self {
            config,
            shared,
            job_sender,
            event_receiver,
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Runs a command and waits for the player's raw answer
    pub fn execute(&self, command: Command) -> Result<String, PlayerError> {
        if self.shared.stopping.load() {
            return Err(PlayerError::Stopped);
        }

        let (reply, response) = bounded(1);

        self.job_sender
            .send(Job {
                command,
                reply: Some(reply),
            })
            .map_err(|_| PlayerError::Stopped)?;

        response.recv().map_err(|_| PlayerError::Stopped)?
    }

    /// Queues a command without waiting for it. Status answers still update the snapshot.
    pub fn send(&self, command: Command) {
        if self.shared.stopping.load() {
            return;
        }

        let _ = self.job_sender.send(Job {
            command,
            reply: None,
        });
    }

    /// The latest known status, if the player ever answered
    pub fn current_status(&self) -> Option<Arc<PlayerStatus>> {
        self.shared.status.read().clone()
    }

    /// Whether a request is being made to the player right now
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopping.load()
    }

    /// Events emitted by the worker
    pub fn events(&self) -> Receiver<PlayerEvent> {
        self.event_receiver.clone()
    }

    /// Stops the worker after its current request. Waits for it to exit.
    pub fn stop(&self) {
        self.shared.stopping.store(true);

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                warn!("Player worker panicked");
            }
        }
    }
}

impl KaraokePlayer for PlayerClient {
    fn execute(&self, command: Command) -> Result<String, PlayerError> {
        PlayerClient::execute(self, command)
    }

    fn send(&self, command: Command) {
        PlayerClient::send(self, command)
    }

    fn current_status(&self) -> Option<Arc<PlayerStatus>> {
        PlayerClient::current_status(self)
    }

    fn events(&self) -> Receiver<PlayerEvent> {
        PlayerClient::events(self)
    }

    fn stop(&self) {
        PlayerClient::stop(self)
    }
}

impl Drop for PlayerClient {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    config: PlayerConfig,
    shared: Arc<Shared>,
    jobs: Receiver<Job>,
    events: Sender<PlayerEvent>,
    last_status: Instant,
    failures: u32,
}

impl Worker {
    fn run(mut self) {
        info!("Talking to the player at {}", self.config.address);

        while !self.shared.stopping.load() {
            match self.jobs.try_recv() {
                Ok(job) => self.run_job(job),
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            if self.status_is_due() {
                self.refresh_status();
            }

            match self.jobs.recv_timeout(self.config.tick()) {
                Ok(job) => self.run_job(job),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        // Nobody is left to run these
        for job in self.jobs.try_iter() {
            if let Some(reply) = job.reply {
                let _ = reply.send(Err(PlayerError::Stopped));
            }
        }

        info!("Player worker stopped");
    }

    fn status_is_due(&self) -> bool {
        let elapsed = self.last_status.elapsed();
        let idle = self.config.backoff(self.failures);
        let force = self.config.force_refresh().max(idle);

        elapsed >= force || (self.jobs.is_empty() && elapsed >= idle)
    }

    fn refresh_status(&mut self) {
        self.last_status = Instant::now();

        if let Ok(response) = self.request(&Command::status()) {
            self.apply_status(&response);
        }
    }

    fn run_job(&mut self, job: Job) {
        if self.shared.stopping.load() {
            if let Some(reply) = job.reply {
                let _ = reply.send(Err(PlayerError::Stopped));
            }
            return;
        }

        let result = self.request(&job.command);

        if let Ok(response) = &result {
            if job.command.returns_status() {
                self.last_status = Instant::now();
                self.apply_status(response);
            }
        }

        if let Some(reply) = job.reply {
            let _ = reply.send(result);
        }
    }

    fn request(&mut self, command: &Command) -> Result<String, PlayerError> {
        self.shared.busy.store(true);
        let result = connection::request(&self.config, &command.to_message());
        self.shared.busy.store(false);

        match &result {
            Ok(_) => {
                if self.failures > 0 {
                    info!("Player is reachable again");
                }
                self.failures = 0;
            }
            Err(error) => {
                if error.is_transport() {
                    self.failures = self.failures.saturating_add(1);
                }
                warn!("{} failed: {}", command, error);
            }
        }

        result
    }

    /// Replaces the snapshot if the status changed, and lets everyone know
    fn apply_status(&mut self, response: &str) {
        let status = match PlayerStatus::parse(response) {
            Ok(status) => status,
            Err(error) => {
                warn!("Ignoring status: {}", error);
                return;
            }
        };

        let mut current = self.shared.status.write();

        if current.as_ref().is_some_and(|c| c.same_as(&status)) {
            return;
        }

        let status = Arc::new(status);
        *current = Some(status.clone());
        drop(current);

        let _ = self.events.send(PlayerEvent::StatusChanged(status));
    }
}

fn spawn_worker_thread(
    config: PlayerConfig,
    shared: Arc<Shared>,
    jobs: Receiver<Job>,
    events: Sender<PlayerEvent>,
) -> JoinHandle<()> {
    let worker = Worker {
        config,
        shared,
        jobs,
        events,
        last_status: Instant::now(),
        failures: 0,
    };

    thread::spawn(move || worker.run())
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::{
        connection::test::{config, fake_player},
        status::test::{IDLE, PLAYING},
        Command, KaraokePlayer, PlayerClient, PlayerConfig, PlayerError, PlayerEvent, PlayerState,
    };

    /// A config that never polls on its own
    fn quiet(address: &str) -> PlayerConfig {
        PlayerConfig {
            idle_refresh_in_seconds: 600.,
            force_refresh_in_seconds: 600.,
            max_backoff_in_seconds: 600.,
            ..config(address)
        }
    }

    #[test]
    fn commands_update_the_status_once_per_change() {
        let responses = vec![PLAYING, PLAYING, IDLE]
            .into_iter()
            .map(str::to_string)
            .collect();
        let (address, player) = fake_player(responses);

        let client = PlayerClient::new(quiet(&address));
        let events = client.events();

        client.execute(Command::Play).unwrap();
        let PlayerEvent::StatusChanged(status) = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(status.state, PlayerState::Playing);

        client.execute(Command::Play).unwrap();
        assert!(events.try_recv().is_err());

        client.execute(Command::Pause).unwrap();
        let PlayerEvent::StatusChanged(status) = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(status.state, PlayerState::Idle);
        assert_eq!(
            client.current_status().map(|s| s.state),
            Some(PlayerState::Idle)
        );

        client.stop();
        assert_eq!(
            player.join().unwrap(),
            vec![
                "<action type=\"play\"></action>",
                "<action type=\"play\"></action>",
                "<action type=\"pause\"></action>"
            ]
        );
    }

    #[test]
    fn polls_status_when_idle() {
        let (address, _player) = fake_player(vec![PLAYING.to_string()]);

        let client = PlayerClient::new(PlayerConfig {
            idle_refresh_in_seconds: 0.1,
            ..quiet(&address)
        });

        let PlayerEvent::StatusChanged(status) = client
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(status.queue.len(), 2);
        client.stop();
    }

    #[test]
    fn lookups_do_not_touch_the_status() {
        let xml = r#"<list><item id="5"><title>Toxic</title><artist>Britney Spears</artist><year>2003</year><duration>201</duration></item></list>"#;
        let (address, player) = fake_player(vec![xml.to_string()]);

        let client = PlayerClient::new(quiet(&address));
        let entries = client.search("toxic", 10, 0).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 5);
        assert!(client.current_status().is_none());

        client.stop();
        assert_eq!(
            player.join().unwrap(),
            vec!["<action type=\"search\" offset=\"0\" limit=\"10\">toxic</action>"]
        );
    }

    #[test]
    fn failures_are_returned_not_raised() {
        let address = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("ws://{}", listener.local_addr().unwrap())
        };

        let client = PlayerClient::new(quiet(&address));

        assert!(matches!(
            client.execute(Command::Play),
            Err(PlayerError::ConnectionRefused)
        ));
        // The worker is still there
        assert!(matches!(
            client.status(),
            Err(PlayerError::ConnectionRefused)
        ));
        assert!(!client.is_busy());
    }

    #[test]
    fn stopped_clients_refuse_commands() {
        let client = PlayerClient::new(quiet("ws://127.0.0.1:9"));

        client.stop();

        assert!(client.is_stopped());
        assert!(matches!(
            client.execute(Command::Next),
            Err(PlayerError::Stopped)
        ));
    }
}
