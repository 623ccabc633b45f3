//! Observational events emitted by resolution backends. Listeners receive
//! them best-effort; there is no back-pressure and no delivery guarantee
//! beyond "in the order the backend produced them".

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Phase(PhaseEvent),
    Download(DownloadEvent),
    Log(LogEvent),
}

impl Event {
    /// A coarse progress marker ("Gathering dependencies", "Building model").
    pub fn phase(description: &str) -> Event {
        Event::Phase(PhaseEvent {
            description: description.to_string(),
        })
    }

    pub fn download(stage: DownloadStage, artifact: &str) -> Event {
        Event::Download(DownloadEvent {
            stage,
            artifact: artifact.to_string(),
        })
    }

    pub fn log(source: &str, message: &str, detail: Option<&str>) -> Event {
        Event::Log(LogEvent {
            source: source.to_string(),
            message: message.to_string(),
            detail: detail.map(str::to_string),
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhaseEvent {
    pub description: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DownloadStage {
    Starting,
    Complete,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DownloadEvent {
    pub stage: DownloadStage,
    pub artifact: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEvent {
    pub source: String,
    pub message: String,
    pub detail: Option<String>,
}

pub trait EventListener {
    fn on_event(&self, event: Event);
}

/// Discards everything. Useful for tests and for callers that only want the
/// resolution result.
pub struct NullListener;

impl EventListener for NullListener {
    fn on_event(&self, _event: Event) {}
}
