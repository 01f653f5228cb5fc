//! Background image decoding for gallery items.
//!
//! Each media item asks for exactly one texture and gets back a
//! [`PendingTexture`] handle. Results are delivered through that handle only,
//! so an item never observes another item's completion order. Dropping the
//! handle cancels the request: a queued decode is skipped and a finished one is
//! discarded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use atelier_engine::scene::{ImageData, TextureId, TextureRef};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::{debug, trace, warn};

// Shared by every loader so renderer cache keys never collide.
static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

fn next_texture_id() -> TextureId {
    TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
}

// ── errors ────────────────────────────────────────────────────────────────

/// Why an item ended up without a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The element has no deferred source attribute.
    MissingSource,
    /// The source uses a scheme this loader cannot fetch (e.g. `https://`).
    UnsupportedScheme { src: String },
    /// Reading or decoding the file failed.
    Decode { src: String, message: String },
    /// The decode worker went away before answering.
    Disconnected,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingSource => write!(f, "element has no data-src"),
            LoadError::UnsupportedScheme { src } => write!(f, "unsupported image source `{src}`"),
            LoadError::Decode { src, message } => write!(f, "failed to decode `{src}`: {message}"),
            LoadError::Disconnected => write!(f, "texture loader shut down before the image was decoded"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Maps a `data-src` value to a local path.
///
/// Accepts plain paths and `file://` URLs; every other `scheme://` is rejected.
pub fn resolve_source(src: &str) -> Result<PathBuf, LoadError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(LoadError::MissingSource);
    }
    if let Some(path) = src.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if src.contains("://") {
        return Err(LoadError::UnsupportedScheme { src: src.to_string() });
    }
    Ok(PathBuf::from(src))
}

// ── decoding ──────────────────────────────────────────────────────────────

/// Turns a file into RGBA8 pixels. Called on worker threads.
pub trait ImageDecoder: Send + Sync + 'static {
    fn decode(&self, path: &Path) -> Result<ImageData, LoadError>;
}

/// Decodes files with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<ImageData, LoadError> {
        let src = path.display().to_string();
        let rgba = image::open(path)
            .map_err(|e| LoadError::Decode {
                src: src.clone(),
                message: e.to_string(),
            })?
            .to_rgba8();

        let (width, height) = rgba.dimensions();
        ImageData::new(width, height, rgba.into_raw()).ok_or(LoadError::Decode {
            src,
            message: format!("empty image ({width}x{height})"),
        })
    }
}

// ── handles ───────────────────────────────────────────────────────────────

type LoadResult = Result<TextureRef, LoadError>;

/// Receiving end of one texture request.
#[derive(Debug)]
pub struct PendingTexture {
    src: String,
    rx: Receiver<LoadResult>,
    cancelled: Arc<AtomicBool>,
}

impl PendingTexture {
    #[inline]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Non-blocking check. `None` while the decode is still running.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected)),
        }
    }
}

impl Drop for PendingTexture {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Where a media item's texture stands.
#[derive(Debug)]
pub enum TextureState {
    Pending(PendingTexture),
    Loaded(TextureRef),
    Failed(LoadError),
}

impl TextureState {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, TextureState::Pending(_))
    }

    #[inline]
    pub fn texture(&self) -> Option<&TextureRef> {
        match self {
            TextureState::Loaded(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn error(&self) -> Option<&LoadError> {
        match self {
            TextureState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// ── loader ────────────────────────────────────────────────────────────────

struct Job {
    id: TextureId,
    src: String,
    path: PathBuf,
    cancelled: Arc<AtomicBool>,
    reply: Sender<LoadResult>,
}

enum Mode {
    Pool {
        jobs: Option<Sender<Job>>,
        handles: Vec<thread::JoinHandle<()>>,
    },
    Immediate(Arc<dyn ImageDecoder>),
}

/// Hands out one [`PendingTexture`] per request and decodes in the background.
pub struct TextureLoader {
    mode: Mode,
}

impl TextureLoader {
    /// Worker-pool loader with `workers` decode threads (at least one).
    pub fn new(workers: usize, decoder: impl ImageDecoder) -> std::io::Result<Self> {
        let decoder: Arc<dyn ImageDecoder> = Arc::new(decoder);
        let (jobs_tx, jobs_rx) = crossbeam_channel::unbounded::<Job>();

        let workers = workers.max(1);
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let jobs = jobs_rx.clone();
            let decoder = Arc::clone(&decoder);
            let handle = thread::Builder::new()
                .name(format!("atelier-decode-{worker_id}"))
                .spawn(move || {
                    trace!("decode worker {worker_id} started");
                    while let Ok(job) = jobs.recv() {
                        run_job(decoder.as_ref(), job);
                    }
                    trace!("decode worker {worker_id} stopped");
                })?;
            handles.push(handle);
        }

        debug!("texture loader started with {workers} worker(s)");
        Ok(Self {
            mode: Mode::Pool {
                jobs: Some(jobs_tx),
                handles,
            },
        })
    }

    /// Pool sized to the machine, capped at four threads.
    pub fn with_default_workers(decoder: impl ImageDecoder) -> std::io::Result<Self> {
        let workers = thread::available_parallelism().map_or(2, |n| n.get().min(4));
        Self::new(workers, decoder)
    }

    /// Decodes on the calling thread inside `request`. The result is still
    /// only visible through the returned handle.
    pub fn immediate(decoder: impl ImageDecoder) -> Self {
        Self {
            mode: Mode::Immediate(Arc::new(decoder)),
        }
    }

    /// Starts loading `src` (a path or `file://` URL).
    pub fn request(&self, src: &str) -> PendingTexture {
        let (reply, rx) = crossbeam_channel::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = PendingTexture {
            src: src.to_string(),
            rx,
            cancelled: Arc::clone(&cancelled),
        };

        let path = match resolve_source(src) {
            Ok(path) => path,
            Err(e) => {
                let _ = reply.send(Err(e));
                return handle;
            }
        };

        let job = Job {
            id: next_texture_id(),
            src: src.to_string(),
            path,
            cancelled,
            reply,
        };

        match &self.mode {
            Mode::Pool { jobs: Some(jobs), .. } => {
                // A failed send drops the job and its reply sender; the handle
                // then reports `Disconnected`.
                if jobs.send(job).is_err() {
                    warn!("texture loader is shut down; `{src}` will not load");
                }
            }
            Mode::Pool { jobs: None, .. } => {}
            Mode::Immediate(decoder) => run_job(decoder.as_ref(), job),
        }

        handle
    }
}

fn run_job(decoder: &dyn ImageDecoder, job: Job) {
    if job.cancelled.load(Ordering::Relaxed) {
        trace!("skipping cancelled decode of `{}`", job.src);
        return;
    }

    let result = decoder
        .decode(&job.path)
        .map(|image| TextureRef::new(job.id, image))
        .map_err(|e| match e {
            LoadError::Decode { message, .. } => LoadError::Decode {
                src: job.src.clone(),
                message,
            },
            other => other,
        });

    if job.cancelled.load(Ordering::Relaxed) {
        trace!("discarding decode of `{}` (cancelled)", job.src);
        return;
    }

    // The receiver may have been dropped in the meantime.
    let _ = job.reply.send(result);
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        if let Mode::Pool { jobs, handles } = &mut self.mode {
            // Closing the queue ends every worker loop after its current job.
            jobs.take();
            for handle in handles.drain(..) {
                if handle.join().is_err() {
                    warn!("decode worker panicked");
                }
            }
        }
    }
}
