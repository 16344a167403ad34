use flate2::write::GzDecoder;
use log::debug;
use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Suffix of products being written
const PARTIAL_SUFFIX: &str = ".part";

/// Temporary location of `path`, until its content is complete
pub fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_os_string();
    partial.push(PARTIAL_SUFFIX);
    PathBuf::from(partial)
}

enum Sink {
    Plain(File),
    Gunzip(GzDecoder<File>),
}

/// Local sink of a download, decompressing on the fly if need be.
/// Content lands in [partial_path] and is moved to its destination by [FileDescriptor::finish].
/// An unfinished descriptor deletes its content when dropped.
pub struct FileDescriptor {
    sink: Option<Sink>,
    partial: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl Write for FileDescriptor {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.sink.as_mut().ok_or(io::ErrorKind::BrokenPipe)? {
            Sink::Plain(w) => w.write(data),
            Sink::Gunzip(w) => w.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.sink.as_mut().ok_or(io::ErrorKind::BrokenPipe)? {
            Sink::Plain(w) => w.flush(),
            Sink::Gunzip(w) => w.flush(),
        }
    }
}

impl FileDescriptor {
    pub fn new(gunzip: bool, path: &Path) -> io::Result<Self> {
        let partial = partial_path(path);
        let fd = File::create(&partial)?;

        let sink = if gunzip {
            Sink::Gunzip(GzDecoder::new(fd))
        } else {
            Sink::Plain(fd)
        };

        Ok(Self {
            partial,
            sink: Some(sink),
            path: path.to_path_buf(),
            committed: false,
        })
    }

    /// Flushes pending content and moves it to its destination.
    /// A truncated gzip stream is reported here.
    pub fn finish(mut self) -> io::Result<()> {
        let fd = match self.sink.take() {
            Some(Sink::Plain(fd)) => fd,
            Some(Sink::Gunzip(w)) => w.finish()?,
            None => return Err(io::ErrorKind::BrokenPipe.into()),
        };

        fd.sync_all()?;
        drop(fd);

        std::fs::rename(&self.partial, &self.path)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for FileDescriptor {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        // close before removal
        self.sink.take();

        match std::fs::remove_file(&self.partial) {
            Ok(()) => debug!("{} - discarded", self.partial.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => debug!("{} - failed to discard: {}", self.partial.display(), e),
        }
    }
}
